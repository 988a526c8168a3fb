use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::loaders;
use crate::db;
use crate::entities::{allocations, builds, inventory_balance, part_master};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// A committed reservation together with the balance it left behind.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AllocationReceipt {
    pub allocation_id: i64,
    pub build_id: i64,
    pub stage_id: i64,
    pub item_id: i64,
    pub qty: Decimal,
    pub status: String,
    pub on_hand_qty: Decimal,
    pub allocated_qty: Decimal,
    pub available_qty: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Reserves stock against build stages.
#[derive(Clone)]
pub struct AllocationService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl AllocationService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Inserts a `reserved` allocation and raises the item's allocated
    /// quantity in the same transaction.
    ///
    /// # Errors
    /// `ValidationError` for a non-positive quantity, `NotFound` for an
    /// unknown build or item, `InsufficientStock` when `qty` exceeds what is
    /// available.
    #[instrument(skip(self))]
    pub async fn reserve(
        &self,
        build_id: i64,
        stage_id: i64,
        item_id: i64,
        qty: Decimal,
    ) -> Result<AllocationReceipt, ServiceError> {
        if qty <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "qty must be greater than zero".to_string(),
            ));
        }

        let receipt = db::run_in_transaction(&self.db_pool, "reserve_allocation", move |txn| {
            Box::pin(async move {
                builds::Entity::find_by_id(build_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| ServiceError::NotFound(format!("Build {} not found", build_id)))?;
                let part = part_master::Entity::find_by_id(item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

                let now = Utc::now();
                let reserved = inventory_balance::Entity::update_many()
                    .col_expr(
                        inventory_balance::Column::AllocatedQty,
                        Expr::col(inventory_balance::Column::AllocatedQty).add(qty),
                    )
                    .col_expr(inventory_balance::Column::UpdatedAt, Expr::value(now))
                    .filter(inventory_balance::Column::ItemId.eq(item_id))
                    .filter(
                        Expr::col(inventory_balance::Column::OnHandQty)
                            .gte(Expr::col(inventory_balance::Column::AllocatedQty).add(qty)),
                    )
                    .exec(txn)
                    .await
                    .map_err(ServiceError::db_error)?;

                if reserved.rows_affected == 0 {
                    let available = loaders::find_balance(txn, item_id)
                        .await
                        .map_err(ServiceError::db_error)?
                        .map(|balance| balance.available())
                        .unwrap_or(Decimal::ZERO);
                    return Err(ServiceError::InsufficientStock(format!(
                        "{} has {} available, {} requested",
                        part.sku, available, qty
                    )));
                }

                let allocation = allocations::ActiveModel {
                    build_id: Set(build_id),
                    stage_id: Set(stage_id),
                    item_id: Set(item_id),
                    qty: Set(qty),
                    status: Set(allocations::STATUS_RESERVED.to_string()),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(ServiceError::db_error)?;

                let balance = loaders::find_balance(txn, item_id)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| {
                        ServiceError::InternalError(format!("Balance for item {} vanished", item_id))
                    })?;

                Ok(AllocationReceipt {
                    allocation_id: allocation.id,
                    build_id,
                    stage_id,
                    item_id,
                    qty,
                    status: allocation.status,
                    on_hand_qty: balance.on_hand_qty,
                    allocated_qty: balance.allocated_qty,
                    available_qty: balance.available(),
                    created_at: now,
                })
            })
        })
        .await?;

        info!(
            allocation_id = receipt.allocation_id,
            build_id,
            item_id,
            qty = %qty,
            "Stock reserved"
        );

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::StockAllocated {
                    allocation_id: receipt.allocation_id,
                    build_id,
                    stage_id,
                    item_id,
                    qty,
                })
                .await;
        }

        Ok(receipt)
    }
}
