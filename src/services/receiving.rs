//! Stock receiving.
//!
//! Receipts raise on-hand stock and then give parts-blocked tasks a chance
//! to resume: any BLOCKED task whose latest block was for parts, and whose
//! requirements are now all covered, is moved on with an UNBLOCK event.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use super::loaders;
use super::task_events::record_event;
use crate::db;
use crate::entities::{
    inventory_balance, inventory_lot, part_master, stock_receipts, task_requirements, tasks,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{actions, EventType, TaskFacts, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ReceiptOutcome {
    pub receipt_id: i64,
    pub item_id: i64,
    pub sku: String,
    pub lot_code: String,
    pub qty: Decimal,
    pub on_hand_qty: Decimal,
    pub allocated_qty: Decimal,
    pub available_qty: Decimal,
    pub received_at: DateTime<Utc>,
    /// Tasks moved out of BLOCKED by this receipt.
    pub unblocked_task_ids: Vec<i64>,
}

#[derive(Clone)]
pub struct ReceivingService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl ReceivingService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Books `qty` of the item into stock and unblocks the tasks it satisfies.
    #[instrument(skip(self, note))]
    pub async fn receive(
        &self,
        item_id: i64,
        qty: Decimal,
        note: Option<String>,
    ) -> Result<ReceiptOutcome, ServiceError> {
        if qty <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "qty must be greater than zero".to_string(),
            ));
        }
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let outcome = db::run_in_transaction(&self.db_pool, "receive_stock", move |txn| {
            Box::pin(async move {
                let now = Utc::now();
                let part = part_master::Entity::find_by_id(item_id)
                    .one(txn)
                    .await
                    .map_err(ServiceError::db_error)?
                    .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", item_id)))?;

                let receipt = stock_receipts::ActiveModel {
                    item_id: Set(item_id),
                    qty: Set(qty),
                    note: Set(note),
                    received_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(ServiceError::db_error)?;

                let lot_code = format!("RCV-{}-{}", now.format("%Y%m%d"), receipt.id);
                inventory_lot::ActiveModel {
                    item_id: Set(item_id),
                    lot_code: Set(lot_code.clone()),
                    qty: Set(qty),
                    received_at: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await
                .map_err(ServiceError::db_error)?;

                let balance = add_on_hand(txn, item_id, qty, now).await?;
                let unblocked_task_ids = unblock_satisfied_tasks(txn, &part, now).await?;

                Ok(ReceiptOutcome {
                    receipt_id: receipt.id,
                    item_id,
                    sku: part.sku,
                    lot_code,
                    qty,
                    on_hand_qty: balance.on_hand_qty,
                    allocated_qty: balance.allocated_qty,
                    available_qty: balance.available(),
                    received_at: now,
                    unblocked_task_ids,
                })
            })
        })
        .await?;

        info!(
            item_id,
            qty = %qty,
            on_hand = %outcome.on_hand_qty,
            unblocked = outcome.unblocked_task_ids.len(),
            "Stock received"
        );

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::StockReceived {
                    item_id,
                    qty,
                    on_hand: outcome.on_hand_qty,
                })
                .await;
            for task_id in &outcome.unblocked_task_ids {
                sender
                    .send_or_log(Event::TaskUnblocked {
                        task_id: *task_id,
                        item_id,
                    })
                    .await;
            }
        }

        Ok(outcome)
    }
}

/// Raises on-hand stock in place, creating the balance row on first receipt.
async fn add_on_hand(
    txn: &DatabaseTransaction,
    item_id: i64,
    qty: Decimal,
    now: DateTime<Utc>,
) -> Result<inventory_balance::Model, ServiceError> {
    let raised = inventory_balance::Entity::update_many()
        .col_expr(
            inventory_balance::Column::OnHandQty,
            Expr::col(inventory_balance::Column::OnHandQty).add(qty),
        )
        .col_expr(inventory_balance::Column::UpdatedAt, Expr::value(now))
        .filter(inventory_balance::Column::ItemId.eq(item_id))
        .exec(txn)
        .await
        .map_err(ServiceError::db_error)?;

    if raised.rows_affected == 0 {
        return inventory_balance::ActiveModel {
            item_id: Set(item_id),
            on_hand_qty: Set(qty),
            allocated_qty: Set(Decimal::ZERO),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error);
    }

    loaders::find_balance(txn, item_id)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::InternalError(format!("Balance for item {} vanished", item_id)))
}

/// Logs UNBLOCK on every parts-blocked task needing `part` whose
/// requirements are all covered after the receipt. Returns their ids.
async fn unblock_satisfied_tasks(
    txn: &DatabaseTransaction,
    part: &part_master::Model,
    now: DateTime<Utc>,
) -> Result<Vec<i64>, ServiceError> {
    let mut task_ids: Vec<i64> = task_requirements::Entity::find()
        .filter(task_requirements::Column::ItemId.eq(part.id))
        .all(txn)
        .await
        .map_err(ServiceError::db_error)?
        .into_iter()
        .map(|requirement| requirement.task_id)
        .collect();
    task_ids.sort_unstable();
    task_ids.dedup();
    if task_ids.is_empty() {
        return Ok(Vec::new());
    }

    let blocked = loaders::task_rows(
        txn,
        tasks::Entity::find()
            .filter(tasks::Column::Id.is_in(task_ids))
            .order_by_asc(tasks::Column::Id),
    )
    .await
    .map_err(ServiceError::db_error)?
    .into_iter()
    .filter(|task| task.parsed_status() == Some(TaskStatus::Blocked))
    .map(|task| task.id)
    .collect::<Vec<_>>();

    let block_events = loaders::latest_block_events(txn, &blocked)
        .await
        .map_err(ServiceError::db_error)?;
    let parts_blocked: Vec<i64> = blocked
        .into_iter()
        .filter(|task_id| {
            block_events
                .get(task_id)
                .map(|event| actions::is_parts_block(event.note.as_deref()))
                .unwrap_or(false)
        })
        .collect();

    let still_short = loaders::short_parts_by_task(txn, &parts_blocked)
        .await
        .map_err(ServiceError::db_error)?;

    let mut unblocked = Vec::new();
    for task_id in parts_blocked {
        if let Some(short) = still_short.get(&task_id) {
            debug!(task_id, short_items = short.len(), "Task still short after receipt");
            continue;
        }
        record_event(
            txn,
            task_id,
            EventType::Unblock,
            Some(format!("Stock received: {}", part.sku)),
            None,
            now,
        )
        .await?;
        unblocked.push(task_id);
    }
    Ok(unblocked)
}
