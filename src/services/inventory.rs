//! Inventory availability view.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::db::or_fallback;
use crate::entities::{inventory_balance, inventory_lot, part_master};
use crate::errors::ServiceError;
use crate::models::shortages::{availability_tone, available, StockTone};

/// Where the quantities of an inventory view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InventorySource {
    Balances,
    /// No balance rows exist yet; on-hand is the sum of received lots.
    Lots,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InventoryRow {
    pub item_id: i64,
    pub sku: String,
    pub name: String,
    pub on_hand: Decimal,
    pub allocated: Decimal,
    pub available: Decimal,
    pub tone: StockTone,
}

impl InventoryRow {
    fn new(part: &part_master::Model, on_hand: Decimal, allocated: Decimal) -> Self {
        let available = available(on_hand, allocated);
        Self {
            item_id: part.id,
            sku: part.sku.clone(),
            name: part.name.clone(),
            on_hand,
            allocated,
            available,
            tone: availability_tone(available),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct InventoryView {
    pub source: InventorySource,
    pub rows: Vec<InventoryRow>,
}

#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DatabaseConnection>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Availability per part, ordered by SKU.
    #[instrument(skip(self))]
    pub async fn inventory(&self) -> InventoryView {
        let from_balances = or_fallback(self.balance_rows().await, Vec::new(), "inventory_balances");
        if !from_balances.is_empty() {
            return InventoryView {
                source: InventorySource::Balances,
                rows: from_balances,
            };
        }

        debug!("No inventory balances, summing lots");
        InventoryView {
            source: InventorySource::Lots,
            rows: or_fallback(self.lot_rows().await, Vec::new(), "inventory_lots"),
        }
    }

    async fn balance_rows(&self) -> Result<Vec<InventoryRow>, ServiceError> {
        let db = &*self.db_pool;
        let balances = inventory_balance::Entity::find()
            .find_also_related(part_master::Entity)
            .all(db)
            .await?;

        let mut rows: Vec<InventoryRow> = balances
            .into_iter()
            .filter_map(|(balance, part)| {
                part.map(|part| InventoryRow::new(&part, balance.on_hand_qty, balance.allocated_qty))
            })
            .collect();
        rows.sort_by(|a, b| a.sku.cmp(&b.sku));
        Ok(rows)
    }

    /// Every part with the total of its lots; parts with no lots show zero.
    async fn lot_rows(&self) -> Result<Vec<InventoryRow>, ServiceError> {
        let db = &*self.db_pool;
        let parts = part_master::Entity::find()
            .order_by_asc(part_master::Column::Sku)
            .all(db)
            .await?;
        let lots = inventory_lot::Entity::find().all(db).await?;

        let totals = lots.into_iter().fold(HashMap::new(), |mut acc, lot| {
            *acc.entry(lot.item_id).or_insert(Decimal::ZERO) += lot.qty;
            acc
        });

        Ok(parts
            .iter()
            .map(|part| {
                let on_hand = totals.get(&part.id).copied().unwrap_or(Decimal::ZERO);
                InventoryRow::new(part, on_hand, Decimal::ZERO)
            })
            .collect())
    }
}
