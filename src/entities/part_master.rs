use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::shortages::ItemType;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "part_master")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    pub part_type: String,
    pub make_buy: Option<String>,
    pub is_serialized: bool,
    pub uom: Option<String>,
    pub item_type: String,
    pub criticality: Option<String>,
}

impl Model {
    /// Unrecognised item types are treated as plain SKUs.
    pub fn parsed_item_type(&self) -> ItemType {
        self.item_type.parse().unwrap_or(ItemType::Sku)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::inventory_balance::Entity")]
    Balance,
}

impl Related<super::inventory_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Balance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
