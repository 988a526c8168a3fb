use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::shortages;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_balance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub item_id: i64,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub on_hand_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub allocated_qty: Decimal,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn available(&self) -> Decimal {
        shortages::available(self.on_hand_qty, self.allocated_qty)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::part_master::Entity",
        from = "Column::ItemId",
        to = "super::part_master::Column::Id"
    )]
    Part,
}

impl Related<super::part_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
