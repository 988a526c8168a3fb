use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contents of a kit or bag item.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kit_components")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub parent_item_id: i64,
    pub child_item_id: i64,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub qty_per_parent: Decimal,
    pub instance_status: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::part_master::Entity",
        from = "Column::ChildItemId",
        to = "super::part_master::Column::Id"
    )]
    Child,
}

impl Related<super::part_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Child.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
