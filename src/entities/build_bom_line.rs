use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "build_bom_line")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub build_id: i64,
    pub part_id: i64,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub required_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub allocated_qty: Decimal,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub consumed_qty: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::builds::Entity",
        from = "Column::BuildId",
        to = "super::builds::Column::Id"
    )]
    Build,
    #[sea_orm(
        belongs_to = "super::part_master::Entity",
        from = "Column::PartId",
        to = "super::part_master::Column::Id"
    )]
    Part,
}

impl Related<super::builds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Build.def()
    }
}

impl Related<super::part_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
