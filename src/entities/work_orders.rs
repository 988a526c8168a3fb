use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wo_type: String,
    pub status: String,
    pub target_part_id: i64,
    pub for_build_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::part_master::Entity",
        from = "Column::TargetPartId",
        to = "super::part_master::Column::Id"
    )]
    TargetPart,
    #[sea_orm(
        belongs_to = "super::builds::Entity",
        from = "Column::ForBuildId",
        to = "super::builds::Column::Id"
    )]
    Build,
}

impl Related<super::part_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TargetPart.def()
    }
}

impl Related<super::builds::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Build.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
