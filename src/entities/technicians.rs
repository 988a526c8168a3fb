use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technicians")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub display_name: String,
    pub title: Option<String>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::work_sessions::Entity")]
    WorkSessions,
}

impl Related<super::work_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkSessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
