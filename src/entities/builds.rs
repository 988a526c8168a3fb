use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A vehicle under construction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "builds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub model: Option<String>,
    pub status: String,
    pub eta_date: Option<Date>,
    /// Free-form build sheet; `hold_reason` and `description` are read from it.
    pub spec_json: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    fn spec_field(&self, key: &str) -> Option<String> {
        self.spec_json
            .as_ref()
            .and_then(|spec| spec.get(key))
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }

    pub fn hold_reason(&self) -> Option<String> {
        self.spec_field("hold_reason")
    }

    pub fn description(&self) -> Option<String> {
        self.spec_field("description")
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
    #[sea_orm(has_many = "super::build_documents::Entity")]
    Documents,
    #[sea_orm(has_many = "super::build_bom_line::Entity")]
    BomLines,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::build_documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::build_bom_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
