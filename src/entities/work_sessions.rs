use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A technician's timed stretch on one task; open while `ended_at` is null.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub technician_id: i64,
    pub task_id: i64,
    pub station: Option<String>,
    pub started_at: DateTimeUtc,
    pub ended_at: Option<DateTimeUtc>,
}

impl Model {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Hours worked inside `[day_start, now]`; open sessions run until `now`.
    pub fn hours_since(&self, day_start: DateTime<Utc>, now: DateTime<Utc>) -> Decimal {
        let start = self.started_at.max(day_start);
        let end = self.ended_at.unwrap_or(now).min(now);
        if end <= start {
            return Decimal::ZERO;
        }
        Decimal::from((end - start).num_seconds()) / Decimal::from(3600)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::technicians::Entity",
        from = "Column::TechnicianId",
        to = "super::technicians::Column::Id"
    )]
    Technician,
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
}

impl Related<super::technicians::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Technician.def()
    }
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
