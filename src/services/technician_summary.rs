//! "My work" summary for the selected technician.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::loaders::{self, TaskRow};
use crate::db::or_fallback;
use crate::entities::{tasks, technicians, work_sessions};
use crate::errors::ServiceError;
use crate::models::TaskStatus;

const NEXT_LIMIT: u64 = 3;
const BLOCKER_LIMIT: u64 = 5;
const TEAM_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NowWorking {
    pub task_id: i64,
    pub task_name: String,
    pub build_code: Option<String>,
    pub phase: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NextTask {
    pub task_id: i64,
    pub task_name: String,
    pub build_code: Option<String>,
    pub phase: Option<String>,
    pub status: String,
}

impl From<TaskRow> for NextTask {
    fn from(row: TaskRow) -> Self {
        Self {
            task_id: row.id,
            task_name: row.title,
            build_code: row.build_code,
            phase: row.phase,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MyBlocker {
    pub task_id: i64,
    pub task_name: String,
    pub build_code: Option<String>,
    pub phase: Option<String>,
    pub note: Option<String>,
    pub blocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeammateNow {
    pub technician_id: i64,
    pub display_name: String,
    pub task_name: String,
    pub build_code: Option<String>,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TechnicianSummary {
    pub technician_id: Option<i64>,
    pub now: Option<NowWorking>,
    pub next: Vec<NextTask>,
    pub blockers: Vec<MyBlocker>,
    /// Phase used to pick teammates: the current task's, else the first next task's.
    pub team_phase: Option<String>,
    pub team_now: Vec<TeammateNow>,
}

impl TechnicianSummary {
    fn empty(technician_id: Option<i64>) -> Self {
        Self {
            technician_id,
            now: None,
            next: Vec::new(),
            blockers: Vec::new(),
            team_phase: None,
            team_now: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct TechnicianSummaryService {
    db_pool: Arc<DatabaseConnection>,
}

impl TechnicianSummaryService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, technician_id: Option<i64>) -> TechnicianSummary {
        let Some(tech) = technician_id else {
            return TechnicianSummary::empty(None);
        };

        let now = or_fallback(self.now_working(tech).await, None, "technician_now");
        let next = or_fallback(self.next_tasks(tech).await, Vec::new(), "technician_next");
        let blockers = or_fallback(self.blockers(tech).await, Vec::new(), "technician_blockers");

        let team_phase = now
            .as_ref()
            .and_then(|n| n.phase.clone())
            .or_else(|| next.first().and_then(|t| t.phase.clone()));
        let team_now = match team_phase.as_deref() {
            Some(phase) => or_fallback(self.team_now(tech, phase).await, Vec::new(), "team_now"),
            None => Vec::new(),
        };

        TechnicianSummary {
            technician_id: Some(tech),
            now,
            next,
            blockers,
            team_phase,
            team_now,
        }
    }

    async fn now_working(&self, technician_id: i64) -> Result<Option<NowWorking>, ServiceError> {
        let db = &*self.db_pool;
        let Some(session) = work_sessions::Entity::find()
            .filter(work_sessions::Column::TechnicianId.eq(technician_id))
            .filter(work_sessions::Column::EndedAt.is_null())
            .order_by_desc(work_sessions::Column::StartedAt)
            .one(db)
            .await?
        else {
            return Ok(None);
        };

        let task = loaders::task_rows(db, tasks::Entity::find_by_id(session.task_id))
            .await?
            .into_iter()
            .next();
        Ok(task.map(|task| NowWorking {
            task_id: task.id,
            task_name: task.title,
            build_code: task.build_code,
            phase: task.phase.or(session.station),
            started_at: session.started_at,
        }))
    }

    async fn assigned_with_status(
        &self,
        technician_id: i64,
        statuses: &[TaskStatus],
        limit: u64,
    ) -> Result<Vec<TaskRow>, ServiceError> {
        let db = &*self.db_pool;
        let assigned = loaders::assigned_task_ids(db, technician_id).await?;
        if assigned.is_empty() {
            return Ok(Vec::new());
        }
        Ok(loaders::task_rows(
            db,
            tasks::Entity::find()
                .filter(tasks::Column::Id.is_in(assigned))
                .filter(tasks::Column::Status.is_in(statuses.iter().map(TaskStatus::as_str)))
                .order_by_desc(tasks::Column::UpdatedAt)
                .order_by_desc(tasks::Column::Id)
                .limit(limit),
        )
        .await?)
    }

    async fn next_tasks(&self, technician_id: i64) -> Result<Vec<NextTask>, ServiceError> {
        Ok(self
            .assigned_with_status(
                technician_id,
                &[TaskStatus::NotStarted, TaskStatus::Paused],
                NEXT_LIMIT,
            )
            .await?
            .into_iter()
            .map(NextTask::from)
            .collect())
    }

    async fn blockers(&self, technician_id: i64) -> Result<Vec<MyBlocker>, ServiceError> {
        let rows = self
            .assigned_with_status(technician_id, &[TaskStatus::Blocked], BLOCKER_LIMIT)
            .await?;
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let blocks = loaders::block_info(&*self.db_pool, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let block = blocks.get(&row.id);
                MyBlocker {
                    task_id: row.id,
                    note: block.and_then(|b| b.reason.clone()),
                    blocked_at: block.map(|b| b.blocked_at),
                    task_name: row.title,
                    build_code: row.build_code,
                    phase: row.phase,
                }
            })
            .collect())
    }

    /// Other technicians with an open session on a task in `phase`.
    async fn team_now(
        &self,
        technician_id: i64,
        phase: &str,
    ) -> Result<Vec<TeammateNow>, ServiceError> {
        let db = &*self.db_pool;
        let sessions = work_sessions::Entity::find()
            .filter(work_sessions::Column::TechnicianId.ne(technician_id))
            .filter(work_sessions::Column::EndedAt.is_null())
            .find_also_related(technicians::Entity)
            .order_by_desc(work_sessions::Column::StartedAt)
            .all(db)
            .await?;

        let mut task_ids: Vec<i64> = sessions.iter().map(|(s, _)| s.task_id).collect();
        task_ids.sort_unstable();
        task_ids.dedup();
        let tasks: HashMap<i64, TaskRow> = if task_ids.is_empty() {
            HashMap::new()
        } else {
            loaders::task_rows(db, tasks::Entity::find().filter(tasks::Column::Id.is_in(task_ids)))
                .await?
                .into_iter()
                .map(|task| (task.id, task))
                .collect()
        };

        Ok(sessions
            .into_iter()
            .filter_map(|(session, tech)| {
                let task = tasks.get(&session.task_id)?;
                if task.phase.as_deref() != Some(phase) {
                    return None;
                }
                Some(TeammateNow {
                    technician_id: session.technician_id,
                    display_name: tech.map(|t| t.display_name).unwrap_or_default(),
                    task_name: task.title.clone(),
                    build_code: task.build_code.clone(),
                    started_at: session.started_at,
                })
            })
            .take(TEAM_LIMIT)
            .collect())
    }
}
