//! Operations summary for the admin landing page.

use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::loaders::{self, TaskRow};
use crate::db::or_fallback;
use crate::entities::{builds, task_requirements, tasks, technicians, work_sessions};
use crate::errors::ServiceError;
use crate::models::{BuildStatus, TaskStatus, UNASSIGNED_PHASE};

const TOP_BLOCKER_LIMIT: usize = 6;
const UNSPECIFIED_REASON: &str = "Unspecified";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SummaryMetrics {
    pub active_builds: u64,
    pub hold_builds: u64,
    pub blocked_tasks: u64,
    /// Task requirements that current availability cannot cover.
    pub shortages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BlockerCount {
    pub reason: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PhaseWip {
    pub phase: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TechnicianStatus {
    pub id: i64,
    pub display_name: String,
    pub title: Option<String>,
    pub working: bool,
    pub current_task: Option<String>,
    pub build_code: Option<String>,
    pub station: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub hours_today: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AdminSummary {
    pub metrics: SummaryMetrics,
    pub top_blockers: Vec<BlockerCount>,
    pub wip_by_phase: Vec<PhaseWip>,
    pub technicians: Vec<TechnicianStatus>,
}

/// Groups reasons, most frequent first; ties keep alphabetical order.
pub fn count_blockers<'a>(reasons: impl IntoIterator<Item = Option<&'a str>>) -> Vec<BlockerCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for reason in reasons {
        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(UNSPECIFIED_REASON);
        *counts.entry(reason.to_string()).or_default() += 1;
    }
    let mut grouped: Vec<BlockerCount> = counts
        .into_iter()
        .map(|(reason, count)| BlockerCount { reason, count })
        .collect();
    grouped.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.reason.cmp(&b.reason)));
    grouped.truncate(TOP_BLOCKER_LIMIT);
    grouped
}

pub fn wip_by_phase(tasks: &[TaskRow]) -> Vec<PhaseWip> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for task in tasks {
        *counts
            .entry(task.phase.as_deref().unwrap_or(UNASSIGNED_PHASE))
            .or_default() += 1;
    }
    let mut wip: Vec<PhaseWip> = counts
        .into_iter()
        .map(|(phase, count)| PhaseWip {
            phase: phase.to_string(),
            count,
        })
        .collect();
    wip.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.phase.cmp(&b.phase)));
    wip
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[derive(Clone)]
pub struct AdminSummaryService {
    db_pool: Arc<DatabaseConnection>,
}

impl AdminSummaryService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> AdminSummary {
        AdminSummary {
            metrics: or_fallback(self.metrics().await, SummaryMetrics::default(), "summary_metrics"),
            top_blockers: or_fallback(self.top_blockers().await, Vec::new(), "summary_blockers"),
            wip_by_phase: or_fallback(self.wip().await, Vec::new(), "summary_wip"),
            technicians: or_fallback(
                self.technicians(Utc::now()).await,
                Vec::new(),
                "summary_technicians",
            ),
        }
    }

    async fn metrics(&self) -> Result<SummaryMetrics, ServiceError> {
        let db = &*self.db_pool;
        let active_builds = builds::Entity::find()
            .filter(builds::Column::Status.eq(BuildStatus::InProgress.as_str()))
            .count(db)
            .await?;
        let hold_builds = builds::Entity::find()
            .filter(builds::Column::Status.eq(BuildStatus::Hold.as_str()))
            .count(db)
            .await?;
        let blocked_tasks = tasks::Entity::find()
            .filter(tasks::Column::Status.eq(TaskStatus::Blocked.as_str()))
            .count(db)
            .await?;

        let requirements = task_requirements::Entity::find().all(db).await?;
        let mut item_ids: Vec<i64> = requirements.iter().map(|r| r.item_id).collect();
        item_ids.sort_unstable();
        item_ids.dedup();
        let balances = loaders::balances_by_item(db, &item_ids).await?;
        let shortages = requirements
            .iter()
            .filter(|r| r.required_qty > loaders::available_for(&balances, r.item_id))
            .count() as u64;

        Ok(SummaryMetrics {
            active_builds,
            hold_builds,
            blocked_tasks,
            shortages,
        })
    }

    async fn top_blockers(&self) -> Result<Vec<BlockerCount>, ServiceError> {
        let db = &*self.db_pool;
        let blocked: Vec<i64> = tasks::Entity::find()
            .filter(tasks::Column::Status.eq(TaskStatus::Blocked.as_str()))
            .all(db)
            .await?
            .into_iter()
            .map(|task| task.id)
            .collect();
        let events = loaders::latest_block_events(db, &blocked).await?;
        Ok(count_blockers(blocked.iter().map(|id| {
            events.get(id).and_then(|event| event.note.as_deref())
        })))
    }

    async fn wip(&self) -> Result<Vec<PhaseWip>, ServiceError> {
        let active = loaders::task_rows(
            &*self.db_pool,
            tasks::Entity::find().filter(tasks::Column::Status.is_in([
                TaskStatus::InProgress.as_str(),
                TaskStatus::Paused.as_str(),
            ])),
        )
        .await?;
        Ok(wip_by_phase(&active))
    }

    async fn technicians(&self, now: DateTime<Utc>) -> Result<Vec<TechnicianStatus>, ServiceError> {
        let db = &*self.db_pool;
        let techs = technicians::Entity::find()
            .filter(technicians::Column::Active.eq(true))
            .order_by_asc(technicians::Column::DisplayName)
            .all(db)
            .await?;
        let tech_ids: Vec<i64> = techs.iter().map(|t| t.id).collect();
        if tech_ids.is_empty() {
            return Ok(Vec::new());
        }

        let day_start = start_of_day(now);
        let sessions = work_sessions::Entity::find()
            .filter(work_sessions::Column::TechnicianId.is_in(tech_ids))
            .filter(
                sea_orm::Condition::any()
                    .add(work_sessions::Column::StartedAt.gte(day_start))
                    .add(work_sessions::Column::EndedAt.is_null()),
            )
            .order_by_desc(work_sessions::Column::StartedAt)
            .all(db)
            .await?;

        let mut task_ids: Vec<i64> = sessions
            .iter()
            .filter(|s| s.is_open())
            .map(|s| s.task_id)
            .collect();
        task_ids.sort_unstable();
        task_ids.dedup();
        let tasks: HashMap<i64, TaskRow> = loaders::task_rows(
            db,
            tasks::Entity::find().filter(tasks::Column::Id.is_in(task_ids)),
        )
        .await?
        .into_iter()
        .map(|task| (task.id, task))
        .collect();

        Ok(techs
            .into_iter()
            .map(|tech| {
                let mine: Vec<&work_sessions::Model> =
                    sessions.iter().filter(|s| s.technician_id == tech.id).collect();
                let open = mine.iter().find(|s| s.is_open());
                let task = open.and_then(|s| tasks.get(&s.task_id));
                let hours_today: Decimal = mine
                    .iter()
                    .filter(|s| s.started_at >= day_start)
                    .map(|s| s.hours_since(day_start, now))
                    .sum();

                TechnicianStatus {
                    id: tech.id,
                    display_name: tech.display_name,
                    title: tech.title,
                    working: open.is_some(),
                    current_task: task.map(|t| t.title.clone()),
                    build_code: task.and_then(|t| t.build_code.clone()),
                    station: task
                        .and_then(|t| t.phase.clone())
                        .or_else(|| open.and_then(|s| s.station.clone())),
                    started_at: open.map(|s| s.started_at),
                    hours_today: hours_today.round_dp(2),
                }
            })
            .collect())
    }
}
