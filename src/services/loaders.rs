//! Query helpers shared by the view services.
//!
//! Every helper is generic over `ConnectionTrait` so the same lookups run on
//! the pool for page loads and inside a transaction for writes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Select,
};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use crate::entities::{
    builds, inventory_balance, part_master, phases, task_assignments, task_events,
    task_requirements, tasks,
};
use crate::models::{quick_log::QuickLogRow, shortages, EventFacts, EventType, TaskFacts};

/// A task joined with its phase and build, the shape most views start from.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TaskRow {
    pub id: i64,
    pub build_id: i64,
    pub build_code: Option<String>,
    pub build_model: Option<String>,
    pub build_status: Option<String>,
    pub title: String,
    pub phase_id: Option<i64>,
    pub phase: Option<String>,
    pub status: String,
    pub owner: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl TaskFacts for TaskRow {
    fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }
}

impl QuickLogRow for TaskRow {
    fn build_code(&self) -> Option<&str> {
        self.build_code.as_deref()
    }

    fn title(&self) -> Option<&str> {
        Some(self.title.as_str())
    }
}

/// Latest BLOCK event on a task.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BlockInfo {
    pub reason: Option<String>,
    pub blocked_at: DateTime<Utc>,
}

impl From<&task_events::Model> for BlockInfo {
    fn from(event: &task_events::Model) -> Self {
        Self {
            reason: event.note.clone(),
            blocked_at: event.occurred_at,
        }
    }
}

/// A task event labelled with its task and phase.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TaskEventView {
    pub id: i64,
    pub task_id: i64,
    pub task_name: Option<String>,
    pub event_type: String,
    pub phase: Option<String>,
    pub note: Option<String>,
    pub technician_id: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

impl EventFacts for TaskEventView {
    fn event_type(&self) -> Option<&str> {
        Some(self.event_type.as_str())
    }

    fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }
}

/// Loads `query` with each task's phase and build attached.
pub async fn task_rows<C: ConnectionTrait>(
    db: &C,
    query: Select<tasks::Entity>,
) -> Result<Vec<TaskRow>, DbErr> {
    let rows = query.find_also_related(phases::Entity).all(db).await?;

    let mut build_ids: Vec<i64> = rows.iter().map(|(task, _)| task.build_id).collect();
    build_ids.sort_unstable();
    build_ids.dedup();
    let builds = builds_by_id(db, &build_ids).await?;

    Ok(rows
        .into_iter()
        .map(|(task, phase)| {
            let build = builds.get(&task.build_id);
            TaskRow {
                id: task.id,
                build_id: task.build_id,
                build_code: build.map(|b| b.code.clone()),
                build_model: build.and_then(|b| b.model.clone()),
                build_status: build.map(|b| b.status.clone()),
                title: task.name,
                phase_id: task.phase_id,
                phase: phase.map(|p| p.name),
                status: task.status,
                owner: task.owner,
                started_at: task.started_at,
                updated_at: task.updated_at,
            }
        })
        .collect())
}

pub async fn builds_by_id<C: ConnectionTrait>(
    db: &C,
    ids: &[i64],
) -> Result<HashMap<i64, builds::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(builds::Entity::find()
        .filter(builds::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|build| (build.id, build))
        .collect())
}

/// Resolves a build by code, or by numeric id when the key parses as one.
pub async fn find_build<C: ConnectionTrait>(
    db: &C,
    key: &str,
) -> Result<Option<builds::Model>, DbErr> {
    let key = key.trim();
    let mut condition = Condition::any().add(builds::Column::Code.eq(key));
    if let Ok(id) = key.parse::<i64>() {
        condition = condition.add(builds::Column::Id.eq(id));
    }
    builds::Entity::find().filter(condition).one(db).await
}

/// Events on the given tasks, newest first.
pub async fn task_events_for<C: ConnectionTrait>(
    db: &C,
    tasks: &[TaskRow],
    limit: Option<u64>,
) -> Result<Vec<TaskEventView>, DbErr> {
    if tasks.is_empty() {
        return Ok(Vec::new());
    }
    let by_id: HashMap<i64, &TaskRow> = tasks.iter().map(|task| (task.id, task)).collect();
    let events = task_events::Entity::find()
        .filter(task_events::Column::TaskId.is_in(by_id.keys().copied().collect::<Vec<_>>()))
        .order_by_desc(task_events::Column::OccurredAt)
        .order_by_desc(task_events::Column::Id)
        .limit(limit)
        .all(db)
        .await?;

    Ok(events
        .into_iter()
        .map(|event| {
            let task = by_id.get(&event.task_id);
            TaskEventView {
                id: event.id,
                task_id: event.task_id,
                task_name: task.map(|t| t.title.clone()),
                event_type: event.event_type,
                phase: task.and_then(|t| t.phase.clone()),
                note: event.note,
                technician_id: event.technician_id,
                occurred_at: event.occurred_at,
            }
        })
        .collect())
}

/// Ids of every task assigned to the technician.
pub async fn assigned_task_ids<C: ConnectionTrait>(
    db: &C,
    technician_id: i64,
) -> Result<Vec<i64>, DbErr> {
    let mut ids: Vec<i64> = task_assignments::Entity::find()
        .filter(task_assignments::Column::TechnicianId.eq(technician_id))
        .all(db)
        .await?
        .into_iter()
        .map(|assignment| assignment.task_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Latest BLOCK event per task, keyed by task id.
pub async fn latest_block_events<C: ConnectionTrait>(
    db: &C,
    task_ids: &[i64],
) -> Result<HashMap<i64, task_events::Model>, DbErr> {
    if task_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let events = task_events::Entity::find()
        .filter(task_events::Column::TaskId.is_in(task_ids.to_vec()))
        .filter(task_events::Column::EventType.eq(EventType::Block.as_str()))
        .order_by_desc(task_events::Column::OccurredAt)
        .order_by_desc(task_events::Column::Id)
        .all(db)
        .await?;

    let mut latest = HashMap::new();
    for event in events {
        latest.entry(event.task_id).or_insert(event);
    }
    Ok(latest)
}

pub async fn block_info<C: ConnectionTrait>(
    db: &C,
    task_ids: &[i64],
) -> Result<HashMap<i64, BlockInfo>, DbErr> {
    Ok(latest_block_events(db, task_ids)
        .await?
        .iter()
        .map(|(task_id, event)| (*task_id, BlockInfo::from(event)))
        .collect())
}

pub async fn find_balance<C: ConnectionTrait>(
    db: &C,
    item_id: i64,
) -> Result<Option<inventory_balance::Model>, DbErr> {
    inventory_balance::Entity::find()
        .filter(inventory_balance::Column::ItemId.eq(item_id))
        .one(db)
        .await
}

pub async fn balances_by_item<C: ConnectionTrait>(
    db: &C,
    item_ids: &[i64],
) -> Result<HashMap<i64, inventory_balance::Model>, DbErr> {
    if item_ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(inventory_balance::Entity::find()
        .filter(inventory_balance::Column::ItemId.is_in(item_ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|balance| (balance.item_id, balance))
        .collect())
}

pub async fn parts_by_id<C: ConnectionTrait>(
    db: &C,
    ids: &[i64],
) -> Result<HashMap<i64, part_master::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    Ok(part_master::Entity::find()
        .filter(part_master::Column::Id.is_in(ids.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|part| (part.id, part))
        .collect())
}

/// Configured phase names in sequence order.
pub async fn phase_names<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, DbErr> {
    Ok(phases::Entity::find()
        .order_by_asc(phases::Column::Seq)
        .all(db)
        .await?
        .into_iter()
        .map(|phase| phase.name)
        .collect())
}

/// Available quantity for an item; a missing balance row counts as zero stock.
pub fn available_for(balances: &HashMap<i64, inventory_balance::Model>, item_id: i64) -> Decimal {
    balances
        .get(&item_id)
        .map(inventory_balance::Model::available)
        .unwrap_or(Decimal::ZERO)
}

/// A requirement on a task that current stock cannot cover.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ShortPart {
    pub item_id: i64,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub required_qty: Decimal,
    pub available_qty: Decimal,
    pub shortage_qty: Decimal,
}

/// Short parts per task, keyed by task id. Tasks with every requirement
/// covered are absent from the map.
pub async fn short_parts_by_task<C: ConnectionTrait>(
    db: &C,
    task_ids: &[i64],
) -> Result<HashMap<i64, Vec<ShortPart>>, DbErr> {
    if task_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let requirements = task_requirements::Entity::find()
        .filter(task_requirements::Column::TaskId.is_in(task_ids.to_vec()))
        .order_by_asc(task_requirements::Column::Id)
        .all(db)
        .await?;

    let mut item_ids: Vec<i64> = requirements.iter().map(|r| r.item_id).collect();
    item_ids.sort_unstable();
    item_ids.dedup();
    let balances = balances_by_item(db, &item_ids).await?;
    let parts = parts_by_id(db, &item_ids).await?;

    let mut short: HashMap<i64, Vec<ShortPart>> = HashMap::new();
    for requirement in requirements {
        let available = available_for(&balances, requirement.item_id);
        if !shortages::is_short(requirement.required_qty, available, Decimal::ZERO) {
            continue;
        }
        let part = parts.get(&requirement.item_id);
        short.entry(requirement.task_id).or_default().push(ShortPart {
            item_id: requirement.item_id,
            sku: part.map(|p| p.sku.clone()),
            name: part.map(|p| p.name.clone()),
            required_qty: requirement.required_qty,
            available_qty: available,
            shortage_qty: shortages::shortage(requirement.required_qty, available),
        });
    }
    Ok(short)
}
