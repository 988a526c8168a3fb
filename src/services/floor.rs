//! Technician shop-floor views.
//!
//! Each view is assembled from plain task rows plus the latest BLOCK event
//! and the current shortages of every task it shows. Reads never fail the
//! request: a storage error degrades to an empty board.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

use super::loaders::{self, BlockInfo, ShortPart, TaskEventView, TaskRow};
use crate::db::or_fallback;
use crate::entities::{builds, kit_components, part_master, phases, task_requirements, tasks};
use crate::errors::ServiceError;
use crate::models::{
    actions::primary_enabled,
    build_phase_timeline,
    instructions::{instruction_template, InstructionTemplate},
    next_action,
    quick_log::{self, QuickLogFilter, StatusFilter},
    shortages::{self, KitChild, RequirementLine},
    stations::{self, Queue, Station, StationShortage},
    status_tone, summarize_phase, PhaseSummary, PhaseTimelineItem,
    TaskAction, TaskFacts, TaskStatus, Tone, BLOCK_REASONS, UNASSIGNED_PHASE,
};

const TODAY_BOARD_LIMIT: usize = 50;
const QUICK_LOG_SOURCE_LIMIT: u64 = 50;
const STATION_TASK_LIMIT: u64 = 200;
const BUILD_STATION_TASK_LIMIT: u64 = 100;
const BUILD_STATION_EVENT_LIMIT: u64 = 20;

fn open_status_values() -> Vec<&'static str> {
    TaskStatus::open_statuses()
        .iter()
        .map(TaskStatus::as_str)
        .collect()
}

fn block_reasons() -> Vec<String> {
    BLOCK_REASONS.iter().map(|r| r.to_string()).collect()
}

/// A task card with everything the technician needs to act on it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FloorTask {
    pub id: i64,
    pub build_id: i64,
    pub build_code: Option<String>,
    pub model: Option<String>,
    pub title: String,
    pub phase: Option<String>,
    pub status: String,
    pub tone: Tone,
    pub block_reason: Option<String>,
    pub block_at: Option<DateTime<Utc>>,
    pub action: TaskAction,
    /// False while parts are short, except for resolving a block.
    pub primary_enabled: bool,
    pub short_parts: Vec<ShortPart>,
}

impl FloorTask {
    fn new(row: TaskRow, block: Option<&BlockInfo>, short_parts: Vec<ShortPart>) -> Self {
        let action = next_action(Some(&row.status));
        Self {
            primary_enabled: primary_enabled(&action, !short_parts.is_empty()),
            tone: status_tone(Some(&row.status)),
            block_reason: block.and_then(|b| b.reason.clone()),
            block_at: block.map(|b| b.blocked_at),
            id: row.id,
            build_id: row.build_id,
            build_code: row.build_code,
            model: row.build_model,
            title: row.title,
            phase: row.phase,
            status: row.status,
            action,
            short_parts,
        }
    }
}

impl TaskFacts for FloorTask {
    fn phase(&self) -> Option<&str> {
        self.phase.as_deref()
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodayCard {
    pub build_id: i64,
    pub code: String,
    pub model: Option<String>,
    pub status: String,
    pub tone: Tone,
    pub phase: Option<String>,
    pub task_name: Option<String>,
    pub task_status: Option<String>,
    /// Build on HOLD or its next task BLOCKED.
    pub blocked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodayPhaseGroup {
    pub phase: String,
    pub builds: Vec<TodayCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TodayBoard {
    /// `None` when no technician is selected; the board is then empty.
    pub technician_id: Option<i64>,
    pub groups: Vec<TodayPhaseGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QuickLogView {
    pub stage: Option<String>,
    pub status: StatusFilter,
    pub q: Option<String>,
    pub stages: Vec<String>,
    pub tasks: Vec<FloorTask>,
    pub block_reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StationView {
    pub station: Station,
    pub stations: Vec<Station>,
    pub now: Vec<FloorTask>,
    pub next: Vec<FloorTask>,
    pub blocked: Vec<FloorTask>,
    /// Station tasks waiting on parts, whatever their queue.
    pub blocked_by_parts: usize,
    pub shortages: Vec<StationShortage>,
    pub block_reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BuildHeader {
    pub id: i64,
    pub code: String,
    pub model: Option<String>,
    pub status: String,
    pub tone: Tone,
    pub eta: Option<NaiveDate>,
}

impl From<&builds::Model> for BuildHeader {
    fn from(build: &builds::Model) -> Self {
        Self {
            id: build.id,
            code: build.code.clone(),
            model: build.model.clone(),
            status: build.status.clone(),
            tone: status_tone(Some(&build.status)),
            eta: build.eta_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StageRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BuildStationView {
    pub build: BuildHeader,
    /// First task that still needs work.
    pub next_task: Option<FloorTask>,
    pub phase_summary: PhaseSummary,
    pub timeline: Vec<PhaseTimelineItem>,
    pub stages: Vec<StageRef>,
    pub tasks: Vec<FloorTask>,
    pub events: Vec<TaskEventView>,
    pub block_reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StageRequirementsView {
    pub build_id: i64,
    pub build_code: String,
    pub stage_id: i64,
    pub stage_name: Option<String>,
    /// Kits and bags when the stage has any, otherwise every line.
    pub lines: Vec<RequirementLine>,
    pub top_shortages: Vec<RequirementLine>,
    pub suggested_block_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TaskInstructions {
    pub task_id: i64,
    pub build_code: Option<String>,
    pub instructions: InstructionTemplate,
}

/// Sums requirement rows per item, keeping first-seen order.
pub fn aggregate_requirements(rows: &[task_requirements::Model]) -> Vec<(i64, Decimal)> {
    let mut order: Vec<i64> = Vec::new();
    let mut totals: HashMap<i64, Decimal> = HashMap::new();
    for row in rows {
        let total = totals.entry(row.item_id).or_insert_with(|| {
            order.push(row.item_id);
            Decimal::ZERO
        });
        *total += row.required_qty;
    }
    order
        .into_iter()
        .map(|item_id| (item_id, totals.get(&item_id).copied().unwrap_or_default()))
        .collect()
}

/// Short parts per (phase, item), largest shortage kept.
fn station_requirements(tasks: &[FloorTask]) -> Vec<StationShortage> {
    let mut by_key: BTreeMap<(Option<String>, i64), StationShortage> = BTreeMap::new();
    for task in tasks {
        for part in &task.short_parts {
            let key = (task.phase.clone(), part.item_id);
            let candidate = StationShortage {
                phase: task.phase.clone(),
                sku: part.sku.clone(),
                name: part.name.clone(),
                shortage_qty: part.shortage_qty,
            };
            by_key
                .entry(key)
                .and_modify(|existing| {
                    if candidate.shortage_qty > existing.shortage_qty {
                        *existing = candidate.clone();
                    }
                })
                .or_insert(candidate);
        }
    }
    by_key.into_values().collect()
}

#[derive(Clone)]
pub struct FloorService {
    db_pool: Arc<DatabaseConnection>,
}

impl FloorService {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self { db_pool }
    }

    /// Attaches block info and shortages to each row.
    async fn floor_tasks(&self, rows: Vec<TaskRow>) -> Vec<FloorTask> {
        let db = &*self.db_pool;
        let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
        let blocks = or_fallback(loaders::block_info(db, &ids).await, HashMap::new(), "block_info");
        let mut short = or_fallback(
            loaders::short_parts_by_task(db, &ids).await,
            HashMap::new(),
            "short_parts",
        );
        rows.into_iter()
            .map(|row| {
                let parts = short.remove(&row.id).unwrap_or_default();
                let block = blocks.get(&row.id);
                FloorTask::new(row, block, parts)
            })
            .collect()
    }

    async fn open_task_rows(&self, limit: u64) -> Result<Vec<TaskRow>, ServiceError> {
        Ok(loaders::task_rows(
            &*self.db_pool,
            tasks::Entity::find()
                .filter(tasks::Column::Status.is_in(open_status_values()))
                .order_by_desc(tasks::Column::UpdatedAt)
                .order_by_desc(tasks::Column::Id)
                .limit(limit),
        )
        .await?)
    }

    /// Builds with the technician's next assigned task, grouped by phase.
    #[instrument(skip(self))]
    pub async fn today_board(&self, technician_id: Option<i64>) -> TodayBoard {
        let Some(tech) = technician_id else {
            return TodayBoard {
                technician_id: None,
                groups: Vec::new(),
            };
        };
        TodayBoard {
            technician_id: Some(tech),
            groups: or_fallback(self.load_today(tech).await, Vec::new(), "today_board"),
        }
    }

    async fn load_today(&self, technician_id: i64) -> Result<Vec<TodayPhaseGroup>, ServiceError> {
        let db = &*self.db_pool;
        let assigned = loaders::assigned_task_ids(db, technician_id).await?;
        let latest: HashMap<i64, TaskRow> = if assigned.is_empty() {
            HashMap::new()
        } else {
            let rows = loaders::task_rows(
                db,
                tasks::Entity::find()
                    .filter(tasks::Column::Id.is_in(assigned))
                    .filter(tasks::Column::Status.is_in(open_status_values()))
                    .order_by_desc(tasks::Column::UpdatedAt)
                    .order_by_desc(tasks::Column::Id),
            )
            .await?;
            let mut latest = HashMap::new();
            for row in rows {
                latest.entry(row.build_id).or_insert(row);
            }
            latest
        };

        let all_builds = builds::Entity::find()
            .order_by_desc(builds::Column::UpdatedAt)
            .all(db)
            .await?;

        let mut cards: Vec<TodayCard> = all_builds
            .into_iter()
            .map(|build| {
                let task = latest.get(&build.id);
                let on_hold = build.status.eq_ignore_ascii_case("HOLD");
                let task_blocked = task
                    .and_then(|t| t.parsed_status())
                    .map(|s| s.is_blocked())
                    .unwrap_or(false);
                TodayCard {
                    build_id: build.id,
                    tone: status_tone(Some(&build.status)),
                    phase: task.and_then(|t| t.phase.clone()),
                    task_name: task.map(|t| t.title.clone()),
                    task_status: task.map(|t| t.status.clone()),
                    blocked: on_hold || task_blocked,
                    code: build.code,
                    model: build.model,
                    status: build.status,
                }
            })
            .collect();

        // Phase A-Z with unphased builds last; the sort is stable so recency
        // order holds within a phase.
        cards.sort_by(|a, b| match (&a.phase, &b.phase) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        cards.truncate(TODAY_BOARD_LIMIT);

        let mut groups: Vec<TodayPhaseGroup> = Vec::new();
        for card in cards {
            let phase = card.phase.clone().unwrap_or_else(|| UNASSIGNED_PHASE.to_string());
            match groups.iter_mut().find(|g| g.phase == phase) {
                Some(group) => group.builds.push(card),
                None => groups.push(TodayPhaseGroup {
                    phase,
                    builds: vec![card],
                }),
            }
        }
        Ok(groups)
    }

    /// Active tasks narrowed by the quick log filters.
    #[instrument(skip(self))]
    pub async fn quick_log(&self, filter: QuickLogFilter) -> QuickLogView {
        let rows = or_fallback(
            self.open_task_rows(QUICK_LOG_SOURCE_LIMIT).await,
            Vec::new(),
            "quick_log",
        );
        let stages = quick_log::stages(&rows);
        let selected: Vec<TaskRow> = filter.apply(&rows).into_iter().cloned().collect();
        let tasks = self.floor_tasks(selected).await;

        QuickLogView {
            stage: filter.stage,
            status: filter.status,
            q: filter.q,
            stages,
            tasks,
            block_reasons: block_reasons(),
        }
    }

    /// NOW / NEXT / BLOCKED queues for one station.
    #[instrument(skip(self))]
    pub async fn station_view(&self, station_id: Option<&str>) -> StationView {
        let station = station_id
            .and_then(stations::find_station)
            .copied()
            .unwrap_or(stations::STATIONS[0]);

        let rows = or_fallback(
            self.open_task_rows(STATION_TASK_LIMIT).await,
            Vec::new(),
            "station_tasks",
        );
        let at_station: Vec<TaskRow> = rows
            .into_iter()
            .filter(|row| stations::matches_station(row.phase.as_deref(), station.id))
            .collect();
        let tasks = self.floor_tasks(at_station).await;

        let shortages = stations::station_shortages(&station_requirements(&tasks), station.id);
        let blocked_by_parts = tasks.iter().filter(|t| !t.short_parts.is_empty()).count();

        let mut now = Vec::new();
        let mut next = Vec::new();
        let mut blocked = Vec::new();
        for task in tasks {
            match stations::queue_for(Some(&task.status)) {
                Some(Queue::Now) => now.push(task),
                Some(Queue::Next) => next.push(task),
                Some(Queue::Blocked) => blocked.push(task),
                None => {}
            }
        }

        StationView {
            station,
            stations: stations::STATIONS.to_vec(),
            now,
            next,
            blocked,
            blocked_by_parts,
            shortages,
            block_reasons: block_reasons(),
        }
    }

    /// Station screen for one build.
    #[instrument(skip(self))]
    pub async fn build_station(&self, key: &str) -> Result<BuildStationView, ServiceError> {
        let db = &*self.db_pool;
        let build = or_fallback(loaders::find_build(db, key).await, None, "find_build")
            .ok_or_else(|| ServiceError::NotFound(format!("Build {} not found", key)))?;

        let rows = or_fallback(
            loaders::task_rows(
                db,
                tasks::Entity::find()
                    .filter(tasks::Column::BuildId.eq(build.id))
                    .order_by_desc(tasks::Column::UpdatedAt)
                    .order_by_desc(tasks::Column::Id)
                    .limit(BUILD_STATION_TASK_LIMIT),
            )
            .await,
            Vec::new(),
            "build_station_tasks",
        );
        let events = or_fallback(
            loaders::task_events_for(db, &rows, Some(BUILD_STATION_EVENT_LIMIT)).await,
            Vec::new(),
            "build_station_events",
        );
        let phase_rows = or_fallback(
            phases::Entity::find()
                .order_by_asc(phases::Column::Seq)
                .all(db)
                .await,
            Vec::new(),
            "phases",
        );
        let phase_names: Vec<String> = phase_rows.iter().map(|p| p.name.clone()).collect();

        let phase_summary = summarize_phase(&rows, &phase_names, build.eta_date);
        let timeline = build_phase_timeline(&phase_names, &rows, build.eta_date);

        let mut stage_ids: Vec<i64> = rows.iter().filter_map(|row| row.phase_id).collect();
        stage_ids.sort_unstable();
        stage_ids.dedup();
        let stages = phase_rows
            .iter()
            .filter(|phase| stage_ids.contains(&phase.id))
            .map(|phase| StageRef {
                id: phase.id,
                name: phase.name.clone(),
            })
            .collect();

        let tasks = self.floor_tasks(rows).await;
        let next_task = tasks
            .iter()
            .find(|task| task.parsed_status().map(|s| s.is_open()).unwrap_or(false))
            .cloned();

        Ok(BuildStationView {
            build: BuildHeader::from(&build),
            next_task,
            phase_summary,
            timeline,
            stages,
            tasks,
            events,
            block_reasons: block_reasons(),
        })
    }

    /// Requirement lines for one stage of a build.
    #[instrument(skip(self))]
    pub async fn stage_requirements(
        &self,
        key: &str,
        stage_id: i64,
    ) -> Result<StageRequirementsView, ServiceError> {
        let db = &*self.db_pool;
        let build = or_fallback(loaders::find_build(db, key).await, None, "find_build")
            .ok_or_else(|| ServiceError::NotFound(format!("Build {} not found", key)))?;

        let stage_name = or_fallback(
            phases::Entity::find_by_id(stage_id).one(db).await,
            None,
            "stage",
        )
        .map(|phase| phase.name);

        let lines = or_fallback(
            self.requirement_lines(build.id, stage_id).await,
            Vec::new(),
            "stage_requirements",
        );
        let top_shortages = shortages::top_shortages(&lines);
        let suggested_block_note = shortages::suggested_block_note(&top_shortages);

        Ok(StageRequirementsView {
            build_id: build.id,
            build_code: build.code,
            stage_id,
            stage_name,
            lines: shortages::display_lines(&lines),
            top_shortages,
            suggested_block_note,
        })
    }

    async fn requirement_lines(
        &self,
        build_id: i64,
        stage_id: i64,
    ) -> Result<Vec<RequirementLine>, ServiceError> {
        let db = &*self.db_pool;
        let task_ids: Vec<i64> = tasks::Entity::find()
            .filter(tasks::Column::BuildId.eq(build_id))
            .filter(tasks::Column::PhaseId.eq(stage_id))
            .all(db)
            .await?
            .into_iter()
            .map(|task| task.id)
            .collect();
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let requirements = task_requirements::Entity::find()
            .filter(task_requirements::Column::TaskId.is_in(task_ids))
            .order_by_asc(task_requirements::Column::Id)
            .all(db)
            .await?;
        let totals = aggregate_requirements(&requirements);
        let item_ids: Vec<i64> = totals.iter().map(|(id, _)| *id).collect();

        let parts = loaders::parts_by_id(db, &item_ids).await?;
        let balances = loaders::balances_by_item(db, &item_ids).await?;
        let children = kit_children(db, &item_ids).await?;

        Ok(totals
            .into_iter()
            .map(|(item_id, required)| {
                let part = parts.get(&item_id);
                let mut line = RequirementLine::new(
                    item_id,
                    part.map(|p| p.sku.clone()),
                    part.map(|p| p.name.clone()),
                    part.map(part_master::Model::parsed_item_type)
                        .unwrap_or(shortages::ItemType::Sku),
                    required,
                    loaders::available_for(&balances, item_id),
                );
                line.uom = part.and_then(|p| p.uom.clone());
                line.criticality = part.and_then(|p| p.criticality.clone());
                line.children = children.get(&item_id).cloned().unwrap_or_default();
                line
            })
            .collect())
    }

    /// Work instruction card for a task.
    #[instrument(skip(self))]
    pub async fn task_instructions(&self, task_id: i64) -> Result<TaskInstructions, ServiceError> {
        let row = or_fallback(
            loaders::task_rows(&*self.db_pool, tasks::Entity::find_by_id(task_id)).await,
            Vec::new(),
            "task_instructions",
        )
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound(format!("Task {} not found", task_id)))?;

        Ok(TaskInstructions {
            task_id: row.id,
            instructions: instruction_template(
                Some(&row.title),
                row.phase.as_deref(),
            ),
            build_code: row.build_code,
        })
    }
}

/// Contents of every kit or bag among `parent_ids`.
async fn kit_children(
    db: &DatabaseConnection,
    parent_ids: &[i64],
) -> Result<HashMap<i64, Vec<KitChild>>, ServiceError> {
    if parent_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = kit_components::Entity::find()
        .filter(kit_components::Column::ParentItemId.is_in(parent_ids.to_vec()))
        .find_also_related(part_master::Entity)
        .order_by_asc(kit_components::Column::Id)
        .all(db)
        .await?;

    let mut children: HashMap<i64, Vec<KitChild>> = HashMap::new();
    for (component, part) in rows {
        children
            .entry(component.parent_item_id)
            .or_default()
            .push(KitChild {
                item_id: component.child_item_id,
                sku: part.as_ref().map(|p| p.sku.clone()),
                name: part.map(|p| p.name),
                qty_per_parent: component.qty_per_parent,
                instance_status: component.instance_status,
            });
    }
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement(id: i64, task_id: i64, item_id: i64, qty: i64) -> task_requirements::Model {
        task_requirements::Model {
            id,
            task_id,
            item_id,
            required_qty: Decimal::from(qty),
        }
    }

    #[test]
    fn requirements_sum_per_item_in_first_seen_order() {
        let rows = vec![
            requirement(1, 10, 7, 2),
            requirement(2, 11, 3, 1),
            requirement(3, 11, 7, 5),
        ];
        assert_eq!(
            aggregate_requirements(&rows),
            vec![(7, Decimal::from(7)), (3, Decimal::from(1))]
        );
    }

    fn short_task(id: i64, phase: &str, item_id: i64, shortage: i64) -> FloorTask {
        let row = TaskRow {
            id,
            build_id: 1,
            build_code: Some("GW-1".into()),
            build_model: None,
            build_status: None,
            title: format!("task {}", id),
            phase_id: None,
            phase: Some(phase.into()),
            status: "NOT_STARTED".into(),
            owner: None,
            started_at: None,
            updated_at: Utc::now(),
        };
        FloorTask::new(
            row,
            None,
            vec![ShortPart {
                item_id,
                sku: Some(format!("SKU-{}", item_id)),
                name: None,
                required_qty: Decimal::from(shortage),
                available_qty: Decimal::ZERO,
                shortage_qty: Decimal::from(shortage),
            }],
        )
    }

    #[test]
    fn shortages_disable_the_primary_action() {
        let task = short_task(1, "Paint Prep", 5, 2);
        assert_eq!(task.action.label, "Start");
        assert!(!task.primary_enabled);
    }

    #[test]
    fn station_requirements_keep_the_largest_shortage_per_phase_and_item() {
        let tasks = vec![
            short_task(1, "Paint Prep", 5, 2),
            short_task(2, "Paint Prep", 5, 4),
            short_task(3, "Final Assembly", 5, 1),
        ];
        let merged = station_requirements(&tasks);
        assert_eq!(merged.len(), 2);
        let paint = merged
            .iter()
            .find(|s| s.phase.as_deref() == Some("Paint Prep"))
            .unwrap();
        assert_eq!(paint.shortage_qty, Decimal::from(4));
    }
}
