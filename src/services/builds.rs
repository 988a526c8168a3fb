//! Admin build views: the build list and the tabbed build detail.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::loaders::{self, TaskEventView, TaskRow};
use crate::db::or_fallback;
use crate::entities::{
    build_bom_line, build_documents, builds, part_master, tasks, work_orders,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{
    build_phase_timeline, current_focus_phase, phases::NOT_STARTED_PHASE, status_tone,
    PhaseTimelineItem, TaskStatus, Tone,
};

const BUILD_LIST_LIMIT: u64 = 50;
const DETAIL_TASK_LIMIT: usize = 200;
const DETAIL_EVENT_LIMIT: u64 = 200;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BuildListItem {
    pub id: i64,
    pub code: String,
    pub model: Option<String>,
    pub status: String,
    pub tone: Tone,
    pub eta: Option<NaiveDate>,
    pub focus_phase: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BuildOverview {
    pub id: i64,
    pub code: String,
    pub model: Option<String>,
    pub status: String,
    pub tone: Tone,
    pub eta: Option<NaiveDate>,
    pub on_hold: bool,
    pub hold_reason: Option<String>,
    pub description: Option<String>,
    pub focus_phase: String,
    pub timeline: Vec<PhaseTimelineItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BomLineView {
    pub part_id: i64,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub required_qty: Decimal,
    pub allocated_qty: Decimal,
    pub consumed_qty: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BuildDocumentView {
    pub id: i64,
    pub title: String,
    pub url: Option<String>,
    pub doc_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<build_documents::Model> for BuildDocumentView {
    fn from(doc: build_documents::Model) -> Self {
        Self {
            id: doc.id,
            title: doc.filename,
            url: doc.storage_url,
            doc_type: doc.doc_type,
            created_at: doc.uploaded_at,
        }
    }
}

/// Work order row on the build detail, titled by its target part.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BuildWorkOrderView {
    pub id: i64,
    pub code: Option<String>,
    pub wo_type: String,
    pub status: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BuildDetail {
    pub overview: BuildOverview,
    pub bom: Vec<BomLineView>,
    pub tasks: Vec<TaskRow>,
    pub events: Vec<TaskEventView>,
    pub documents: Vec<BuildDocumentView>,
    pub work_orders: Vec<BuildWorkOrderView>,
}

#[derive(Clone)]
pub struct BuildService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl BuildService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Most recently updated builds with their focus phase.
    #[instrument(skip(self))]
    pub async fn list_builds(&self) -> Vec<BuildListItem> {
        or_fallback(self.load_build_list().await, Vec::new(), "list_builds")
    }

    async fn load_build_list(&self) -> Result<Vec<BuildListItem>, ServiceError> {
        let db = &*self.db_pool;
        let builds = builds::Entity::find()
            .order_by_desc(builds::Column::UpdatedAt)
            .limit(BUILD_LIST_LIMIT)
            .all(db)
            .await?;
        let build_ids: Vec<i64> = builds.iter().map(|b| b.id).collect();

        let focus = if build_ids.is_empty() {
            HashMap::new()
        } else {
            let in_progress = loaders::task_rows(
                db,
                tasks::Entity::find()
                    .filter(tasks::Column::BuildId.is_in(build_ids))
                    .filter(tasks::Column::Status.eq(TaskStatus::InProgress.as_str()))
                    .order_by_desc(tasks::Column::UpdatedAt),
            )
            .await?;
            let mut focus: HashMap<i64, Option<String>> = HashMap::new();
            for task in in_progress {
                focus.entry(task.build_id).or_insert(task.phase);
            }
            focus
        };

        Ok(builds
            .into_iter()
            .map(|build| BuildListItem {
                focus_phase: focus
                    .get(&build.id)
                    .cloned()
                    .flatten()
                    .unwrap_or_else(|| NOT_STARTED_PHASE.to_string()),
                tone: status_tone(Some(&build.status)),
                id: build.id,
                code: build.code,
                model: build.model,
                status: build.status,
                eta: build.eta_date,
            })
            .collect())
    }

    /// Every tab of the build detail for a build code or numeric id.
    #[instrument(skip(self))]
    pub async fn build_detail(&self, key: &str) -> Result<BuildDetail, ServiceError> {
        let db = &*self.db_pool;
        let build = or_fallback(loaders::find_build(db, key).await, None, "find_build")
            .ok_or_else(|| ServiceError::NotFound(format!("Build {} not found", key)))?;

        let tasks = or_fallback(
            loaders::task_rows(
                db,
                tasks::Entity::find()
                    .filter(tasks::Column::BuildId.eq(build.id))
                    .order_by_desc(tasks::Column::UpdatedAt)
                    .order_by_desc(tasks::Column::Id),
            )
            .await,
            Vec::new(),
            "build_tasks",
        );
        let events = or_fallback(
            loaders::task_events_for(db, &tasks, Some(DETAIL_EVENT_LIMIT)).await,
            Vec::new(),
            "build_events",
        );
        let phases = or_fallback(loaders::phase_names(db).await, Vec::new(), "phase_names");
        let bom = or_fallback(self.load_bom(build.id).await, Vec::new(), "build_bom");
        let documents = or_fallback(
            self.load_documents(build.id).await,
            Vec::new(),
            "build_documents",
        );
        let work_orders = or_fallback(
            self.load_work_orders(build.id).await,
            Vec::new(),
            "build_work_orders",
        );

        let overview = BuildOverview {
            id: build.id,
            on_hold: build.status.eq_ignore_ascii_case("HOLD"),
            hold_reason: build.hold_reason(),
            description: build.description(),
            focus_phase: current_focus_phase(&tasks, &events),
            timeline: build_phase_timeline(&phases, &tasks, build.eta_date),
            tone: status_tone(Some(&build.status)),
            code: build.code,
            model: build.model,
            status: build.status,
            eta: build.eta_date,
        };

        Ok(BuildDetail {
            overview,
            bom,
            tasks: tasks.into_iter().take(DETAIL_TASK_LIMIT).collect(),
            events,
            documents,
            work_orders,
        })
    }

    async fn load_bom(&self, build_id: i64) -> Result<Vec<BomLineView>, ServiceError> {
        let lines = build_bom_line::Entity::find()
            .filter(build_bom_line::Column::BuildId.eq(build_id))
            .find_also_related(part_master::Entity)
            .order_by_asc(build_bom_line::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(lines
            .into_iter()
            .map(|(line, part)| BomLineView {
                part_id: line.part_id,
                sku: part.as_ref().map(|p| p.sku.clone()),
                name: part.map(|p| p.name),
                required_qty: line.required_qty,
                allocated_qty: line.allocated_qty,
                consumed_qty: line.consumed_qty,
            })
            .collect())
    }

    async fn load_documents(&self, build_id: i64) -> Result<Vec<BuildDocumentView>, ServiceError> {
        Ok(build_documents::Entity::find()
            .filter(build_documents::Column::BuildId.eq(build_id))
            .order_by_desc(build_documents::Column::UploadedAt)
            .order_by_desc(build_documents::Column::Id)
            .all(&*self.db_pool)
            .await?
            .into_iter()
            .map(BuildDocumentView::from)
            .collect())
    }

    async fn load_work_orders(
        &self,
        build_id: i64,
    ) -> Result<Vec<BuildWorkOrderView>, ServiceError> {
        let rows = work_orders::Entity::find()
            .filter(work_orders::Column::ForBuildId.eq(build_id))
            .find_also_related(part_master::Entity)
            .order_by_desc(work_orders::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(wo, part)| BuildWorkOrderView {
                id: wo.id,
                code: part.as_ref().map(|p| p.sku.clone()),
                title: part.map(|p| p.name),
                wo_type: wo.wo_type,
                status: wo.status,
            })
            .collect())
    }

    /// Attaches a document to the build.
    #[instrument(skip(self, url, doc_type))]
    pub async fn add_document(
        &self,
        key: &str,
        filename: &str,
        url: Option<String>,
        doc_type: Option<String>,
    ) -> Result<BuildDocumentView, ServiceError> {
        let filename = filename.trim();
        if filename.is_empty() {
            return Err(ServiceError::ValidationError(
                "filename is required".to_string(),
            ));
        }
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let db = &*self.db_pool;
        let build = loaders::find_build(db, key)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Build {} not found", key)))?;

        let document = build_documents::ActiveModel {
            build_id: Set(build.id),
            filename: Set(filename.to_string()),
            storage_url: Set(non_blank(url)),
            doc_type: Set(non_blank(doc_type)),
            uploaded_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::db_error)?;

        info!(build_id = build.id, document_id = document.id, "Build document added");

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::BuildDocumentAdded {
                    build_id: build.id,
                    document_id: document.id,
                })
                .await;
        }

        Ok(document.into())
    }
}
