//! Task event logging.
//!
//! A logged event moves the task through the status map and keeps the
//! technician's work sessions in step with it.

use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::db;
use crate::entities::{phases, task_events, tasks, technicians, work_sessions};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::{EventType, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LoggedTaskEvent {
    pub event_id: i64,
    pub task_id: i64,
    pub event_type: EventType,
    pub status: TaskStatus,
    pub technician_id: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TaskEventService {
    db_pool: Arc<DatabaseConnection>,
    event_sender: Option<Arc<EventSender>>,
}

impl TaskEventService {
    pub fn new(db_pool: Arc<DatabaseConnection>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Records `event_type` against the task and moves it to the mapped status.
    ///
    /// The event insert, the status update and any work session changes
    /// commit together.
    #[instrument(skip(self, note))]
    pub async fn log_event(
        &self,
        task_id: i64,
        event_type: EventType,
        note: Option<String>,
        technician_id: Option<i64>,
    ) -> Result<LoggedTaskEvent, ServiceError> {
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let logged = db::run_in_transaction(&self.db_pool, "log_task_event", move |txn| {
            Box::pin(async move {
                record_event(txn, task_id, event_type, note, technician_id, Utc::now()).await
            })
        })
        .await?;

        info!(
            task_id,
            event_id = logged.event_id,
            status = %logged.status,
            "Task event logged"
        );

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::TaskEventLogged {
                    task_id,
                    event_id: logged.event_id,
                    event_type,
                    status: logged.status,
                    technician_id: logged.technician_id,
                })
                .await;
        }

        Ok(logged)
    }
}

/// Event insert plus status transition on an open transaction. Shared with
/// stock receiving, which logs UNBLOCK events inside its own transaction.
pub(crate) async fn record_event(
    txn: &DatabaseTransaction,
    task_id: i64,
    event_type: EventType,
    note: Option<String>,
    technician_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<LoggedTaskEvent, ServiceError> {
    let task = tasks::Entity::find_by_id(task_id)
        .one(txn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Task {} not found", task_id)))?;

    let technician_id = match technician_id {
        Some(id) => {
            let known = technicians::Entity::find_by_id(id)
                .one(txn)
                .await
                .map_err(ServiceError::db_error)?
                .is_some();
            if !known {
                warn!(technician_id = id, "Unknown technician on task event, logging without one");
            }
            known.then_some(id)
        }
        None => None,
    };

    let next_status = event_type.next_status();

    let event = task_events::ActiveModel {
        task_id: Set(task_id),
        event_type: Set(event_type.as_str().to_string()),
        note: Set(note),
        technician_id: Set(technician_id),
        occurred_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(ServiceError::db_error)?;

    let mut active: tasks::ActiveModel = task.clone().into();
    active.status = Set(next_status.as_str().to_string());
    active.updated_at = Set(now);
    if event_type == EventType::Start && task.started_at.is_none() {
        active.started_at = Set(Some(now));
    }
    if event_type == EventType::Complete {
        active.completed_at = Set(Some(now));
    }
    active.update(txn).await.map_err(ServiceError::db_error)?;

    if event_type.closes_session() {
        close_sessions(txn, work_sessions::Column::TaskId.eq(task_id), now).await?;
    }

    if let (true, Some(technician_id)) = (event_type.opens_session(), technician_id) {
        // One open session per technician.
        close_sessions(
            txn,
            work_sessions::Column::TechnicianId.eq(technician_id),
            now,
        )
        .await?;

        let station = match task.phase_id {
            Some(phase_id) => phases::Entity::find_by_id(phase_id)
                .one(txn)
                .await
                .map_err(ServiceError::db_error)?
                .map(|phase| phase.name),
            None => None,
        };

        work_sessions::ActiveModel {
            technician_id: Set(technician_id),
            task_id: Set(task_id),
            station: Set(station),
            started_at: Set(now),
            ended_at: Set(None),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::db_error)?;
    }

    Ok(LoggedTaskEvent {
        event_id: event.id,
        task_id,
        event_type,
        status: next_status,
        technician_id,
        occurred_at: now,
    })
}

async fn close_sessions(
    txn: &DatabaseTransaction,
    scope: sea_orm::sea_query::SimpleExpr,
    now: DateTime<Utc>,
) -> Result<u64, ServiceError> {
    let result = work_sessions::Entity::update_many()
        .col_expr(work_sessions::Column::EndedAt, Expr::value(now))
        .filter(scope)
        .filter(work_sessions::Column::EndedAt.is_null())
        .exec(txn)
        .await
        .map_err(ServiceError::db_error)?;
    Ok(result.rows_affected)
}
