use axum::{extract::State, response::Json};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::{required, AppJson};
use crate::errors::ServiceError;
use crate::models::EventType;
use crate::services::task_events::LoggedTaskEvent;
use crate::session::Session;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogTaskEventRequest {
    #[schema(example = 42)]
    pub task_id: Option<i64>,
    /// One of START, PAUSE, RESUME, COMPLETE, BLOCK, UNBLOCK.
    #[schema(example = "START")]
    pub event_type: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

fn parse_event_type(raw: &str) -> Result<EventType, ServiceError> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::ValidationError(format!("Unknown event type: {}", raw)))
}

/// Log a task event
///
/// Moves the task to the status the event maps to. The technician selected
/// in the `gw_tech_id` cookie is recorded on the event.
#[utoipa::path(
    post,
    path = "/api/v1/task-events",
    request_body = LogTaskEventRequest,
    responses(
        (status = 200, description = "Event logged", body = ApiResponse<LoggedTaskEvent>),
        (status = 400, description = "Missing field or unknown event type", body = crate::errors::ErrorResponse),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Floor"
)]
pub async fn log_task_event(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<LogTaskEventRequest>,
) -> ApiResult<LoggedTaskEvent> {
    payload.validate()?;
    let task_id = required(payload.task_id, "taskId")?;
    let event_type = parse_event_type(&required(payload.event_type, "eventType")?)?;

    let logged = state
        .services
        .task_events
        .log_event(task_id, event_type, payload.note, session.technician_id)
        .await?;
    Ok(Json(ApiResponse::success(logged)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn event_types_parse_case_insensitively() {
        assert_eq!(parse_event_type("start").unwrap(), EventType::Start);
        assert_eq!(parse_event_type(" UNBLOCK ").unwrap(), EventType::Unblock);
    }

    #[test]
    fn unknown_event_type_is_a_validation_error() {
        assert_matches!(parse_event_type("REWORK"), Err(ServiceError::ValidationError(_)));
    }
}
