use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::quick_log::QuickLogFilter;
use crate::services::floor::{
    BuildStationView, QuickLogView, StageRequirementsView, StationView, TaskInstructions,
    TodayBoard,
};
use crate::session::Session;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StationQuery {
    /// Station id such as `paint`; unknown or missing ids show every station.
    pub station: Option<String>,
}

/// Today board for the selected technician
#[utoipa::path(
    get,
    path = "/api/v1/floor/today",
    responses(
        (status = 200, description = "Builds grouped by phase; empty when no technician is selected", body = ApiResponse<TodayBoard>),
    ),
    tag = "Floor"
)]
pub async fn today(State(state): State<AppState>, session: Session) -> ApiResult<TodayBoard> {
    Ok(Json(ApiResponse::success(
        state.services.floor.today_board(session.technician_id).await,
    )))
}

/// Quick log of active tasks
#[utoipa::path(
    get,
    path = "/api/v1/floor/log",
    params(
        ("stage" = Option<String>, Query, description = "Phase name, or `all`"),
        ("status" = Option<String>, Query, description = "active, blocked, completed or all"),
        ("q" = Option<String>, Query, description = "Search over build code, task and phase"),
    ),
    responses(
        (status = 200, description = "Filtered tasks with their next action", body = ApiResponse<QuickLogView>),
    ),
    tag = "Floor"
)]
pub async fn quick_log(
    State(state): State<AppState>,
    Query(filter): Query<QuickLogFilter>,
) -> ApiResult<QuickLogView> {
    Ok(Json(ApiResponse::success(
        state.services.floor.quick_log(filter).await,
    )))
}

/// Station queues
#[utoipa::path(
    get,
    path = "/api/v1/floor/station",
    params(StationQuery),
    responses(
        (status = 200, description = "NOW, NEXT and BLOCKED queues with shortages", body = ApiResponse<StationView>),
    ),
    tag = "Floor"
)]
pub async fn station(
    State(state): State<AppState>,
    Query(query): Query<StationQuery>,
) -> ApiResult<StationView> {
    Ok(Json(ApiResponse::success(
        state
            .services
            .floor
            .station_view(query.station.as_deref())
            .await,
    )))
}

/// Build station screen
#[utoipa::path(
    get,
    path = "/api/v1/floor/builds/{id}",
    params(("id" = String, Path, description = "Build code or id")),
    responses(
        (status = 200, description = "Tasks, events and phase progress for the build", body = ApiResponse<BuildStationView>),
        (status = 404, description = "Build not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Floor"
)]
pub async fn build_station(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BuildStationView> {
    let view = state.services.floor.build_station(&id).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// Material requirements for one stage of a build
#[utoipa::path(
    get,
    path = "/api/v1/floor/builds/{id}/stages/{stage_id}/requirements",
    params(
        ("id" = String, Path, description = "Build code or id"),
        ("stage_id" = i64, Path, description = "Phase id"),
    ),
    responses(
        (status = 200, description = "Requirement lines and shortages", body = ApiResponse<StageRequirementsView>),
        (status = 404, description = "Build not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Floor"
)]
pub async fn stage_requirements(
    State(state): State<AppState>,
    Path((id, stage_id)): Path<(String, i64)>,
) -> ApiResult<StageRequirementsView> {
    let view = state
        .services
        .floor
        .stage_requirements(&id, stage_id)
        .await?;
    Ok(Json(ApiResponse::success(view)))
}

#[utoipa::path(
    get,
    path = "/api/v1/floor/tasks/{id}/instructions",
    params(("id" = i64, Path, description = "Task id")),
    responses(
        (status = 200, description = "Work instructions", body = ApiResponse<TaskInstructions>),
        (status = 404, description = "Task not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Floor"
)]
pub async fn task_instructions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<TaskInstructions> {
    let instructions = state.services.floor.task_instructions(id).await?;
    Ok(Json(ApiResponse::success(instructions)))
}
