use axum::{extract::State, response::Json};

use crate::services::admin_summary::AdminSummary;
use crate::services::technicians::TechnicianView;
use crate::{ApiResponse, ApiResult, AppState};

/// Operations summary
///
/// Build and task counts, the most common blockers, work in progress per
/// phase and what each technician is doing.
#[utoipa::path(
    get,
    path = "/api/v1/admin/summary",
    responses(
        (status = 200, description = "Summary", body = ApiResponse<AdminSummary>),
    ),
    tag = "Admin"
)]
pub async fn summary(State(state): State<AppState>) -> ApiResult<AdminSummary> {
    Ok(Json(ApiResponse::success(
        state.services.admin_summary.summary().await,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/technicians",
    responses(
        (status = 200, description = "Active technicians", body = ApiResponse<Vec<TechnicianView>>),
    ),
    tag = "Admin"
)]
pub async fn list_technicians(State(state): State<AppState>) -> ApiResult<Vec<TechnicianView>> {
    Ok(Json(ApiResponse::success(
        state.services.technicians.list_active().await,
    )))
}
