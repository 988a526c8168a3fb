use axum::{extract::State, response::Json};

use crate::services::technician_summary::TechnicianSummary;
use crate::session::Session;
use crate::{ApiResponse, ApiResult, AppState};

/// Current work, next tasks, blockers and teammates for the selected technician
#[utoipa::path(
    get,
    path = "/api/v1/technician/summary",
    responses(
        (status = 200, description = "Summary; empty when no technician is selected", body = ApiResponse<TechnicianSummary>),
    ),
    tag = "Floor"
)]
pub async fn summary(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<TechnicianSummary> {
    Ok(Json(ApiResponse::success(
        state
            .services
            .technician_summary
            .summary(session.technician_id)
            .await,
    )))
}
