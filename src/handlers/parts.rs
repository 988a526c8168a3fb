use axum::extract::{Query, State};
use axum::response::Json;

use crate::services::parts::{PartSearch, PartsView};
use crate::{ApiResponse, ApiResult, AppState};

/// Search parts by SKU or name
#[utoipa::path(
    get,
    path = "/api/v1/parts",
    params(PartSearch),
    responses(
        (status = 200, description = "Matching parts", body = ApiResponse<PartsView>),
    ),
    tag = "Catalog"
)]
pub async fn list_parts(
    State(state): State<AppState>,
    Query(search): Query<PartSearch>,
) -> ApiResult<PartsView> {
    Ok(Json(ApiResponse::success(
        state.services.parts.search(&search).await,
    )))
}
