use axum::{extract::State, response::Json};

use crate::services::inventory::InventoryView;
use crate::{ApiResponse, ApiResult, AppState};

/// Stock availability per part
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    responses(
        (status = 200, description = "On hand, allocated and available per part", body = ApiResponse<InventoryView>),
    ),
    tag = "Inventory"
)]
pub async fn list_inventory(State(state): State<AppState>) -> ApiResult<InventoryView> {
    Ok(Json(ApiResponse::success(
        state.services.inventory.inventory().await,
    )))
}
