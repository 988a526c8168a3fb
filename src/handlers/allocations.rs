use axum::{extract::State, response::Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{required, AppJson};
use crate::services::allocations::AllocationReceipt;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAllocationRequest {
    pub build_id: Option<i64>,
    pub stage_id: Option<i64>,
    pub item_id: Option<i64>,
    #[schema(value_type = Option<f64>, example = 2)]
    pub qty: Option<Decimal>,
}

/// Reserve stock for a build stage
#[utoipa::path(
    post,
    path = "/api/v1/allocations",
    request_body = CreateAllocationRequest,
    responses(
        (status = 200, description = "Stock reserved", body = ApiResponse<AllocationReceipt>),
        (status = 400, description = "Missing field or non-positive quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Build or item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn create_allocation(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAllocationRequest>,
) -> ApiResult<AllocationReceipt> {
    let build_id = required(payload.build_id, "buildId")?;
    let stage_id = required(payload.stage_id, "stageId")?;
    let item_id = required(payload.item_id, "itemId")?;
    let qty = required(payload.qty, "qty")?;

    let receipt = state
        .services
        .allocations
        .reserve(build_id, stage_id, item_id, qty)
        .await?;
    Ok(Json(ApiResponse::success(receipt)))
}
