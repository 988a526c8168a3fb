use axum::{extract::State, response::Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::{required, AppJson};
use crate::services::receiving::ReceiptOutcome;
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveStockRequest {
    pub item_id: Option<i64>,
    #[schema(value_type = Option<f64>, example = 10)]
    pub qty: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

/// Receive stock
///
/// Books the quantity on hand and resumes parts-blocked tasks whose
/// requirements are now covered.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/receipts",
    request_body = ReceiveStockRequest,
    responses(
        (status = 200, description = "Stock received", body = ApiResponse<ReceiptOutcome>),
        (status = 400, description = "Missing field or non-positive quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse),
    ),
    tag = "Inventory"
)]
pub async fn receive_stock(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ReceiveStockRequest>,
) -> ApiResult<ReceiptOutcome> {
    payload.validate()?;
    let item_id = required(payload.item_id, "itemId")?;
    let qty = required(payload.qty, "qty")?;

    let outcome = state
        .services
        .receiving
        .receive(item_id, qty, payload.note)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}
