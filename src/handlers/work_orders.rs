use axum::{
    extract::{Path, State},
    response::Json,
};

use crate::services::work_orders::{WorkOrderDetail, WorkOrderSummary};
use crate::{ApiResponse, ApiResult, AppState};

/// List work orders
#[utoipa::path(
    get,
    path = "/api/v1/work-orders",
    responses(
        (status = 200, description = "Newest work orders", body = ApiResponse<Vec<WorkOrderSummary>>),
    ),
    tag = "Catalog"
)]
pub async fn list_work_orders(State(state): State<AppState>) -> ApiResult<Vec<WorkOrderSummary>> {
    Ok(Json(ApiResponse::success(
        state.services.work_orders.list_work_orders().await,
    )))
}

/// Get a work order with its consumption and inspections
#[utoipa::path(
    get,
    path = "/api/v1/work-orders/{id}",
    params(("id" = String, Path, description = "Numeric work order id")),
    responses(
        (status = 200, description = "Work order detail", body = ApiResponse<WorkOrderDetail>),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Catalog"
)]
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WorkOrderDetail> {
    let detail = state.services.work_orders.work_order_detail(&id).await?;
    Ok(Json(ApiResponse::success(detail)))
}
