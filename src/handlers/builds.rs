use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::AppJson;
use crate::services::builds::{BuildDetail, BuildDocumentView, BuildListItem};
use crate::{ApiResponse, ApiResult, AppState};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddDocumentRequest {
    #[serde(default)]
    #[validate(length(max = 255))]
    pub filename: String,
    #[validate(length(max = 2048))]
    pub url: Option<String>,
    pub doc_type: Option<String>,
}

/// List builds
///
/// Most recently updated builds with their current focus phase.
#[utoipa::path(
    get,
    path = "/api/v1/builds",
    responses(
        (status = 200, description = "Builds", body = ApiResponse<Vec<BuildListItem>>),
    ),
    tag = "Builds"
)]
pub async fn list_builds(State(state): State<AppState>) -> ApiResult<Vec<BuildListItem>> {
    Ok(Json(ApiResponse::success(
        state.services.builds.list_builds().await,
    )))
}

/// Get a build by code or numeric id
#[utoipa::path(
    get,
    path = "/api/v1/builds/{id}",
    params(("id" = String, Path, description = "Build code or id")),
    responses(
        (status = 200, description = "Build detail", body = ApiResponse<BuildDetail>),
        (status = 404, description = "Build not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Builds"
)]
pub async fn get_build(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BuildDetail> {
    let detail = state.services.builds.build_detail(&id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    post,
    path = "/api/v1/builds/{id}/documents",
    params(("id" = String, Path, description = "Build code or id")),
    request_body = AddDocumentRequest,
    responses(
        (status = 200, description = "Document attached", body = ApiResponse<BuildDocumentView>),
        (status = 400, description = "Filename missing", body = crate::errors::ErrorResponse),
        (status = 404, description = "Build not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Builds"
)]
pub async fn add_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<AddDocumentRequest>,
) -> ApiResult<BuildDocumentView> {
    payload.validate()?;
    let document = state
        .services
        .builds
        .add_document(&id, &payload.filename, payload.url, payload.doc_type)
        .await?;
    Ok(Json(ApiResponse::success(document)))
}
