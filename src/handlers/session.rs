use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Redirect},
};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use super::{required, AppJson};
use crate::errors::ServiceError;
use crate::session::{self, Mode, NavEntry, Session, MODE_COOKIE, TECHNICIAN_COOKIE};
use crate::{ApiResponse, AppState};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionView {
    pub mode: Mode,
    pub technician_id: Option<i64>,
    pub navigation: Vec<NavEntry>,
}

impl From<Session> for SessionView {
    fn from(session: Session) -> Self {
        Self {
            mode: session.mode,
            technician_id: session.technician_id,
            navigation: session::navigation(session.mode),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetModeRequest {
    pub mode: Option<Mode>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetTechnicianRequest {
    /// `null` clears the selection.
    pub technician_id: Option<i64>,
}

fn with_cookie(
    name: &str,
    value: &str,
    view: SessionView,
) -> Result<impl IntoResponse, ServiceError> {
    let cookie = session::set_cookie(name, value)
        .ok_or_else(|| ServiceError::InternalError(format!("invalid {} cookie", name)))?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ApiResponse::success(view)),
    ))
}

/// Current mode, technician and navigation
#[utoipa::path(
    get,
    path = "/api/v1/session",
    responses((status = 200, description = "Session", body = ApiResponse<SessionView>)),
    tag = "Session"
)]
pub async fn get_session(session: Session) -> Json<ApiResponse<SessionView>> {
    Json(ApiResponse::success(SessionView::from(session)))
}

#[utoipa::path(
    post,
    path = "/api/v1/session/mode",
    request_body = SetModeRequest,
    responses(
        (status = 200, description = "Mode stored in the gw_mode cookie", body = ApiResponse<SessionView>),
        (status = 400, description = "Missing or unknown mode", body = crate::errors::ErrorResponse),
    ),
    tag = "Session"
)]
pub async fn set_mode(
    session: Session,
    AppJson(payload): AppJson<SetModeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let mode = required(payload.mode, "mode")?;
    info!(%mode, "Mode switched");
    with_cookie(
        MODE_COOKIE,
        &mode.to_string(),
        SessionView::from(Session { mode, ..session }),
    )
}

/// Select the technician working this terminal
#[utoipa::path(
    post,
    path = "/api/v1/session/technician",
    request_body = SetTechnicianRequest,
    responses(
        (status = 200, description = "Technician stored in the gw_tech_id cookie", body = ApiResponse<SessionView>),
        (status = 404, description = "Technician not found", body = crate::errors::ErrorResponse),
    ),
    tag = "Session"
)]
pub async fn set_technician(
    State(state): State<AppState>,
    session: Session,
    AppJson(payload): AppJson<SetTechnicianRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(id) = payload.technician_id {
        if !state.services.technicians.exists(id).await {
            return Err(ServiceError::NotFound(format!("Technician {} not found", id)));
        }
    }
    let value = payload
        .technician_id
        .map(|id| id.to_string())
        .unwrap_or_default();
    with_cookie(
        TECHNICIAN_COOKIE,
        &value,
        SessionView::from(Session {
            technician_id: payload.technician_id,
            ..session
        }),
    )
}

/// Sends the browser to the landing page of its mode.
pub async fn home(session: Session) -> Redirect {
    Redirect::temporary(session.mode.home_path())
}
