//! Shop floor API library
//!
//! Manufacturing operations backend: admin views over builds, parts,
//! inventory and work orders, and technician views for logging work on the
//! shop floor.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod session;
pub mod tracing;

use axum::{
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer};
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = handlers::AppServices::new(db.clone(), Arc::new(event_sender.clone()));
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors: None,
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    let writes = Router::new()
        .route(
            "/task-events",
            post(handlers::task_events::log_task_event),
        )
        .route("/allocations", post(handlers::allocations::create_allocation))
        .route(
            "/inventory/receipts",
            post(handlers::receiving::receive_stock),
        );

    let admin = Router::new()
        .route("/builds", get(handlers::builds::list_builds))
        .route("/builds/:id", get(handlers::builds::get_build))
        .route(
            "/builds/:id/documents",
            post(handlers::builds::add_document),
        )
        .route("/parts", get(handlers::parts::list_parts))
        .route("/inventory", get(handlers::inventory::list_inventory))
        .route(
            "/work-orders",
            get(handlers::work_orders::list_work_orders),
        )
        .route(
            "/work-orders/:id",
            get(handlers::work_orders::get_work_order),
        )
        .route("/admin/summary", get(handlers::admin::summary))
        .route("/technicians", get(handlers::admin::list_technicians));

    let floor = Router::new()
        .route("/floor/today", get(handlers::floor::today))
        .route("/floor/log", get(handlers::floor::quick_log))
        .route("/floor/station", get(handlers::floor::station))
        .route("/floor/builds/:id", get(handlers::floor::build_station))
        .route(
            "/floor/builds/:id/stages/:stage_id/requirements",
            get(handlers::floor::stage_requirements),
        )
        .route(
            "/floor/tasks/:id/instructions",
            get(handlers::floor::task_instructions),
        )
        .route(
            "/technician/summary",
            get(handlers::technician::summary),
        );

    let session = Router::new()
        .route("/session", get(handlers::session::get_session))
        .route("/session/mode", post(handlers::session::set_mode))
        .route(
            "/session/technician",
            post(handlers::session::set_technician),
        );

    Router::new()
        .merge(writes)
        .merge(admin)
        .merge(floor)
        .merge(session)
}

/// The full application: API, health checks, Swagger UI and the HTTP layers.
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let db = state.db.clone();

    Router::new()
        .route("/", get(handlers::session::home))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
        .nest("/health", health::health_routes(db))
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
}
