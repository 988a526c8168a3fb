pub mod admin;
pub mod allocations;
pub mod builds;
pub mod floor;
pub mod inventory;
pub mod parts;
pub mod receiving;
pub mod session;
pub mod task_events;
pub mod technician;
pub mod work_orders;

use crate::db::DbPool;
use crate::errors::ServiceError;
use crate::events::EventSender;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use crate::services::{
    admin_summary::AdminSummaryService, allocations::AllocationService, builds::BuildService,
    floor::FloorService, inventory::InventoryService, parts::PartService,
    receiving::ReceivingService, task_events::TaskEventService,
    technician_summary::TechnicianSummaryService, technicians::TechnicianService,
    work_orders::WorkOrderService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub task_events: Arc<TaskEventService>,
    pub allocations: Arc<AllocationService>,
    pub receiving: Arc<ReceivingService>,
    pub builds: Arc<BuildService>,
    pub parts: Arc<PartService>,
    pub inventory: Arc<InventoryService>,
    pub work_orders: Arc<WorkOrderService>,
    pub admin_summary: Arc<AdminSummaryService>,
    pub floor: Arc<FloorService>,
    pub technician_summary: Arc<TechnicianSummaryService>,
    pub technicians: Arc<TechnicianService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let events = Some(event_sender);
        Self {
            task_events: Arc::new(TaskEventService::new(db_pool.clone(), events.clone())),
            allocations: Arc::new(AllocationService::new(db_pool.clone(), events.clone())),
            receiving: Arc::new(ReceivingService::new(db_pool.clone(), events.clone())),
            builds: Arc::new(BuildService::new(db_pool.clone(), events)),
            parts: Arc::new(PartService::new(db_pool.clone())),
            inventory: Arc::new(InventoryService::new(db_pool.clone())),
            work_orders: Arc::new(WorkOrderService::new(db_pool.clone())),
            admin_summary: Arc::new(AdminSummaryService::new(db_pool.clone())),
            floor: Arc::new(FloorService::new(db_pool.clone())),
            technician_summary: Arc::new(TechnicianSummaryService::new(db_pool.clone())),
            technicians: Arc::new(TechnicianService::new(db_pool)),
        }
    }
}

/// JSON body extractor whose rejections use the `ErrorResponse` envelope.
pub struct AppJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(AppJson(value))
    }
}

/// Rejects a missing required field with a 400.
pub(crate) fn required<T>(value: Option<T>, field: &str) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::ValidationError(format!("{} is required", field)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::{body::Body, http::header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct EventBody {
        task_id: Option<i64>,
    }

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_bodies_are_extracted() {
        let AppJson(body) = AppJson::<EventBody>::from_request(json_request(r#"{"taskId":7}"#), &())
            .await
            .unwrap();
        assert_eq!(body.task_id, Some(7));
    }

    #[tokio::test]
    async fn body_rejections_become_bad_requests() {
        for raw in [r#"{"taskId":"42"}"#, r#"{"taskId":"#, "not json"] {
            let err = AppJson::<EventBody>::from_request(json_request(raw), &())
                .await
                .err()
                .unwrap();
            assert_matches!(err, ServiceError::BadRequest(_));
            assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        }

        let missing_content_type = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"taskId":7}"#))
            .unwrap();
        let err = AppJson::<EventBody>::from_request(missing_content_type, &())
            .await
            .err()
            .unwrap();
        assert_matches!(err, ServiceError::BadRequest(_));
    }
}
