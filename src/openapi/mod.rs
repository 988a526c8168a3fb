use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shop Floor API",
        version = "1.0.0",
        description = r#"
# Shop Floor API

Backend of the manufacturing operations dashboard: admin views over builds,
parts, inventory and work orders, and technician views for the shop floor.

## Session

There is no login. The `gw_mode` cookie (`admin` or `technician`) picks the
navigation and landing page; `gw_tech_id` selects the technician whose work
the floor views show and who is recorded on logged task events.

## Errors

Failures use a single body shape:

```json
{
  "error": "Not Found",
  "message": "Not found: Task 42 not found",
  "request_id": "req-abc123xyz",
  "timestamp": "2025-03-04T10:30:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Builds", description = "Build list and detail"),
        (name = "Catalog", description = "Parts and work orders"),
        (name = "Inventory", description = "Availability, reservations and receipts"),
        (name = "Floor", description = "Technician shop floor views and task events"),
        (name = "Admin", description = "Operations summary and technicians"),
        (name = "Session", description = "Mode and technician selection")
    ),
    paths(
        // Writes
        crate::handlers::task_events::log_task_event,
        crate::handlers::allocations::create_allocation,
        crate::handlers::receiving::receive_stock,

        // Admin
        crate::handlers::builds::list_builds,
        crate::handlers::builds::get_build,
        crate::handlers::builds::add_document,
        crate::handlers::parts::list_parts,
        crate::handlers::inventory::list_inventory,
        crate::handlers::work_orders::list_work_orders,
        crate::handlers::work_orders::get_work_order,
        crate::handlers::admin::summary,
        crate::handlers::admin::list_technicians,

        // Floor
        crate::handlers::floor::today,
        crate::handlers::floor::quick_log,
        crate::handlers::floor::station,
        crate::handlers::floor::build_station,
        crate::handlers::floor::stage_requirements,
        crate::handlers::floor::task_instructions,
        crate::handlers::technician::summary,

        // Session
        crate::handlers::session::get_session,
        crate::handlers::session::set_mode,
        crate::handlers::session::set_technician,
    ),
    components(
        schemas(
            crate::handlers::task_events::LogTaskEventRequest,
            crate::handlers::allocations::CreateAllocationRequest,
            crate::handlers::receiving::ReceiveStockRequest,
            crate::handlers::builds::AddDocumentRequest,
            crate::handlers::session::SetModeRequest,
            crate::handlers::session::SetTechnicianRequest,
            crate::models::EventType,
            crate::models::TaskStatus,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_floor_and_admin_paths() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Shop Floor API"));
        assert!(json.contains("/api/v1/task-events"));
        assert!(json.contains("/api/v1/floor/station"));
        assert!(json.contains("/api/v1/admin/summary"));
    }
}
