mod common;

use axum::http::StatusCode;
use common::{tech_cookie, TestApp};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde_json::json;
use shopfloor_api::entities::{task_events, tasks, work_sessions};

async fn task_status(app: &TestApp, task_id: i64) -> String {
    tasks::Entity::find_by_id(task_id)
        .one(app.db())
        .await
        .expect("load task")
        .expect("task exists")
        .status
}

#[tokio::test]
async fn events_walk_a_task_through_its_statuses() {
    let app = TestApp::new().await;
    let phase = app.seed_phase("Paint Prep", 1).await;
    let build = app.seed_build("GW-2001", "IN_PROGRESS").await;
    let task = app
        .seed_task(build.id, Some(phase.id), "Mask body panels", "NOT_STARTED")
        .await;

    for (event, expected) in [
        ("START", "IN_PROGRESS"),
        ("PAUSE", "PAUSED"),
        ("RESUME", "IN_PROGRESS"),
        ("BLOCK", "BLOCKED"),
        ("UNBLOCK", "IN_PROGRESS"),
        ("COMPLETE", "DONE"),
    ] {
        let (status, body) = app
            .post_json(
                "/api/v1/task-events",
                json!({ "taskId": task.id, "eventType": event }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{event}: {body}");
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], expected);
        assert_eq!(task_status(&app, task.id).await, expected);
    }

    let stored = task_events::Entity::find()
        .filter(task_events::Column::TaskId.eq(task.id))
        .all(app.db())
        .await
        .expect("load events");
    assert_eq!(stored.len(), 6);

    let done = tasks::Entity::find_by_id(task.id)
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert!(done.started_at.is_some());
    assert!(done.completed_at.is_some());
}

#[tokio::test]
async fn lowercase_event_types_are_accepted() {
    let app = TestApp::new().await;
    let build = app.seed_build("GW-2002", "IN_PROGRESS").await;
    let task = app.seed_task(build.id, None, "Fit doors", "NOT_STARTED").await;

    let (status, body) = app
        .post_json(
            "/api/v1/task-events",
            json!({ "taskId": task.id, "eventType": "start" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["event_type"], "START");
}

#[tokio::test]
async fn unknown_event_type_is_rejected_without_changes() {
    let app = TestApp::new().await;
    let build = app.seed_build("GW-2003", "IN_PROGRESS").await;
    let task = app.seed_task(build.id, None, "Fit doors", "NOT_STARTED").await;

    let (status, body) = app
        .post_json(
            "/api/v1/task-events",
            json!({ "taskId": task.id, "eventType": "REWORK" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("REWORK"));
    assert_eq!(task_status(&app, task.id).await, "NOT_STARTED");

    let events = task_events::Entity::find().all(app.db()).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn missing_fields_are_bad_requests() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/api/v1/task-events", json!({ "eventType": "START" }), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("taskId"));

    let (status, body) = app
        .post_json("/api/v1/task-events", json!({ "taskId": 1 }), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("eventType"));
}

#[tokio::test]
async fn mistyped_fields_are_bad_requests() {
    let app = TestApp::new().await;
    let task = {
        let build = app.seed_build("GW-1090", "IN_PROGRESS").await;
        app.seed_task(build.id, None, "Torque lugs", "NOT_STARTED").await
    };

    for payload in [
        json!({ "taskId": "42", "eventType": "START" }),
        json!({ "taskId": task.id, "eventType": 3 }),
        json!({ "taskId": task.id, "eventType": "START", "note": ["a", "b"] }),
    ] {
        let (status, body) = app.post_json("/api/v1/task-events", payload, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(body["error"], "Bad Request");
        assert!(body["request_id"].is_string());
        assert!(body["timestamp"].is_string());
    }

    assert_eq!(task_status(&app, task.id).await, "NOT_STARTED");
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/v1/task-events",
            json!({ "taskId": 9999, "eventType": "START" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn start_records_the_cookie_technician_and_opens_a_session() {
    let app = TestApp::new().await;
    let phase = app.seed_phase("Electrical", 1).await;
    let tech = app.seed_technician("Sam Ortiz").await;
    let build = app.seed_build("GW-2004", "IN_PROGRESS").await;
    let first = app
        .seed_task(build.id, Some(phase.id), "Route harness", "NOT_STARTED")
        .await;
    let second = app
        .seed_task(build.id, Some(phase.id), "Terminate grounds", "NOT_STARTED")
        .await;
    let cookie = tech_cookie(tech.id);

    let (status, body) = app
        .post_json(
            "/api/v1/task-events",
            json!({ "taskId": first.id, "eventType": "START", "note": "  " }),
            Some(&cookie),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["technician_id"], tech.id);

    let event = task_events::Entity::find()
        .filter(task_events::Column::TaskId.eq(first.id))
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.technician_id, Some(tech.id));
    assert_eq!(event.note, None);

    // Starting a second task moves the technician's open session over.
    app.post_json(
        "/api/v1/task-events",
        json!({ "taskId": second.id, "eventType": "START" }),
        Some(&cookie),
    )
    .await;

    let open: Vec<work_sessions::Model> = work_sessions::Entity::find()
        .filter(work_sessions::Column::TechnicianId.eq(tech.id))
        .filter(work_sessions::Column::EndedAt.is_null())
        .all(app.db())
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].task_id, second.id);
    assert_eq!(open[0].station.as_deref(), Some("Electrical"));

    app.post_json(
        "/api/v1/task-events",
        json!({ "taskId": second.id, "eventType": "COMPLETE" }),
        Some(&cookie),
    )
    .await;

    let still_open = work_sessions::Entity::find()
        .filter(work_sessions::Column::EndedAt.is_null())
        .all(app.db())
        .await
        .unwrap();
    assert!(still_open.is_empty());
}

#[tokio::test]
async fn unknown_cookie_technician_is_dropped_from_the_event() {
    let app = TestApp::new().await;
    let build = app.seed_build("GW-2005", "IN_PROGRESS").await;
    let task = app.seed_task(build.id, None, "Seat install", "NOT_STARTED").await;

    let (status, body) = app
        .post_json(
            "/api/v1/task-events",
            json!({ "taskId": task.id, "eventType": "START" }),
            Some(&tech_cookie(4242)),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["technician_id"].is_null());

    let sessions = work_sessions::Entity::find().all(app.db()).await.unwrap();
    assert!(sessions.is_empty());
}
