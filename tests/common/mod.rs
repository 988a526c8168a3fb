#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use shopfloor_api::{
    config::AppConfig,
    db,
    entities::{
        builds, inventory_balance, kit_components, part_master, phases, task_assignments,
        task_events, task_requirements, tasks, technicians, work_sessions,
    },
    events::{self, EventSender},
    AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// Helper harness for spinning up the application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<usize>,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single connection keeps every query on the same in-memory database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = shopfloor_api::app(state.clone(), CorsLayer::permissive());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// Send a request through the full router, optionally with a `Cookie` header.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let body = if let Some(json) = body {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get_json(&self, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
        let response = self.request(Method::GET, uri, None, cookie).await;
        into_json(response).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: Value,
        cookie: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(Method::POST, uri, Some(body), cookie).await;
        into_json(response).await
    }

    // Fixtures

    pub async fn seed_phase(&self, name: &str, seq: i32) -> phases::Model {
        phases::ActiveModel {
            name: Set(name.to_string()),
            seq: Set(seq),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed phase")
    }

    pub async fn seed_technician(&self, name: &str) -> technicians::Model {
        technicians::ActiveModel {
            display_name: Set(name.to_string()),
            title: Set(Some("Technician".to_string())),
            active: Set(true),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed technician")
    }

    pub async fn seed_part(&self, sku: &str, item_type: &str) -> part_master::Model {
        part_master::ActiveModel {
            sku: Set(sku.to_string()),
            name: Set(format!("Part {}", sku)),
            part_type: Set("COMPONENT".to_string()),
            make_buy: Set(Some("BUY".to_string())),
            is_serialized: Set(false),
            uom: Set(Some("ea".to_string())),
            item_type: Set(item_type.to_string()),
            criticality: Set(None),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed part")
    }

    pub async fn seed_balance(
        &self,
        item_id: i64,
        on_hand: i64,
        allocated: i64,
    ) -> inventory_balance::Model {
        inventory_balance::ActiveModel {
            item_id: Set(item_id),
            on_hand_qty: Set(Decimal::from(on_hand)),
            allocated_qty: Set(Decimal::from(allocated)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed balance")
    }

    pub async fn seed_kit_component(&self, parent: i64, child: i64, qty: i64) {
        kit_components::ActiveModel {
            parent_item_id: Set(parent),
            child_item_id: Set(child),
            qty_per_parent: Set(Decimal::from(qty)),
            instance_status: Set(None),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed kit component");
    }

    pub async fn seed_build(&self, code: &str, status: &str) -> builds::Model {
        let now = Utc::now();
        builds::ActiveModel {
            code: Set(code.to_string()),
            model: Set(Some("Roadster S".to_string())),
            status: Set(status.to_string()),
            eta_date: Set(None),
            spec_json: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed build")
    }

    /// Inserts a task; later calls get a later `updated_at`.
    pub async fn seed_task(
        &self,
        build_id: i64,
        phase_id: Option<i64>,
        name: &str,
        status: &str,
    ) -> tasks::Model {
        let now = Utc::now();
        tasks::ActiveModel {
            build_id: Set(build_id),
            phase_id: Set(phase_id),
            name: Set(name.to_string()),
            status: Set(status.to_string()),
            owner: Set(None),
            started_at: Set(None),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed task")
    }

    pub async fn assign(&self, task_id: i64, technician_id: i64) {
        task_assignments::ActiveModel {
            task_id: Set(task_id),
            technician_id: Set(technician_id),
            assigned_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed assignment");
    }

    pub async fn require(&self, task_id: i64, item_id: i64, qty: i64) {
        task_requirements::ActiveModel {
            task_id: Set(task_id),
            item_id: Set(item_id),
            required_qty: Set(Decimal::from(qty)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed requirement");
    }

    pub async fn block_event(&self, task_id: i64, note: &str) {
        task_events::ActiveModel {
            task_id: Set(task_id),
            event_type: Set("BLOCK".to_string()),
            note: Set(Some(note.to_string())),
            technician_id: Set(None),
            occurred_at: Set(Utc::now() - Duration::minutes(5)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed block event");
    }

    pub async fn open_session(&self, technician_id: i64, task_id: i64, hours_ago: i64) {
        work_sessions::ActiveModel {
            technician_id: Set(technician_id),
            task_id: Set(task_id),
            station: Set(None),
            started_at: Set(Utc::now() - Duration::hours(hours_ago)),
            ended_at: Set(None),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed work session");
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn into_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is json")
    };
    (status, value)
}

/// Cookie header selecting technician mode and `technician_id`.
pub fn tech_cookie(technician_id: i64) -> String {
    format!("gw_mode=technician; gw_tech_id={}", technician_id)
}

/// Reads a decimal whether it was serialized as a string or a number.
pub fn dec(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {other}"),
    }
}
