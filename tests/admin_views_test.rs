mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{dec, TestApp};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use shopfloor_api::entities::{build_bom_line, inspection_records, wo_consumption, work_orders};

#[tokio::test]
async fn build_list_shows_focus_phase() {
    let app = TestApp::new().await;
    let carbon = app.seed_phase("Carbon Layup", 1).await;
    let active = app.seed_build("GW-4001", "IN_PROGRESS").await;
    app.seed_build("GW-4002", "PLANNED").await;
    app.seed_task(active.id, Some(carbon.id), "Lay hood plies", "IN_PROGRESS")
        .await;

    let (status, body) = app.get_json("/api/v1/builds", None).await;
    assert_eq!(status, StatusCode::OK);
    let builds = body["data"].as_array().expect("build list");
    assert_eq!(builds.len(), 2);

    let focus = |code: &str| {
        builds
            .iter()
            .find(|b| b["code"] == code)
            .map(|b| b["focus_phase"].clone())
            .expect("build listed")
    };
    assert_eq!(focus("GW-4001"), "Carbon Layup");
    assert_eq!(focus("GW-4002"), "Not started");
}

#[tokio::test]
async fn build_detail_resolves_code_or_id() {
    let app = TestApp::new().await;
    let teardown = app.seed_phase("Teardown", 1).await;
    let build = app.seed_build("GW-4010", "IN_PROGRESS").await;
    let part = app.seed_part("PNL-HOOD", "SKU").await;
    let task = app
        .seed_task(build.id, Some(teardown.id), "Strip interior", "IN_PROGRESS")
        .await;
    app.block_event(task.id, "Safety hold").await;

    build_bom_line::ActiveModel {
        build_id: Set(build.id),
        part_id: Set(part.id),
        required_qty: Set(Decimal::from(2)),
        allocated_qty: Set(Decimal::ONE),
        consumed_qty: Set(Decimal::ZERO),
        ..Default::default()
    }
    .insert(app.db())
    .await
    .unwrap();

    let (status, by_code) = app.get_json("/api/v1/builds/GW-4010", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, by_id) = app
        .get_json(&format!("/api/v1/builds/{}", build.id), None)
        .await;
    assert_eq!(by_code["data"]["overview"], by_id["data"]["overview"]);

    let detail = &by_code["data"];
    assert_eq!(detail["overview"]["code"], "GW-4010");
    assert_eq!(detail["overview"]["on_hold"], false);
    assert_eq!(detail["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(detail["events"].as_array().unwrap().len(), 1);
    assert_eq!(detail["bom"][0]["sku"], "PNL-HOOD");
    assert_eq!(dec(&detail["bom"][0]["required_qty"]), Decimal::from(2));
    assert!(!detail["overview"]["timeline"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_build_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.get_json("/api/v1/builds/GW-0000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].as_str().unwrap().contains("GW-0000"));
}

#[tokio::test]
async fn documents_attach_to_a_build() {
    let app = TestApp::new().await;
    app.seed_build("GW-4020", "IN_PROGRESS").await;

    let (status, body) = app
        .post_json(
            "/api/v1/builds/GW-4020/documents",
            json!({ "filename": "wiring.pdf", "url": "https://files.local/wiring.pdf", "docType": "drawing" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "wiring.pdf");

    let (status, _) = app
        .post_json(
            "/api/v1/builds/GW-4020/documents",
            json!({ "filename": "   " }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post_json(
            "/api/v1/builds/GW-9999/documents",
            json!({ "filename": "notes.txt" }),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, detail) = app.get_json("/api/v1/builds/GW-4020", None).await;
    let documents = detail["data"]["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["doc_type"], "drawing");
}

#[tokio::test]
async fn parts_search_matches_sku_or_name() {
    let app = TestApp::new().await;
    app.seed_part("BLT-M8", "SKU").await;
    app.seed_part("KIT-DOOR", "KIT").await;

    let (status, body) = app.get_json("/api/v1/parts?q=blt", None).await;
    assert_eq!(status, StatusCode::OK);
    let parts = body["data"]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["sku"], "BLT-M8");

    // Names are "Part <sku>", so this matches both.
    let (_, body) = app.get_json("/api/v1/parts?q=PART", None).await;
    assert_eq!(body["data"]["parts"].as_array().unwrap().len(), 2);

    let (_, body) = app.get_json("/api/v1/parts?type=fastener", None).await;
    assert!(body["data"]["parts"].as_array().unwrap().is_empty());
    assert!(body["data"]["part_types"]
        .as_array()
        .unwrap()
        .contains(&json!("FASTENER")));
}

#[tokio::test]
async fn inventory_reports_availability() {
    let app = TestApp::new().await;
    let bolt = app.seed_part("BLT-M8", "SKU").await;
    let harness = app.seed_part("HRN-MAIN", "SKU").await;
    app.seed_balance(bolt.id, 100, 20).await;
    app.seed_balance(harness.id, 1, 1).await;

    let (status, body) = app.get_json("/api/v1/inventory", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "balances");
    let rows = body["data"]["rows"].as_array().unwrap();
    assert_eq!(rows[0]["sku"], "BLT-M8");
    assert_eq!(dec(&rows[0]["available"]), Decimal::from(80));
    assert_eq!(rows[0]["tone"], "OK");
    assert_eq!(rows[1]["sku"], "HRN-MAIN");
    assert_eq!(rows[1]["tone"], "CRITICAL");
}

#[tokio::test]
async fn inventory_falls_back_to_lots() {
    let app = TestApp::new().await;
    let part = app.seed_part("GSKT-4", "SKU").await;

    let (_, empty) = app.get_json("/api/v1/inventory", None).await;
    assert_eq!(empty["data"]["source"], "lots");
    let rows = empty["data"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["item_id"], part.id);
    assert_eq!(dec(&rows[0]["on_hand"]), Decimal::ZERO);
}

#[tokio::test]
async fn work_orders_list_and_detail() {
    let app = TestApp::new().await;
    let build = app.seed_build("GW-4030", "IN_PROGRESS").await;
    let seat = app.seed_part("SEAT-FR", "SKU").await;
    let foam = app.seed_part("FOAM-20", "MATERIAL").await;

    let wo = work_orders::ActiveModel {
        wo_type: Set("FABRICATION".to_string()),
        status: Set("IN_PROGRESS".to_string()),
        target_part_id: Set(seat.id),
        for_build_id: Set(Some(build.id)),
        notes: Set(Some("Left seat first".to_string())),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(app.db())
    .await
    .unwrap();
    wo_consumption::ActiveModel {
        work_order_id: Set(wo.id),
        part_id: Set(foam.id),
        qty: Set(Decimal::new(25, 1)),
        consumed_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(app.db())
    .await
    .unwrap();
    inspection_records::ActiveModel {
        work_order_id: Set(wo.id),
        result: Set("PASS".to_string()),
        notes: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(app.db())
    .await
    .unwrap();

    let (status, list) = app.get_json("/api/v1/work-orders", None).await;
    assert_eq!(status, StatusCode::OK);
    let rows = list["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["code"], "SEAT-FR");
    assert_eq!(rows[0]["build_code"], "GW-4030");

    let (status, detail) = app
        .get_json(&format!("/api/v1/work-orders/{}", wo.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = &detail["data"];
    assert_eq!(data["header"]["wo_type"], "FABRICATION");
    assert_eq!(data["consumption"][0]["sku"], "FOAM-20");
    assert_eq!(dec(&data["consumption"][0]["qty"]), Decimal::new(25, 1));
    assert_eq!(data["inspections"][0]["result"], "PASS");

    let (status, _) = app.get_json("/api/v1/work-orders/WO-12", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get_json("/api/v1/work-orders/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_summary_counts_builds_blockers_and_shortages() {
    let app = TestApp::new().await;
    let electrical = app.seed_phase("Electrical", 1).await;
    let paint = app.seed_phase("Paint Prep", 2).await;
    let tech = app.seed_technician("Jo Park").await;
    let active = app.seed_build("GW-4040", "IN_PROGRESS").await;
    app.seed_build("GW-4041", "HOLD").await;
    let harness = app.seed_part("HRN-MAIN", "SKU").await;
    app.seed_balance(harness.id, 0, 0).await;

    let blocked = app
        .seed_task(active.id, Some(electrical.id), "Install harness", "BLOCKED")
        .await;
    app.require(blocked.id, harness.id, 1).await;
    app.block_event(blocked.id, "Awaiting parts/material").await;

    let working = app
        .seed_task(active.id, Some(paint.id), "Sand primer", "IN_PROGRESS")
        .await;
    app.open_session(tech.id, working.id, 0).await;

    let (status, body) = app.get_json("/api/v1/admin/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["metrics"]["active_builds"], 1);
    assert_eq!(data["metrics"]["hold_builds"], 1);
    assert_eq!(data["metrics"]["blocked_tasks"], 1);
    assert_eq!(data["metrics"]["shortages"], 1);
    assert_eq!(
        data["top_blockers"],
        json!([{ "reason": "Awaiting parts/material", "count": 1 }])
    );
    assert_eq!(data["wip_by_phase"], json!([{ "phase": "Paint Prep", "count": 1 }]));

    let techs = data["technicians"].as_array().unwrap();
    assert_eq!(techs.len(), 1);
    assert_eq!(techs[0]["working"], true);
    assert_eq!(techs[0]["current_task"], "Sand primer");
    assert_eq!(techs[0]["build_code"], "GW-4040");
}

#[tokio::test]
async fn technicians_lists_active_technicians() {
    let app = TestApp::new().await;
    app.seed_technician("Riley Chen").await;
    app.seed_technician("Alex Diaz").await;

    let (status, body) = app.get_json("/api/v1/technicians", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["display_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alex Diaz", "Riley Chen"]);
}
