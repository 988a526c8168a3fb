mod common;

use axum::http::StatusCode;
use common::{dec, tech_cookie, TestApp};
use rust_decimal::Decimal;
use serde_json::{json, Value};

fn ids(tasks: &Value) -> Vec<i64> {
    tasks
        .as_array()
        .expect("task list")
        .iter()
        .map(|t| t["id"].as_i64().expect("task id"))
        .collect()
}

#[tokio::test]
async fn station_view_splits_tasks_into_queues() {
    let app = TestApp::new().await;
    let electrical = app.seed_phase("Electrical", 1).await;
    let paint = app.seed_phase("Paint Prep", 2).await;
    let build = app.seed_build("GW-5001", "IN_PROGRESS").await;
    let harness = app.seed_part("HRN-MAIN", "SKU").await;
    app.seed_balance(harness.id, 1, 0).await;

    let now = app
        .seed_task(build.id, Some(electrical.id), "Route harness", "IN_PROGRESS")
        .await;
    let next = app
        .seed_task(build.id, Some(electrical.id), "Fit fuse box", "NOT_STARTED")
        .await;
    let blocked = app
        .seed_task(build.id, Some(electrical.id), "Install main harness", "BLOCKED")
        .await;
    app.require(blocked.id, harness.id, 3).await;
    app.block_event(blocked.id, "Awaiting parts/material — HRN-MAIN").await;
    app.seed_task(build.id, Some(paint.id), "Sand primer", "IN_PROGRESS")
        .await;

    let (status, body) = app
        .get_json("/api/v1/floor/station?station=electrical", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let view = &body["data"];
    assert_eq!(view["station"]["id"], "electrical");
    assert_eq!(ids(&view["now"]), vec![now.id]);
    assert_eq!(ids(&view["next"]), vec![next.id]);
    assert_eq!(ids(&view["blocked"]), vec![blocked.id]);
    assert_eq!(view["blocked_by_parts"], 1);

    let card = &view["blocked"][0];
    assert_eq!(card["action"]["label"], "Resolve Block");
    assert_eq!(card["primary_enabled"], true);
    assert_eq!(card["block_reason"], "Awaiting parts/material — HRN-MAIN");
    assert_eq!(dec(&card["short_parts"][0]["shortage_qty"]), Decimal::from(2));

    assert_eq!(view["shortages"][0]["sku"], "HRN-MAIN");
    assert_eq!(dec(&view["shortages"][0]["shortage_qty"]), Decimal::from(2));
    assert_eq!(view["stations"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn unknown_station_shows_every_task() {
    let app = TestApp::new().await;
    let electrical = app.seed_phase("Electrical", 1).await;
    let paint = app.seed_phase("Paint Prep", 2).await;
    let build = app.seed_build("GW-5002", "IN_PROGRESS").await;
    app.seed_task(build.id, Some(electrical.id), "Route harness", "IN_PROGRESS")
        .await;
    app.seed_task(build.id, Some(paint.id), "Sand primer", "IN_PROGRESS")
        .await;
    app.seed_task(build.id, Some(paint.id), "Final wipe", "DONE").await;

    let (status, body) = app
        .get_json("/api/v1/floor/station?station=spaceport", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["station"]["id"], "all");
    assert_eq!(body["data"]["now"].as_array().unwrap().len(), 2);
    assert!(body["data"]["next"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn shortage_disables_the_primary_action() {
    let app = TestApp::new().await;
    let assembly = app.seed_phase("Final Assembly", 1).await;
    let build = app.seed_build("GW-5003", "IN_PROGRESS").await;
    let seat = app.seed_part("SEAT-FR", "SKU").await;
    let task = app
        .seed_task(build.id, Some(assembly.id), "Install seats", "NOT_STARTED")
        .await;
    app.require(task.id, seat.id, 2).await;

    let (_, body) = app.get_json("/api/v1/floor/log", None).await;
    let card = &body["data"]["tasks"][0];
    assert_eq!(card["id"], task.id);
    assert_eq!(card["action"]["label"], "Start");
    assert_eq!(card["action"]["primary_event"], "START");
    assert_eq!(card["primary_enabled"], false);

    app.seed_balance(seat.id, 2, 0).await;
    let (_, body) = app.get_json("/api/v1/floor/log", None).await;
    assert_eq!(body["data"]["tasks"][0]["primary_enabled"], true);
}

#[tokio::test]
async fn quick_log_filters_by_stage_status_and_search() {
    let app = TestApp::new().await;
    let carbon = app.seed_phase("Carbon Layup", 1).await;
    let qc = app.seed_phase("QC Inspection", 2).await;
    let first = app.seed_build("GW-5010", "IN_PROGRESS").await;
    let second = app.seed_build("GW-5011", "IN_PROGRESS").await;

    let layup = app
        .seed_task(first.id, Some(carbon.id), "Lay hood plies", "IN_PROGRESS")
        .await;
    let inspect = app
        .seed_task(second.id, Some(qc.id), "Panel gap check", "BLOCKED")
        .await;
    app.seed_task(second.id, Some(qc.id), "Road test", "DONE").await;

    let (status, body) = app.get_json("/api/v1/floor/log", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["status"], "active");
    let mut all = ids(&data["tasks"]);
    all.sort_unstable();
    assert_eq!(all, vec![layup.id, inspect.id]);
    assert_eq!(data["block_reasons"][0], "Awaiting parts/material");
    let mut stages: Vec<String> = data["stages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect();
    stages.sort();
    assert_eq!(stages, vec!["Carbon Layup", "QC Inspection"]);

    let (_, body) = app
        .get_json("/api/v1/floor/log?stage=Carbon%20Layup", None)
        .await;
    assert_eq!(ids(&body["data"]["tasks"]), vec![layup.id]);

    let (_, body) = app.get_json("/api/v1/floor/log?status=blocked", None).await;
    assert_eq!(ids(&body["data"]["tasks"]), vec![inspect.id]);

    let (_, body) = app.get_json("/api/v1/floor/log?q=gw-5010", None).await;
    assert_eq!(ids(&body["data"]["tasks"]), vec![layup.id]);

    let (_, body) = app.get_json("/api/v1/floor/log?q=gap", None).await;
    assert_eq!(ids(&body["data"]["tasks"]), vec![inspect.id]);

    // Only open tasks feed the quick log.
    let (_, body) = app.get_json("/api/v1/floor/log?status=completed", None).await;
    assert!(body["data"]["tasks"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn quick_log_caps_the_row_count() {
    let app = TestApp::new().await;
    let build = app.seed_build("GW-5012", "IN_PROGRESS").await;
    for n in 0..14 {
        app.seed_task(build.id, None, &format!("Task {n}"), "NOT_STARTED")
            .await;
    }

    let (_, body) = app.get_json("/api/v1/floor/log?status=all", None).await;
    assert_eq!(body["data"]["tasks"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn today_board_needs_a_technician() {
    let app = TestApp::new().await;
    app.seed_build("GW-5020", "IN_PROGRESS").await;

    let (status, body) = app.get_json("/api/v1/floor/today", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["technician_id"].is_null());
    assert!(body["data"]["groups"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn today_board_groups_builds_by_the_technicians_phase() {
    let app = TestApp::new().await;
    let carbon = app.seed_phase("Carbon Layup", 1).await;
    let electrical = app.seed_phase("Electrical", 2).await;
    let tech = app.seed_technician("Sam Ortiz").await;
    let first = app.seed_build("GW-5021", "IN_PROGRESS").await;
    let second = app.seed_build("GW-5022", "HOLD").await;
    app.seed_build("GW-5023", "PLANNED").await;

    let layup = app
        .seed_task(first.id, Some(carbon.id), "Lay hood plies", "IN_PROGRESS")
        .await;
    app.assign(layup.id, tech.id).await;
    let wiring = app
        .seed_task(second.id, Some(electrical.id), "Route harness", "NOT_STARTED")
        .await;
    app.assign(wiring.id, tech.id).await;

    let (_, body) = app
        .get_json("/api/v1/floor/today", Some(&tech_cookie(tech.id)))
        .await;
    let data = &body["data"];
    assert_eq!(data["technician_id"], tech.id);

    let groups = data["groups"].as_array().unwrap();
    let phases: Vec<&str> = groups.iter().map(|g| g["phase"].as_str().unwrap()).collect();
    assert_eq!(phases, vec!["Carbon Layup", "Electrical", "Unassigned"]);

    assert_eq!(groups[0]["builds"][0]["code"], "GW-5021");
    assert_eq!(groups[0]["builds"][0]["task_name"], "Lay hood plies");
    assert_eq!(groups[0]["builds"][0]["blocked"], false);
    assert_eq!(groups[1]["builds"][0]["code"], "GW-5022");
    assert_eq!(groups[1]["builds"][0]["blocked"], true);
    assert_eq!(groups[2]["builds"][0]["code"], "GW-5023");
    assert!(groups[2]["builds"][0]["task_name"].is_null());
}

#[tokio::test]
async fn build_station_shows_next_task_and_stages() {
    let app = TestApp::new().await;
    let teardown = app.seed_phase("Teardown", 1).await;
    let carbon = app.seed_phase("Carbon Layup", 2).await;
    app.seed_phase("QC Inspection", 3).await;
    let build = app.seed_build("GW-5030", "IN_PROGRESS").await;

    app.seed_task(build.id, Some(teardown.id), "Strip interior", "DONE")
        .await;
    let open = app
        .seed_task(build.id, Some(carbon.id), "Lay hood plies", "NOT_STARTED")
        .await;
    app.post_json(
        "/api/v1/task-events",
        json!({ "taskId": open.id, "eventType": "START" }),
        None,
    )
    .await;

    let (status, body) = app.get_json("/api/v1/floor/builds/GW-5030", None).await;
    assert_eq!(status, StatusCode::OK);
    let view = &body["data"];
    assert_eq!(view["build"]["code"], "GW-5030");
    assert_eq!(view["next_task"]["id"], open.id);
    assert_eq!(view["next_task"]["action"]["label"], "Complete");
    assert_eq!(view["tasks"].as_array().unwrap().len(), 2);
    assert_eq!(view["events"][0]["event_type"], "START");
    assert_eq!(
        view["stages"],
        json!([
            { "id": teardown.id, "name": "Teardown" },
            { "id": carbon.id, "name": "Carbon Layup" }
        ])
    );
    assert_eq!(view["timeline"].as_array().unwrap().len(), 3);

    let (status, _) = app.get_json("/api/v1/floor/builds/GW-0404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stage_requirements_prefer_kits_and_suggest_a_block_note() {
    let app = TestApp::new().await;
    let assembly = app.seed_phase("Final Assembly", 1).await;
    let build = app.seed_build("GW-5040", "IN_PROGRESS").await;
    let kit = app.seed_part("KIT-DOOR", "KIT").await;
    let hinge = app.seed_part("HNG-DOOR", "SKU").await;
    let bolt = app.seed_part("BLT-M8", "SKU").await;
    app.seed_kit_component(kit.id, hinge.id, 2).await;
    app.seed_balance(kit.id, 0, 0).await;
    app.seed_balance(bolt.id, 100, 0).await;

    let hang = app
        .seed_task(build.id, Some(assembly.id), "Hang doors", "NOT_STARTED")
        .await;
    let align = app
        .seed_task(build.id, Some(assembly.id), "Align doors", "NOT_STARTED")
        .await;
    app.require(hang.id, kit.id, 1).await;
    app.require(align.id, kit.id, 1).await;
    app.require(hang.id, bolt.id, 8).await;

    let (status, body) = app
        .get_json(
            &format!("/api/v1/floor/builds/GW-5040/stages/{}/requirements", assembly.id),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let view = &body["data"];
    assert_eq!(view["stage_name"], "Final Assembly");

    let lines = view["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["sku"], "KIT-DOOR");
    assert_eq!(dec(&lines[0]["required_qty"]), Decimal::from(2));
    assert_eq!(lines[0]["status"], "SHORT");
    assert_eq!(lines[0]["children"][0]["sku"], "HNG-DOOR");

    let top = view["top_shortages"].as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(dec(&top[0]["shortage_qty"]), Decimal::from(2));

    let note = view["suggested_block_note"].as_str().unwrap();
    assert!(note.starts_with("Awaiting parts/material"));
    assert!(note.contains("KIT-DOOR"));
}

#[tokio::test]
async fn stage_without_tasks_has_no_requirements() {
    let app = TestApp::new().await;
    let build = app.seed_build("GW-5041", "IN_PROGRESS").await;

    let (status, body) = app
        .get_json(&format!("/api/v1/floor/builds/{}/stages/99/requirements", build.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["lines"].as_array().unwrap().is_empty());
    assert!(body["data"]["stage_name"].is_null());
    assert!(body["data"]["suggested_block_note"].is_null());
}

#[tokio::test]
async fn task_instructions_follow_the_phase() {
    let app = TestApp::new().await;
    let teardown = app.seed_phase("Teardown", 1).await;
    let build = app.seed_build("GW-5050", "IN_PROGRESS").await;
    let known = app
        .seed_task(build.id, Some(teardown.id), "Strip interior", "NOT_STARTED")
        .await;
    let generic = app.seed_task(build.id, None, "Sweep bay", "NOT_STARTED").await;

    let (status, body) = app
        .get_json(&format!("/api/v1/floor/tasks/{}/instructions", known.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["build_code"], "GW-5050");
    assert_eq!(body["data"]["instructions"]["station"], "Teardown");
    assert!(!body["data"]["instructions"]["steps"].as_array().unwrap().is_empty());

    let (_, body) = app
        .get_json(&format!("/api/v1/floor/tasks/{}/instructions", generic.id), None)
        .await;
    assert_eq!(body["data"]["instructions"]["station"], "General");
    assert_eq!(body["data"]["instructions"]["task_title"], "Sweep bay");

    let (status, _) = app.get_json("/api/v1/floor/tasks/4040/instructions", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn technician_summary_collects_now_next_blockers_and_team() {
    let app = TestApp::new().await;
    let paint = app.seed_phase("Paint Prep", 1).await;
    let me = app.seed_technician("Sam Ortiz").await;
    let mate = app.seed_technician("Jo Park").await;
    let build = app.seed_build("GW-5060", "IN_PROGRESS").await;

    let working = app
        .seed_task(build.id, Some(paint.id), "Sand primer", "IN_PROGRESS")
        .await;
    app.assign(working.id, me.id).await;
    app.open_session(me.id, working.id, 1).await;

    let queued = app
        .seed_task(build.id, Some(paint.id), "Mask trim", "NOT_STARTED")
        .await;
    app.assign(queued.id, me.id).await;

    let stuck = app
        .seed_task(build.id, Some(paint.id), "Spray base coat", "BLOCKED")
        .await;
    app.assign(stuck.id, me.id).await;
    app.block_event(stuck.id, "Tooling/equipment issue — gun clogged").await;

    let mates_task = app
        .seed_task(build.id, Some(paint.id), "Mix clear coat", "IN_PROGRESS")
        .await;
    app.open_session(mate.id, mates_task.id, 2).await;

    let (status, body) = app
        .get_json("/api/v1/technician/summary", Some(&tech_cookie(me.id)))
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["technician_id"], me.id);
    assert_eq!(data["now"]["task_id"], working.id);
    assert_eq!(data["now"]["phase"], "Paint Prep");

    let next = data["next"].as_array().unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0]["task_id"], queued.id);

    let blockers = data["blockers"].as_array().unwrap();
    assert_eq!(blockers.len(), 1);
    assert_eq!(blockers[0]["note"], "Tooling/equipment issue — gun clogged");

    assert_eq!(data["team_phase"], "Paint Prep");
    let team = data["team_now"].as_array().unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0]["display_name"], "Jo Park");
    assert_eq!(team[0]["task_name"], "Mix clear coat");
}

#[tokio::test]
async fn technician_summary_is_empty_without_a_technician() {
    let app = TestApp::new().await;

    let (status, body) = app.get_json("/api/v1/technician/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert!(data["technician_id"].is_null());
    assert!(data["now"].is_null());
    assert!(data["next"].as_array().unwrap().is_empty());
    assert!(data["team_now"].as_array().unwrap().is_empty());
}
