//! Seed data script - populates the database with a small demo shop floor
//!
//! Run with: cargo run --bin seed-data -- --migrate
//!
//! This creates:
//! - the build phases and four technicians
//! - a part master with a kit and a bag, plus stock balances
//! - three builds with tasks, assignments and material requirements
//! - one parts-blocked task, so receiving stock has something to unblock
//! - a work order with consumption and an inspection

use chrono::{Duration, NaiveDate, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::json;
use std::time::Duration as StdDuration;
use tracing::info;

use shopfloor_api::entities::{
    build_bom_line, builds, inspection_records, inventory_balance, kit_components, part_master,
    phases, task_assignments, task_events, task_requirements, tasks, technicians,
    wo_consumption, work_orders, work_sessions,
};
use shopfloor_api::models::{actions::format_block_note, PARTS_BLOCK_REASON};

#[derive(Debug, Parser)]
#[command(name = "seed-data", about = "Load demo shop floor data")]
struct Args {
    /// Database URL; falls back to DATABASE_URL, then a local SQLite file.
    #[arg(long)]
    database_url: Option<String>,

    /// Run the embedded migrations first.
    #[arg(long)]
    migrate: bool,
}

const PHASES: [&str; 6] = [
    "Teardown",
    "Carbon Layup",
    "Paint Prep",
    "Final Assembly",
    "Electrical",
    "QC Inspection",
];

struct Part {
    sku: &'static str,
    name: &'static str,
    part_type: &'static str,
    item_type: &'static str,
    uom: &'static str,
    on_hand: Decimal,
}

const PARTS: [Part; 7] = [
    Part {
        sku: "BLT-M8-30",
        name: "Bolt M8x30",
        part_type: "FASTENER",
        item_type: "SKU",
        uom: "ea",
        on_hand: dec!(120),
    },
    Part {
        sku: "PRM-GRY-1L",
        name: "Primer grey 1L",
        part_type: "MATERIAL",
        item_type: "MATERIAL",
        uom: "L",
        on_hand: dec!(4),
    },
    Part {
        sku: "CF-PANEL-HOOD",
        name: "Carbon hood panel",
        part_type: "COMPONENT",
        item_type: "SKU",
        uom: "ea",
        on_hand: dec!(1),
    },
    Part {
        sku: "HRN-MAIN",
        name: "Main wiring harness",
        part_type: "SUBASSEMBLY",
        item_type: "SKU",
        uom: "ea",
        on_hand: dec!(0),
    },
    Part {
        sku: "KIT-DOOR-L",
        name: "Left door trim kit",
        part_type: "ASSEMBLY",
        item_type: "KIT",
        uom: "kit",
        on_hand: dec!(2),
    },
    Part {
        sku: "BAG-HINGE",
        name: "Hinge hardware bag",
        part_type: "FASTENER",
        item_type: "BAG",
        uom: "bag",
        on_hand: dec!(3),
    },
    Part {
        sku: "SEAL-DOOR",
        name: "Door seal",
        part_type: "COMPONENT",
        item_type: "SKU",
        uom: "m",
        on_hand: dec!(10),
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    let args = Args::parse();

    info!("=== Shop Floor Seed Data ===");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://shopfloor.db?mode=rwc".to_string());

    let mut options = ConnectOptions::new(database_url.clone());
    options
        .max_connections(5)
        .min_connections(1)
        .connect_timeout(StdDuration::from_secs(10))
        .acquire_timeout(StdDuration::from_secs(10));

    info!("Connecting to database: {}", database_url);
    let db = Database::connect(options).await?;

    if args.migrate {
        info!("Running migrations...");
        shopfloor_api::db::run_migrations(&db).await?;
    }

    let phase_ids = create_phases(&db).await?;
    info!("  Created {} phases", phase_ids.len());

    let tech_ids = create_technicians(&db).await?;
    info!("  Created {} technicians", tech_ids.len());

    let part_ids = create_parts(&db).await?;
    info!("  Created {} parts with balances", part_ids.len());

    let build_count = create_builds(&db, &phase_ids, &tech_ids, &part_ids).await?;
    info!("  Created {} builds with tasks", build_count);

    info!("=== Seed Data Complete ===");
    info!("Try these API calls:");
    info!("  curl http://localhost:8080/api/v1/builds");
    info!("  curl http://localhost:8080/api/v1/floor/station?station=paint");
    info!("  curl http://localhost:8080/api/v1/admin/summary");
    info!("Or explore interactively at: http://localhost:8080/swagger-ui");

    Ok(())
}

async fn create_phases(db: &DatabaseConnection) -> anyhow::Result<Vec<i64>> {
    let mut ids = Vec::new();
    for (seq, name) in PHASES.iter().enumerate() {
        let phase = phases::ActiveModel {
            name: Set(name.to_string()),
            seq: Set(seq as i32 + 1),
            ..Default::default()
        }
        .insert(db)
        .await?;
        ids.push(phase.id);
    }
    Ok(ids)
}

async fn create_technicians(db: &DatabaseConnection) -> anyhow::Result<Vec<i64>> {
    let people = [
        ("Alex Rivera", Some("Lead Technician")),
        ("Sam Okafor", Some("Painter")),
        ("Jordan Lee", Some("Electrician")),
        ("Casey Novak", None),
    ];
    let mut ids = Vec::new();
    for (name, title) in people {
        let tech = technicians::ActiveModel {
            display_name: Set(name.to_string()),
            title: Set(title.map(str::to_string)),
            active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;
        ids.push(tech.id);
    }
    Ok(ids)
}

async fn create_parts(db: &DatabaseConnection) -> anyhow::Result<Vec<i64>> {
    let now = Utc::now();
    let mut ids = Vec::new();
    for part in &PARTS {
        let row = part_master::ActiveModel {
            sku: Set(part.sku.to_string()),
            name: Set(part.name.to_string()),
            part_type: Set(part.part_type.to_string()),
            make_buy: Set(Some("BUY".to_string())),
            is_serialized: Set(false),
            uom: Set(Some(part.uom.to_string())),
            item_type: Set(part.item_type.to_string()),
            criticality: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;

        inventory_balance::ActiveModel {
            item_id: Set(row.id),
            on_hand_qty: Set(part.on_hand),
            allocated_qty: Set(Decimal::ZERO),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        ids.push(row.id);
    }

    // Door kit = seal + hinge bag; hinge bag = bolts.
    let components = [(4, 6, dec!(2)), (4, 5, dec!(1)), (5, 0, dec!(6))];
    for (parent, child, qty) in components {
        kit_components::ActiveModel {
            parent_item_id: Set(ids[parent]),
            child_item_id: Set(ids[child]),
            qty_per_parent: Set(qty),
            instance_status: Set(None),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(ids)
}

async fn create_builds(
    db: &DatabaseConnection,
    phase_ids: &[i64],
    tech_ids: &[i64],
    part_ids: &[i64],
) -> anyhow::Result<usize> {
    let now = Utc::now();
    let specs = [
        ("GW-1001", "Roadster S", "IN_PROGRESS", 3, None),
        ("GW-1002", "Roadster S", "IN_PROGRESS", 2, None),
        ("GW-1003", "Tourer GT", "HOLD", 1, Some("Awaiting customer spec sign-off")),
    ];

    for (index, (code, model, status, reached, hold_reason)) in specs.into_iter().enumerate() {
        let build = builds::ActiveModel {
            code: Set(code.to_string()),
            model: Set(Some(model.to_string())),
            status: Set(status.to_string()),
            eta_date: Set(NaiveDate::from_ymd_opt(2026, 3 + index as u32, 15)),
            spec_json: Set(Some(json!({
                "description": format!("{} customer build", model),
                "hold_reason": hold_reason,
            }))),
            created_at: Set(now - Duration::days(30)),
            updated_at: Set(now - Duration::hours(index as i64)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        for (phase_index, phase_id) in phase_ids.iter().enumerate() {
            let status = match phase_index {
                i if i < reached => "COMPLETE",
                i if i == reached => "IN_PROGRESS",
                _ => "NOT_STARTED",
            };
            let task = tasks::ActiveModel {
                build_id: Set(build.id),
                phase_id: Set(Some(*phase_id)),
                name: Set(format!("{} {}", PHASES[phase_index], code)),
                status: Set(status.to_string()),
                owner: Set(None),
                started_at: Set((status != "NOT_STARTED").then(|| now - Duration::days(7))),
                completed_at: Set((status == "COMPLETE").then(|| now - Duration::days(1))),
                created_at: Set(now - Duration::days(30)),
                updated_at: Set(now - Duration::minutes((index * 10 + phase_index) as i64)),
                ..Default::default()
            }
            .insert(db)
            .await?;

            let tech = tech_ids[(index + phase_index) % tech_ids.len()];
            task_assignments::ActiveModel {
                task_id: Set(task.id),
                technician_id: Set(tech),
                assigned_at: Set(now - Duration::days(7)),
                ..Default::default()
            }
            .insert(db)
            .await?;

            if status == "IN_PROGRESS" {
                work_sessions::ActiveModel {
                    technician_id: Set(tech),
                    task_id: Set(task.id),
                    station: Set(Some(PHASES[phase_index].to_string())),
                    started_at: Set(now - Duration::hours(2)),
                    ended_at: Set(None),
                    ..Default::default()
                }
                .insert(db)
                .await?;
            }

            seed_requirements(db, &task, phase_index, part_ids).await?;
        }

        build_bom_line::ActiveModel {
            build_id: Set(build.id),
            part_id: Set(part_ids[2]),
            required_qty: Set(dec!(1)),
            allocated_qty: Set(Decimal::ZERO),
            consumed_qty: Set(Decimal::ZERO),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    seed_work_order(db, part_ids).await?;
    Ok(specs.len())
}

async fn seed_requirements(
    db: &DatabaseConnection,
    task: &tasks::Model,
    phase_index: usize,
    part_ids: &[i64],
) -> anyhow::Result<()> {
    let lines: &[(usize, Decimal)] = match PHASES[phase_index] {
        "Paint Prep" => &[(1, dec!(2))],
        "Final Assembly" => &[(4, dec!(1)), (0, dec!(16))],
        "Electrical" => &[(3, dec!(1))],
        _ => &[],
    };
    for (part, qty) in lines {
        task_requirements::ActiveModel {
            task_id: Set(task.id),
            item_id: Set(part_ids[*part]),
            required_qty: Set(*qty),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    // The harness is out of stock, so any started electrical task waits on it.
    if PHASES[phase_index] == "Electrical" && task.status == "IN_PROGRESS" {
        let mut blocked: tasks::ActiveModel = task.clone().into();
        blocked.status = Set("BLOCKED".to_string());
        blocked.update(db).await?;

        task_events::ActiveModel {
            task_id: Set(task.id),
            event_type: Set("BLOCK".to_string()),
            note: Set(Some(format_block_note(
                PARTS_BLOCK_REASON,
                Some("HRN-MAIN on back order"),
            ))),
            technician_id: Set(None),
            occurred_at: Set(Utc::now() - Duration::hours(1)),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }
    Ok(())
}

async fn seed_work_order(db: &DatabaseConnection, part_ids: &[i64]) -> anyhow::Result<()> {
    let now = Utc::now();
    let wo = work_orders::ActiveModel {
        wo_type: Set("KIT".to_string()),
        status: Set("COMPLETE".to_string()),
        target_part_id: Set(part_ids[4]),
        for_build_id: Set(None),
        notes: Set(Some("Kit two left door trim sets".to_string())),
        created_at: Set(now - Duration::days(3)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    wo_consumption::ActiveModel {
        work_order_id: Set(wo.id),
        part_id: Set(part_ids[6]),
        qty: Set(dec!(4)),
        consumed_at: Set(now - Duration::days(2)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    inspection_records::ActiveModel {
        work_order_id: Set(wo.id),
        result: Set("PASS".to_string()),
        notes: Set(Some("Counts verified".to_string())),
        created_at: Set(now - Duration::days(2)),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(())
}
