use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::status::TaskStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Station {
    #[schema(value_type = String)]
    pub id: &'static str,
    #[schema(value_type = String)]
    pub label: &'static str,
    #[schema(value_type = Vec<String>)]
    pub keywords: &'static [&'static str],
}

pub const ALL_STATIONS: &str = "all";

pub const STATIONS: [Station; 8] = [
    Station {
        id: ALL_STATIONS,
        label: "All",
        keywords: &[],
    },
    Station {
        id: "carbon",
        label: "Carbon",
        keywords: &["carbon", "composite"],
    },
    Station {
        id: "paint",
        label: "Paint",
        keywords: &["paint", "prep", "finish"],
    },
    Station {
        id: "assembly",
        label: "Assembly",
        keywords: &["assembly", "trim"],
    },
    Station {
        id: "powertrain",
        label: "Powertrain",
        keywords: &["power", "engine", "drivetrain"],
    },
    Station {
        id: "electrical",
        label: "Electrical",
        keywords: &["electrical", "wiring"],
    },
    Station {
        id: "qc",
        label: "QC",
        keywords: &["qc", "quality", "inspection"],
    },
    Station {
        id: "teardown",
        label: "Teardown",
        keywords: &["teardown", "strip"],
    },
];

pub fn find_station(id: &str) -> Option<&'static Station> {
    STATIONS.iter().find(|station| station.id.eq_ignore_ascii_case(id))
}

/// Keyword match of a phase name against a station; `all` matches anything.
pub fn matches_station(phase: Option<&str>, station_id: &str) -> bool {
    if station_id.eq_ignore_ascii_case(ALL_STATIONS) {
        return true;
    }
    let Some(station) = find_station(station_id) else {
        return false;
    };
    let phase = phase.unwrap_or_default().to_lowercase();
    station
        .keywords
        .iter()
        .any(|keyword| phase.contains(keyword))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Queue {
    Now,
    Next,
    Blocked,
}

pub fn queue_for(status: Option<&str>) -> Option<Queue> {
    match TaskStatus::parse_loose(status)? {
        TaskStatus::InProgress | TaskStatus::Paused => Some(Queue::Now),
        TaskStatus::NotStarted => Some(Queue::Next),
        TaskStatus::Blocked => Some(Queue::Blocked),
        TaskStatus::Done => None,
    }
}

/// A short part attributed to the phase that needs it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StationShortage {
    pub phase: Option<String>,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub shortage_qty: Decimal,
}

/// Up to three largest shortages for the station.
pub fn station_shortages(requirements: &[StationShortage], station_id: &str) -> Vec<StationShortage> {
    let mut matching: Vec<StationShortage> = requirements
        .iter()
        .filter(|req| req.shortage_qty > Decimal::ZERO)
        .filter(|req| matches_station(req.phase.as_deref(), station_id))
        .cloned()
        .collect();
    matching.sort_by(|a, b| b.shortage_qty.cmp(&a.shortage_qty));
    matching.truncate(super::shortages::TOP_SHORTAGE_LIMIT);
    matching
}
