//! Shortage and availability arithmetic.
//!
//! `available = on_hand - allocated`, and a requirement is short whenever the
//! required quantity exceeds what is available.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::actions::PARTS_BLOCK_REASON;

/// How many shortages the floor panels surface.
pub const TOP_SHORTAGE_LIMIT: usize = 3;

/// Availability at or under `required * LOW_STOCK_FACTOR` is reported as LOW.
const LOW_STOCK_FACTOR: Decimal = dec!(1.2);

/// Available quantity at or under this level is reported as LOW stock.
const LOW_AVAILABLE_THRESHOLD: Decimal = dec!(3);

pub fn available(on_hand: Decimal, allocated: Decimal) -> Decimal {
    on_hand - allocated
}

/// Deficit of `required` against `available`, never negative.
pub fn shortage(required: Decimal, available: Decimal) -> Decimal {
    (required - available).max(Decimal::ZERO)
}

pub fn is_short(required: Decimal, on_hand: Decimal, allocated: Decimal) -> bool {
    required > available(on_hand, allocated)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequirementStatus {
    Short,
    Low,
    Ok,
}

pub fn requirement_status(required: Decimal, available: Decimal) -> RequirementStatus {
    if shortage(required, available) > Decimal::ZERO {
        RequirementStatus::Short
    } else if available <= required * LOW_STOCK_FACTOR {
        RequirementStatus::Low
    } else {
        RequirementStatus::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum StockTone {
    Critical,
    Low,
    Ok,
}

pub fn availability_tone(available: Decimal) -> StockTone {
    if available <= Decimal::ZERO {
        StockTone::Critical
    } else if available <= LOW_AVAILABLE_THRESHOLD {
        StockTone::Low
    } else {
        StockTone::Ok
    }
}

/// Quantity the reserve button claims for a requirement.
pub fn reserve_qty(available: Decimal, required: Decimal) -> Decimal {
    available.min(required).max(Decimal::ZERO)
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ItemType {
    Kit,
    Bag,
    Sku,
    Material,
}

impl ItemType {
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Kit | Self::Bag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KitChild {
    pub item_id: i64,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub qty_per_parent: Decimal,
    pub instance_status: Option<String>,
}

/// One item needed by a build stage.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RequirementLine {
    pub item_id: i64,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub item_type: ItemType,
    pub required_qty: Decimal,
    pub uom: Option<String>,
    pub available_qty: Decimal,
    pub shortage_qty: Decimal,
    pub criticality: Option<String>,
    pub status: RequirementStatus,
    pub reserve_qty: Decimal,
    pub children: Vec<KitChild>,
}

impl RequirementLine {
    pub fn new(
        item_id: i64,
        sku: Option<String>,
        name: Option<String>,
        item_type: ItemType,
        required_qty: Decimal,
        available_qty: Decimal,
    ) -> Self {
        Self {
            item_id,
            sku,
            name,
            item_type,
            required_qty,
            uom: None,
            available_qty,
            shortage_qty: shortage(required_qty, available_qty),
            criticality: None,
            status: requirement_status(required_qty, available_qty),
            reserve_qty: reserve_qty(available_qty, required_qty),
            children: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        self.sku
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("item")
    }
}

/// Kits and bags hide their loose contents when present.
pub fn display_lines(lines: &[RequirementLine]) -> Vec<RequirementLine> {
    let containers: Vec<RequirementLine> = lines
        .iter()
        .filter(|line| line.item_type.is_container())
        .cloned()
        .collect();
    if containers.is_empty() {
        lines.to_vec()
    } else {
        containers
    }
}

/// Largest shortages first, at most [`TOP_SHORTAGE_LIMIT`].
pub fn top_shortages(lines: &[RequirementLine]) -> Vec<RequirementLine> {
    let mut short: Vec<RequirementLine> = lines
        .iter()
        .filter(|line| line.shortage_qty > Decimal::ZERO)
        .cloned()
        .collect();
    short.sort_by(|a, b| b.shortage_qty.cmp(&a.shortage_qty));
    short.truncate(TOP_SHORTAGE_LIMIT);
    short
}

/// Block note proposed to the technician when parts are short.
pub fn suggested_block_note(top: &[RequirementLine]) -> Option<String> {
    if top.is_empty() {
        return None;
    }
    let summary = top
        .iter()
        .map(RequirementLine::label)
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!("{} — {}", PARTS_BLOCK_REASON, summary))
}
