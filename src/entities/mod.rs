//! sea-orm entities for the shop-floor schema.

pub mod allocations;
pub mod build_bom_line;
pub mod build_documents;
pub mod builds;
pub mod inspection_records;
pub mod inventory_balance;
pub mod inventory_lot;
pub mod kit_components;
pub mod part_master;
pub mod phases;
pub mod stock_receipts;
pub mod task_assignments;
pub mod task_events;
pub mod task_requirements;
pub mod tasks;
pub mod technicians;
pub mod wo_consumption;
pub mod work_orders;
pub mod work_sessions;
