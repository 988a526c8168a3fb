// Shared query helpers
pub mod loaders;

// Writes
pub mod allocations;
pub mod receiving;
pub mod task_events;

// Admin views
pub mod admin_summary;
pub mod builds;
pub mod inventory;
pub mod parts;
pub mod work_orders;

// Technician views
pub mod floor;
pub mod technician_summary;
pub mod technicians;
