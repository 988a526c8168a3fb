use serde::Serialize;
use utoipa::ToSchema;

use super::status::{EventType, TaskStatus};

/// Block reason that marks a task as waiting on stock.
pub const PARTS_BLOCK_REASON: &str = "Awaiting parts/material";

/// Reasons offered when a technician blocks a task.
pub const BLOCK_REASONS: [&str; 6] = [
    PARTS_BLOCK_REASON,
    "Awaiting QC",
    "Tooling/equipment issue",
    "Waiting on engineering",
    "Rework required",
    "Safety hold",
];

/// The button a technician sees for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TaskAction {
    pub label: String,
    /// Event logged by the primary button; `None` means view only.
    pub primary_event: Option<EventType>,
    pub secondary_event: Option<EventType>,
}

/// A missing status is treated as NOT_STARTED.
pub fn next_action(status: Option<&str>) -> TaskAction {
    let status = match status {
        None => Some(TaskStatus::NotStarted),
        Some(raw) => TaskStatus::parse_loose(Some(raw)),
    };
    let (label, primary, secondary) = match status {
        Some(TaskStatus::NotStarted) => ("Start", EventType::Start, EventType::Block),
        Some(TaskStatus::InProgress) => ("Complete", EventType::Complete, EventType::Pause),
        Some(TaskStatus::Paused) => ("Resume", EventType::Resume, EventType::Block),
        Some(TaskStatus::Blocked) => ("Resolve Block", EventType::Unblock, EventType::Block),
        _ => {
            return TaskAction {
                label: "View / Log Note".to_string(),
                primary_event: None,
                secondary_event: None,
            }
        }
    };
    TaskAction {
        label: label.to_string(),
        primary_event: Some(primary),
        secondary_event: Some(secondary),
    }
}

/// Whether the primary button can fire while the task has short parts.
pub fn primary_enabled(action: &TaskAction, has_shortage: bool) -> bool {
    !has_shortage || action.primary_event == Some(EventType::Unblock)
}

/// Joins a block reason and a free-text note into the stored event note.
pub fn format_block_note(reason: &str, note: Option<&str>) -> String {
    match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(note) => format!("{} — {}", reason.trim(), note),
        None => reason.trim().to_string(),
    }
}

/// True when a stored BLOCK note was written for a parts shortage.
pub fn is_parts_block(note: Option<&str>) -> bool {
    note.map(|n| n.trim_start().starts_with(PARTS_BLOCK_REASON))
        .unwrap_or(false)
}
