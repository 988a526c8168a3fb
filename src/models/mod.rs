//! Derived shop-floor state.
//!
//! Everything in here is pure: it takes rows already loaded by the services
//! and computes statuses, shortages, timelines and instructions from them.

pub mod actions;
pub mod instructions;
pub mod phases;
pub mod quick_log;
pub mod shortages;
pub mod stations;
pub mod status;

use chrono::{DateTime, Utc};

pub use actions::{format_block_note, next_action, TaskAction, BLOCK_REASONS, PARTS_BLOCK_REASON};
pub use phases::{
    build_phase_timeline, current_focus_phase, summarize_phase, PhaseSummary, PhaseSummaryStatus,
    PhaseTimelineItem, TimelineStatus,
};
pub use status::{status_tone, BuildStatus, EventType, PartType, TaskStatus, Tone};

/// Phase name used when a task has no phase.
pub const UNASSIGNED_PHASE: &str = "Unassigned";

/// Read access to the task columns the derivations care about.
pub trait TaskFacts {
    fn phase(&self) -> Option<&str>;
    fn status(&self) -> Option<&str>;
    fn started_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    fn parsed_status(&self) -> Option<TaskStatus> {
        TaskStatus::parse_loose(self.status())
    }
}

/// Read access to the task event columns used by focus phase detection.
pub trait EventFacts {
    fn event_type(&self) -> Option<&str>;
    fn phase(&self) -> Option<&str>;
}
