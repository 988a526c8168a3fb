use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Lifecycle of a single task on a build.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Paused,
    Blocked,
    #[serde(alias = "COMPLETE")]
    #[strum(to_string = "DONE", serialize = "COMPLETE")]
    Done,
}

impl TaskStatus {
    /// Parses a stored status string, tolerating case and surrounding whitespace.
    pub fn parse_loose(value: Option<&str>) -> Option<Self> {
        value.and_then(|raw| raw.trim().parse().ok())
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// IN_PROGRESS or PAUSED: someone has their hands on it.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress | Self::Paused)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Statuses that still show up on the floor boards.
    pub fn is_open(&self) -> bool {
        !self.is_done()
    }

    pub fn open_statuses() -> [TaskStatus; 4] {
        [
            Self::InProgress,
            Self::Paused,
            Self::Blocked,
            Self::NotStarted,
        ]
    }
}

/// Event a technician logs against a task.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EventType {
    Start,
    Pause,
    Resume,
    Complete,
    Block,
    Unblock,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Status a task moves to once this event is logged.
    pub fn next_status(&self) -> TaskStatus {
        match self {
            Self::Start | Self::Resume | Self::Unblock => TaskStatus::InProgress,
            Self::Pause => TaskStatus::Paused,
            Self::Complete => TaskStatus::Done,
            Self::Block => TaskStatus::Blocked,
        }
    }

    /// Events that put a technician on the task.
    pub fn opens_session(&self) -> bool {
        matches!(self, Self::Start | Self::Resume)
    }

    /// Events that take the technician off the task.
    pub fn closes_session(&self) -> bool {
        matches!(self, Self::Pause | Self::Complete | Self::Block)
    }
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
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum BuildStatus {
    Planned,
    InProgress,
    Hold,
    Complete,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Part master classification used by the parts filter.
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
    EnumIter,
    AsRefStr,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PartType {
    Component,
    Subassembly,
    Fastener,
    Material,
    Assembly,
    Service,
}

impl PartType {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Badge colour for a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Hold,
    Critical,
    Low,
    Info,
    Ok,
}

/// Maps any build, task or event status label to a badge tone.
pub fn status_tone(status: Option<&str>) -> Tone {
    let normalized = status.map(|s| s.trim().to_ascii_uppercase());
    match normalized.as_deref() {
        Some("HOLD") => Tone::Hold,
        Some("BLOCK") | Some("BLOCKED") => Tone::Critical,
        Some("PAUSE") | Some("PAUSED") => Tone::Low,
        Some("IN_PROGRESS") => Tone::Info,
        Some("DONE") | Some("COMPLETE") => Tone::Ok,
        _ => Tone::Info,
    }
}
