use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use super::{TaskFacts, UNASSIGNED_PHASE};

/// Most rows the quick log shows at once.
pub const QUICK_LOG_LIMIT: usize = 10;

const ALL_STAGES: &str = "all";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatusFilter {
    #[default]
    Active,
    Blocked,
    Completed,
    All,
}

impl StatusFilter {
    fn accepts(&self, status: Option<&str>) -> bool {
        let parsed = super::TaskStatus::parse_loose(status);
        match self {
            Self::All => true,
            Self::Active => !parsed.map(|s| s.is_done()).unwrap_or(false),
            Self::Blocked => parsed.map(|s| s.is_blocked()).unwrap_or(false),
            Self::Completed => parsed.map(|s| s.is_done()).unwrap_or(false),
        }
    }
}

/// A task row as the quick log searches it.
pub trait QuickLogRow: TaskFacts {
    fn build_code(&self) -> Option<&str>;
    fn title(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct QuickLogFilter {
    pub stage: Option<String>,
    #[serde(default)]
    pub status: StatusFilter,
    pub q: Option<String>,
}

impl QuickLogFilter {
    fn stage_matches(&self, phase: Option<&str>) -> bool {
        match self.stage.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(stage) if stage.eq_ignore_ascii_case(ALL_STAGES) => true,
            Some(stage) => phase == Some(stage),
        }
    }

    fn search_matches<R: QuickLogRow>(&self, row: &R) -> bool {
        let Some(term) = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        else {
            return true;
        };
        let haystack = [row.build_code(), row.title(), row.phase()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        haystack.contains(&term.to_lowercase())
    }

    pub fn matches<R: QuickLogRow>(&self, row: &R) -> bool {
        self.stage_matches(row.phase())
            && self.status.accepts(row.status())
            && self.search_matches(row)
    }

    /// Rows passing every filter, capped at [`QUICK_LOG_LIMIT`].
    pub fn apply<'a, R: QuickLogRow>(&self, rows: &'a [R]) -> Vec<&'a R> {
        rows.iter()
            .filter(|row| self.matches(*row))
            .take(QUICK_LOG_LIMIT)
            .collect()
    }
}

/// Distinct stage names for the stage picker, in first-seen order.
pub fn stages<R: QuickLogRow>(rows: &[R]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for row in rows {
        let phase = row.phase().unwrap_or(UNASSIGNED_PHASE);
        if !seen.iter().any(|s| s == phase) {
            seen.push(phase.to_string());
        }
    }
    seen
}
