use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{status::TaskStatus, EventFacts, TaskFacts, UNASSIGNED_PHASE};

/// Focus phase reported when nothing is under way yet.
pub const NOT_STARTED_PHASE: &str = "Not started";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStatus {
    Planned,
    Active,
    Hold,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PhaseTimelineItem {
    pub name: String,
    pub status: TimelineStatus,
    /// Only set on the active phase.
    pub eta: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhaseSummaryStatus {
    Active,
    Hold,
    Complete,
    Planned,
}

/// Current work package of a build as shown on the build station screen.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PhaseSummary {
    pub name: String,
    pub status: PhaseSummaryStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub eta: Option<NaiveDate>,
    pub progress_pct: u32,
    pub blockers: usize,
}

#[derive(Default)]
struct PhaseCounts {
    total: usize,
    completed: usize,
    blocked: usize,
    active: bool,
}

fn phase_of<T: TaskFacts>(task: &T) -> &str {
    task.phase().unwrap_or(UNASSIGNED_PHASE)
}

fn count_phase<T: TaskFacts>(tasks: &[T], phase: &str) -> PhaseCounts {
    tasks
        .iter()
        .filter(|task| phase_of(*task) == phase)
        .fold(PhaseCounts::default(), |mut acc, task| {
            acc.total += 1;
            match task.parsed_status() {
                Some(status) if status.is_done() => acc.completed += 1,
                Some(status) if status.is_blocked() => acc.blocked += 1,
                Some(status) if status.is_active() => acc.active = true,
                _ => {}
            }
            acc
        })
}

/// One entry per phase, in configured order.
///
/// Falls back to the distinct task phases (first seen first) when no phases
/// are configured.
pub fn build_phase_timeline<T: TaskFacts>(
    phases: &[String],
    tasks: &[T],
    eta: Option<NaiveDate>,
) -> Vec<PhaseTimelineItem> {
    let names: Vec<String> = if phases.is_empty() {
        let mut seen: Vec<String> = Vec::new();
        for task in tasks {
            let name = phase_of(task);
            if !seen.iter().any(|existing| existing == name) {
                seen.push(name.to_string());
            }
        }
        seen
    } else {
        phases.to_vec()
    };

    names
        .into_iter()
        .map(|name| {
            let counts = count_phase(tasks, &name);
            let status = if counts.total == 0 {
                TimelineStatus::Planned
            } else if counts.completed == counts.total {
                TimelineStatus::Complete
            } else if counts.blocked > 0 {
                TimelineStatus::Hold
            } else if counts.active {
                TimelineStatus::Active
            } else {
                TimelineStatus::Planned
            };
            PhaseTimelineItem {
                eta: if status == TimelineStatus::Active { eta } else { None },
                name,
                status,
            }
        })
        .collect()
}

/// Phase the build is focused on right now.
pub fn current_focus_phase<T: TaskFacts, E: EventFacts>(tasks: &[T], events: &[E]) -> String {
    let from_task = tasks
        .iter()
        .find(|task| task.parsed_status() == Some(TaskStatus::InProgress))
        .and_then(|task| task.phase());
    if let Some(phase) = from_task {
        return phase.to_string();
    }

    events
        .iter()
        .find(|event| {
            event
                .event_type()
                .map(|kind| {
                    let kind = kind.to_ascii_uppercase();
                    kind == "IN_PROGRESS" || kind == "RESUME"
                })
                .unwrap_or(false)
        })
        .and_then(|event| event.phase())
        .unwrap_or(NOT_STARTED_PHASE)
        .to_string()
}

pub fn summarize_phase<T: TaskFacts>(
    tasks: &[T],
    phases: &[String],
    eta: Option<NaiveDate>,
) -> PhaseSummary {
    let active_task = tasks
        .iter()
        .find(|task| {
            matches!(
                task.parsed_status(),
                Some(TaskStatus::InProgress | TaskStatus::Paused | TaskStatus::Blocked)
            )
        })
        .or_else(|| tasks.first());

    let name = active_task
        .and_then(|task| task.phase())
        .or_else(|| phases.first().map(String::as_str))
        .unwrap_or(UNASSIGNED_PHASE)
        .to_string();

    let counts = count_phase(tasks, &name);
    let total = counts.total.max(1);

    // An empty phase reports COMPLETE with zero progress.
    let status = if counts.completed == counts.total {
        PhaseSummaryStatus::Complete
    } else if counts.blocked > 0 {
        PhaseSummaryStatus::Hold
    } else if counts.active {
        PhaseSummaryStatus::Active
    } else {
        PhaseSummaryStatus::Planned
    };

    let started_at = tasks
        .iter()
        .filter(|task| phase_of(*task) == name)
        .filter_map(|task| task.started_at())
        .min();

    let progress_pct = ((counts.completed as f64 / total as f64) * 100.0).round() as u32;

    PhaseSummary {
        name,
        status,
        started_at,
        eta,
        progress_pct,
        blockers: counts.blocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Task {
        phase: Option<&'static str>,
        status: Option<&'static str>,
        started_at: Option<DateTime<Utc>>,
    }

    impl TaskFacts for Task {
        fn phase(&self) -> Option<&str> {
            self.phase
        }
        fn status(&self) -> Option<&str> {
            self.status
        }
        fn started_at(&self) -> Option<DateTime<Utc>> {
            self.started_at
        }
    }

    struct Event(&'static str, Option<&'static str>);

    impl EventFacts for Event {
        fn event_type(&self) -> Option<&str> {
            Some(self.0)
        }
        fn phase(&self) -> Option<&str> {
            self.1
        }
    }

    fn task(phase: &'static str, status: &'static str) -> Task {
        Task {
            phase: Some(phase),
            status: Some(status),
            started_at: None,
        }
    }

    fn phases(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn eta() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2025, 6, 30)
    }

    #[test]
    fn timeline_statuses_per_phase() {
        let tasks = vec![
            task("Teardown", "DONE"),
            task("Teardown", "COMPLETE"),
            task("Paint", "BLOCKED"),
            task("Paint", "IN_PROGRESS"),
            task("Assembly", "PAUSED"),
            task("Electrical", "NOT_STARTED"),
        ];
        let timeline = build_phase_timeline(
            &phases(&["Teardown", "Paint", "Assembly", "Electrical", "QC"]),
            &tasks,
            eta(),
        );
        let statuses: Vec<_> = timeline.iter().map(|item| item.status).collect();
        assert_eq!(
            statuses,
            vec![
                TimelineStatus::Complete,
                TimelineStatus::Hold,
                TimelineStatus::Active,
                TimelineStatus::Planned,
                TimelineStatus::Planned,
            ]
        );
        assert_eq!(timeline[2].eta, eta());
        assert!(timeline
            .iter()
            .filter(|item| item.status != TimelineStatus::Active)
            .all(|item| item.eta.is_none()));
    }

    #[test]
    fn timeline_falls_back_to_task_phases() {
        let tasks = vec![
            task("Paint", "IN_PROGRESS"),
            Task {
                phase: None,
                status: Some("NOT_STARTED"),
                started_at: None,
            },
            task("Paint", "DONE"),
        ];
        let timeline = build_phase_timeline(&[], &tasks, None);
        let names: Vec<_> = timeline.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Paint", "Unassigned"]);
        assert_eq!(timeline[0].status, TimelineStatus::Active);
        assert_eq!(timeline[1].status, TimelineStatus::Planned);
    }

    #[test]
    fn focus_phase_prefers_in_progress_task() {
        let tasks = vec![task("Paint", "PAUSED"), task("Carbon", "IN_PROGRESS")];
        let events = vec![Event("RESUME", Some("Paint"))];
        assert_eq!(current_focus_phase(&tasks, &events), "Carbon");
    }

    #[test]
    fn focus_phase_falls_back_to_events_then_default() {
        let tasks = vec![task("Paint", "PAUSED")];
        let events = vec![Event("BLOCK", Some("QC")), Event("RESUME", Some("Paint"))];
        assert_eq!(current_focus_phase(&tasks, &events), "Paint");
        assert_eq!(
            current_focus_phase(&tasks, &Vec::<Event>::new()),
            NOT_STARTED_PHASE
        );
    }

    #[test]
    fn summary_of_active_phase() {
        let early = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap();
        let tasks = vec![
            task("Teardown", "DONE"),
            Task {
                phase: Some("Paint"),
                status: Some("IN_PROGRESS"),
                started_at: Some(later),
            },
            Task {
                phase: Some("Paint"),
                status: Some("DONE"),
                started_at: Some(early),
            },
            task("Paint", "NOT_STARTED"),
        ];
        let summary = summarize_phase(&tasks, &phases(&["Teardown", "Paint"]), eta());
        assert_eq!(summary.name, "Paint");
        assert_eq!(summary.status, PhaseSummaryStatus::Active);
        assert_eq!(summary.progress_pct, 33);
        assert_eq!(summary.started_at, Some(early));
        assert_eq!(summary.blockers, 0);
        assert_eq!(summary.eta, eta());
    }

    #[test]
    fn summary_reports_hold_with_blockers() {
        let tasks = vec![task("Paint", "BLOCKED"), task("Paint", "DONE")];
        let summary = summarize_phase(&tasks, &[], None);
        assert_eq!(summary.status, PhaseSummaryStatus::Hold);
        assert_eq!(summary.blockers, 1);
        assert_eq!(summary.progress_pct, 50);
    }

    #[test]
    fn summary_without_tasks_uses_first_phase() {
        let summary = summarize_phase(&Vec::<Task>::new(), &phases(&["Teardown"]), None);
        assert_eq!(summary.name, "Teardown");
        assert_eq!(summary.status, PhaseSummaryStatus::Complete);
        assert_eq!(summary.progress_pct, 0);

        let summary = summarize_phase(&Vec::<Task>::new(), &[], None);
        assert_eq!(summary.name, UNASSIGNED_PHASE);
    }
}
