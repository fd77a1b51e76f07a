//! Workflow state: the only mutable part of an entry.

use std::fmt;
use std::str::FromStr;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use super::{AuditEvent, AuditLog, ValidationError};

/// Where an entry stands in the revival pipeline.
///
/// ```text
/// pending → analyzing → modernizing → community-building → completed
/// ```
///
/// `failed` and `paused` are reachable from any non-terminal state. A paused
/// entry resumes to the state it paused from. `completed` and `failed` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Pending,
    Analyzing,
    Modernizing,
    CommunityBuilding,
    Completed,
    Failed,
    Paused,
}

impl Status {
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Analyzing,
        Self::Modernizing,
        Self::CommunityBuilding,
        Self::Completed,
        Self::Failed,
        Self::Paused,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzing => "analyzing",
            Self::Modernizing => "modernizing",
            Self::CommunityBuilding => "community-building",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Paused => "paused",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// The pipeline phase that follows this one.
    fn next_phase(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Analyzing),
            Self::Analyzing => Some(Self::Modernizing),
            Self::Modernizing => Some(Self::CommunityBuilding),
            Self::CommunityBuilding => Some(Self::Completed),
            Self::Completed | Self::Failed | Self::Paused => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::unknown("status", s))
    }
}

/// Mutable workflow state of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    /// Higher is more urgent. Any integer is allowed.
    pub priority: i64,
    pub status: Status,
    /// The state a paused entry resumes to. Set only while paused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused_from: Option<Status>,
    /// Percent complete, 0-100.
    pub progress: u8,
    pub added_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<SignedDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<SignedDuration>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub log: AuditLog,
}

/// A partial change to a [`Workflow`]. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<SignedDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_duration: Option<SignedDuration>,
    /// Replaces the issue list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
    /// Lets `progress` move backwards within the same status, e.g. when a
    /// phase is re-run.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retry: bool,
}

impl Workflow {
    /// Fresh workflow state for a newly immersed entry.
    pub fn new(priority: i64, now: Timestamp) -> Self {
        Self {
            priority,
            status: Status::Pending,
            paused_from: None,
            progress: 0,
            added_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            estimated_duration: None,
            actual_duration: None,
            issues: Vec::new(),
            log: AuditLog::default(),
        }
    }

    /// Whether the state machine allows moving from the current status to `to`.
    ///
    /// Staying in the current status is not a transition and always allowed.
    pub fn can_transition(&self, to: Status) -> bool {
        let from = self.status;
        if from == to {
            return true;
        }
        if from.is_terminal() {
            return false;
        }
        match to {
            Status::Failed => true,
            Status::Paused => from != Status::Paused,
            _ if from == Status::Paused => self.paused_from == Some(to),
            _ => from.next_phase() == Some(to),
        }
    }

    /// Merges `update` into this workflow and refreshes `updated_at`.
    ///
    /// Everything is validated before anything is assigned, so a rejected
    /// update leaves the workflow untouched. Returns the previous status when
    /// the status changed.
    pub fn apply(
        &mut self,
        update: &WorkflowUpdate,
        now: Timestamp,
    ) -> Result<Option<Status>, ValidationError> {
        let from = self.status;
        let to = update.status.unwrap_or(from);

        if !self.can_transition(to) {
            return Err(ValidationError::InvalidTransition { from, to });
        }
        // Resuming from a pause returns to the same phase, so progress
        // carries over.
        let same_phase = from == to || (from == Status::Paused && self.paused_from == Some(to));
        if let Some(progress) = update.progress {
            if progress > 100 {
                return Err(ValidationError::ProgressOutOfRange(progress));
            }
            if same_phase && progress < self.progress && !update.retry {
                return Err(ValidationError::ProgressRegressed {
                    from: self.progress,
                    to: progress,
                });
            }
        }
        for (field, duration) in [
            ("estimatedDuration", update.estimated_duration),
            ("actualDuration", update.actual_duration),
        ] {
            if duration.is_some_and(|d| d.is_negative()) {
                return Err(ValidationError::NegativeDuration(field));
            }
        }

        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        if let Some(started_at) = update.started_at {
            self.started_at = Some(started_at);
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
        if let Some(estimated) = update.estimated_duration {
            self.estimated_duration = Some(estimated);
        }
        if let Some(actual) = update.actual_duration {
            self.actual_duration = Some(actual);
        }
        if let Some(issues) = &update.issues {
            self.issues.clone_from(issues);
        }
        self.updated_at = now;

        if from == to {
            return Ok(None);
        }

        self.status = to;
        self.paused_from = (to == Status::Paused).then_some(from);
        if to == Status::Analyzing && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        if to.is_terminal() && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        Ok(Some(from))
    }

    /// Appends an audit record and refreshes `updated_at`.
    pub fn record(&mut self, event: AuditEvent, now: Timestamp) {
        self.log.append(event);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> Workflow {
        Workflow::new(10, Timestamp::UNIX_EPOCH)
    }

    fn to(status: Status) -> WorkflowUpdate {
        WorkflowUpdate {
            status: Some(status),
            ..Default::default()
        }
    }

    #[test]
    fn walks_the_pipeline_forward() {
        let mut wf = workflow();
        let now = Timestamp::now();
        for status in [
            Status::Analyzing,
            Status::Modernizing,
            Status::CommunityBuilding,
            Status::Completed,
        ] {
            let previous = wf.status;
            assert_eq!(wf.apply(&to(status), now).unwrap(), Some(previous));
        }
        assert_eq!(wf.status, Status::Completed);
        assert_eq!(wf.started_at, Some(now));
        assert_eq!(wf.completed_at, Some(now));
    }

    #[test]
    fn rejects_skipping_phases() {
        let mut wf = workflow();
        let err = wf.apply(&to(Status::Completed), Timestamp::now()).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidTransition {
                from: Status::Pending,
                to: Status::Completed
            }
        ));
        assert_eq!(wf.status, Status::Pending);
    }

    #[test]
    fn terminal_states_are_final() {
        for terminal in [Status::Completed, Status::Failed] {
            let mut wf = workflow();
            wf.status = terminal;
            for target in Status::ALL.into_iter().filter(|s| *s != terminal) {
                let before = wf.clone();
                assert!(wf.apply(&to(target), Timestamp::now()).is_err());
                assert_eq!(wf, before);
            }
        }
    }

    #[test]
    fn pause_resumes_to_previous_state_only() {
        let mut wf = workflow();
        let now = Timestamp::now();
        wf.apply(&to(Status::Analyzing), now).unwrap();
        wf.apply(&to(Status::Paused), now).unwrap();
        assert_eq!(wf.paused_from, Some(Status::Analyzing));

        assert!(wf.apply(&to(Status::Modernizing), now).is_err());
        assert!(wf.apply(&to(Status::Pending), now).is_err());

        wf.apply(&to(Status::Analyzing), now).unwrap();
        assert_eq!(wf.status, Status::Analyzing);
        assert_eq!(wf.paused_from, None);
    }

    #[test]
    fn failed_is_reachable_from_paused() {
        let mut wf = workflow();
        let now = Timestamp::now();
        wf.apply(&to(Status::Paused), now).unwrap();
        wf.apply(&to(Status::Failed), now).unwrap();
        assert_eq!(wf.status, Status::Failed);
        assert_eq!(wf.completed_at, Some(now));
    }

    #[test]
    fn progress_is_monotonic_unless_retrying() {
        let mut wf = workflow();
        let now = Timestamp::now();
        let progress = |p: u8, retry: bool| WorkflowUpdate {
            progress: Some(p),
            retry,
            ..Default::default()
        };

        wf.apply(&progress(40, false), now).unwrap();
        let err = wf.apply(&progress(20, false), now).unwrap_err();
        assert!(matches!(err, ValidationError::ProgressRegressed { from: 40, to: 20 }));

        wf.apply(&progress(0, true), now).unwrap();
        assert_eq!(wf.progress, 0);
    }

    #[test]
    fn pause_resume_keeps_progress_monotonic() {
        let mut wf = workflow();
        let now = Timestamp::now();
        wf.apply(&to(Status::Analyzing), now).unwrap();
        wf.apply(
            &WorkflowUpdate {
                progress: Some(80),
                ..Default::default()
            },
            now,
        )
        .unwrap();
        wf.apply(&to(Status::Paused), now).unwrap();

        let resume = |retry: bool| WorkflowUpdate {
            status: Some(Status::Analyzing),
            progress: Some(10),
            retry,
            ..Default::default()
        };
        let err = wf.apply(&resume(false), now).unwrap_err();
        assert!(matches!(err, ValidationError::ProgressRegressed { from: 80, to: 10 }));
        assert_eq!(wf.status, Status::Paused);
        assert_eq!(wf.progress, 80);

        assert_eq!(wf.apply(&resume(true), now).unwrap(), Some(Status::Paused));
        assert_eq!(wf.status, Status::Analyzing);
        assert_eq!(wf.progress, 10);
    }

    #[test]
    fn progress_may_reset_on_status_change() {
        let mut wf = workflow();
        let now = Timestamp::now();
        wf.apply(
            &WorkflowUpdate {
                progress: Some(100),
                ..Default::default()
            },
            now,
        )
        .unwrap();
        wf.apply(
            &WorkflowUpdate {
                status: Some(Status::Analyzing),
                progress: Some(0),
                ..Default::default()
            },
            now,
        )
        .unwrap();
        assert_eq!(wf.progress, 0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut wf = workflow();
        let now = Timestamp::now();

        let err = wf
            .apply(
                &WorkflowUpdate {
                    progress: Some(101),
                    ..Default::default()
                },
                now,
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::ProgressOutOfRange(101)));

        let err = wf
            .apply(
                &WorkflowUpdate {
                    estimated_duration: Some(SignedDuration::from_hours(-1)),
                    ..Default::default()
                },
                now,
            )
            .unwrap_err();
        assert!(matches!(err, ValidationError::NegativeDuration("estimatedDuration")));
    }

    #[test]
    fn refreshes_updated_at_on_every_merge() {
        let mut wf = workflow();
        let now = Timestamp::now();
        wf.apply(
            &WorkflowUpdate {
                priority: Some(-5),
                ..Default::default()
            },
            now,
        )
        .unwrap();
        assert_eq!(wf.priority, -5);
        assert_eq!(wf.updated_at, now);
    }

    #[test]
    fn status_parses_kebab_case() {
        assert_eq!(
            "community-building".parse::<Status>().unwrap(),
            Status::CommunityBuilding
        );
        assert!("queued".parse::<Status>().is_err());
    }
}
