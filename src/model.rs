//! Core data model for the pit.
//!
//! An [`Entry`] pairs an immutable repository snapshot with mutable
//! [`Workflow`] state, free-form [`Metadata`], and an append-only
//! [`AuditLog`].

mod audit;
mod entry;
mod metadata;
mod repository;
mod workflow;

pub use audit::{AuditEvent, AuditLog, AuditRecord, Level};
pub use entry::Entry;
pub use metadata::{Category, Metadata, Source};
pub use repository::{DiscoveryRecord, RepositorySummary, SourceAnalysis};
pub use workflow::{Status, Workflow, WorkflowUpdate};

/// Input rejected before any state was touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("repository full name must not be empty")]
    EmptyFullName,

    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("progress must be between 0 and 100, got {0}")]
    ProgressOutOfRange(u8),

    #[error("progress cannot go from {from} back to {to} without a retry")]
    ProgressRegressed { from: u8, to: u8 },

    #[error("{0} must not be negative")]
    NegativeDuration(&'static str),

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },
}

impl ValidationError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}
