//! Entry: one tracked repository candidate.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Metadata, RepositorySummary, SourceAnalysis, ValidationError, Workflow};

/// A repository queued for revival, with its workflow state and audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Assigned at immersion, never changes.
    pub id: Uuid,

    /// Snapshot of the repository when it was immersed.
    pub repository: RepositorySummary,

    /// Discovery scoring, when the entry came from a discovery run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<SourceAnalysis>,

    pub workflow: Workflow,

    pub metadata: Metadata,
}

impl Entry {
    /// Builds an entry, rejecting a missing repository identity.
    pub fn new(
        id: Uuid,
        repository: RepositorySummary,
        analysis: Option<SourceAnalysis>,
        workflow: Workflow,
        metadata: Metadata,
    ) -> Result<Self, ValidationError> {
        let entry = Self {
            id,
            repository,
            analysis,
            workflow,
            metadata,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Checks the invariants that hold for every stored entry.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.repository.full_name.trim().is_empty() {
            return Err(ValidationError::EmptyFullName);
        }
        if self.workflow.progress > 100 {
            return Err(ValidationError::ProgressOutOfRange(self.workflow.progress));
        }
        Ok(())
    }

    pub fn full_name(&self) -> &str {
        &self.repository.full_name
    }
}
