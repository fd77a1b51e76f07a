//! Repository metadata lookup.
//!
//! Immersing by name needs a [`RepositorySummary`]. Where it comes from is
//! the caller's business: a host API client, a cache, or [`OfflineLookup`].

use jiff::Timestamp;

use crate::model::RepositorySummary;

/// A lookup that could not produce metadata for a repository.
#[derive(Debug, Clone, thiserror::Error)]
#[error("could not look up {name}: {reason}")]
pub struct LookupError {
    pub name: String,
    pub reason: String,
}

/// Resolves `owner/name` into repository metadata.
pub trait RepositoryLookup {
    fn summarize(&self, full_name: &str) -> Result<RepositorySummary, LookupError>;
}

/// Builds a placeholder summary from the name alone, without network access.
///
/// Counts are zero, the language is unknown, and both timestamps are the
/// time of the lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookup;

impl RepositoryLookup for OfflineLookup {
    fn summarize(&self, full_name: &str) -> Result<RepositorySummary, LookupError> {
        let full_name = full_name.trim();
        let now = Timestamp::now();
        Ok(RepositorySummary {
            full_name: full_name.to_string(),
            url: format!("https://github.com/{full_name}"),
            description: None,
            language: None,
            stars: 0,
            forks: 0,
            open_issues: 0,
            pushed_at: now,
            created_at: now,
        })
    }
}
