//! Query engine: filter, sort, and paginate a snapshot of entries.
//!
//! Stateless. Filter dimensions combine with AND; within a dimension any
//! listed value matches. An empty list leaves that dimension unconstrained.

use std::cmp::Ordering;
use std::str::FromStr;

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};

use crate::model::{Category, Entry, Source, Status, ValidationError};

/// What to sort results by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Priority,
    AddedAt,
    Progress,
    /// Entries without an estimate sort as zero.
    EstimatedDuration,
    Stars,
}

impl SortKey {
    pub const ALL: [Self; 5] = [
        Self::Priority,
        Self::AddedAt,
        Self::Progress,
        Self::EstimatedDuration,
        Self::Stars,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::AddedAt => "added-at",
            Self::Progress => "progress",
            Self::EstimatedDuration => "estimated-duration",
            Self::Stars => "stars",
        }
    }

    fn compare(self, a: &Entry, b: &Entry) -> Ordering {
        match self {
            Self::Priority => a.workflow.priority.cmp(&b.workflow.priority),
            Self::AddedAt => a.workflow.added_at.cmp(&b.workflow.added_at),
            Self::Progress => a.workflow.progress.cmp(&b.workflow.progress),
            Self::EstimatedDuration => estimate(a).cmp(&estimate(b)),
            Self::Stars => a.repository.stars.cmp(&b.repository.stars),
        }
    }
}

fn estimate(entry: &Entry) -> SignedDuration {
    entry
        .workflow
        .estimated_duration
        .unwrap_or(SignedDuration::ZERO)
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::unknown("sort key", s))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// A combined filter, sort, and page request.
///
/// The default query matches everything, highest priority first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub statuses: Vec<Status>,
    /// Inclusive lower bound.
    pub priority_min: Option<i64>,
    /// Inclusive upper bound.
    pub priority_max: Option<i64>,
    /// Compared case-insensitively; `"unknown"` matches entries without one.
    pub languages: Vec<String>,
    pub sources: Vec<Source>,
    /// Matches entries carrying at least one of these tags.
    pub tags: Vec<String>,
    pub categories: Vec<Category>,
    /// Inclusive lower bound on `addedAt`.
    pub added_from: Option<Timestamp>,
    /// Inclusive upper bound on `addedAt`.
    pub added_to: Option<Timestamp>,
    /// Case-insensitive substring of full name, description, or notes.
    pub search: Option<String>,
    pub sort_by: SortKey,
    pub order: SortOrder,
    pub offset: usize,
    /// `None` returns everything after `offset`.
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.statuses.push(status);
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn sort(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.order = order;
        self
    }

    #[must_use]
    pub fn page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = Some(limit);
        self
    }

    /// Whether `entry` passes every filter dimension.
    pub fn matches(&self, entry: &Entry) -> bool {
        let wf = &entry.workflow;
        let meta = &entry.metadata;

        if !self.statuses.is_empty() && !self.statuses.contains(&wf.status) {
            return false;
        }
        if self.priority_min.is_some_and(|min| wf.priority < min)
            || self.priority_max.is_some_and(|max| wf.priority > max)
        {
            return false;
        }
        if !self.languages.is_empty() {
            let language = entry.repository.language_or_unknown();
            if !self
                .languages
                .iter()
                .any(|l| l.eq_ignore_ascii_case(language))
            {
                return false;
            }
        }
        if !self.sources.is_empty() && !self.sources.contains(&meta.source) {
            return false;
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| meta.tags.contains(t)) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&meta.category) {
            return false;
        }
        if self.added_from.is_some_and(|from| wf.added_at < from)
            || self.added_to.is_some_and(|to| wf.added_at > to)
        {
            return false;
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.to_lowercase();
            let hit = |haystack: &str| haystack.to_lowercase().contains(&needle);
            if !(hit(&entry.repository.full_name)
                || entry.repository.description.as_deref().is_some_and(hit)
                || hit(&meta.notes))
            {
                return false;
            }
        }
        true
    }
}

/// Runs `query` over `entries`, returning copies of the matching page.
///
/// Sorting is stable: entries that compare equal keep their order in
/// `entries`, which for a pit snapshot is insertion order.
pub fn evaluate(entries: &[Entry], query: &Query) -> Vec<Entry> {
    let mut hits: Vec<&Entry> = entries.iter().filter(|e| query.matches(e)).collect();

    // `sort_by` is a stable merge sort; ties keep their snapshot order.
    hits.sort_by(|a, b| {
        let ordering = query.sort_by.compare(a, b);
        match query.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });

    hits.into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}
