//! Priority scheduling: which entry to work on next, and how urgent a new
//! entry starts out.

use crate::model::{Entry, RepositorySummary, SourceAnalysis, Status};
use crate::query::{self, Query, SortKey, SortOrder};

/// Priority for entries immersed without discovery scoring or an explicit
/// priority.
pub const DEFAULT_PRIORITY: i64 = 1;

/// The highest-priority pending entry, if any.
///
/// Ties go to the entry immersed first.
pub fn next_pending(entries: &[Entry]) -> Option<Entry> {
    let query = Query::new()
        .status(Status::Pending)
        .sort(SortKey::Priority, SortOrder::Descending)
        .page(0, 1);
    query::evaluate(entries, &query).into_iter().next()
}

/// Starting priority for a new entry.
///
/// Weighted blend of discovery signals, each scaled to 0-100:
///
/// | weight | signal                              |
/// |--------|-------------------------------------|
/// | 0.4    | revival potential                   |
/// | 0.3    | 100 - abandonment score             |
/// | 0.2    | stars, saturating at 1000           |
/// | 0.1    | days inactive, saturating at 365    |
///
/// Falls back to [`DEFAULT_PRIORITY`] without an analysis.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn default_priority(repository: &RepositorySummary, analysis: Option<&SourceAnalysis>) -> i64 {
    let Some(analysis) = analysis else {
        return DEFAULT_PRIORITY;
    };

    let stars = repository.stars as f64;
    let star_score = (stars / 1000.0 * 100.0).min(100.0);
    let age_score = (analysis.inactivity_days / 365.0 * 100.0).min(100.0);

    let weighted = 0.4 * analysis.revival_potential
        + 0.3 * (100.0 - analysis.abandonment_score)
        + 0.2 * star_score
        + 0.1 * age_score;

    // Saturating float-to-int cast; NaN maps to zero.
    weighted.round() as i64
}
