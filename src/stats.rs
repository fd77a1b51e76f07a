//! Cross-entry summaries.

use std::collections::BTreeMap;

use jiff::SignedDuration;
use serde::Serialize;

use crate::model::{Entry, Source, Status};

/// Aggregate view over a snapshot of entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    /// Every status is present, zero-filled.
    pub by_status: BTreeMap<Status, usize>,
    /// Every source is present, zero-filled.
    pub by_source: BTreeMap<Source, usize>,
    /// Keyed by language; entries without one count as `"unknown"`.
    pub by_language: BTreeMap<String, usize>,
    pub avg_progress: f64,
    pub avg_priority: f64,
    pub total_estimated: SignedDuration,
    pub total_actual: SignedDuration,
    /// Completed entries as a percentage of all entries.
    pub success_rate: f64,
}

/// Reduces `entries` into [`Stats`]. Averages and rates are zero when empty.
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(entries: &[Entry]) -> Stats {
    let mut by_status: BTreeMap<Status, usize> = Status::ALL.iter().map(|s| (*s, 0)).collect();
    let mut by_source: BTreeMap<Source, usize> = Source::ALL.iter().map(|s| (*s, 0)).collect();
    let mut by_language: BTreeMap<String, usize> = BTreeMap::new();

    let mut progress_sum = 0.0;
    let mut priority_sum = 0.0;
    let mut total_estimated = SignedDuration::ZERO;
    let mut total_actual = SignedDuration::ZERO;

    for entry in entries {
        let wf = &entry.workflow;
        *by_status.entry(wf.status).or_default() += 1;
        *by_source.entry(entry.metadata.source).or_default() += 1;
        *by_language
            .entry(entry.repository.language_or_unknown().to_string())
            .or_default() += 1;

        progress_sum += f64::from(wf.progress);
        priority_sum += wf.priority as f64;
        if let Some(d) = wf.estimated_duration {
            total_estimated = total_estimated.saturating_add(d);
        }
        if let Some(d) = wf.actual_duration {
            total_actual = total_actual.saturating_add(d);
        }
    }

    let total = entries.len();
    let completed = by_status[&Status::Completed];
    let ratio = |n: f64| if total == 0 { 0.0 } else { n / total as f64 };

    Stats {
        total,
        by_status,
        by_source,
        by_language,
        avg_progress: ratio(progress_sum),
        avg_priority: ratio(priority_sum),
        total_estimated,
        total_actual,
        success_rate: ratio(completed as f64) * 100.0,
    }
}
