//! Output formatting for CLI display.

use jiff::SignedDuration;
use uuid::Uuid;

use pit::model::AuditRecord;
use pit::{Entry, Stats};

/// First eight hex digits of an ID, enough to pass back as a prefix.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

/// One line per entry, for `list` and `next`.
pub(super) fn format_row(entry: &Entry) -> String {
    let wf = &entry.workflow;
    format!(
        "{}  [{}] p{} {:>3}%  {}",
        short_id(entry.id),
        wf.status,
        wf.priority,
        wf.progress,
        entry.full_name()
    )
}

pub(super) fn format_duration(duration: SignedDuration) -> String {
    let minutes = duration.as_secs() / 60;
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

pub(super) fn format_record(record: &AuditRecord) -> String {
    format!(
        "{}  {:<7}  {}",
        record.timestamp.strftime("%Y-%m-%d %H:%M:%S"),
        record.level.to_string(),
        record.message
    )
}

/// Full detail view for `show`.
pub(super) fn format_entry(entry: &Entry) -> String {
    let repo = &entry.repository;
    let wf = &entry.workflow;
    let meta = &entry.metadata;

    let mut lines = vec![
        format!("{}  {}", entry.id, repo.full_name),
        format!("  url:       {}", repo.url),
    ];
    if let Some(description) = &repo.description {
        lines.push(format!("  about:     {description}"));
    }
    lines.push(format!(
        "  language:  {}  stars: {}  forks: {}  open issues: {}",
        repo.language_or_unknown(),
        repo.stars,
        repo.forks,
        repo.open_issues
    ));
    lines.push(format!("  status:    {}", wf.status));
    if let Some(from) = wf.paused_from {
        lines.push(format!("  paused in: {from}"));
    }
    lines.push(format!("  priority:  {}", wf.priority));
    lines.push(format!("  progress:  {}%", wf.progress));
    lines.push(format!("  added:     {}", wf.added_at));
    if let Some(at) = wf.started_at {
        lines.push(format!("  started:   {at}"));
    }
    if let Some(at) = wf.completed_at {
        lines.push(format!("  completed: {at}"));
    }
    if let Some(d) = wf.estimated_duration {
        lines.push(format!("  estimate:  {}", format_duration(d)));
    }
    if let Some(d) = wf.actual_duration {
        lines.push(format!("  actual:    {}", format_duration(d)));
    }
    lines.push(format!(
        "  source:    {}  category: {}",
        meta.source, meta.category
    ));
    if !meta.tags.is_empty() {
        let tags: Vec<&str> = meta.tags.iter().map(String::as_str).collect();
        lines.push(format!("  tags:      {}", tags.join(", ")));
    }
    if let Some(assignee) = &meta.assignee {
        lines.push(format!("  assignee:  {assignee}"));
    }
    if !meta.notes.is_empty() {
        lines.push(format!("  notes:     {}", meta.notes));
    }
    if let Some(analysis) = &entry.analysis {
        lines.push(format!(
            "  analysis:  abandonment {:.0}, revival {:.0}, inactive {:.0} days",
            analysis.abandonment_score, analysis.revival_potential, analysis.inactivity_days
        ));
        lines.extend(analysis.reasons.iter().map(|r| format!("    - {r}")));
    }
    lines.extend(wf.issues.iter().map(|i| format!("  issue:     {i}")));

    lines.push(String::new());
    lines.push(format!("Log ({}):", wf.log.len()));
    lines.extend(wf.log.iter().map(|r| format!("  {}", format_record(r))));

    lines.join("\n") + "\n"
}

fn format_counts<'a>(
    title: &str,
    counts: impl IntoIterator<Item = (&'a str, usize)>,
) -> Vec<String> {
    let mut lines = vec![String::new(), format!("{title}:")];
    lines.extend(counts.into_iter().map(|(key, n)| format!("  {key:<20} {n}")));
    lines
}

pub(super) fn format_stats(stats: &Stats) -> String {
    let mut lines = vec![format!("Entries: {}", stats.total)];

    lines.extend(format_counts(
        "By status",
        stats.by_status.iter().map(|(s, n)| (s.as_str(), *n)),
    ));
    lines.extend(format_counts(
        "By source",
        stats.by_source.iter().map(|(s, n)| (s.as_str(), *n)),
    ));
    if !stats.by_language.is_empty() {
        lines.extend(format_counts(
            "By language",
            stats.by_language.iter().map(|(l, n)| (l.as_str(), *n)),
        ));
    }

    lines.extend([
        String::new(),
        format!("Average priority: {:.1}", stats.avg_priority),
        format!("Average progress: {:.1}%", stats.avg_progress),
        format!("Success rate:     {:.1}%", stats.success_rate),
        format!("Estimated:        {}", format_duration(stats.total_estimated)),
        format!("Actual:           {}", format_duration(stats.total_actual)),
    ]);

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;

    use jiff::Timestamp;
    use pit::model::{Metadata, RepositorySummary, Workflow};
    use pit::{Category, Source, Status};

    fn entry() -> Entry {
        let id: Uuid = "a3b0fc12-0000-4000-8000-000000000000".parse().unwrap();
        let mut workflow = Workflow::new(42, Timestamp::UNIX_EPOCH);
        workflow.status = Status::CommunityBuilding;
        workflow.progress = 7;
        Entry {
            id,
            repository: RepositorySummary {
                full_name: "octo/old-cli".into(),
                url: "https://github.com/octo/old-cli".into(),
                description: Some("A command line tool".into()),
                language: None,
                stars: 12,
                forks: 3,
                open_issues: 1,
                pushed_at: Timestamp::UNIX_EPOCH,
                created_at: Timestamp::UNIX_EPOCH,
            },
            analysis: None,
            workflow,
            metadata: Metadata {
                source: Source::Manual,
                tags: BTreeSet::from(["js".to_string(), "cli".to_string()]),
                notes: String::new(),
                assignee: None,
                category: Category::CliTool,
            },
        }
    }

    #[test]
    fn short_id_is_eight_chars() {
        assert_eq!(short_id(entry().id), "a3b0fc12");
    }

    #[test]
    fn row_shows_status_priority_progress() {
        assert_eq!(
            format_row(&entry()),
            "a3b0fc12  [community-building] p42   7%  octo/old-cli"
        );
    }

    #[test]
    fn durations_render_hours_and_minutes() {
        let cases = [
            (SignedDuration::ZERO, "0m"),
            (SignedDuration::from_mins(45), "45m"),
            (SignedDuration::from_hours(3), "3h"),
            (SignedDuration::from_mins(150), "2h 30m"),
        ];
        for (duration, expected) in cases {
            assert_eq!(format_duration(duration), expected);
        }
    }

    #[test]
    fn detail_view_lists_tags_sorted() {
        let text = format_entry(&entry());
        assert!(text.contains("tags:      cli, js"), "{text}");
        assert!(text.contains("language:  unknown"), "{text}");
        assert!(text.contains("Log (0):"), "{text}");
        assert!(text.ends_with("Log (0):\n"), "{text}");
    }

    #[test]
    fn stats_view_includes_every_status() {
        let text = format_stats(&pit::stats::compute_stats(&[entry()]));
        for status in Status::ALL {
            assert!(text.contains(status.as_str()), "missing {status}: {text}");
        }
        assert!(text.contains("Average priority: 42.0"), "{text}");
        let language = format!("\nBy language:\n  {:<20} 1\n", "unknown");
        assert!(text.contains(&language), "{text}");
    }
}
