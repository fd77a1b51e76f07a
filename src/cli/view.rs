//! Read-only commands: list, show, next, stats.

use clap::Args;
use jiff::Timestamp;
use serde::Serialize;

use pit::{Category, Pit, Query, SortKey, SortOrder, Source, Status};

use super::format::{format_entry, format_row, format_stats};
use super::resolve_entry;

/// Filters combine with AND; repeating a filter matches any of its values.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Status to include. Can be specified multiple times.
    #[arg(long)]
    status: Vec<Status>,

    /// Inclusive lower bound on priority.
    #[arg(long, allow_negative_numbers = true)]
    min_priority: Option<i64>,

    /// Inclusive upper bound on priority.
    #[arg(long, allow_negative_numbers = true)]
    max_priority: Option<i64>,

    /// Language, case-insensitive. `unknown` matches entries without one.
    #[arg(long)]
    language: Vec<String>,

    #[arg(long)]
    source: Vec<Source>,

    /// Matches entries with any of the given tags.
    #[arg(long)]
    tag: Vec<String>,

    #[arg(long)]
    category: Vec<Category>,

    /// Immersed at or after this instant (RFC 3339).
    #[arg(long)]
    since: Option<Timestamp>,

    /// Immersed at or before this instant (RFC 3339).
    #[arg(long)]
    until: Option<Timestamp>,

    /// Substring of full name, description, or notes.
    #[arg(long)]
    search: Option<String>,

    /// priority, added-at, progress, estimated-duration, or stars.
    #[arg(long, default_value = "priority")]
    sort: SortKey,

    /// Sort smallest first.
    #[arg(long)]
    ascending: bool,

    #[arg(long, default_value_t = 0)]
    offset: usize,

    #[arg(long)]
    limit: Option<usize>,

    #[arg(long)]
    json: bool,
}

impl ListArgs {
    fn to_query(&self) -> Query {
        Query {
            statuses: self.status.clone(),
            priority_min: self.min_priority,
            priority_max: self.max_priority,
            languages: self.language.clone(),
            sources: self.source.clone(),
            tags: self.tag.clone(),
            categories: self.category.clone(),
            added_from: self.since,
            added_to: self.until,
            search: self.search.clone(),
            sort_by: self.sort,
            order: if self.ascending {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            },
            offset: self.offset,
            limit: self.limit,
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let json =
        serde_json::to_string_pretty(value).map_err(|e| format!("failed to serialize: {e}"))?;
    println!("{json}");
    Ok(())
}

pub(super) fn cmd_list(pit: &Pit, args: &ListArgs) -> Result<(), String> {
    let entries = pit.query(&args.to_query());

    if args.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        println!("No entries");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_row(entry));
    }
    Ok(())
}

pub(super) fn cmd_show(pit: &Pit, reference: &str, json: bool) -> Result<(), String> {
    let entry = resolve_entry(pit, reference)?;
    if json {
        return print_json(&entry);
    }
    print!("{}", format_entry(&entry));
    Ok(())
}

pub(super) fn cmd_next(pit: &Pit, json: bool) -> Result<(), String> {
    let next = pit.next_pending();
    if json {
        return print_json(&next);
    }
    match next {
        Some(entry) => println!("{}", format_row(&entry)),
        None => println!("No pending entries"),
    }
    Ok(())
}

pub(super) fn cmd_stats(pit: &Pit, json: bool) -> Result<(), String> {
    let stats = pit.stats();
    if json {
        return print_json(&stats);
    }
    print!("{}", format_stats(&stats));
    Ok(())
}
