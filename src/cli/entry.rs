//! Commands that change the pit: immerse, extract, update, log, import.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use jiff::SignedDuration;
use uuid::Uuid;

use pit::config::Config;
use pit::discovery::{self, DiscoveryResults};
use pit::{
    AuditEvent, Category, ImmerseOptions, Level, OfflineLookup, Pit, Source, Status,
    WorkflowUpdate,
};

use super::format::short_id;
use super::resolve_entry;

#[derive(Debug, Args)]
pub struct ImmerseArgs {
    /// Starting priority, higher is more urgent. Defaults to 1.
    #[arg(long, allow_negative_numbers = true)]
    priority: Option<i64>,

    /// How the repository was found: discovered, manual, programmatic.
    #[arg(long)]
    source: Option<Source>,

    /// Tag to attach. Can be specified multiple times.
    #[arg(long = "tag")]
    tags: Vec<String>,

    #[arg(long)]
    notes: Option<String>,

    /// cli-tool, library, framework, application, or other.
    #[arg(long)]
    category: Option<Category>,

    #[arg(long)]
    assignee: Option<String>,
}

impl ImmerseArgs {
    fn to_options(&self) -> ImmerseOptions {
        ImmerseOptions {
            priority: self.priority,
            source: self.source,
            tags: self.tags.iter().cloned().collect(),
            notes: self.notes.clone(),
            category: self.category,
            assignee: self.assignee.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// pending, analyzing, modernizing, community-building, completed,
    /// failed, or paused.
    #[arg(long)]
    status: Option<Status>,

    #[arg(long, allow_negative_numbers = true)]
    priority: Option<i64>,

    /// Percent complete, 0-100.
    #[arg(long)]
    progress: Option<u8>,

    /// Estimated effort, e.g. `3h`, `2h 30m`, or `PT90M`.
    #[arg(long)]
    estimate: Option<SignedDuration>,

    /// Effort actually spent.
    #[arg(long)]
    actual: Option<SignedDuration>,

    /// Replaces the issue list. Can be specified multiple times.
    #[arg(long = "issue")]
    issues: Vec<String>,

    /// Empty the issue list.
    #[arg(long, conflicts_with = "issues")]
    clear_issues: bool,

    /// Let progress move backwards, e.g. when re-running a phase.
    #[arg(long)]
    retry: bool,
}

impl UpdateArgs {
    fn to_update(&self) -> WorkflowUpdate {
        let issues = if self.clear_issues {
            Some(Vec::new())
        } else if self.issues.is_empty() {
            None
        } else {
            Some(self.issues.clone())
        };

        WorkflowUpdate {
            status: self.status,
            priority: self.priority,
            progress: self.progress,
            estimated_duration: self.estimate,
            actual_duration: self.actual,
            issues,
            retry: self.retry,
            ..WorkflowUpdate::default()
        }
    }
}

/// CLI-facing audit level, mapped to the domain `Level`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Info,
    Warn,
    Error,
    Success,
}

impl LevelArg {
    fn to_domain(self) -> Level {
        match self {
            Self::Info => Level::Info,
            Self::Warn => Level::Warn,
            Self::Error => Level::Error,
            Self::Success => Level::Success,
        }
    }
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Discovery results JSON file.
    file: PathBuf,

    /// Skip repositories with fewer stars. Defaults to 10.
    #[arg(long)]
    min_stars: Option<u64>,

    /// Skip repositories scoring below this revival potential.
    #[arg(long)]
    min_revival: Option<f64>,

    /// Skip repositories scoring above this abandonment score.
    #[arg(long)]
    max_abandonment: Option<f64>,

    /// Also import repositories with no primary language.
    #[arg(long)]
    allow_no_language: bool,

    /// Tag every imported entry. Can be specified multiple times.
    #[arg(long = "tag")]
    tags: Vec<String>,
}

pub(super) fn cmd_immerse(pit: &Pit, full_name: &str, args: &ImmerseArgs) -> Result<(), String> {
    let id = pit
        .immerse_by_name(full_name, &OfflineLookup, args.to_options())
        .map_err(|e| format!("failed to immerse {full_name}: {e}"))?;

    println!("{id}");
    Ok(())
}

pub(super) fn cmd_extract(pit: &Pit, reference: &str) -> Result<(), String> {
    // A full UUID is extracted directly so repeating the command is harmless.
    let id = match reference.parse::<Uuid>() {
        Ok(id) => id,
        Err(_) => resolve_entry(pit, reference)?.id,
    };

    let removed = pit
        .extract(id)
        .map_err(|e| format!("failed to extract {}: {e}", short_id(id)))?;

    if removed {
        eprintln!("Extracted {}", short_id(id));
    } else {
        eprintln!("No entry {}, nothing to extract", short_id(id));
    }
    Ok(())
}

pub(super) fn cmd_update(pit: &Pit, reference: &str, args: &UpdateArgs) -> Result<(), String> {
    let update = args.to_update();
    if update == WorkflowUpdate::default() {
        return Err("nothing to update: pass at least one of --status, --priority, \
                    --progress, --estimate, --actual, --issue, --clear-issues"
            .to_string());
    }

    let entry = resolve_entry(pit, reference)?;
    let short = short_id(entry.id);
    if !pit
        .update_workflow(entry.id, &update)
        .map_err(|e| format!("failed to update {short}: {e}"))?
    {
        return Err(format!("entry {short} disappeared before it could be updated"));
    }

    match update.status {
        Some(status) if status != entry.workflow.status => {
            eprintln!("{short}: {} → {status}", entry.workflow.status);
        }
        _ => eprintln!("{short} updated"),
    }
    Ok(())
}

pub(super) fn cmd_log(
    pit: &Pit,
    reference: &str,
    message: &str,
    level: LevelArg,
) -> Result<(), String> {
    let entry = resolve_entry(pit, reference)?;
    let short = short_id(entry.id);
    let event = AuditEvent::new(level.to_domain(), message);

    if !pit
        .log(entry.id, event)
        .map_err(|e| format!("failed to log to {short}: {e}"))?
    {
        return Err(format!("entry {short} disappeared before it could be logged to"));
    }
    Ok(())
}

pub(super) fn cmd_import(pit: &Pit, config: &Config, args: &ImportArgs) -> Result<(), String> {
    let results = DiscoveryResults::load(&args.file)
        .map_err(|e| format!("failed to read {}: {e}", args.file.display()))?;

    let mut criteria = config.import.criteria();
    if let Some(n) = args.min_stars {
        criteria.min_stars = n;
    }
    if args.min_revival.is_some() {
        criteria.min_revival_potential = args.min_revival;
    }
    if args.max_abandonment.is_some() {
        criteria.max_abandonment_score = args.max_abandonment;
    }
    if args.allow_no_language {
        criteria.require_language = false;
    }

    let options = ImmerseOptions {
        tags: args.tags.iter().cloned().collect(),
        ..ImmerseOptions::default()
    };

    let report = discovery::import(pit, results, &criteria, &options)
        .map_err(|e| format!("import failed, nothing was added: {e}"))?;

    for (name, id) in &report.imported {
        println!("{}  {name}", short_id(*id));
    }
    for (name, reason) in &report.skipped {
        eprintln!("skipped {name}: {reason}");
    }
    eprintln!(
        "Imported {}, skipped {}",
        report.imported.len(),
        report.skipped.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    #[derive(Debug, Parser)]
    struct UpdateHarness {
        #[command(flatten)]
        update: UpdateArgs,
    }

    #[derive(Debug, Parser)]
    struct ImmerseHarness {
        #[command(flatten)]
        options: ImmerseArgs,
    }

    fn parse_update(args: &[&str]) -> WorkflowUpdate {
        let argv = std::iter::once("update").chain(args.iter().copied());
        UpdateHarness::try_parse_from(argv).unwrap().update.to_update()
    }

    #[test]
    fn update_flags_map_to_workflow_update() {
        let update = parse_update(&[
            "--status",
            "community-building",
            "--progress",
            "60",
            "--estimate",
            "2h 30m",
            "--issue",
            "ci broken",
            "--issue",
            "no license",
            "--retry",
        ]);

        assert_eq!(update.status, Some(Status::CommunityBuilding));
        assert_eq!(update.progress, Some(60));
        assert_eq!(update.estimated_duration, Some(SignedDuration::from_mins(150)));
        assert_eq!(
            update.issues.as_deref(),
            Some(&["ci broken".to_string(), "no license".to_string()][..])
        );
        assert!(update.retry);
        assert_eq!(update.priority, None);
    }

    #[test]
    fn empty_update_is_default() {
        assert_eq!(parse_update(&[]), WorkflowUpdate::default());
    }

    #[test]
    fn clear_issues_sends_empty_list() {
        assert_eq!(parse_update(&["--clear-issues"]).issues, Some(vec![]));
    }

    #[test]
    fn negative_priority_is_accepted() {
        assert_eq!(parse_update(&["--priority", "-5"]).priority, Some(-5));
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(UpdateHarness::try_parse_from(["update", "--status", "done"]).is_err());
    }

    #[test]
    fn immerse_flags_map_to_options() {
        let harness = ImmerseHarness::try_parse_from([
            "immerse",
            "--source",
            "programmatic",
            "--category",
            "library",
            "--tag",
            "js",
            "--tag",
            "js",
        ])
        .unwrap();
        let options = harness.options.to_options();

        assert_eq!(options.source, Some(Source::Programmatic));
        assert_eq!(options.category, Some(Category::Library));
        assert_eq!(options.tags.len(), 1);
        assert_eq!(options.priority, None);
    }
}
