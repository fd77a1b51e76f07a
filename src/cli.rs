//! CLI interface for the pit.
//!
//! Each subcommand is non-interactive: arguments in, text or JSON out.
//! Commands that read print to stdout; confirmations go to stderr.
//!
//! Entry IDs take a full UUID or an unambiguous prefix (e.g. `a3b`).

mod entry;
mod format;
mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use pit::config::Config;
use pit::{Entry, Pit};

use entry::{ImmerseArgs, ImportArgs, LevelArg, UpdateArgs};
use view::ListArgs;

/// Pit: a queue of repositories waiting to be revived.
#[derive(Debug, Parser)]
#[command(name = "pit", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Backing file. Falls back to `PIT_FILE`, then `pit-file` in
    /// `~/.pit/config.toml`, then `~/.pit/pit.json`.
    #[arg(long, global = true)]
    pub pit: Option<PathBuf>,

    /// Log debug output to stderr. `RUST_LOG` takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: reviving a repository
  1. pit import results.json
     → immerses every qualifying repository from a discovery run
  2. pit next
     → prints the highest-priority pending entry (e.g. a3b0fc12)
  3. pit update a3b --status analyzing --estimate "3h"
  4. pit log a3b "dependency audit done" --level success
  5. pit update a3b --status modernizing --progress 40

Inspect:
  pit list --status pending --language rust --sort stars
  pit show a3b --json
  pit stats"#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add a repository by full name (`owner/repo`). Prints the entry ID.
    Immerse {
        full_name: String,

        #[command(flatten)]
        options: ImmerseArgs,
    },

    /// Remove an entry. Succeeds quietly if it is already gone.
    Extract {
        /// Entry ID: full UUID or unambiguous prefix.
        id: String,
    },

    /// List entries matching every given filter.
    List(ListArgs),

    /// Show one entry with its audit log.
    Show {
        /// Entry ID: full UUID or unambiguous prefix.
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Show the highest-priority pending entry.
    Next {
        #[arg(long)]
        json: bool,
    },

    /// Change workflow state: status, priority, progress, durations, issues.
    ///
    /// Status changes are recorded in the audit log.
    Update {
        /// Entry ID: full UUID or unambiguous prefix.
        id: String,

        #[command(flatten)]
        update: UpdateArgs,
    },

    /// Append a record to an entry's audit log.
    Log {
        /// Entry ID: full UUID or unambiguous prefix.
        id: String,

        message: String,

        #[arg(long, value_enum, default_value_t = LevelArg::Info)]
        level: LevelArg,
    },

    /// Summarize the whole pit.
    Stats {
        #[arg(long)]
        json: bool,
    },

    /// Immerse qualifying repositories from a discovery results file.
    Import(ImportArgs),
}

/// Run a parsed command, returning an error message on failure.
pub fn run(command: Command, config: &Config, pit: &Pit) -> Result<(), String> {
    match command {
        Command::Immerse { full_name, options } => entry::cmd_immerse(pit, &full_name, &options),
        Command::Extract { id } => entry::cmd_extract(pit, &id),
        Command::List(args) => view::cmd_list(pit, &args),
        Command::Show { id, json } => view::cmd_show(pit, &id, json),
        Command::Next { json } => view::cmd_next(pit, json),
        Command::Update { id, update } => entry::cmd_update(pit, &id, &update),
        Command::Log { id, message, level } => entry::cmd_log(pit, &id, &message, level),
        Command::Stats { json } => view::cmd_stats(pit, json),
        Command::Import(args) => entry::cmd_import(pit, config, &args),
    }
}

/// Resolve an entry reference (full UUID or unambiguous prefix) to an entry.
fn resolve_entry(pit: &Pit, reference: &str) -> Result<Entry, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return pit
            .get(id)
            .ok_or_else(|| format!("no entry with id {id}"));
    }

    let reference = reference.to_lowercase();
    let mut matches: Vec<Entry> = pit
        .all()
        .into_iter()
        .filter(|e| e.id.to_string().starts_with(&reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no entry matching '{reference}'")),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<String> = matches.iter().map(|e| format::short_id(e.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous, matches {n} entries: {}",
                ids.join(", ")
            ))
        }
    }
}
