//! The pit: the authoritative entry collection.
//!
//! All mutations take the write lock, change the in-memory collection,
//! and rewrite the snapshot before releasing it. If the write fails the
//! in-memory change is undone, so memory and disk never drift apart.
//! Readers share the read lock and always see a whole collection.

use std::collections::BTreeSet;

use jiff::Timestamp;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::lookup::{LookupError, RepositoryLookup};
use crate::model::{
    AuditEvent, Category, DiscoveryRecord, Entry, Level, Metadata, RepositorySummary, Source,
    SourceAnalysis, Status, ValidationError, Workflow, WorkflowUpdate,
};
use crate::query::{self, Query};
use crate::schedule;
use crate::stats::{self, Stats};
use crate::storage::{Storage, StorageError};

/// Errors surfaced by pit operations.
///
/// An unknown id is not an error: operations report it as `false` or `None`.
#[derive(Debug, thiserror::Error)]
pub enum PitError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("entry {id} cannot move from {from} to {to}")]
    InvalidTransition { id: Uuid, from: Status, to: Status },

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type Result<T> = core::result::Result<T, PitError>;

/// What to immerse: a bare repository snapshot or a scored discovery record.
#[derive(Debug, Clone)]
pub enum Candidate {
    Repository(RepositorySummary),
    Discovery(DiscoveryRecord),
}

impl From<RepositorySummary> for Candidate {
    fn from(repository: RepositorySummary) -> Self {
        Self::Repository(repository)
    }
}

impl From<DiscoveryRecord> for Candidate {
    fn from(record: DiscoveryRecord) -> Self {
        Self::Discovery(record)
    }
}

/// Optional settings for a new entry.
#[derive(Debug, Clone, Default)]
pub struct ImmerseOptions {
    /// Overrides the computed default priority.
    pub priority: Option<i64>,
    /// Defaults to `discovered` for discovery records, `manual` otherwise.
    pub source: Option<Source>,
    pub tags: BTreeSet<String>,
    pub notes: Option<String>,
    /// Defaults to `other`; batch immersion infers one per repository.
    pub category: Option<Category>,
    pub assignee: Option<String>,
}

/// The entry store.
#[derive(Debug)]
pub struct Pit {
    storage: Storage,
    entries: RwLock<Vec<Entry>>,
}

impl Pit {
    /// Opens the pit backed by `storage`, loading every stored entry.
    ///
    /// A missing pit file opens empty. A pit file that exists but can't be
    /// read is an error; the pit never starts empty over existing data.
    pub fn open(storage: Storage) -> Result<Self> {
        let entries = storage.load_all()?;
        tracing::info!(
            path = %storage.path().display(),
            entries = entries.len(),
            "opened pit"
        );
        Ok(Self {
            storage,
            entries: RwLock::new(entries),
        })
    }

    // ── Mutations ──

    /// Adds a new pending entry and returns its id.
    pub fn immerse(
        &self,
        candidate: impl Into<Candidate>,
        options: ImmerseOptions,
    ) -> Result<Uuid> {
        let candidate = candidate.into();
        let mut entries = self.entries.write();

        let entry = build_entry(fresh_id(&entries), candidate, &options, Timestamp::now())?;
        let id = entry.id;
        let name = entry.repository.full_name.clone();

        entries.push(entry);
        if let Err(e) = self.storage.save_all(&entries) {
            entries.pop();
            tracing::warn!(%id, error = %e, "immerse rolled back");
            return Err(e.into());
        }

        tracing::info!(%id, repository = %name, "immersed");
        Ok(id)
    }

    /// Looks up `full_name` and immerses the result.
    pub fn immerse_by_name(
        &self,
        full_name: &str,
        lookup: &impl RepositoryLookup,
        options: ImmerseOptions,
    ) -> Result<Uuid> {
        if full_name.trim().is_empty() {
            return Err(ValidationError::EmptyFullName.into());
        }
        let repository = lookup.summarize(full_name)?;
        self.immerse(repository, options)
    }

    /// Immerses every record in one write. Either all land or none do.
    ///
    /// Unless `options.category` is set, each entry's category is inferred
    /// from its repository.
    pub fn immerse_batch(
        &self,
        records: Vec<DiscoveryRecord>,
        options: &ImmerseOptions,
    ) -> Result<Vec<Uuid>> {
        let mut entries = self.entries.write();
        let now = Timestamp::now();

        let mut fresh: Vec<Entry> = Vec::with_capacity(records.len());
        for record in records {
            let category = options
                .category
                .unwrap_or_else(|| Category::infer(&record.repository));
            let options = ImmerseOptions {
                category: Some(category),
                ..options.clone()
            };
            let id = loop {
                let id = fresh_id(&entries);
                if fresh.iter().all(|e| e.id != id) {
                    break id;
                }
            };
            fresh.push(build_entry(id, record.into(), &options, now)?);
        }

        let ids: Vec<Uuid> = fresh.iter().map(|e| e.id).collect();
        let previous_len = entries.len();
        entries.extend(fresh);
        if let Err(e) = self.storage.save_all(&entries) {
            entries.truncate(previous_len);
            tracing::warn!(count = ids.len(), error = %e, "batch immerse rolled back");
            return Err(e.into());
        }

        tracing::info!(count = ids.len(), "batch immersed");
        Ok(ids)
    }

    /// Removes an entry. Returns `false` if there was nothing to remove.
    pub fn extract(&self, id: Uuid) -> Result<bool> {
        let mut entries = self.entries.write();
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };

        let removed = entries.remove(index);
        if let Err(e) = self.storage.save_all(&entries) {
            entries.insert(index, removed);
            tracing::warn!(%id, error = %e, "extract rolled back");
            return Err(e.into());
        }

        tracing::info!(%id, repository = %removed.repository.full_name, "extracted");
        Ok(true)
    }

    /// Merges `update` into an entry's workflow.
    ///
    /// Status changes are checked against the state machine and recorded in
    /// the entry's audit log. A move out of `completed` or `failed` is
    /// rejected with [`PitError::InvalidTransition`]. Returns `false` if the
    /// entry doesn't exist.
    pub fn update_workflow(&self, id: Uuid, update: &WorkflowUpdate) -> Result<bool> {
        let mut entries = self.entries.write();
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };

        let before = entries[index].clone();
        let workflow = &mut entries[index].workflow;
        let now = Timestamp::now();
        let changed = workflow.apply(update, now).map_err(|e| match e {
            ValidationError::InvalidTransition { from, to } => {
                PitError::InvalidTransition { id, from, to }
            }
            other => other.into(),
        })?;

        if let Some(from) = changed {
            let to = workflow.status;
            let level = match to {
                Status::Completed => Level::Success,
                Status::Failed => Level::Error,
                _ => Level::Info,
            };
            let event = AuditEvent::new(level, format!("status changed from {from} to {to}"))
                .with_details(serde_json::json!({ "from": from, "to": to, "update": update }));
            workflow.record(event, now);
        }

        if let Err(e) = self.storage.save_all(&entries) {
            entries[index] = before;
            tracing::warn!(%id, error = %e, "workflow update rolled back");
            return Err(e.into());
        }

        if let Some(from) = changed {
            tracing::info!(%id, %from, to = %entries[index].workflow.status, "status changed");
        }
        Ok(true)
    }

    /// Appends an audit event to an entry. Returns `false` if the entry
    /// doesn't exist.
    pub fn log(&self, id: Uuid, event: AuditEvent) -> Result<bool> {
        let mut entries = self.entries.write();
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };

        let before = entries[index].clone();
        entries[index].workflow.record(event, Timestamp::now());
        if let Err(e) = self.storage.save_all(&entries) {
            entries[index] = before;
            tracing::warn!(%id, error = %e, "log append rolled back");
            return Err(e.into());
        }
        Ok(true)
    }

    // ── Reads ──

    pub fn get(&self, id: Uuid) -> Option<Entry> {
        self.entries.read().iter().find(|e| e.id == id).cloned()
    }

    /// A copy of every entry, in insertion order.
    pub fn all(&self) -> Vec<Entry> {
        self.entries.read().clone()
    }

    pub fn query(&self, query: &Query) -> Vec<Entry> {
        query::evaluate(&self.entries.read(), query)
    }

    /// The highest-priority pending entry.
    pub fn next_pending(&self) -> Option<Entry> {
        schedule::next_pending(&self.entries.read())
    }

    pub fn stats(&self) -> Stats {
        stats::compute_stats(&self.entries.read())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// A v4 id not already used by `entries`.
fn fresh_id(entries: &[Entry]) -> Uuid {
    loop {
        let id = Uuid::new_v4();
        if entries.iter().all(|e| e.id != id) {
            return id;
        }
    }
}

fn build_entry(
    id: Uuid,
    candidate: Candidate,
    options: &ImmerseOptions,
    now: Timestamp,
) -> core::result::Result<Entry, ValidationError> {
    let (repository, analysis): (RepositorySummary, Option<SourceAnalysis>) = match candidate {
        Candidate::Repository(repository) => (repository, None),
        Candidate::Discovery(record) => (record.repository, Some(record.analysis)),
    };

    let priority = options
        .priority
        .unwrap_or_else(|| schedule::default_priority(&repository, analysis.as_ref()));
    let source = options.source.unwrap_or(if analysis.is_some() {
        Source::Discovered
    } else {
        Source::Manual
    });

    let mut workflow = Workflow::new(priority, now);
    workflow.log.append(
        AuditEvent::info("immersed in the pit")
            .with_details(serde_json::json!({ "source": source, "priority": priority })),
    );

    Entry::new(
        id,
        repository,
        analysis,
        workflow,
        Metadata {
            source,
            tags: options.tags.clone(),
            notes: options.notes.clone().unwrap_or_default(),
            assignee: options.assignee.clone(),
            category: options.category.unwrap_or(Category::Other),
        },
    )
}
