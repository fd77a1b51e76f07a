//! The pit: a durable, queryable collection of repositories awaiting
//! revival.
//!
//! Each [`Entry`] tracks one repository through the pipeline
//! `pending → analyzing → modernizing → community-building → completed`,
//! with a priority, progress, and an append-only audit log. The whole
//! collection lives in a single JSON file rewritten atomically on every
//! mutation.
//!
//! ```no_run
//! use pit::{ImmerseOptions, Pit, Storage};
//! # fn main() -> pit::Result<()> {
//! let pit = Pit::open(Storage::new("pit.json")?)?;
//! let id = pit.immerse_by_name("octo/old-cli", &pit::OfflineLookup, ImmerseOptions::default())?;
//! assert_eq!(pit.next_pending().map(|e| e.id), Some(id));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod discovery;
pub mod lookup;
pub mod model;
pub mod pit;
pub mod query;
pub mod schedule;
pub mod stats;
pub mod storage;

pub use discovery::{DiscoveryResults, ImportCriteria, ImportReport};
pub use lookup::{LookupError, OfflineLookup, RepositoryLookup};
pub use model::{
    AuditEvent, Category, DiscoveryRecord, Entry, Level, RepositorySummary, Source, SourceAnalysis,
    Status, ValidationError, WorkflowUpdate,
};
pub use pit::{Candidate, ImmerseOptions, Pit, PitError, Result};
pub use query::{Query, SortKey, SortOrder};
pub use stats::Stats;
pub use storage::{Storage, StorageError};
