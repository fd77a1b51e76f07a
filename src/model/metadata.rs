//! Free-form entry metadata: where an entry came from and how it is labelled.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{RepositorySummary, ValidationError};

/// Caller-owned labels attached to an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub source: Source,
    pub tags: BTreeSet<String>,
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    pub category: Category,
}

/// How an entry entered the pit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    /// Scored and handed over by a discovery run.
    Discovered,
    /// Added by hand.
    Manual,
    /// Added by another program through the library.
    Programmatic,
}

impl Source {
    pub const ALL: [Self; 3] = [Self::Discovered, Self::Manual, Self::Programmatic];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Manual => "manual",
            Self::Programmatic => "programmatic",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::unknown("source", s))
    }
}

/// Rough kind of project a repository is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    CliTool,
    Library,
    Framework,
    Application,
    Other,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::CliTool,
        Self::Library,
        Self::Framework,
        Self::Application,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CliTool => "cli-tool",
            Self::Library => "library",
            Self::Framework => "framework",
            Self::Application => "application",
            Self::Other => "other",
        }
    }

    /// Guesses a category from the repository name and description.
    ///
    /// First match wins, checked in declaration order.
    pub fn infer(repository: &RepositorySummary) -> Self {
        let name = repository.full_name.to_lowercase();
        let description = repository
            .description
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        if name.contains("cli") || description.contains("command line") {
            Self::CliTool
        } else if name.contains("lib") || description.contains("library") {
            Self::Library
        } else if name.contains("framework") || description.contains("framework") {
            Self::Framework
        } else if name.contains("app") || description.contains("application") {
            Self::Application
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| ValidationError::unknown("category", s))
    }
}
