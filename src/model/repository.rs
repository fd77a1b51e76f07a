//! Repository snapshots and discovery scoring.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Repository metadata captured when an entry is immersed.
///
/// Never mutated afterwards. Field aliases accept the GitHub REST shape so
/// discovery output can be ingested as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    /// `owner/name`.
    #[serde(alias = "full_name")]
    pub full_name: String,

    #[serde(alias = "html_url")]
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Primary language, if the host reported one.
    #[serde(default)]
    pub language: Option<String>,

    #[serde(alias = "stargazers_count")]
    pub stars: u64,

    #[serde(alias = "forks_count")]
    pub forks: u64,

    #[serde(alias = "open_issues_count")]
    pub open_issues: u64,

    #[serde(alias = "pushed_at")]
    pub pushed_at: Timestamp,

    #[serde(alias = "created_at")]
    pub created_at: Timestamp,
}

impl RepositorySummary {
    /// The language bucket used by filters and stats.
    pub fn language_or_unknown(&self) -> &str {
        self.language.as_deref().unwrap_or("unknown")
    }
}

/// Scores and signals produced by an external discovery process.
///
/// Taken as given: the pit never re-derives these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAnalysis {
    /// 0-100, higher means more thoroughly abandoned.
    pub abandonment_score: f64,

    /// 0-100, higher means more worth reviving.
    pub revival_potential: f64,

    /// Days since the last commit.
    #[serde(alias = "lastCommitAge")]
    pub inactivity_days: f64,

    #[serde(default)]
    pub reasons: Vec<String>,

    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// A pre-scored repository handed over by discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRecord {
    pub repository: RepositorySummary,

    #[serde(flatten)]
    pub analysis: SourceAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_record_accepts_github_shape() {
        let json = r#"{
            "repository": {
                "full_name": "octo/sample",
                "name": "sample",
                "owner": { "login": "octo" },
                "html_url": "https://github.com/octo/sample",
                "description": null,
                "language": "TypeScript",
                "stargazers_count": 1200,
                "forks_count": 40,
                "open_issues_count": 7,
                "pushed_at": "2021-03-04T05:06:07Z",
                "created_at": "2015-01-01T00:00:00Z"
            },
            "abandonmentScore": 80,
            "revivalPotential": 70,
            "lastCommitAge": 900,
            "reasons": ["no commits in two years"],
            "recommendations": ["update dependencies"]
        }"#;

        let record: DiscoveryRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.repository.full_name, "octo/sample");
        assert_eq!(record.repository.stars, 1200);
        assert_eq!(record.repository.description, None);
        assert!((record.analysis.inactivity_days - 900.0).abs() < f64::EPSILON);
        assert_eq!(record.analysis.reasons.len(), 1);
    }

    #[test]
    fn missing_language_falls_into_unknown_bucket() {
        let summary = RepositorySummary {
            full_name: "octo/sample".into(),
            url: "https://github.com/octo/sample".into(),
            description: None,
            language: None,
            stars: 0,
            forks: 0,
            open_issues: 0,
            pushed_at: Timestamp::UNIX_EPOCH,
            created_at: Timestamp::UNIX_EPOCH,
        };
        assert_eq!(summary.language_or_unknown(), "unknown");
    }
}
