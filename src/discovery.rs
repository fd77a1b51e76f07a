//! Ingesting discovery results.
//!
//! A discovery run writes a JSON document of scored repositories. Records
//! that pass [`ImportCriteria`] are immersed together in one batch.

use std::fs;
use std::io;
use std::path::Path;

use jiff::Timestamp;
use serde::Deserialize;
use uuid::Uuid;

use crate::model::DiscoveryRecord;
use crate::pit::{ImmerseOptions, Pit, PitError};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid discovery results: {0}")]
    Json(#[from] serde_json::Error),
}

/// The document a discovery run produces.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResults {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub total_found: u64,
    pub analyzed: Vec<DiscoveryRecord>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

impl DiscoveryResults {
    pub fn load(path: &Path) -> Result<Self, DiscoveryError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Which discovery records are worth immersing.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportCriteria {
    pub min_revival_potential: Option<f64>,
    pub max_abandonment_score: Option<f64>,
    pub min_stars: u64,
    /// Skip repositories whose host reported no primary language.
    pub require_language: bool,
}

impl Default for ImportCriteria {
    fn default() -> Self {
        Self {
            min_revival_potential: None,
            max_abandonment_score: None,
            min_stars: 10,
            require_language: true,
        }
    }
}

impl ImportCriteria {
    /// Why `record` should be skipped, or `None` if it qualifies.
    pub fn rejection(&self, record: &DiscoveryRecord) -> Option<String> {
        let analysis = &record.analysis;
        let repository = &record.repository;

        if let Some(min) = self.min_revival_potential
            && analysis.revival_potential < min
        {
            return Some(format!(
                "revival potential {} below {min}",
                analysis.revival_potential
            ));
        }
        if let Some(max) = self.max_abandonment_score
            && analysis.abandonment_score > max
        {
            return Some(format!(
                "abandonment score {} above {max}",
                analysis.abandonment_score
            ));
        }
        if self.require_language && repository.language.is_none() {
            return Some("no primary language".to_string());
        }
        if repository.stars < self.min_stars {
            return Some(format!(
                "{} stars, need {}",
                repository.stars, self.min_stars
            ));
        }
        None
    }
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// `(full name, new entry id)`, in document order.
    pub imported: Vec<(String, Uuid)>,
    /// `(full name, reason)`, in document order.
    pub skipped: Vec<(String, String)>,
}

/// Immerses every qualifying record from `results` in a single batch.
pub fn import(
    pit: &Pit,
    results: DiscoveryResults,
    criteria: &ImportCriteria,
    options: &ImmerseOptions,
) -> Result<ImportReport, PitError> {
    let mut report = ImportReport::default();
    let mut accepted = Vec::new();

    for record in results.analyzed {
        match criteria.rejection(&record) {
            Some(reason) => report
                .skipped
                .push((record.repository.full_name.clone(), reason)),
            None => accepted.push(record),
        }
    }

    let names: Vec<String> = accepted
        .iter()
        .map(|r| r.repository.full_name.clone())
        .collect();
    let ids = pit.immerse_batch(accepted, options)?;
    report.imported = names.into_iter().zip(ids).collect();

    tracing::info!(
        query = %results.query,
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        "imported discovery results"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::model::{Category, Source, Status};
    use crate::storage::Storage;

    const RESULTS: &str = r#"{
        "query": "language:javascript pushed:<2020-01-01",
        "totalFound": 4,
        "timestamp": "2024-05-01T12:00:00Z",
        "analyzed": [
            {
                "repository": {
                    "full_name": "octo/old-cli",
                    "html_url": "https://github.com/octo/old-cli",
                    "description": "A command line tool",
                    "language": "JavaScript",
                    "stargazers_count": 2400,
                    "forks_count": 80,
                    "open_issues_count": 12,
                    "pushed_at": "2019-02-03T04:05:06Z",
                    "created_at": "2014-01-01T00:00:00Z"
                },
                "abandonmentScore": 85,
                "revivalPotential": 72,
                "lastCommitAge": 1800,
                "reasons": ["no commits since 2019"],
                "recommendations": ["migrate to ESM"]
            },
            {
                "repository": {
                    "full_name": "octo/tiny",
                    "html_url": "https://github.com/octo/tiny",
                    "description": null,
                    "language": "JavaScript",
                    "stargazers_count": 3,
                    "forks_count": 0,
                    "open_issues_count": 0,
                    "pushed_at": "2019-02-03T04:05:06Z",
                    "created_at": "2018-01-01T00:00:00Z"
                },
                "abandonmentScore": 90,
                "revivalPotential": 40,
                "lastCommitAge": 1800,
                "reasons": [],
                "recommendations": []
            },
            {
                "repository": {
                    "full_name": "octo/docs-only",
                    "html_url": "https://github.com/octo/docs-only",
                    "description": "Notes",
                    "language": null,
                    "stargazers_count": 500,
                    "forks_count": 1,
                    "open_issues_count": 0,
                    "pushed_at": "2019-02-03T04:05:06Z",
                    "created_at": "2018-01-01T00:00:00Z"
                },
                "abandonmentScore": 70,
                "revivalPotential": 60,
                "lastCommitAge": 900,
                "reasons": [],
                "recommendations": []
            },
            {
                "repository": {
                    "full_name": "octo/widget-lib",
                    "html_url": "https://github.com/octo/widget-lib",
                    "description": "Widgets",
                    "language": "TypeScript",
                    "stargazers_count": 150,
                    "forks_count": 9,
                    "open_issues_count": 4,
                    "pushed_at": "2020-06-01T00:00:00Z",
                    "created_at": "2016-01-01T00:00:00Z"
                },
                "abandonmentScore": 65,
                "revivalPotential": 20,
                "lastCommitAge": 700,
                "reasons": [],
                "recommendations": []
            }
        ]
    }"#;

    fn test_pit() -> (TempDir, Pit) {
        let dir = TempDir::new().unwrap();
        let pit = Pit::open(Storage::new(dir.path().join("pit.json")).unwrap()).unwrap();
        (dir, pit)
    }

    fn results() -> DiscoveryResults {
        serde_json::from_str(RESULTS).unwrap()
    }

    #[test]
    fn load_reads_results_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, RESULTS).unwrap();

        let loaded = DiscoveryResults::load(&path).unwrap();
        assert_eq!(loaded.total_found, 4);
        assert_eq!(loaded.analyzed.len(), 4);
    }

    #[test]
    fn load_rejects_malformed_results() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.json");
        fs::write(&path, r#"{"analyzed": "nope"}"#).unwrap();

        assert!(matches!(
            DiscoveryResults::load(&path).unwrap_err(),
            DiscoveryError::Json(_)
        ));
    }

    #[test]
    fn default_criteria_skip_small_and_languageless() {
        let (_dir, pit) = test_pit();

        let report = import(
            &pit,
            results(),
            &ImportCriteria::default(),
            &ImmerseOptions::default(),
        )
        .unwrap();

        let imported: Vec<&str> = report.imported.iter().map(|(n, _)| n.as_str()).collect();
        let skipped: Vec<&str> = report.skipped.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(imported, ["octo/old-cli", "octo/widget-lib"]);
        assert_eq!(skipped, ["octo/tiny", "octo/docs-only"]);

        let (_, id) = &report.imported[0];
        let entry = pit.get(*id).unwrap();
        assert_eq!(entry.workflow.status, Status::Pending);
        assert_eq!(entry.metadata.source, Source::Discovered);
        assert_eq!(entry.metadata.category, Category::CliTool);
        assert_eq!(entry.analysis.unwrap().reasons, ["no commits since 2019"]);
    }

    #[test]
    fn score_thresholds_apply() {
        let criteria = ImportCriteria {
            min_revival_potential: Some(50.0),
            max_abandonment_score: Some(80.0),
            ..ImportCriteria::default()
        };
        let results = results();

        let reasons: Vec<Option<String>> =
            results.analyzed.iter().map(|r| criteria.rejection(r)).collect();

        assert_eq!(
            reasons[0].as_deref(),
            Some("abandonment score 85 above 80")
        );
        assert_eq!(reasons[3].as_deref(), Some("revival potential 20 below 50"));
    }

    #[test]
    fn imported_entries_are_ranked_by_heuristic() {
        let (_dir, pit) = test_pit();
        import(
            &pit,
            results(),
            &ImportCriteria::default(),
            &ImmerseOptions::default(),
        )
        .unwrap();

        assert_eq!(pit.next_pending().unwrap().full_name(), "octo/old-cli");
    }
}
