//! Pit configuration.
//!
//! Loaded from `~/.pit/config.toml`. The file is optional; a missing file
//! means defaults. The backing file is resolved through a chain:
//!
//! 1. `--pit <path>`, explicit per-command override
//! 2. `PIT_FILE` env var
//! 3. `pit-file` in `~/.pit/config.toml`
//! 4. `~/.pit/pit.json`

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::discovery::ImportCriteria;
use crate::storage::Storage;

/// Environment variable naming the backing file.
pub const PIT_FILE_ENV: &str = "PIT_FILE";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Backing file; a leading `~/` expands to the home directory.
    pub pit_file: Option<PathBuf>,

    #[serde(default)]
    pub import: ImportConfig,
}

/// Defaults for `pit import`, each overridable on the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImportConfig {
    pub min_stars: Option<u64>,
    pub min_revival_potential: Option<f64>,
    pub max_abandonment_score: Option<f64>,
    pub require_language: Option<bool>,
}

impl ImportConfig {
    pub fn criteria(&self) -> ImportCriteria {
        let defaults = ImportCriteria::default();
        ImportCriteria {
            min_revival_potential: self.min_revival_potential,
            max_abandonment_score: self.max_abandonment_score,
            min_stars: self.min_stars.unwrap_or(defaults.min_stars),
            require_language: self.require_language.unwrap_or(defaults.require_language),
        }
    }
}

impl Config {
    /// Load config from `~/.pit/config.toml`, or defaults when absent.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.pit/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".pit").join("config.toml"))
    }

    /// Resolve the backing file from the flag, environment, and config.
    pub fn resolve_pit_file(&self, explicit: Option<&Path>) -> Result<PathBuf, String> {
        resolve(explicit, std::env::var_os(PIT_FILE_ENV), self)
    }
}

fn resolve(
    explicit: Option<&Path>,
    env: Option<OsString>,
    config: &Config,
) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env
        && !path.is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(path) = &config.pit_file {
        return Ok(expand_home(path));
    }

    Storage::default_path().ok_or_else(|| {
        format!("could not determine home directory: pass --pit <path> or set {PIT_FILE_ENV}")
    })
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    path.to_path_buf()
}
