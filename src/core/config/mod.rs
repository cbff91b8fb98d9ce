//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$TBH_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/tarball-history/config.toml`
//! 3. `~/.tarball-history/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use tarball_history::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Archive: {}", config.base_url());
//! println!("Branch: {}", config.branch());
//! ```

pub mod schema;

pub use schema::{FileConfig, DEFAULT_AUTHOR, DEFAULT_BASE_URL, DEFAULT_BRANCH};

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{AuthorIdentity, BranchName};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TBH_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Resolved configuration.
///
/// Every value here has passed validation; accessors never fail.
#[derive(Debug, Clone)]
pub struct Config {
    base_url: String,
    branch: BranchName,
    author: Option<AuthorIdentity>,
    tags: bool,
    date: bool,
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// holds an invalid value. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let candidates = search_paths(
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
            dirs::home_dir(),
        );

        match candidates.into_iter().find(|path| path.exists()) {
            Some(path) => Self::load_from(&path),
            None => Self::from_file(FileConfig::default(), None),
        }
    }

    /// Load configuration from one specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: FileConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::from_file(file, Some(path.to_path_buf()))
    }

    /// Validate a parsed file and apply defaults.
    pub fn from_file(file: FileConfig, loaded_from: Option<PathBuf>) -> Result<Self, ConfigError> {
        file.validate()?;

        let base_url = schema::validate_base_url(
            file.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;

        let branch = BranchName::new(file.branch.as_deref().unwrap_or(DEFAULT_BRANCH))
            .map_err(|e| ConfigError::InvalidValue(format!("invalid branch name: {}", e)))?;

        let author = match file.author.as_deref().unwrap_or(DEFAULT_AUTHOR) {
            "" => None,
            raw => Some(
                AuthorIdentity::parse(raw)
                    .map_err(|e| ConfigError::InvalidValue(format!("invalid author: {}", e)))?,
            ),
        };

        Ok(Self {
            base_url,
            branch,
            author,
            tags: file.tags.unwrap_or(true),
            date: file.date.unwrap_or(true),
            loaded_from,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Root of the tarball archive, always ending in `/`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Primary branch name.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Commit author, or `None` to use the repository's identity.
    pub fn author(&self) -> Option<&AuthorIdentity> {
        self.author.as_ref()
    }

    /// Whether snapshots are tagged.
    pub fn tags(&self) -> bool {
        self.tags
    }

    /// Whether commits carry the archive header date.
    pub fn date(&self) -> bool {
        self.date
    }

    /// Path the configuration was read from, if any.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}

/// Candidate config files, in search order.
fn search_paths(
    explicit: Option<PathBuf>,
    xdg_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    paths.extend(explicit);
    paths.extend(xdg_home.map(|dir| dir.join("tarball-history/config.toml")));
    paths.extend(home.map(|dir| dir.join(".tarball-history/config.toml")));
    paths
}
