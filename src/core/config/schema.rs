//! core::config::schema
//!
//! Configuration file schema.
//!
//! Every field is optional; anything left out falls back to the built-in
//! default. Values are validated after parsing (e.g., `branch` must be a
//! valid branch name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{AuthorIdentity, BranchName};

/// Archive consulted when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "http://opensource.apple.com/tarballs/";

/// Primary branch of a freshly created repository.
pub const DEFAULT_BRANCH: &str = "master";

/// Author recorded on imported commits.
pub const DEFAULT_AUTHOR: &str = "Apple <opensource@apple.com>";

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// base_url = "https://mirror.example.com/tarballs/"
/// branch = "main"
/// author = "Release Bot <releases@example.com>"
/// tags = true
/// date = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Root of the tarball archive
    pub base_url: Option<String>,

    /// Primary branch name
    pub branch: Option<String>,

    /// Commit author as `Name <email>`; empty means "use the repository identity"
    pub author: Option<String>,

    /// Tag each imported snapshot
    pub tags: Option<bool>,

    /// Use archive header dates as commit dates
    pub date: Option<bool>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.base_url {
            validate_base_url(url)?;
        }

        if let Some(branch) = &self.branch {
            BranchName::new(branch.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid branch name: {}", e))
            })?;
        }

        if let Some(author) = &self.author {
            if !author.is_empty() {
                AuthorIdentity::parse(author)
                    .map_err(|e| ConfigError::InvalidValue(format!("invalid author: {}", e)))?;
            }
        }

        Ok(())
    }
}

/// Check a base URL and return it with a trailing `/`.
pub fn validate_base_url(url: &str) -> Result<String, ConfigError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidValue(format!(
            "base_url '{}' must start with http:// or https://",
            url
        )));
    }

    let mut url = url.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(url)
}
