//! engine::exec
//!
//! The import executor.
//!
//! # Architecture
//!
//! The executor is the only component that writes to the repository. It
//! consumes an [`ImportPlan`] strictly in order; each entry becomes one
//! commit (or none, when its content equals the previous snapshot) and one
//! tag.
//!
//! # Per-snapshot Pipeline
//!
//! ```text
//! tag name check -> fetch -> header date -> unpack (scratch dir) -> commit -> tag
//! ```
//!
//! The scratch directory is a `tempfile` directory and is removed when the
//! entry finishes, whether it succeeded or not.
//!
//! # Invariants
//!
//! - Entries are processed one at a time, in plan order
//! - A failed entry stops the run; earlier commits and tags stay in place
//! - Header-date failures skip the entry only when `keep_going` is set
//! - With tags on, a stem that is not a valid tag name is rejected before
//!   anything is fetched or committed (skipped under `keep_going`)
//! - The caller holds the [`ImportLock`](crate::core::lock::ImportLock)

use serde::Serialize;
use thiserror::Error;

use super::plan::ImportPlan;
use crate::archive::{self, ArchiveError};
use crate::core::types::{AuthorIdentity, BranchName, UtcTimestamp};
use crate::core::version::VersionFilename;
use crate::git::{CommitOutcome, Git, GitError};
use crate::source::{SnapshotSource, SourceError};
use crate::ui::output::{self, Verbosity};

/// Errors from execution.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Downloading or reading a snapshot failed.
    #[error("cannot fetch {name}: {source}")]
    Fetch {
        /// The snapshot being fetched
        name: String,
        source: SourceError,
    },

    /// A snapshot could not be dated or unpacked.
    #[error("{name}: {source}")]
    Archive {
        /// The snapshot being imported
        name: String,
        source: ArchiveError,
    },

    /// Git operation failed.
    #[error("git error while importing {name}: {source}")]
    Git {
        /// The snapshot being imported
        name: String,
        source: GitError,
    },

    /// The scratch directory could not be created.
    #[error("cannot create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),
}

/// Settings for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Branch receiving the commits.
    pub branch: BranchName,
    /// Commit author; `None` uses the repository identity.
    pub author: Option<AuthorIdentity>,
    /// Use the archive header date as the author date.
    pub date: bool,
    /// Tag every imported snapshot with its stem.
    pub tags: bool,
    /// Skip snapshots whose header date cannot be read.
    pub keep_going: bool,
}

/// What happened to one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotRecord {
    /// Snapshot stem (commit message and tag name).
    pub name: String,
    /// Commit the snapshot resolved to.
    pub commit: String,
    /// Whether a new commit was created.
    pub created: bool,
    /// Whether a tag was written.
    pub tagged: bool,
    /// Author date taken from the archive header.
    pub date: Option<UtcTimestamp>,
}

/// Result of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Snapshots imported, in order.
    pub snapshots: Vec<SnapshotRecord>,
    /// Snapshots skipped under `keep_going`.
    pub skipped: Vec<String>,
}

impl ImportSummary {
    /// Number of new commits.
    pub fn committed(&self) -> usize {
        self.snapshots.iter().filter(|s| s.created).count()
    }

    /// Number of snapshots identical to their predecessor.
    pub fn unchanged(&self) -> usize {
        self.snapshots.iter().filter(|s| !s.created).count()
    }

    /// Number of tags written.
    pub fn tagged(&self) -> usize {
        self.snapshots.iter().filter(|s| s.tagged).count()
    }

    /// The newest snapshot imported in this run.
    pub fn last(&self) -> Option<&SnapshotRecord> {
        self.snapshots.last()
    }
}

/// The executor.
///
/// Applies an import plan to the repository, one snapshot at a time.
pub struct Executor<'a> {
    git: &'a Git,
    source: &'a dyn SnapshotSource,
    options: &'a ImportOptions,
    verbosity: Verbosity,
}

impl<'a> Executor<'a> {
    /// Create a new executor.
    pub fn new(
        git: &'a Git,
        source: &'a dyn SnapshotSource,
        options: &'a ImportOptions,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            git,
            source,
            options,
            verbosity,
        }
    }

    /// Import every entry of `plan` for `target`.
    ///
    /// # Errors
    ///
    /// Returns the first failure; snapshots imported before it remain in
    /// the repository.
    pub async fn execute(
        &self,
        target: &str,
        plan: &ImportPlan,
    ) -> Result<ImportSummary, ExecuteError> {
        let mut summary = ImportSummary::default();

        for entry in &plan.entries {
            match self.import_one(target, entry).await? {
                Some(record) => summary.snapshots.push(record),
                None => summary.skipped.push(entry.stem().to_string()),
            }
        }

        Ok(summary)
    }

    /// Import a single snapshot. `Ok(None)` means it was skipped.
    async fn import_one(
        &self,
        target: &str,
        entry: &VersionFilename,
    ) -> Result<Option<SnapshotRecord>, ExecuteError> {
        let name = entry.stem().to_string();
        let verbosity = self.verbosity;

        // The branch must never move to a commit the tag step cannot name.
        if self.options.tags {
            match Git::validate_tag_name(&name) {
                Ok(()) => {}
                Err(e) if self.options.keep_going => {
                    output::warn(format!("skipping {}: {}", name, e), verbosity);
                    return Ok(None);
                }
                Err(source) => return Err(ExecuteError::Git { name, source }),
            }
        }

        output::debug(format!("fetching {}", entry), verbosity);
        let bytes = self
            .source
            .fetch(target, entry)
            .await
            .map_err(|source| ExecuteError::Fetch {
                name: name.clone(),
                source,
            })?;
        output::debug(format!("{}: {} bytes", entry, bytes.len()), verbosity);

        let date = if self.options.date {
            match archive::read_header_date(bytes.as_slice()) {
                Ok(date) => {
                    output::debug(format!("{}: dated {}", name, date), verbosity);
                    Some(date)
                }
                Err(e) if self.options.keep_going => {
                    output::warn(format!("skipping {}: {}", name, e), verbosity);
                    return Ok(None);
                }
                Err(source) => return Err(ExecuteError::Archive { name, source }),
            }
        } else {
            None
        };

        let scratch = tempfile::Builder::new()
            .prefix("tarball-history-")
            .tempdir()
            .map_err(ExecuteError::Scratch)?;
        archive::unpack(&bytes, scratch.path()).map_err(|source| ExecuteError::Archive {
            name: name.clone(),
            source,
        })?;
        let work_tree = archive::work_tree_for(scratch.path(), &name);
        output::debug(
            format!("{}: committing {}", name, work_tree.display()),
            verbosity,
        );

        let git_err = |source| ExecuteError::Git {
            name: name.clone(),
            source,
        };

        let outcome = self
            .git
            .commit_tree(
                &self.options.branch,
                &work_tree,
                &name,
                self.options.author.as_ref(),
                date,
            )
            .map_err(git_err)?;

        let tagged = if self.options.tags {
            match self.git.tag(&name, outcome.oid()) {
                Ok(()) => true,
                Err(GitError::TagExists { .. }) => {
                    output::warn(format!("tag {} already exists, leaving it", name), verbosity);
                    false
                }
                Err(e) => return Err(git_err(e)),
            }
        } else {
            false
        };

        let created = matches!(outcome, CommitOutcome::Created(_));
        let short = outcome.oid().short(7);
        if created {
            output::print(format!("{} -> {}", name, short), verbosity);
        } else {
            output::print(
                format!("{} -> {} (same content as previous snapshot)", name, short),
                verbosity,
            );
        }

        Ok(Some(SnapshotRecord {
            name,
            commit: outcome.oid().to_string(),
            created,
            tagged,
            date,
        }))
    }
}
