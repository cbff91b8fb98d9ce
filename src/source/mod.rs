//! source
//!
//! Listing and downloading snapshot archives.
//!
//! # Modules
//!
//! - [`traits`] - The [`SnapshotSource`] trait and [`SourceError`]
//! - [`http`] - Directory index served over HTTP (the default)
//! - [`local`] - A directory of tarballs on disk (`--from-dir`)
//!
//! # Listing Normalization
//!
//! Every source funnels raw names through [`normalize_listing`], so the
//! rest of the importer can rely on one shape: bare `.tar.gz` filenames,
//! each listed once, sorted by version.

pub mod http;
pub mod local;
pub mod traits;

pub use http::HttpSource;
pub use local::DirectorySource;
pub use traits::{SnapshotSource, SourceError};

use std::collections::HashSet;
use std::path::PathBuf;

use crate::core::version::VersionFilename;

/// Only archives with this suffix are listed.
pub const SNAPSHOT_SUFFIX: &str = ".tar.gz";

/// Filter, de-duplicate and sort raw listing entries.
///
/// Path-like entries (`sub/dir/pkg-1.tar.gz`) are reduced to their last
/// component. Query strings and fragments are not stripped: an entry like
/// `pkg-1.tar.gz?download` is not an archive name and is dropped.
///
/// # Example
///
/// ```
/// use tarball_history::source::normalize_listing;
///
/// let raw = ["xnu-10.tar.gz", "../", "xnu-9.tar.gz", "/tarballs/xnu/xnu-9.tar.gz", "notes.txt"];
/// let names: Vec<String> = normalize_listing(raw)
///     .into_iter()
///     .map(String::from)
///     .collect();
/// assert_eq!(names, vec!["xnu-9.tar.gz", "xnu-10.tar.gz"]);
/// ```
pub fn normalize_listing<I, S>(raw: I) -> Vec<VersionFilename>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut names: Vec<VersionFilename> = raw
        .into_iter()
        .filter_map(|entry| {
            let entry = entry.as_ref();
            let name = entry.rsplit('/').next().unwrap_or(entry);
            (name.len() > SNAPSHOT_SUFFIX.len() && name.ends_with(SNAPSHOT_SUFFIX))
                .then(|| name.to_string())
        })
        .filter(|name| seen.insert(name.clone()))
        .map(VersionFilename::parse)
        .collect();

    names.sort();
    names
}

/// Which source an import reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// HTTP directory index rooted at this URL (ends with `/`).
    Http { base_url: String },
    /// Local directory holding the tarballs.
    Directory { root: PathBuf },
}

/// Create the source for a run.
pub fn create_source(kind: &SourceKind) -> Result<Box<dyn SnapshotSource>, SourceError> {
    match kind {
        SourceKind::Http { base_url } => Ok(Box::new(HttpSource::new(base_url)?)),
        SourceKind::Directory { root } => Ok(Box::new(DirectorySource::new(root))),
    }
}
