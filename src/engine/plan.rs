//! engine::plan
//!
//! Deterministic import plan generation.
//!
//! # Invariants
//!
//! - Planner does not perform I/O
//! - Input order is preserved; the listing is expected to be sorted
//! - With a cutoff, only snapshots strictly newer than it survive
//! - An empty plan means "already up to date", not an error
//!
//! # Example
//!
//! ```
//! use tarball_history::core::version::VersionFilename;
//! use tarball_history::engine::plan::plan;
//!
//! let listing: Vec<VersionFilename> = ["pkg-1.0", "pkg-1.1", "pkg-2.0"]
//!     .into_iter()
//!     .map(VersionFilename::parse)
//!     .collect();
//!
//! let cutoff = VersionFilename::parse("pkg-1.1");
//! let p = plan(&listing, Some(&cutoff));
//! assert_eq!(p.names(), vec!["pkg-2.0"]);
//! ```

use std::cmp::Ordering;

use serde::Serialize;

use crate::core::version::VersionFilename;

/// The ordered snapshots one run will import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportPlan {
    /// Newest snapshot already present, when updating.
    pub cutoff: Option<VersionFilename>,
    /// Snapshots to import, oldest first.
    pub entries: Vec<VersionFilename>,
    /// Listing entries dropped by the cutoff.
    pub skipped: usize,
}

impl ImportPlan {
    /// Check if there is nothing to import.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of snapshots to import.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The listed names, in import order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.as_str()).collect()
    }
}

/// Build the import plan from a sorted listing and an optional cutoff.
pub fn plan(listing: &[VersionFilename], cutoff: Option<&VersionFilename>) -> ImportPlan {
    let entries: Vec<VersionFilename> = match cutoff {
        None => listing.to_vec(),
        Some(cutoff) => listing
            .iter()
            .filter(|entry| entry.cmp_version(cutoff) == Ordering::Greater)
            .cloned()
            .collect(),
    };

    ImportPlan {
        cutoff: cutoff.cloned(),
        skipped: listing.len() - entries.len(),
        entries,
    }
}
