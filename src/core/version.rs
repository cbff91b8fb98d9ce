//! core::version
//!
//! Version ordering for snapshot filenames.
//!
//! # Overview
//!
//! Snapshot names have the shape `<name>-<version>.<archive-extension>`,
//! e.g. `xnu-792.6.76.tar.gz`. Sorting them alphabetically is wrong for
//! multi-component versions (`xnu-9` would land after `xnu-10`), so the
//! version is parsed into a sequence of integers and compared numerically.
//!
//! # Ordering
//!
//! 1. The archive suffix is removed (`.tar.gz`, `.tgz`, `.gz`, `.tar`;
//!    first match wins).
//! 2. The trailing `-<digits and dots>` is the version. Anything else
//!    (including `pkg-1.0rc1`) has no version and an empty token sequence.
//! 3. Token sequences compare left to right by integer value; when one is
//!    a prefix of the other the shorter one is lower (`9` < `9.0` < `9.1`).
//!
//! Names without a version therefore sort below every versioned name.
//! Callers rely on that to push stray listing entries to the front
//! instead of failing.
//!
//! # Example
//!
//! ```
//! use std::cmp::Ordering;
//! use tarball_history::core::version::compare_versions;
//!
//! assert_eq!(compare_versions("xnu-9.tar.gz", "xnu-10.tar.gz"), Ordering::Less);
//! assert_eq!(compare_versions("xnu-792", "xnu-792.6.76"), Ordering::Less);
//! assert_eq!(compare_versions("readme", "xnu-1"), Ordering::Less);
//! ```

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Archive suffixes stripped before the version is parsed, in match order.
pub const ARCHIVE_SUFFIXES: [&str; 4] = [".tar.gz", ".tgz", ".gz", ".tar"];

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-([0-9.]+)$").expect("version pattern is a valid regex"));

/// Remove the first matching archive suffix, if any.
///
/// ```
/// use tarball_history::core::version::strip_archive_suffix;
///
/// assert_eq!(strip_archive_suffix("xnu-792.tar.gz"), "xnu-792");
/// assert_eq!(strip_archive_suffix("xnu-792.tgz"), "xnu-792");
/// assert_eq!(strip_archive_suffix("xnu-792"), "xnu-792");
/// ```
pub fn strip_archive_suffix(name: &str) -> &str {
    ARCHIVE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
}

/// Return the version substring of a suffix-free stem, if it has one.
fn version_of(stem: &str) -> Option<&str> {
    VERSION_RE
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Split a version substring into integer tokens.
///
/// Trailing empty components are dropped (`1.2.` is `[1, 2]`, `.` is `[]`)
/// and interior empty ones count as zero (`1..2` is `[1, 0, 2]`).
/// Components too large for `u64` saturate.
fn tokenize(version: &str) -> Vec<u64> {
    let mut parts: Vec<&str> = version.split('.').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    parts
        .into_iter()
        .map(|p| {
            if p.is_empty() {
                0
            } else {
                // Only ASCII digits reach here, so the sole failure is overflow.
                p.parse::<u64>().unwrap_or(u64::MAX)
            }
        })
        .collect()
}

/// A parsed snapshot filename.
///
/// Parsing is total: every string is a `VersionFilename`, possibly with an
/// empty token sequence.
///
/// `Ord` sorts by version tokens and breaks ties on the raw name so a
/// sorted listing is fully deterministic. Use [`VersionFilename::cmp_version`]
/// when two names with equal versions must compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct VersionFilename {
    raw: String,
    stem_len: usize,
    tokens: Vec<u64>,
}

impl VersionFilename {
    /// Parse a filename.
    ///
    /// ```
    /// use tarball_history::core::version::VersionFilename;
    ///
    /// let v = VersionFilename::parse("xnu-792.6.76.tar.gz");
    /// assert_eq!(v.stem(), "xnu-792.6.76");
    /// assert_eq!(v.tokens(), &[792, 6, 76]);
    /// assert_eq!(v.version(), Some("792.6.76"));
    /// ```
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let stem = strip_archive_suffix(&raw);
        let tokens = version_of(stem).map(tokenize).unwrap_or_default();
        Self {
            stem_len: stem.len(),
            tokens,
            raw,
        }
    }

    /// The name exactly as listed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The name without its archive suffix. Used as commit message and tag.
    pub fn stem(&self) -> &str {
        &self.raw[..self.stem_len]
    }

    /// The version substring, if the name has one.
    pub fn version(&self) -> Option<&str> {
        version_of(self.stem())
    }

    /// The parsed version tokens (empty when there is no version).
    pub fn tokens(&self) -> &[u64] {
        &self.tokens
    }

    /// Compare by version alone.
    ///
    /// `Vec` ordering is already "first differing element, else shorter is
    /// lower", which is exactly the snapshot ordering.
    pub fn cmp_version(&self, other: &Self) -> Ordering {
        self.tokens.cmp(&other.tokens)
    }
}

impl Ord for VersionFilename {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_version(other)
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for VersionFilename {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<String> for VersionFilename {
    fn from(raw: String) -> Self {
        Self::parse(raw)
    }
}

impl From<&str> for VersionFilename {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<VersionFilename> for String {
    fn from(v: VersionFilename) -> Self {
        v.raw
    }
}

impl std::fmt::Display for VersionFilename {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two filenames by version.
///
/// Total over all strings; never panics.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    VersionFilename::parse(a).cmp_version(&VersionFilename::parse(b))
}
