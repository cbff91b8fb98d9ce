//! engine::scan
//!
//! Work out where a previous import stopped.
//!
//! # Algorithm
//!
//! Every imported snapshot is tagged with its stem, so the newest imported
//! version is whatever tag sits on the primary branch head:
//!
//! 1. Invert the tag mapping to commit -> tag names.
//! 2. Look up the branch head's commit.
//! 3. Take the highest of those tag names under the snapshot version order.
//!
//! Step 3 matters when a snapshot had the same content as its predecessor:
//! no commit was made, so both tags point at the same commit and the newer
//! one is the real cutoff.
//!
//! # Invariants
//!
//! - [`resolve_cutoff`] is a pure function over an already-read
//!   [`ReferenceSet`]; only [`scan_cutoff`] touches the repository
//! - A missing branch or a branch head without a tag is an error, never
//!   "import everything"

use thiserror::Error;

use crate::core::refs::ReferenceSet;
use crate::core::types::BranchName;
use crate::core::version::VersionFilename;
use crate::git::{Git, GitError};

/// Why an incremental update cannot determine its cutoff.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// The primary branch does not exist.
    #[error("cannot update: branch '{branch}' does not exist (nothing has been imported yet)")]
    NoBranchHead {
        /// The branch that was looked up
        branch: String,
    },

    /// The primary branch head carries no tag.
    #[error("cannot update: {branch} is at {oid}, which has no tag naming an imported snapshot")]
    NoMatchingTag {
        /// The branch that was looked up
        branch: String,
        /// The commit it points at
        oid: String,
    },
}

/// Errors from reading the repository to compute a cutoff.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// The newest snapshot already imported, from the tags at the branch head.
///
/// # Errors
///
/// - [`ResolveError::NoBranchHead`] if the branch does not exist
/// - [`ResolveError::NoMatchingTag`] if no tag points at the branch head
///
/// # Example
///
/// ```
/// use tarball_history::core::refs::ReferenceSet;
/// use tarball_history::core::types::{BranchName, Oid};
/// use tarball_history::engine::scan::resolve_cutoff;
///
/// let h1 = Oid::new("1".repeat(40)).unwrap();
/// let refs = ReferenceSet::new(
///     BranchName::new("master").unwrap(),
///     Some(h1.clone()),
///     [("pkg-2.0".to_string(), h1.clone()), ("pkg-1.9".to_string(), h1)],
/// );
///
/// assert_eq!(resolve_cutoff(&refs).unwrap().as_str(), "pkg-2.0");
/// ```
pub fn resolve_cutoff(refs: &ReferenceSet) -> Result<VersionFilename, ResolveError> {
    let head = refs
        .branch_head()
        .ok_or_else(|| ResolveError::NoBranchHead {
            branch: refs.branch().to_string(),
        })?;

    refs.tags_by_oid()
        .get(head)
        .and_then(|names| names.iter().map(|name| VersionFilename::parse(*name)).max())
        .ok_or_else(|| ResolveError::NoMatchingTag {
            branch: refs.branch().to_string(),
            oid: head.to_string(),
        })
}

/// Read the repository's references and resolve the update cutoff.
pub fn scan_cutoff(git: &Git, branch: &BranchName) -> Result<VersionFilename, ScanError> {
    let refs = git.references(branch)?;
    Ok(resolve_cutoff(&refs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Oid;

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    fn refs(head: Option<Oid>, tags: &[(&str, Oid)]) -> ReferenceSet {
        ReferenceSet::new(
            BranchName::new("master").unwrap(),
            head,
            tags.iter().map(|(n, o)| (n.to_string(), o.clone())),
        )
    }

    #[test]
    fn single_tag_at_head() {
        let refs = refs(
            Some(oid('b')),
            &[("pkg-1.0", oid('a')), ("pkg-1.1", oid('b'))],
        );
        assert_eq!(resolve_cutoff(&refs).unwrap().as_str(), "pkg-1.1");
    }

    #[test]
    fn highest_of_several_tags_at_head() {
        let refs = refs(
            Some(oid('a')),
            &[("pkg-2.0", oid('a')), ("pkg-1.9", oid('a'))],
        );
        assert_eq!(resolve_cutoff(&refs).unwrap().as_str(), "pkg-2.0");
    }

    #[test]
    fn numeric_not_lexical_max() {
        let refs = refs(
            Some(oid('a')),
            &[("pkg-9", oid('a')), ("pkg-10", oid('a')), ("pkg-9.1", oid('a'))],
        );
        assert_eq!(resolve_cutoff(&refs).unwrap().as_str(), "pkg-10");
    }

    #[test]
    fn tags_elsewhere_are_ignored() {
        let refs = refs(
            Some(oid('a')),
            &[("pkg-1.0", oid('a')), ("pkg-5.0", oid('b'))],
        );
        assert_eq!(resolve_cutoff(&refs).unwrap().as_str(), "pkg-1.0");
    }

    #[test]
    fn missing_branch() {
        let err = resolve_cutoff(&refs(None, &[("pkg-1.0", oid('a'))])).unwrap_err();
        assert_eq!(
            err,
            ResolveError::NoBranchHead {
                branch: "master".to_string()
            }
        );
    }

    #[test]
    fn head_without_tag() {
        let err = resolve_cutoff(&refs(Some(oid('c')), &[("pkg-1.0", oid('a'))])).unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingTag { .. }));
        assert!(err.to_string().contains("cccc"));
    }

    #[test]
    fn no_tags_at_all() {
        let err = resolve_cutoff(&refs(Some(oid('a')), &[])).unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingTag { .. }));
    }
}
