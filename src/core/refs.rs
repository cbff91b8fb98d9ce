//! core::refs
//!
//! Point-in-time view of an import repository's references.
//!
//! A [`ReferenceSet`] is materialized once by [`crate::git::Git::references`]
//! and then only read. Keeping it as plain data lets the update resolver be
//! tested without a repository on disk.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use super::types::{BranchName, Oid};

/// Branch head and tag targets of a repository.
///
/// Tags are stored already peeled to the commit they name.
///
/// # Example
///
/// ```
/// use tarball_history::core::refs::ReferenceSet;
/// use tarball_history::core::types::{BranchName, Oid};
///
/// let h1 = Oid::new("1".repeat(40)).unwrap();
/// let refs = ReferenceSet::new(
///     BranchName::new("master").unwrap(),
///     Some(h1.clone()),
///     [("pkg-1.9".to_string(), h1.clone()), ("pkg-2.0".to_string(), h1.clone())],
/// );
///
/// let at_head = refs.tags_by_oid();
/// assert_eq!(at_head[&h1].len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSet {
    branch: BranchName,
    branch_head: Option<Oid>,
    tags: BTreeMap<String, Oid>,
}

impl ReferenceSet {
    /// Build a reference set from its parts.
    pub fn new(
        branch: BranchName,
        branch_head: Option<Oid>,
        tags: impl IntoIterator<Item = (String, Oid)>,
    ) -> Self {
        Self {
            branch,
            branch_head,
            tags: tags.into_iter().collect(),
        }
    }

    /// The primary branch this set was read for.
    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    /// Commit the primary branch points at, if the branch exists.
    pub fn branch_head(&self) -> Option<&Oid> {
        self.branch_head.as_ref()
    }

    /// Tag name to commit.
    pub fn tags(&self) -> &BTreeMap<String, Oid> {
        &self.tags
    }

    /// Invert the tag mapping: commit to every tag name pointing at it.
    ///
    /// A commit can carry several tags when an import produced no changes
    /// and the next snapshot was tagged on the same commit.
    pub fn tags_by_oid(&self) -> HashMap<&Oid, BTreeSet<&str>> {
        let mut by_oid: HashMap<&Oid, BTreeSet<&str>> = HashMap::new();
        for (name, oid) in &self.tags {
            by_oid.entry(oid).or_default().insert(name.as_str());
        }
        by_oid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(c: char) -> Oid {
        Oid::new(c.to_string().repeat(40)).unwrap()
    }

    #[test]
    fn empty_set() {
        let refs = ReferenceSet::new(BranchName::new("master").unwrap(), None, []);
        assert!(refs.branch_head().is_none());
        assert!(refs.tags_by_oid().is_empty());
    }

    #[test]
    fn inverts_tags() {
        let refs = ReferenceSet::new(
            BranchName::new("master").unwrap(),
            Some(oid('a')),
            [
                ("pkg-1.0".to_string(), oid('a')),
                ("pkg-1.1".to_string(), oid('b')),
                ("pkg-1.0.1".to_string(), oid('a')),
            ],
        );

        let by_oid = refs.tags_by_oid();
        assert_eq!(
            by_oid[&oid('a')].iter().copied().collect::<Vec<_>>(),
            vec!["pkg-1.0", "pkg-1.0.1"]
        );
        assert_eq!(by_oid[&oid('b')].len(), 1);
    }
}
