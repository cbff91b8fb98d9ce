//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to the import repository.
//! Every read of its references and every commit or tag the importer
//! creates flows through [`Git`], which normalizes git2 failures into
//! typed [`GitError`] categories.
//!
//! # Repository Shape
//!
//! Import repositories are bare. A snapshot is committed by pointing the
//! repository at the snapshot's extracted directory as a temporary work
//! tree, staging everything in it, and committing the resulting tree on
//! top of the primary branch.
//!
//! # Example
//!
//! ```ignore
//! use tarball_history::core::types::BranchName;
//! use tarball_history::git::Git;
//! use std::path::Path;
//!
//! let branch = BranchName::new("master")?;
//! let git = Git::open_or_init_bare(Path::new("xnu.git"), &branch)?;
//! let refs = git.references(&branch)?;
//! println!("{} tags", refs.tags().len());
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::refs::ReferenceSet;
use crate::core::types::{AuthorIdentity, BranchName, Oid, TypeError, UtcTimestamp};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// No repository at the given path.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Import repositories must be bare.
    #[error("repository at {path} has a working directory; imports need a bare repository")]
    NotBare {
        /// The repository path
        path: PathBuf,
    },

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// A tag with this name already exists.
    #[error("tag already exists: {name}")]
    TagExists {
        /// The tag name
        name: String,
    },

    /// Neither an explicit author nor a configured identity is available.
    #[error("no commit identity: pass --author or set user.name and user.email")]
    NoIdentity,

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref or tag name.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidRefName {
                message: format!("{}: {}", context, err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidOid(msg) => GitError::InvalidOid { oid: msg },
            TypeError::InvalidBranchName(msg) => GitError::InvalidRefName { message: msg },
            TypeError::InvalidAuthor(msg) => GitError::Internal { message: msg },
        }
    }
}

/// Result of committing one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit was created and the branch advanced to it.
    Created(Oid),
    /// The snapshot's tree is identical to the branch head; nothing was
    /// committed and the branch still points at this commit.
    Unchanged(Oid),
}

impl CommitOutcome {
    /// The commit the branch points at after this step.
    pub fn oid(&self) -> &Oid {
        match self {
            CommitOutcome::Created(oid) | CommitOutcome::Unchanged(oid) => oid,
        }
    }
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
    /// Parent commits
    pub parents: Vec<Oid>,
}

/// The Git interface.
///
/// This is the **single point of interaction** with the import
/// repository. No other module imports `git2`.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening
    // =========================================================================

    /// Open an existing bare repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if nothing usable is at `path`
    /// - [`GitError::NotBare`] if the repository has a working directory
    pub fn open_bare(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if !repo.is_bare() {
            return Err(GitError::NotBare {
                path: path.to_path_buf(),
            });
        }

        Ok(Self { repo })
    }

    /// Open a bare repository, creating it with `HEAD -> <branch>` if absent.
    pub fn open_or_init_bare(path: &Path, branch: &BranchName) -> Result<Self, GitError> {
        if path.exists() {
            return Self::open_bare(path);
        }

        let mut opts = git2::RepositoryInitOptions::new();
        opts.bare(true)
            .mkpath(true)
            .initial_head(&branch.refname());

        let repo = git2::Repository::init_opts(path, &opts)
            .map_err(|e| GitError::from_git2(e, &path.display().to_string()))?;

        Ok(Self { repo })
    }

    /// Path to the repository directory.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    // =========================================================================
    // Ref Reads
    // =========================================================================

    /// Resolve a branch to the commit it points at, if the branch exists.
    pub fn branch_head(&self, branch: &BranchName) -> Result<Option<Oid>, GitError> {
        let refname = branch.refname();
        match self.repo.find_reference(&refname) {
            Ok(reference) => {
                let commit = reference
                    .peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, &refname))?;
                Ok(Some(Oid::new(commit.id().to_string())?))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, &refname)),
        }
    }

    /// Read the primary branch head and every tag, peeled to commits.
    ///
    /// Tags that do not resolve to a commit (e.g. a tag on a blob) or
    /// whose name is not UTF-8 are not importer tags and are left out.
    pub fn references(&self, branch: &BranchName) -> Result<ReferenceSet, GitError> {
        let head = self.branch_head(branch)?;

        let mut tags = Vec::new();
        for reference in self.repo.references_glob("refs/tags/*")? {
            let reference = reference?;
            let Some(name) = reference.name().and_then(|n| n.strip_prefix("refs/tags/")) else {
                continue;
            };
            let Ok(commit) = reference.peel_to_commit() else {
                continue;
            };
            tags.push((name.to_string(), Oid::new(commit.id().to_string())?));
        }

        Ok(ReferenceSet::new(branch.clone(), head, tags))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Commit the full contents of `work_tree` on top of `branch`.
    ///
    /// The index is rebuilt from scratch, so files missing from this
    /// snapshot are deleted in the new commit. Ignore rules are bypassed:
    /// every file that ships in the snapshot is committed, including ones
    /// matched by its own `.gitignore` or the user's `core.excludesFile`.
    ///
    /// When the resulting tree equals the branch head's tree nothing is
    /// committed and [`CommitOutcome::Unchanged`] is returned.
    ///
    /// `author` defaults to the repository's configured identity; `date`
    /// defaults to now. The committer is the configured identity, or the
    /// author when none is configured.
    ///
    /// # Errors
    ///
    /// - [`GitError::NoIdentity`] if no author is given and none is configured
    pub fn commit_tree(
        &self,
        branch: &BranchName,
        work_tree: &Path,
        message: &str,
        author: Option<&AuthorIdentity>,
        date: Option<UtcTimestamp>,
    ) -> Result<CommitOutcome, GitError> {
        self.repo
            .set_workdir(work_tree, false)
            .map_err(|e| GitError::from_git2(e, &work_tree.display().to_string()))?;

        let mut index = self.repo.index()?;
        index.clear()?;
        index.add_all(["*"].iter(), git2::IndexAddOption::FORCE, None)?;
        let tree_id = index.write_tree()?;

        let refname = branch.refname();
        let parent = match self.branch_head(branch)? {
            Some(oid) => Some(self.find_commit(&oid)?),
            None => None,
        };

        if let Some(parent) = &parent {
            if parent.tree_id() == tree_id {
                return Ok(CommitOutcome::Unchanged(Oid::new(parent.id().to_string())?));
            }
        }

        let tree = self.repo.find_tree(tree_id)?;
        let (author_sig, committer_sig) = self.signatures(author, date)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let commit_id = self
            .repo
            .commit(
                Some(&refname),
                &author_sig,
                &committer_sig,
                &format!("{message}\n"),
                &tree,
                &parents,
            )
            .map_err(|e| GitError::from_git2(e, &refname))?;

        Ok(CommitOutcome::Created(Oid::new(commit_id.to_string())?))
    }

    /// Create a lightweight tag `name` at `target`.
    ///
    /// # Errors
    ///
    /// - [`GitError::TagExists`] if the tag is already present
    /// - [`GitError::InvalidRefName`] if `name` is not a valid tag name
    pub fn tag(&self, name: &str, target: &Oid) -> Result<(), GitError> {
        Self::validate_tag_name(name)?;
        let refname = format!("refs/tags/{name}");

        let commit = self.find_commit(target)?;
        match self.repo.tag_lightweight(name, commit.as_object(), false) {
            Ok(_) => Ok(()),
            Err(e) if e.code() == git2::ErrorCode::Exists => Err(GitError::TagExists {
                name: name.to_string(),
            }),
            Err(e) => Err(GitError::from_git2(e, &refname)),
        }
    }

    /// Check that `name` can be used as a tag, without touching the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::InvalidRefName`] if `refs/tags/<name>` is not a valid ref
    pub fn validate_tag_name(name: &str) -> Result<(), GitError> {
        if git2::Reference::is_valid_name(&format!("refs/tags/{name}")) {
            Ok(())
        } else {
            Err(GitError::InvalidRefName {
                message: format!("'{name}' is not a valid tag name"),
            })
        }
    }

    /// Author and committer signatures for a new commit.
    fn signatures(
        &self,
        author: Option<&AuthorIdentity>,
        date: Option<UtcTimestamp>,
    ) -> Result<(git2::Signature<'static>, git2::Signature<'static>), GitError> {
        let configured = self.repo.signature().ok();
        let author_time = date.unwrap_or_else(UtcTimestamp::now);

        let author_sig = match (author, &configured) {
            (Some(who), _) => signature(who.name(), who.email(), author_time)?,
            (None, Some(sig)) => signature(
                sig.name().unwrap_or_default(),
                sig.email().unwrap_or_default(),
                author_time,
            )?,
            (None, None) => return Err(GitError::NoIdentity),
        };

        let committer_sig = match configured {
            Some(sig) => sig,
            None => signature(
                author_sig.name().unwrap_or_default(),
                author_sig.email().unwrap_or_default(),
                UtcTimestamp::now(),
            )?,
        };

        Ok((author_sig, committer_sig))
    }

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        let git_oid =
            git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))?;
        self.repo
            .find_commit(git_oid)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    // =========================================================================
    // Commit Information
    // =========================================================================

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(oid)?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH);

        let parents = commit
            .parent_ids()
            .map(|id| Oid::new(id.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CommitInfo {
            oid: oid.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
            parents,
        })
    }
}

fn signature(
    name: &str,
    email: &str,
    when: UtcTimestamp,
) -> Result<git2::Signature<'static>, GitError> {
    let time = git2::Time::new(when.unix_seconds(), 0);
    git2::Signature::new(name, email, &time).map_err(|e| GitError::Internal {
        message: format!("invalid signature '{name} <{email}>': {}", e.message()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn master() -> BranchName {
        BranchName::new("master").unwrap()
    }

    fn author() -> AuthorIdentity {
        AuthorIdentity::parse("Apple <opensource@apple.com>").unwrap()
    }

    fn write_tree(dir: &Path, files: &[(&str, &str)]) {
        for (path, content) in files {
            let path = dir.join(path);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
    }

    mod git_error {
        use super::*;

        #[test]
        fn error_display_formatting() {
            let err = GitError::TagExists {
                name: "xnu-792".to_string(),
            };
            assert_eq!(err.to_string(), "tag already exists: xnu-792");
            assert!(GitError::NoIdentity.to_string().contains("--author"));
        }

        #[test]
        fn type_error_conversion() {
            let err: GitError = TypeError::InvalidOid("bad".into()).into();
            assert!(matches!(err, GitError::InvalidOid { .. }));
        }
    }

    mod commit_outcome {
        use super::*;

        #[test]
        fn oid_of_either_variant() {
            let oid = Oid::new("a".repeat(40)).unwrap();
            assert_eq!(CommitOutcome::Created(oid.clone()).oid(), &oid);
            assert_eq!(CommitOutcome::Unchanged(oid.clone()).oid(), &oid);
        }
    }

    mod repository {
        use super::*;

        #[test]
        fn init_creates_bare_repo() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("pkg.git");

            let git = Git::open_or_init_bare(&path, &master()).unwrap();
            assert!(path.join("HEAD").is_file());
            assert!(git.branch_head(&master()).unwrap().is_none());

            // Reopening finds the same repository.
            Git::open_or_init_bare(&path, &master()).unwrap();
        }

        #[test]
        fn open_missing_is_not_a_repo() {
            let dir = TempDir::new().unwrap();
            let err = Git::open_bare(&dir.path().join("missing.git")).unwrap_err();
            assert!(matches!(err, GitError::NotARepo { .. }));
        }

        #[test]
        fn non_bare_rejected() {
            let dir = TempDir::new().unwrap();
            git2::Repository::init(dir.path()).unwrap();
            let err = Git::open_bare(dir.path()).unwrap_err();
            assert!(matches!(err, GitError::NotBare { .. }));
        }
    }

    mod commits {
        use super::*;

        #[test]
        fn commit_with_author_and_date() {
            let dir = TempDir::new().unwrap();
            let git = Git::open_or_init_bare(&dir.path().join("pkg.git"), &master()).unwrap();
            let wt = dir.path().join("pkg-1.0");
            write_tree(&wt, &[("README", "one\n")]);

            let date = UtcTimestamp::from_unix_seconds(1_000_000_000).unwrap();
            let outcome = git
                .commit_tree(&master(), &wt, "pkg-1.0", Some(&author()), Some(date))
                .unwrap();

            let CommitOutcome::Created(oid) = outcome else {
                panic!("expected a new commit");
            };
            let info = git.commit_info(&oid).unwrap();
            assert_eq!(info.summary, "pkg-1.0");
            assert_eq!(info.author_name, "Apple");
            assert_eq!(info.author_email, "opensource@apple.com");
            assert_eq!(info.author_time.timestamp(), 1_000_000_000);
            assert!(info.parents.is_empty());
            assert_eq!(git.branch_head(&master()).unwrap(), Some(oid));
        }

        #[test]
        fn second_commit_has_parent_and_drops_deleted_files() {
            let dir = TempDir::new().unwrap();
            let git = Git::open_or_init_bare(&dir.path().join("pkg.git"), &master()).unwrap();

            let first = dir.path().join("pkg-1.0");
            write_tree(&first, &[("README", "one\n"), ("old.c", "int a;\n")]);
            let c1 = git
                .commit_tree(&master(), &first, "pkg-1.0", Some(&author()), None)
                .unwrap();

            let second = dir.path().join("pkg-1.1");
            write_tree(&second, &[("README", "two\n")]);
            let c2 = git
                .commit_tree(&master(), &second, "pkg-1.1", Some(&author()), None)
                .unwrap();

            let info = git.commit_info(c2.oid()).unwrap();
            assert_eq!(info.parents, vec![c1.oid().clone()]);

            let repo = git2::Repository::open(dir.path().join("pkg.git")).unwrap();
            let commit = repo
                .find_commit(git2::Oid::from_str(c2.oid().as_str()).unwrap())
                .unwrap();
            let tree = commit.tree().unwrap();
            assert!(tree.get_name("README").is_some());
            assert!(tree.get_name("old.c").is_none());
        }

        #[test]
        fn identical_tree_is_unchanged() {
            let dir = TempDir::new().unwrap();
            let git = Git::open_or_init_bare(&dir.path().join("pkg.git"), &master()).unwrap();

            let first = dir.path().join("a");
            write_tree(&first, &[("README", "same\n")]);
            let c1 = git
                .commit_tree(&master(), &first, "pkg-1.0", Some(&author()), None)
                .unwrap();

            let second = dir.path().join("b");
            write_tree(&second, &[("README", "same\n")]);
            let c2 = git
                .commit_tree(&master(), &second, "pkg-1.0.1", Some(&author()), None)
                .unwrap();

            assert_eq!(c2, CommitOutcome::Unchanged(c1.oid().clone()));
        }

        #[test]
        fn ignored_files_are_still_committed() {
            let dir = TempDir::new().unwrap();
            let git = Git::open_or_init_bare(&dir.path().join("pkg.git"), &master()).unwrap();
            let wt = dir.path().join("pkg-1.0");
            write_tree(
                &wt,
                &[(".gitignore", "*.o\n"), ("keep.o", "obj"), ("main.c", "int main;\n")],
            );

            let outcome = git
                .commit_tree(&master(), &wt, "pkg-1.0", Some(&author()), None)
                .unwrap();

            let repo = git2::Repository::open(dir.path().join("pkg.git")).unwrap();
            let tree = repo
                .find_commit(git2::Oid::from_str(outcome.oid().as_str()).unwrap())
                .unwrap()
                .tree()
                .unwrap();
            assert!(tree.get_name(".gitignore").is_some());
            assert!(tree.get_name("keep.o").is_some());
            assert!(tree.get_name("main.c").is_some());
        }
    }

    mod tags {
        use super::*;

        #[test]
        fn tags_show_up_in_references() {
            let dir = TempDir::new().unwrap();
            let git = Git::open_or_init_bare(&dir.path().join("pkg.git"), &master()).unwrap();
            let wt = dir.path().join("wt");
            write_tree(&wt, &[("README", "x\n")]);
            let outcome = git
                .commit_tree(&master(), &wt, "pkg-1.0", Some(&author()), None)
                .unwrap();

            git.tag("pkg-1.0", outcome.oid()).unwrap();
            git.tag("pkg-1.0.1", outcome.oid()).unwrap();

            let refs = git.references(&master()).unwrap();
            assert_eq!(refs.branch_head(), Some(outcome.oid()));
            assert_eq!(refs.tags().len(), 2);
            assert_eq!(refs.tags_by_oid()[outcome.oid()].len(), 2);
        }

        #[test]
        fn duplicate_tag_rejected() {
            let dir = TempDir::new().unwrap();
            let git = Git::open_or_init_bare(&dir.path().join("pkg.git"), &master()).unwrap();
            let wt = dir.path().join("wt");
            write_tree(&wt, &[("README", "x\n")]);
            let outcome = git
                .commit_tree(&master(), &wt, "pkg-1.0", Some(&author()), None)
                .unwrap();

            git.tag("pkg-1.0", outcome.oid()).unwrap();
            let err = git.tag("pkg-1.0", outcome.oid()).unwrap_err();
            assert!(matches!(err, GitError::TagExists { .. }));
        }

        #[test]
        fn invalid_tag_name_rejected() {
            let dir = TempDir::new().unwrap();
            let git = Git::open_or_init_bare(&dir.path().join("pkg.git"), &master()).unwrap();
            let oid = Oid::new("a".repeat(40)).unwrap();
            let err = git.tag("bad..name", &oid).unwrap_err();
            assert!(matches!(err, GitError::InvalidRefName { .. }));
        }

        #[test]
        fn tag_names_checked_up_front() {
            assert!(Git::validate_tag_name("pkg-1.0").is_ok());
            assert!(Git::validate_tag_name("xnu-792.6.76").is_ok());
            for bad in ["bad name-2", "pkg-2..1", "pkg-1.lock", "pkg~1", ""] {
                assert!(
                    matches!(
                        Git::validate_tag_name(bad),
                        Err(GitError::InvalidRefName { .. })
                    ),
                    "{bad:?} accepted"
                );
            }
        }
    }
}
