//! source::local
//!
//! Snapshots read from a local directory.
//!
//! Useful for mirrors that were downloaded ahead of time and for tests.
//! The directory is searched for `<root>/<target>/` first; if that does not
//! exist the tarballs are expected directly in `<root>`, which may hold
//! several packages, so only `<target>-*` names are listed from it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::normalize_listing;
use super::traits::{SnapshotSource, SourceError};
use crate::core::version::VersionFilename;

/// Local directory source.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory holding `target`'s tarballs.
    pub fn dir_for(&self, target: &str) -> PathBuf {
        let nested = self.root.join(target);
        if nested.is_dir() {
            nested
        } else {
            self.root.clone()
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> SourceError {
    if err.kind() == std::io::ErrorKind::NotFound {
        SourceError::NotFound(path.display().to_string())
    } else {
        SourceError::Io(format!("{}: {}", path.display(), err))
    }
}

#[async_trait]
impl SnapshotSource for DirectorySource {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn list(&self, target: &str) -> Result<Vec<VersionFilename>, SourceError> {
        let dir = self.dir_for(target);
        let entries = std::fs::read_dir(&dir).map_err(|e| io_error(&dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_error(&dir, e))?;
            if !entry.path().is_file() {
                continue;
            }
            // Non-UTF-8 names cannot be archive names we know how to order.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        let mut listing = normalize_listing(names);
        if dir == self.root {
            let prefix = format!("{target}-");
            listing.retain(|file| file.stem().starts_with(&prefix));
        }
        Ok(listing)
    }

    async fn fetch(&self, target: &str, file: &VersionFilename) -> Result<Vec<u8>, SourceError> {
        let path = self.dir_for(target).join(file.as_str());
        std::fs::read(&path).map_err(|e| io_error(&path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, content: &[u8]) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn lists_archives_in_root() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pkg-10.tar.gz", b"");
        touch(dir.path(), "pkg-9.tar.gz", b"");
        touch(dir.path(), "README", b"");
        std::fs::create_dir(dir.path().join("pkg-11.tar.gz")).unwrap();

        let source = DirectorySource::new(dir.path());
        let names: Vec<String> = source
            .list("pkg")
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["pkg-9.tar.gz", "pkg-10.tar.gz"]);
    }

    #[tokio::test]
    async fn flat_root_lists_only_the_target() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "pkg-1.tar.gz", b"");
        touch(dir.path(), "other-2.tar.gz", b"");
        touch(dir.path(), "pkgfoo-3.tar.gz", b"");
        touch(dir.path(), "bad name-2.tar.gz", b"");

        let source = DirectorySource::new(dir.path());
        let names: Vec<String> = source
            .list("pkg")
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["pkg-1.tar.gz"]);
    }

    #[tokio::test]
    async fn prefers_target_subdirectory() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        touch(&dir.path().join("pkg"), "pkg-1.tar.gz", b"nested");
        touch(dir.path(), "other-1.tar.gz", b"");

        let source = DirectorySource::new(dir.path());
        let listing = source.list("pkg").await.unwrap();
        assert_eq!(listing.len(), 1);

        let bytes = source.fetch("pkg", &listing[0]).await.unwrap();
        assert_eq!(bytes, b"nested");
    }

    #[tokio::test]
    async fn missing_directory_is_not_found() {
        let source = DirectorySource::new("/nonexistent/tarball-history-test");
        let err = source.list("pkg").await.unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = DirectorySource::new(dir.path());
        let err = source
            .fetch("pkg", &VersionFilename::parse("pkg-1.tar.gz"))
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotFound(_)));
    }
}
