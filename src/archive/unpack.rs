//! archive::unpack
//!
//! Extract a snapshot onto disk so its contents can be committed.

use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use super::header::ArchiveError;

/// Extract a `.tar.gz` archive into `dest`.
///
/// Entry modification times are preserved. `tar` drops `..` entries and
/// leading `/` so nothing is written outside `dest`.
///
/// # Errors
///
/// - [`ArchiveError::Malformed`] if the stream is not a valid gzip'd tar
/// - [`ArchiveError::Io`] if writing to `dest` fails
pub fn unpack(archive_bytes: &[u8], dest: &Path) -> Result<(), ArchiveError> {
    let mut archive = tar::Archive::new(GzDecoder::new(archive_bytes));
    archive.set_preserve_mtime(true);
    archive.set_overwrite(true);

    archive.unpack(dest).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData
        | std::io::ErrorKind::InvalidInput
        | std::io::ErrorKind::UnexpectedEof => ArchiveError::Malformed {
            reason: format!("cannot unpack: {e}"),
        },
        _ => ArchiveError::Io(e),
    })
}

/// The directory to commit for a snapshot unpacked into `dest`.
///
/// Release tarballs conventionally hold a single `<stem>/` directory
/// (`xnu-792.tar.gz` unpacks to `xnu-792/`). When that directory exists it
/// is the work tree; otherwise the whole extraction directory is used.
pub fn work_tree_for(dest: &Path, stem: &str) -> PathBuf {
    let nested = dest.join(stem);
    if !stem.is_empty() && nested.is_dir() {
        nested
    } else {
        dest.to_path_buf()
    }
}
