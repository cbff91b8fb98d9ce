//! archive::header
//!
//! Snapshot authorship date from the tar header.
//!
//! # Layout
//!
//! A tar stream is a sequence of 512-byte headers, each followed by its
//! entry's data. The fields this module needs are at fixed offsets:
//!
//! ```text
//! offset  size  field
//!      0   100  name
//!    100     8  mode
//!    108     8  owner id
//!    116     8  group id
//!    124    12  size
//!    136    12  modification time (octal seconds since the epoch)
//! ```
//!
//! Only the first 148 bytes of the decompressed stream are read; the rest
//! of the payload is never inflated.
//!
//! # Approximation
//!
//! The date of a whole snapshot is taken from its **first** entry, which is
//! normally the top-level directory written when the release was packaged.
//! That is an approximation of unknown accuracy. It is kept as-is because
//! changing it would change the history produced for existing imports.

use std::io::{ErrorKind, Read};

use flate2::read::GzDecoder;
use thiserror::Error;

use crate::core::types::UtcTimestamp;

/// Offset of the modification time field in a tar header.
pub const HEADER_DATE_OFFSET: usize = 100 + 8 + 8 + 8 + 12;

/// End (exclusive) of the modification time field.
pub const HEADER_DATE_END: usize = HEADER_DATE_OFFSET + 12;

/// Errors from reading or unpacking a snapshot.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The archive cannot be used: truncated, not gzip, or a bad date field.
    #[error("malformed archive: {reason}")]
    Malformed {
        /// What was wrong with it
        reason: String,
    },

    /// I/O failure while reading or extracting.
    #[error("archive i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    fn malformed(reason: impl Into<String>) -> Self {
        ArchiveError::Malformed {
            reason: reason.into(),
        }
    }
}

/// Read the modification time of the first entry of a `.tar.gz` stream.
///
/// # Errors
///
/// - [`ArchiveError::Malformed`] if the decompressed stream is shorter than
///   the header fields, is not a gzip stream, or the date field is not octal
/// - [`ArchiveError::Io`] if the underlying reader fails
///
/// # Example
///
/// ```
/// use tarball_history::archive::read_header_date;
///
/// let err = read_header_date(&b"not gzip at all"[..]).unwrap_err();
/// assert!(err.to_string().starts_with("malformed archive"));
/// ```
pub fn read_header_date<R: Read>(compressed: R) -> Result<UtcTimestamp, ArchiveError> {
    let mut decoder = GzDecoder::new(compressed);
    let mut head = [0u8; HEADER_DATE_END];

    decoder.read_exact(&mut head).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ArchiveError::malformed(format!(
            "stream ends before the first header's date field ({HEADER_DATE_END} bytes)"
        )),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            ArchiveError::malformed(format!("not a gzip stream: {e}"))
        }
        _ => ArchiveError::Io(e),
    })?;

    let seconds = parse_octal_field(&head[HEADER_DATE_OFFSET..HEADER_DATE_END])?;
    UtcTimestamp::from_unix_seconds(seconds)
        .ok_or_else(|| ArchiveError::malformed(format!("date {seconds} is out of range")))
}

/// Parse a 12-byte octal header field with at most one trailing NUL.
fn parse_octal_field(field: &[u8]) -> Result<i64, ArchiveError> {
    let digits = field.strip_suffix(b"\0").unwrap_or(field);

    if digits.is_empty() || !digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
        return Err(ArchiveError::malformed(format!(
            "date field is not octal: {:?}",
            String::from_utf8_lossy(field)
        )));
    }

    // At most 12 octal digits, which always fits in an i64.
    let text = std::str::from_utf8(digits).map_err(|e| ArchiveError::malformed(e.to_string()))?;
    i64::from_str_radix(text, 8).map_err(|e| ArchiveError::malformed(e.to_string()))
}
