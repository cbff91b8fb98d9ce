//! archive
//!
//! Reading gzip-compressed tar snapshots.
//!
//! # Modules
//!
//! - [`header`] - Authorship date from the first entry's header
//! - [`unpack`] - Extracting a snapshot onto disk as a commit work tree
//!
//! Both operate on in-memory archive bytes and decompress through
//! `flate2`; the decoder is owned by the calling function and dropped on
//! every return path, including errors.

pub mod header;
pub mod unpack;

pub use header::{read_header_date, ArchiveError, HEADER_DATE_END, HEADER_DATE_OFFSET};
pub use unpack::{unpack, work_tree_for};
