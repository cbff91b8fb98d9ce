//! tarball-history - Rebuild a git history from versioned release tarballs
//!
//! Given a target name such as `xnu`, tarball-history lists every
//! `<target>-<version>.tar.gz` the archive publishes, orders them by the
//! numeric version in their names, and commits each one's contents in
//! turn to a bare repository, dated with the tarball's header timestamp
//! and tagged with its name. Re-running with `--update` picks up only the
//! releases newer than the one tagged at the branch head.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates the Scan -> Plan -> Execute lifecycle
//! - [`core`] - Domain types, version ordering, configuration, locking
//! - [`archive`] - Header dates and unpacking of gzip'd tar snapshots
//! - [`source`] - Listing and downloading snapshots (HTTP or local directory)
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - Output helpers
//!
//! # Correctness Invariants
//!
//! 1. Snapshots are imported in ascending version order, one at a time
//! 2. All repository writes flow through a single executor
//! 3. An update never re-imports a snapshot at or below the cutoff

pub mod archive;
pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod source;
pub mod ui;
