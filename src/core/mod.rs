//! core
//!
//! Core domain types, schemas, and operations for tarball-history.
//!
//! # Modules
//!
//! - [`types`] - Strong types: BranchName, Oid, AuthorIdentity, UtcTimestamp
//! - [`version`] - Version extraction from archive names and their ordering
//! - [`refs`] - Read-only view of a repository's branch head and tags
//! - [`config`] - Configuration schema and loading
//! - [`lock`] - Exclusive import lock
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing
//! - Ordering and resolution are pure functions over these types

pub mod config;
pub mod lock;
pub mod refs;
pub mod types;
pub mod version;
