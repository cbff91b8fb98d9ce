//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. Reading the import
//! repository's references, committing snapshots and tagging them all
//! flow through [`Git`]. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Opening or creating the bare import repository
//! - Materializing the branch head and tags as a [`ReferenceSet`]
//! - Committing an extracted snapshot with a fixed author and date
//! - Creating lightweight tags
//!
//! [`ReferenceSet`]: crate::core::refs::ReferenceSet

mod interface;

pub use interface::{CommitInfo, CommitOutcome, Git, GitError};
