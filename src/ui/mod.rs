//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Verbosity-aware printing and summary formatting
//!
//! # Design
//!
//! All progress and diagnostic text goes through this module so that
//! `--quiet` and `--debug` behave the same in every command.

pub mod output;
