//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Merges CLI flags over the loaded configuration
//! 2. Calls the engine to scan, plan and execute
//! 3. Formats and displays output
//!
//! Handlers do NOT write to the repository directly.
//!
//! # Async Commands
//!
//! Listing and downloading go through the async [`SnapshotSource`]
//! trait, so `import` and `plan` build a tokio runtime and `block_on`
//! their async body.
//!
//! [`SnapshotSource`]: crate::source::SnapshotSource

mod completion;
mod import;
mod plan;
mod shared;

pub use completion::completion;
pub use import::import;
pub use plan::plan;

use crate::cli::args::Command;
use crate::engine::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Import(args) => import::import(ctx, &args),
        Command::Plan(args) => plan::plan(ctx, &args),
        Command::Completion { shell } => completion::completion(shell),
    }
}
