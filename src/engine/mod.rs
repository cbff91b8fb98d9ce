//! engine
//!
//! Orchestrates an import: Scan -> Plan -> Execute.
//!
//! # Architecture
//!
//! 1. **Scan**: Read the repository's references and find where a previous
//!    import stopped ([`scan::scan_cutoff`]). Skipped on a fresh import.
//! 2. **Plan**: Filter the sorted listing against that cutoff
//!    ([`plan::plan`]). Pure, previewable with `tbh plan`.
//! 3. **Execute**: Fetch, date, unpack, commit and tag each planned
//!    snapshot in order ([`exec::Executor`]).
//!
//! # Invariants
//!
//! - Scan and Plan never write to the repository
//! - All mutations flow through the Executor
//! - An empty plan is "up to date", not an error

pub mod exec;
pub mod plan;
pub mod scan;

pub use exec::{ExecuteError, Executor, ImportOptions, ImportSummary, SnapshotRecord};
pub use plan::{plan, ImportPlan};
pub use scan::{resolve_cutoff, scan_cutoff, ResolveError, ScanError};

use std::path::{Path, PathBuf};

use crate::ui::output::Verbosity;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
}

impl Context {
    /// Output verbosity for these flags.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Resolve `path` against the working directory override, if any.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match &self.cwd {
            Some(cwd) if path.is_relative() => cwd.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_follows_flags() {
        let ctx = Context {
            debug: true,
            ..Default::default()
        };
        assert_eq!(ctx.verbosity(), Verbosity::Debug);

        let ctx = Context {
            debug: true,
            quiet: true,
            ..Default::default()
        };
        assert_eq!(ctx.verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn resolve_relative_against_cwd() {
        let ctx = Context {
            cwd: Some(PathBuf::from("/work")),
            ..Default::default()
        };
        assert_eq!(ctx.resolve(Path::new("xnu.git")), PathBuf::from("/work/xnu.git"));
        assert_eq!(ctx.resolve(Path::new("/abs.git")), PathBuf::from("/abs.git"));
    }

    #[test]
    fn resolve_without_cwd_is_identity() {
        let ctx = Context::default();
        assert_eq!(ctx.resolve(Path::new("xnu.git")), PathBuf::from("xnu.git"));
    }
}
