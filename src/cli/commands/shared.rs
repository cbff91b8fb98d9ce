//! shared - Helpers used by both `import` and `plan`
//!
//! Both commands resolve the same flags against the configuration, list
//! the same source, and read the same cutoff; only what happens to the
//! resulting plan differs.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::args::SourceArgs;
use crate::core::config::{schema, Config};
use crate::core::types::BranchName;
use crate::core::version::VersionFilename;
use crate::engine::{self, Context, ImportPlan};
use crate::git::Git;
use crate::source::{SnapshotSource, SourceKind};
use crate::ui::output;

/// Flags merged over configuration.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub target: String,
    pub repo: PathBuf,
    pub branch: BranchName,
    pub source: SourceKind,
}

/// Load the configuration, reporting where it came from in debug mode.
pub fn load_config(ctx: &Context) -> Result<Config> {
    let config = Config::load().context("Failed to load configuration")?;
    if let Some(path) = config.loaded_from() {
        output::debug(
            format!("config loaded from {}", path.display()),
            ctx.verbosity(),
        );
    }
    Ok(config)
}

/// Apply CLI overrides to the configuration.
pub fn resolve(ctx: &Context, args: &SourceArgs, config: &Config) -> Result<Resolved> {
    validate_target(&args.target)?;

    let branch = match &args.branch {
        Some(name) => BranchName::new(name.as_str())
            .with_context(|| format!("Invalid --branch '{}'", name))?,
        None => config.branch().clone(),
    };

    let source = match (&args.from_dir, &args.base_url) {
        (Some(dir), _) => SourceKind::Directory {
            root: ctx.resolve(dir),
        },
        (None, Some(url)) => SourceKind::Http {
            base_url: schema::validate_base_url(url).context("Invalid --base-url")?,
        },
        (None, None) => SourceKind::Http {
            base_url: config.base_url().to_string(),
        },
    };

    let repo = match &args.repo {
        Some(path) => ctx.resolve(path),
        None => ctx.resolve(Path::new(&format!("{}.git", args.target))),
    };

    Ok(Resolved {
        target: args.target.clone(),
        repo,
        branch,
        source,
    })
}

/// A target names one directory level on the source and the repository
/// path, so it must be a single non-empty component other than `.` or `..`.
fn validate_target(target: &str) -> Result<()> {
    if target.is_empty() || target.contains('/') || target.chars().all(|c| c == '.') {
        anyhow::bail!("invalid target '{}': expected a bare name like 'xnu'", target);
    }
    Ok(())
}

/// Open an existing repository and find the newest snapshot it holds.
pub fn read_cutoff(repo: &Path, branch: &BranchName) -> Result<VersionFilename> {
    let git = Git::open_bare(repo)
        .with_context(|| format!("Cannot update: no repository at {}", repo.display()))?;
    Ok(engine::scan_cutoff(&git, branch)?)
}

/// List the source and build the plan.
pub async fn list_and_plan(
    ctx: &Context,
    source: &dyn SnapshotSource,
    target: &str,
    cutoff: Option<&VersionFilename>,
) -> Result<ImportPlan> {
    output::debug(
        format!("listing {} via {} source", target, source.name()),
        ctx.verbosity(),
    );
    let listing = source
        .list(target)
        .await
        .with_context(|| format!("Failed to list tarballs for '{}'", target))?;
    output::debug(
        format!("found {}", output::plural(listing.len(), "tarball")),
        ctx.verbosity(),
    );

    if let Some(cutoff) = cutoff {
        output::debug(format!("update cutoff: {}", cutoff), ctx.verbosity());
    }

    Ok(engine::plan(&listing, cutoff))
}

/// Print a plan for humans, or as JSON.
pub fn show_plan(ctx: &Context, plan: &ImportPlan, json: bool) -> Result<()> {
    if json {
        output::json(plan)?;
        return Ok(());
    }

    let verbosity = ctx.verbosity();
    if plan.is_empty() {
        match &plan.cutoff {
            Some(cutoff) => output::print(format!("Already up to date at {}.", cutoff), verbosity),
            None => output::print("No tarballs found.", verbosity),
        }
        return Ok(());
    }

    output::print(
        format!("Would import {}:", output::plural(plan.len(), "tarball")),
        verbosity,
    );
    output::print(output::format_list(&plan.names(), "  "), verbosity);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_accepted() {
        for target in ["xnu", "Libc", "objc4", "pkg.name", ".hidden"] {
            assert!(validate_target(target).is_ok(), "{target:?} rejected");
        }
    }

    #[test]
    fn paths_and_dot_names_rejected() {
        for target in ["", "a/b", "/", ".", "..", "..."] {
            let err = validate_target(target).unwrap_err();
            assert!(err.to_string().contains("invalid target"), "{target:?}");
        }
    }
}
