//! cli::commands::import
//!
//! Import release tarballs into a bare repository.
//!
//! # Algorithm
//!
//! 1. Merge flags over configuration (branch, author, date, tags, source)
//! 2. Open the repository (`--update`) or open-or-create it
//! 3. Take the import lock
//! 4. With `--update`, read the cutoff from the tag at the branch head
//! 5. List the source and plan
//! 6. Execute the plan and report
//!
//! `--dry-run` stops after step 5 and never creates the repository.
//!
//! # Example
//!
//! ```bash
//! # Fresh import
//! tbh import xnu
//!
//! # Incremental update with a custom author
//! tbh import xnu --update --author "Mirror Bot <bot@example.com>"
//! ```

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::shared;
use crate::cli::args::ImportArgs;
use crate::core::config::Config;
use crate::core::lock::ImportLock;
use crate::core::types::AuthorIdentity;
use crate::engine::{self, Context, Executor, ImportOptions, ImportPlan, ImportSummary};
use crate::git::Git;
use crate::source::create_source;
use crate::ui::output;

/// JSON report for a completed import.
#[derive(Debug, Serialize)]
struct ImportReport<'a> {
    plan: &'a ImportPlan,
    summary: &'a ImportSummary,
}

/// Run the import command.
///
/// This is a synchronous wrapper that uses tokio to run the async implementation.
pub fn import(ctx: &Context, args: &ImportArgs) -> Result<()> {
    let config = shared::load_config(ctx)?;
    let resolved = shared::resolve(ctx, &args.source, &config)?;
    let options = import_options(args, &config, &resolved)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(import_async(ctx, args, &resolved, &options))
}

/// Resolve commit settings: flag, then config, then default.
fn import_options(
    args: &ImportArgs,
    config: &Config,
    resolved: &shared::Resolved,
) -> Result<ImportOptions> {
    let author = if args.no_author {
        None
    } else if let Some(raw) = &args.author {
        Some(AuthorIdentity::parse(raw).with_context(|| format!("Invalid --author '{}'", raw))?)
    } else {
        config.author().cloned()
    };

    Ok(ImportOptions {
        branch: resolved.branch.clone(),
        author,
        date: args.date_flag().unwrap_or(config.date()),
        tags: args.tags_flag().unwrap_or(config.tags()),
        keep_going: args.keep_going,
    })
}

async fn import_async(
    ctx: &Context,
    args: &ImportArgs,
    resolved: &shared::Resolved,
    options: &ImportOptions,
) -> Result<()> {
    let verbosity = ctx.verbosity();
    let update = args.source.update;
    let source = create_source(&resolved.source)?;

    if args.dry_run {
        let cutoff = if update {
            Some(shared::read_cutoff(&resolved.repo, &resolved.branch)?)
        } else {
            None
        };
        let plan =
            shared::list_and_plan(ctx, source.as_ref(), &resolved.target, cutoff.as_ref()).await?;
        return shared::show_plan(ctx, &plan, args.source.json);
    }

    let git = if update {
        Git::open_bare(&resolved.repo).with_context(|| {
            format!("Cannot update: no repository at {}", resolved.repo.display())
        })?
    } else {
        Git::open_or_init_bare(&resolved.repo, &resolved.branch).with_context(|| {
            format!("Failed to open or create {}", resolved.repo.display())
        })?
    };
    output::debug(format!("repository: {}", git.git_dir().display()), verbosity);

    let _lock = ImportLock::acquire(git.git_dir())?;

    let cutoff = if update {
        Some(engine::scan_cutoff(&git, &resolved.branch)?)
    } else {
        if git.branch_head(&resolved.branch)?.is_some() {
            output::warn(
                format!(
                    "{} already has history; importing on top of it \
                     (use --update to import only newer tarballs)",
                    resolved.branch
                ),
                verbosity,
            );
        }
        None
    };

    let plan =
        shared::list_and_plan(ctx, source.as_ref(), &resolved.target, cutoff.as_ref()).await?;

    if plan.is_empty() {
        return shared::show_plan(ctx, &plan, args.source.json);
    }

    let executor = Executor::new(&git, source.as_ref(), options, verbosity);
    let summary = executor.execute(&resolved.target, &plan).await?;

    if args.source.json {
        output::json(&ImportReport {
            plan: &plan,
            summary: &summary,
        })?;
        return Ok(());
    }

    let mut message = format!(
        "Imported {} into {} ({}, {})",
        output::plural(summary.snapshots.len(), "tarball"),
        resolved.repo.display(),
        output::plural(summary.committed(), "commit"),
        output::plural(summary.tagged(), "tag"),
    );
    if !summary.skipped.is_empty() {
        message.push_str(&format!("; skipped {}", summary.skipped.join(", ")));
    }
    output::success(message, verbosity);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    fn args(extra: &[&str]) -> ImportArgs {
        let argv = ["tbh", "import", "xnu"].into_iter().chain(extra.iter().copied());
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Import(args) => args,
            _ => panic!("expected import"),
        }
    }

    fn resolved() -> shared::Resolved {
        shared::Resolved {
            target: "xnu".to_string(),
            repo: PathBuf::from("xnu.git"),
            branch: crate::core::types::BranchName::new("master").unwrap(),
            source: crate::source::SourceKind::Directory {
                root: PathBuf::from("."),
            },
        }
    }

    fn config() -> Config {
        Config::from_file(Default::default(), None).unwrap()
    }

    #[test]
    fn config_defaults_apply() {
        let opts = import_options(&args(&[]), &config(), &resolved()).unwrap();
        assert!(opts.date);
        assert!(opts.tags);
        assert_eq!(opts.author.unwrap().name(), "Apple");
    }

    #[test]
    fn flags_override_config() {
        let opts = import_options(
            &args(&["--no-date", "--no-tags", "--author", "Bot <bot@example.com>"]),
            &config(),
            &resolved(),
        )
        .unwrap();
        assert!(!opts.date);
        assert!(!opts.tags);
        assert_eq!(opts.author.unwrap().email(), "bot@example.com");
    }

    #[test]
    fn no_author_clears_author() {
        let opts = import_options(&args(&["--no-author"]), &config(), &resolved()).unwrap();
        assert!(opts.author.is_none());
    }

    #[test]
    fn malformed_author_rejected() {
        let err = import_options(&args(&["--author", "nobody"]), &config(), &resolved())
            .unwrap_err();
        assert!(err.to_string().contains("--author"));
    }
}
