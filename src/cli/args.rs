//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug` / `--verbose`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// tarball-history - Rebuild a git history from versioned release tarballs
#[derive(Parser, Debug)]
#[command(name = "tbh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if tbh was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, visible_alias = "verbose", global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import release tarballs into a bare repository
    #[command(
        name = "import",
        long_about = "Import every release tarball of a target into a bare git repository.\n\n\
            Tarballs are listed from the archive index, ordered by the version number in \
            their names, and committed oldest first on the primary branch. Each commit is \
            dated with the tarball's header date and tagged with the tarball's name.\n\n\
            With --update, only tarballs newer than the one tagged at the branch head are \
            imported.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Build xnu.git from every published xnu tarball
    tbh import xnu

    # Later, pick up new releases only
    tbh import xnu --update

    # Import from tarballs already on disk
    tbh import xnu --from-dir ~/mirror/tarballs

    # Preview without touching the repository
    tbh import xnu --update --dry-run"
    )]
    Import(ImportArgs),

    /// Show which tarballs an import would process
    #[command(
        name = "plan",
        long_about = "List the tarballs an import would process, in import order.\n\n\
            Nothing is downloaded except the archive index, and the repository is only \
            read (for --update).",
        after_help = "\
WORKFLOW EXAMPLES:
    # Everything, oldest first
    tbh plan xnu

    # What --update would pick up
    tbh plan xnu --update --json"
    )]
    Plan(PlanArgs),

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tbh.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash
    tbh completion bash > ~/.local/share/bash-completion/completions/tbh

    # Zsh
    tbh completion zsh > ~/.zfunc/_tbh"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where tarballs come from and which repository state to compare against.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Target name (e.g. `xnu`); tarballs are `<target>-<version>.tar.gz`
    pub target: String,

    /// Bare repository to import into [default: <target>.git]
    #[arg(long)]
    pub repo: Option<PathBuf>,

    /// Archive root URL (overrides config)
    #[arg(long, value_name = "URL", conflicts_with = "from_dir")]
    pub base_url: Option<String>,

    /// Read tarballs from a local directory instead of the archive
    #[arg(long, value_name = "DIR")]
    pub from_dir: Option<PathBuf>,

    /// Only import tarballs newer than the one tagged at the branch head
    #[arg(long)]
    pub update: bool,

    /// Primary branch (overrides config)
    #[arg(long)]
    pub branch: Option<String>,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `tbh plan`.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Arguments for `tbh import`.
#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Date commits with the tarball header date
    #[arg(long, overrides_with = "no_date")]
    pub date: bool,

    /// Date commits with the current time
    #[arg(long, overrides_with = "date")]
    pub no_date: bool,

    /// Tag each imported tarball
    #[arg(long, overrides_with = "no_tags")]
    pub tags: bool,

    /// Do not create tags
    #[arg(long, overrides_with = "tags")]
    pub no_tags: bool,

    /// Commit author as "Name <email>" (overrides config)
    #[arg(long, value_name = "NAME <EMAIL>", conflicts_with = "no_author")]
    pub author: Option<String>,

    /// Use the repository's own identity as author
    #[arg(long)]
    pub no_author: bool,

    /// Print the plan without touching the repository
    #[arg(long)]
    pub dry_run: bool,

    /// Skip tarballs whose header date cannot be read
    #[arg(long)]
    pub keep_going: bool,
}

impl ImportArgs {
    /// `--date` / `--no-date`, or `None` to use the config value.
    pub fn date_flag(&self) -> Option<bool> {
        flag_pair(self.date, self.no_date)
    }

    /// `--tags` / `--no-tags`, or `None` to use the config value.
    pub fn tags_flag(&self) -> Option<bool> {
        flag_pair(self.tags, self.no_tags)
    }
}

fn flag_pair(yes: bool, no: bool) -> Option<bool> {
    if no {
        Some(false)
    } else if yes {
        Some(true)
    } else {
        None
    }
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("tbh").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_defaults() {
        let cli = parse(&["import", "xnu"]);
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.source.target, "xnu");
        assert!(!args.source.update);
        assert_eq!(args.date_flag(), None);
        assert_eq!(args.tags_flag(), None);
        assert!(args.author.is_none());
    }

    #[test]
    fn negated_flags() {
        let cli = parse(&["import", "xnu", "--no-date", "--no-tags", "--no-author"]);
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.date_flag(), Some(false));
        assert_eq!(args.tags_flag(), Some(false));
        assert!(args.no_author);
    }

    #[test]
    fn last_of_date_pair_wins() {
        let cli = parse(&["import", "xnu", "--no-date", "--date"]);
        let Command::Import(args) = cli.command else {
            panic!("expected import");
        };
        assert_eq!(args.date_flag(), Some(true));
    }

    #[test]
    fn author_conflicts_with_no_author() {
        let result = Cli::try_parse_from([
            "tbh",
            "import",
            "xnu",
            "--author",
            "A <a@b>",
            "--no-author",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn verbose_is_debug() {
        let cli = parse(&["--verbose", "plan", "xnu"]);
        assert!(cli.debug);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["plan", "xnu", "--update", "-q"]);
        assert!(cli.quiet);
        let Command::Plan(args) = cli.command else {
            panic!("expected plan");
        };
        assert!(args.source.update);
    }
}
