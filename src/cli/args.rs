//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Rewrite prefixed static site output so it can be served from any mount path
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: relocate.toml)
    #[arg(short = 'C', long, global = true, default_value = "relocate.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Validate configuration and runtime scripts without touching any file
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: RelocateArgs,
    },

    /// Rewrite the output tree and inject the runtime scripts
    #[command(visible_alias = "r")]
    Run {
        #[command(flatten)]
        args: RelocateArgs,

        /// Report which files would change without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Hide the progress line
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Relocation overrides shared by all commands.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RelocateArgs {
    /// Enable or disable path relocation (overrides `relocate.enable`)
    #[arg(long = "prefix-paths", action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub prefix_paths: Option<bool>,

    /// Build-time prefix to relocate away from
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Runtime detection pattern (JS regex literal or bare source)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Append missing trailing slashes to links and the page URL
    #[arg(short = 'T', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub force_trailing_slash: Option<bool>,

    /// Inject the basename relocator runtime
    #[arg(short = 'B', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub use_basename: Option<bool>,

    /// Override site URL; its path component becomes the site path prefix.
    ///
    /// Example: tola-relocate run --site-url "https://gateway.example/__relocate__"
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// Maximum in-flight file transforms per rewriter
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

impl Cli {
    /// Relocation overrides of the active command.
    pub const fn relocate_args(&self) -> &RelocateArgs {
        match &self.command {
            Commands::Check { args } | Commands::Run { args, .. } => args,
        }
    }

    pub const fn is_run(&self) -> bool {
        matches!(self.command, Commands::Run { .. })
    }
}
