//! tola-relocate - make prefixed static site output servable from any mount path.

mod cli;
mod config;
mod embed;
mod logger;
mod relocate;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;
use relocate::RunOptions;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(&cli)?;

    match &cli.command {
        Commands::Check { .. } => cli::check::check_config(&config),
        Commands::Run { dry_run, quiet, .. } => cli::run::run_relocate(
            &config,
            RunOptions {
                dry_run: *dry_run,
                quiet: *quiet,
            },
        ),
    }
}
