//! `run` command: rewrite the output tree after the site build.

use anyhow::Result;

use crate::config::SiteConfig;
use crate::relocate::{RewriteReport, RunOptions, relocate_site};
use crate::utils::plural_count;
use crate::{debug, log};

pub fn run_relocate(config: &SiteConfig, options: RunOptions) -> Result<()> {
    if !config.relocate.enable {
        log!(
            "relocate";
            "disabled, leaving {} untouched",
            config.root_relative(config.output_dir()).display()
        );
        return Ok(());
    }

    debug!(
        "relocate";
        "prefix `{}` in {} ({} workers)",
        config.relocate.prefix,
        config.root_relative(config.output_dir()).display(),
        config.relocate.concurrency
    );

    let reports = relocate_site(config, options)?;
    for report in &reports {
        log_report(report, options.dry_run);
    }

    log!("done"; "{}", if options.dry_run { "dry run, nothing written" } else { "relocated" });
    Ok(())
}

fn log_report(report: &RewriteReport, dry_run: bool) {
    let verb = if dry_run { "would change" } else { "changed" };
    log!(
        report.name;
        "{} {} of {}",
        verb,
        plural_count(report.changed.len(), "file"),
        report.scanned
    );
    if dry_run {
        for path in &report.changed {
            log!(report.name; "  {}", path.display());
        }
    } else {
        for path in &report.changed {
            debug!(report.name; "  {}", path.display());
        }
    }
}
