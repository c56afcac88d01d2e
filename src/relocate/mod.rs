//! Output tree relocation.
//!
//! # Pipeline
//!
//! Four rewriters run strictly one after another over the same output tree,
//! each fanning out over its own file set:
//!
//! | Step | Rewriter                 | Files                 |
//! |------|--------------------------|-----------------------|
//! | 1    | [`markup::MarkupRewriter`] | HTML                |
//! | 2    | [`asset::AssetRewriter`]   | other text files    |
//! | 3    | [`script::ScriptRewriter`] | JavaScript          |
//! | 4    | [`inject::ScriptInjector`] | HTML                |
//!
//! The file set is collected once up front; no rewriter renames or deletes.
//! The injector only changes (and reports) documents that have a `<head>`,
//! or a `</body>` when the basename relocator is enabled.

mod asset;
mod batch;
mod inject;
mod markup;
mod path;
mod script;
mod select;

pub use batch::RewriteReport;
pub use inject::ScriptInjector;

use std::path::Path;

use anyhow::Result;

use crate::config::SiteConfig;
use crate::logger::ProgressLine;
use asset::AssetRewriter;
use batch::Batch;
use markup::MarkupRewriter;
use path::PrefixPath;
use script::ScriptRewriter;
use select::{FileKind, FileSelector};

/// A text-to-text transform applied to one file at a time.
pub trait Rewriter: Sync {
    /// Counter name in progress lines and summaries.
    fn name(&self) -> &'static str;

    /// Whether to look at this file at all, given its raw bytes.
    fn accepts(&self, _path: &Path, _bytes: &[u8]) -> bool {
        true
    }

    /// New content for the file at `rel` (relative to the output root), or
    /// `None` to leave it untouched.
    fn rewrite(&self, rel: &Path, content: &str) -> Option<String>;
}

/// Options of a pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Report changes without writing.
    pub dry_run: bool,
    /// Hide the progress line.
    pub quiet: bool,
}

/// Run every rewriter over the configured output tree.
///
/// All rewriters are built before the first file is touched, so a runtime
/// script that fails to render aborts with the tree intact.
pub fn relocate_site(config: &SiteConfig, options: RunOptions) -> Result<Vec<RewriteReport>> {
    let relocate = &config.relocate;
    let root = config.output_dir();

    let markup = MarkupRewriter::new(relocate)?;
    let assets = AssetRewriter::new(relocate)?;
    let scripts = ScriptRewriter::new(relocate)?;
    let injector = ScriptInjector::new(relocate)?;

    let selector = FileSelector::new(root, &relocate.exclude);
    let markup_files = selector.select(FileKind::Markup);
    let asset_files = selector.select(FileKind::Asset);
    let script_files = selector.select(FileKind::Script);

    let progress = (!options.quiet).then(|| {
        ProgressLine::new(&[
            (markup.name(), markup_files.len()),
            (assets.name(), asset_files.len()),
            (scripts.name(), script_files.len()),
            (injector.name(), markup_files.len()),
        ])
    });

    let batch = Batch::new(root, relocate.concurrency, options.dry_run, progress.as_ref())?;
    let reports = vec![
        batch.run(&markup, &markup_files)?,
        batch.run(&assets, &asset_files)?,
        batch.run(&scripts, &script_files)?,
        batch.run(&injector, &markup_files)?,
    ];
    drop(batch);

    if let Some(p) = progress {
        p.finish();
    }

    Ok(reports)
}
