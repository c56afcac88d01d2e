//! Bounded-concurrency fan-out over a rewriter's file set.
//!
//! Each file is read, transformed and written on its own; no state is
//! shared between transforms besides the progress counters. The first
//! failing file stops the batch. Files already written stay written.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::{Context, Result, anyhow};
use parking_lot::Mutex;
use rayon::prelude::*;

use super::Rewriter;
use crate::{debug, log, logger::ProgressLine};

/// Outcome of one rewriter pass.
#[derive(Debug)]
pub struct RewriteReport {
    /// Rewriter name, as shown in progress and summaries.
    pub name: &'static str,
    /// Files the rewriter looked at.
    pub scanned: usize,
    /// Changed (or, in dry-run, would-change) files, relative to the output root.
    pub changed: Vec<PathBuf>,
}

/// Runs rewriters over file sets on a dedicated pool.
pub struct Batch<'a> {
    root: &'a Path,
    pool: rayon::ThreadPool,
    dry_run: bool,
    progress: Option<&'a ProgressLine>,
}

impl<'a> Batch<'a> {
    /// `concurrency` caps the number of in-flight file transforms.
    pub fn new(
        root: &'a Path,
        concurrency: usize,
        dry_run: bool,
        progress: Option<&'a ProgressLine>,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|i| format!("relocate-{i}"))
            .build()
            .context("failed to create rewriter thread pool")?;

        Ok(Self {
            root,
            pool,
            dry_run,
            progress,
        })
    }

    /// Apply `rewriter` to every file, stopping at the first error.
    pub fn run<R: Rewriter>(&self, rewriter: &R, files: &[PathBuf]) -> Result<RewriteReport> {
        let changed = Mutex::new(Vec::new());
        let has_error = AtomicBool::new(false);

        self.pool.install(|| {
            files.par_iter().try_for_each(|path| {
                if has_error.load(Ordering::Relaxed) {
                    return Err(anyhow!("Aborted"));
                }
                match self.apply(rewriter, path) {
                    Ok(true) => changed.lock().push(self.relative(path).to_path_buf()),
                    Ok(false) => {}
                    Err(e) => {
                        if !has_error.swap(true, Ordering::Relaxed) {
                            log!("error"; "{}: {:#}", path.display(), e);
                        }
                        return Err(e);
                    }
                }
                if let Some(p) = self.progress {
                    p.inc(rewriter.name());
                }
                Ok(())
            })
        })?;

        let mut changed = changed.into_inner();
        changed.sort();

        Ok(RewriteReport {
            name: rewriter.name(),
            scanned: files.len(),
            changed,
        })
    }

    /// Transform one file. Returns whether its content changed.
    fn apply<R: Rewriter>(&self, rewriter: &R, path: &Path) -> Result<bool> {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        if !rewriter.accepts(path, &bytes) {
            return Ok(false);
        }

        let Ok(content) = std::str::from_utf8(&bytes) else {
            debug!(rewriter.name(); "skipping non-UTF-8 file {}", path.display());
            return Ok(false);
        };

        let Some(rewritten) = rewriter.rewrite(self.relative(path), content) else {
            return Ok(false);
        };
        if rewritten == content {
            return Ok(false);
        }

        if !self.dry_run {
            fs::write(path, rewritten)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        Ok(true)
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.root).unwrap_or(path)
    }
}
