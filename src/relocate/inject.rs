//! Runtime script injection into HTML documents.
//!
//! The prefix detector goes right after `<head>` so it runs before any
//! other script; the basename relocator goes right before `</body>`.
//! Injected tags carry [`MARKER`], and documents that already hold such a
//! tag are skipped, so re-running the pipeline never injects twice.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Result, anyhow};
use regex::Regex;

use super::Rewriter;
use crate::config::RelocateConfig;
use crate::embed::runtime::{BASENAME_JS, DetectorVars, HEAD_PREFIX_JS, RelocatorVars};
use crate::utils::minify::minify_js;

/// Attribute present on every injected script tag.
pub const MARKER: &str = "data-tola-relocate";

/// Opening tag of an injected script, as written by [`script_tag`].
const MARKER_TAG: &str = "<script data-tola-relocate>";

/// Whether the runtime was already injected into this document.
pub fn is_injected(content: &str) -> bool {
    content.contains(MARKER_TAG)
}

/// Opening head tag, with or without attributes (never `<header>`).
static HEAD_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<head(?:[ \t\r\n][^>]*)?>").unwrap());

const BODY_CLOSE: &str = "</body>";

pub struct ScriptInjector {
    detector: String,
    relocator: Option<String>,
}

impl ScriptInjector {
    /// Render (and optionally minify) the runtime scripts once for all files.
    pub fn new(config: &RelocateConfig) -> Result<Self> {
        let detector = HEAD_PREFIX_JS.render(&DetectorVars::from_config(config));
        let detector = Self::prepare(config, detector, "prefix detector")?;

        let relocator = if config.use_basename {
            let relocator = BASENAME_JS.render(&RelocatorVars::from_config(config));
            Some(Self::prepare(config, relocator, "basename relocator")?)
        } else {
            None
        };

        Ok(Self {
            detector: script_tag(&detector),
            relocator: relocator.as_deref().map(script_tag),
        })
    }

    fn prepare(config: &RelocateConfig, source: String, what: &str) -> Result<String> {
        if !config.minify {
            return Ok(source);
        }
        minify_js(&source).ok_or_else(|| {
            anyhow!(
                "failed to minify the {what} runtime, check `relocate.pattern` ('{}')",
                config.pattern
            )
        })
    }

    /// Size of the injected markup per document, for logging.
    pub fn injected_len(&self) -> usize {
        self.detector.len() + self.relocator.as_ref().map_or(0, String::len)
    }
}

fn script_tag(js: &str) -> String {
    format!("<script {MARKER}>{js}</script>")
}

impl Rewriter for ScriptInjector {
    fn name(&self) -> &'static str {
        "inject"
    }

    fn rewrite(&self, _rel: &Path, content: &str) -> Option<String> {
        if is_injected(content) {
            return None;
        }

        let mut output = String::with_capacity(content.len() + self.injected_len());
        let mut injected = false;

        match HEAD_OPEN.find(content) {
            Some(head) => {
                output.push_str(&content[..head.end()]);
                output.push_str(&self.detector);
                output.push_str(&content[head.end()..]);
                injected = true;
            }
            None => output.push_str(content),
        }

        if let Some(relocator) = &self.relocator
            && let Some(pos) = output.rfind(BODY_CLOSE)
        {
            output.insert_str(pos, relocator);
            injected = true;
        }

        injected.then_some(output)
    }
}
