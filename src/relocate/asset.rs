//! Rewriting for every other text file in the output tree (CSS, JSON,
//! SVG, manifests, ...). Binary files are recognized and left untouched.

use std::path::Path;

use anyhow::Result;

use super::{PrefixPath, Rewriter};
use crate::config::RelocateConfig;
use crate::utils::mime;

pub struct AssetRewriter {
    prefix: PrefixPath,
}

impl AssetRewriter {
    pub fn new(config: &RelocateConfig) -> Result<Self> {
        Ok(Self {
            prefix: PrefixPath::new(&config.prefix)?,
        })
    }
}

impl Rewriter for AssetRewriter {
    fn name(&self) -> &'static str {
        "assets"
    }

    /// Text by extension, or by content when the extension is unknown.
    fn accepts(&self, path: &Path, bytes: &[u8]) -> bool {
        let mime = mime::from_path(path);
        mime::is_text(mime) || (mime::is_unknown(mime) && mime::looks_like_text(bytes))
    }

    fn rewrite(&self, rel: &Path, content: &str) -> Option<String> {
        if !self.prefix.mentioned_in(content) {
            return None;
        }
        Some(self.prefix.relativize(content, rel).into_owned())
    }
}
