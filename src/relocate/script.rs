//! JavaScript rewriting: prefixed string literals become references to
//! the runtime prefix global.
//!
//! ```text
//! "/__relocate__"          ->   __relocate__
//! "/__relocate__/app.js"   ->   __relocate__ + "/app.js"
//! ```
//!
//! Every rewritten file starts with a guard that defines the global as an
//! empty string when the detector has not run, so the bundle still loads
//! from the site root.

use std::path::Path;

use anyhow::Result;
use regex::{Captures, Regex};

use super::Rewriter;
use crate::config::RelocateConfig;

/// One quote style; the regex engine has no back-references.
struct QuotedPatterns {
    quote: char,
    standalone: Regex,
    path: Regex,
}

impl QuotedPatterns {
    fn new(prefix: &str, quote: char) -> Result<Self> {
        let p = regex::escape(prefix);
        Ok(Self {
            quote,
            standalone: Regex::new(&format!("{quote}/{p}{quote}"))?,
            path: Regex::new(&format!(r"{quote}/{p}/([^{quote}\\\n]*){quote}"))?,
        })
    }
}

pub struct ScriptRewriter {
    prefix: String,
    guard: String,
    quoted: [QuotedPatterns; 2],
}

impl ScriptRewriter {
    pub fn new(config: &RelocateConfig) -> Result<Self> {
        let prefix = &config.prefix;
        Ok(Self {
            prefix: prefix.clone(),
            guard: format!("if(typeof {prefix}==='undefined'){{globalThis.{prefix}=''}}"),
            quoted: [
                QuotedPatterns::new(prefix, '"')?,
                QuotedPatterns::new(prefix, '\'')?,
            ],
        })
    }
}

impl Rewriter for ScriptRewriter {
    fn name(&self) -> &'static str {
        "scripts"
    }

    fn rewrite(&self, _rel: &Path, content: &str) -> Option<String> {
        if !content.contains(&self.prefix) || content.starts_with(&self.guard) {
            return None;
        }

        let standalone = format!(" {} ", self.prefix);
        let mut output = content.to_string();
        for quoted in &self.quoted {
            output = quoted
                .standalone
                .replace_all(&output, regex::NoExpand(&standalone))
                .into_owned();
            output = quoted
                .path
                .replace_all(&output, |caps: &Captures| {
                    format!(" {} + {q}/{}{q}", self.prefix, &caps[1], q = quoted.quote)
                })
                .into_owned();
        }

        Some(format!("{}{output}", self.guard))
    }
}
