//! `[relocate]` section configuration.
//!
//! Controls the post-build rewrite of prefixed output.
//!
//! # Example
//!
//! ```toml
//! [relocate]
//! enable = true                  # Run the rewriters (the "prefix paths" switch)
//! prefix = "__relocate__"        # Build-time prefix, also the runtime global's name
//! pattern = "/^\\/(ipfs|ipns|bzz)\\/[^/]+/"   # Detects the live mount prefix in the browser
//! force_trailing_slash = false   # Normalize missing trailing slashes (links and page URL)
//! use_basename = false           # Inject the DOM relocator runtime
//! output = "public"              # Output tree (relative to site root)
//! concurrency = 10               # In-flight file transforms per rewriter
//! minify = true                  # Minify injected runtime scripts
//! exclude = ["**/*.map"]         # Globs skipped by every rewriter
//! ```

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::section::SiteSectionConfig;
use crate::config::{ConfigDiagnostics, FieldPath};
use crate::embed::runtime::{DetectorVars, HEAD_PREFIX_JS};
use crate::utils::minify::parses_as_js;

/// Default number of in-flight file transforms.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Relocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelocateConfig {
    /// Run the rewriters at all.
    pub enable: bool,

    /// Literal path segment to relocate away from.
    pub prefix: String,

    /// Regex (JS literal or bare source) matching the live mount prefix.
    pub pattern: String,

    /// Append missing trailing slashes to anchor hrefs and the page URL.
    pub force_trailing_slash: bool,

    /// Inject the basename relocator runtime.
    pub use_basename: bool,

    /// Output directory to rewrite in place.
    pub output: PathBuf,

    /// Maximum in-flight file transforms per rewriter.
    pub concurrency: usize,

    /// Minify injected runtime scripts.
    pub minify: bool,

    /// Glob patterns (relative to output) excluded from every rewriter.
    pub exclude: Vec<String>,
}

impl Default for RelocateConfig {
    fn default() -> Self {
        Self {
            enable: true,
            prefix: String::new(),
            pattern: String::new(),
            force_trailing_slash: false,
            use_basename: false,
            output: "public".into(),
            concurrency: DEFAULT_CONCURRENCY,
            minify: true,
            exclude: Vec::new(),
        }
    }
}

/// Field paths of `[relocate]`.
pub struct RelocateFields {
    pub prefix: FieldPath,
    pub pattern: FieldPath,
    pub output: FieldPath,
    pub concurrency: FieldPath,
    pub exclude: FieldPath,
}

/// The prefix is emitted as a bare script identifier and names a global.
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap());

impl RelocateConfig {
    pub const FIELDS: RelocateFields = RelocateFields {
        prefix: FieldPath::new("relocate.prefix"),
        pattern: FieldPath::new("relocate.pattern"),
        output: FieldPath::new("relocate.output"),
        concurrency: FieldPath::new("relocate.concurrency"),
        exclude: FieldPath::new("relocate.exclude"),
    };

    /// Validate relocation settings. Only called when `enable` is set.
    ///
    /// # Checks
    /// - `prefix` is non-empty and a valid script identifier
    /// - `pattern` is non-empty and renders into a parseable detector
    /// - `concurrency` is at least 1
    /// - `exclude` has no empty patterns
    /// - warns when the site path prefix does not contain `prefix`
    pub fn validate(&self, site: &SiteSectionConfig, diag: &mut ConfigDiagnostics) {
        if self.prefix.is_empty() {
            diag.error_with_hint(
                Self::FIELDS.prefix,
                "you must set the prefix option",
                format!("set {}, e.g.: \"__relocate__\"", Self::FIELDS.prefix),
            );
        } else if !IDENTIFIER.is_match(&self.prefix) {
            diag.error_with_hint(
                Self::FIELDS.prefix,
                format!("'{}' is not a valid script identifier", self.prefix),
                "use letters, digits, `_` or `$`, not starting with a digit",
            );
        }

        if self.pattern.is_empty() {
            diag.error_with_hint(
                Self::FIELDS.pattern,
                "you must set the pattern option",
                format!(
                    "set {}, e.g.: \"/^\\\\/(ipfs|ipns)\\\\/[^/]+/\"",
                    Self::FIELDS.pattern
                ),
            );
        } else if !self.detector_parses() {
            diag.error_with_hint(
                Self::FIELDS.pattern,
                format!("'{}' is not a valid JavaScript regular expression", self.pattern),
                "use a regex literal like /^\\/ipfs\\/[^/]+/ or a bare source like ^/ipfs/[^/]+",
            );
        }

        if self.concurrency == 0 {
            diag.error(Self::FIELDS.concurrency, "must be at least 1");
        }

        if self.exclude.iter().any(|p| p.trim().is_empty()) {
            diag.error(Self::FIELDS.exclude, "patterns must not be empty");
        }

        if !self.prefix.is_empty() && !site.prefix().is_empty() && !site.prefix().contains(&self.prefix)
        {
            diag.warn(
                SiteSectionConfig::FIELDS.path_prefix,
                format!(
                    "'{}' does not contain '{}', prefixed links may not be rewritten",
                    site.prefix(),
                    self.prefix
                ),
            );
        }
    }

    /// Render the detector runtime and check it parses.
    ///
    /// A bad prefix is reported on its own, so a placeholder name keeps it
    /// from failing this check too.
    fn detector_parses(&self) -> bool {
        let mut vars = DetectorVars::from_config(self);
        if !IDENTIFIER.is_match(&vars.prefix_name) {
            vars.prefix_name = "_".into();
        }
        parses_as_js(&HEAD_PREFIX_JS.render(&vars))
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{ConfigDiagnostics, test_parse_config};

    fn diagnose(extra: &str) -> ConfigDiagnostics {
        let config = test_parse_config(extra);
        let mut diag = ConfigDiagnostics::new();
        config.relocate.validate(&config.site, &mut diag);
        diag
    }

    fn fields(diag: &ConfigDiagnostics) -> Vec<&'static str> {
        diag.errors().iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_relocate_defaults() {
        let config = test_parse_config("");
        let relocate = &config.relocate;
        assert!(relocate.enable);
        assert!(relocate.prefix.is_empty());
        assert!(!relocate.force_trailing_slash);
        assert!(!relocate.use_basename);
        assert_eq!(relocate.output, std::path::PathBuf::from("public"));
        assert_eq!(relocate.concurrency, 10);
        assert!(relocate.minify);
        assert!(relocate.exclude.is_empty());
    }

    #[test]
    fn test_relocate_parse() {
        let config = test_parse_config(
            "[relocate]\nprefix = \"__ipfs__\"\npattern = \"^/ipfs/[^/]+\"\nforce_trailing_slash = true\nuse_basename = true\nconcurrency = 4\nexclude = [\"**/*.map\"]",
        );
        let relocate = &config.relocate;
        assert_eq!(relocate.prefix, "__ipfs__");
        assert_eq!(relocate.pattern, "^/ipfs/[^/]+");
        assert!(relocate.force_trailing_slash);
        assert!(relocate.use_basename);
        assert_eq!(relocate.concurrency, 4);
        assert_eq!(relocate.exclude, vec!["**/*.map".to_string()]);
    }

    #[test]
    fn test_validate_ok() {
        let diag = diagnose(
            "[site]\npath_prefix = \"__ipfs__\"\n[relocate]\nprefix = \"__ipfs__\"\npattern = \"/^\\\\/ipfs\\\\/[^/]+/\"",
        );
        assert!(diag.is_empty(), "{diag}");
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn test_validate_missing_options() {
        let diag = diagnose("");
        assert_eq!(fields(&diag), vec!["relocate.prefix", "relocate.pattern"]);
        assert!(diag.errors()[0].message.contains("prefix"));
        assert!(diag.errors()[1].message.contains("pattern"));
    }

    #[test]
    fn test_validate_prefix_identifier() {
        let diag = diagnose("[relocate]\nprefix = \"ipfs-prefix\"\npattern = \"^/ipfs\"");
        assert_eq!(fields(&diag), vec!["relocate.prefix"]);

        let diag = diagnose("[relocate]\nprefix = \"1prefix\"\npattern = \"^/ipfs\"");
        assert_eq!(fields(&diag), vec!["relocate.prefix"]);

        let diag = diagnose("[relocate]\nprefix = \"$prefix_1\"\npattern = \"^/ipfs\"");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_validate_broken_pattern() {
        let diag = diagnose("[relocate]\nprefix = \"p\"\npattern = \"/[/\"");
        assert_eq!(fields(&diag), vec!["relocate.pattern"]);
    }

    #[test]
    fn test_validate_concurrency_and_exclude() {
        let diag =
            diagnose("[relocate]\nprefix = \"p\"\npattern = \"^/ipfs\"\nconcurrency = 0\nexclude = [\" \"]");
        assert_eq!(fields(&diag), vec!["relocate.concurrency", "relocate.exclude"]);
    }

    #[test]
    fn test_validate_warns_on_unrelated_site_prefix() {
        let diag = diagnose("[site]\npath_prefix = \"docs\"\n[relocate]\nprefix = \"p\"\npattern = \"^/ipfs\"");
        assert!(diag.is_empty());
        assert_eq!(diag.warnings().len(), 1);
    }
}
