//! Embedded browser runtime for relocated sites.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `runtime` - Prefix detector (`<head>`) and basename relocator (`</body>`)
//!
//! # Usage
//!
//! ```ignore
//! use embed::runtime::{HEAD_PREFIX_JS, DetectorVars};
//!
//! let js = HEAD_PREFIX_JS.render(&DetectorVars::from_config(&config.relocate));
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod runtime {
    use super::{Template, TemplateVars};
    use crate::config::RelocateConfig;

    /// Flags accepted after the closing slash of a JS regex literal.
    const REGEX_FLAGS: &str = "dgimsuyv";

    /// Variables for head-prefix.js.
    pub struct DetectorVars {
        /// Name of the page-wide prefix global.
        pub prefix_name: String,
        /// Runtime detection pattern, as configured.
        pub pattern: String,
        /// Redirect to `<path>/` when the trailing slash is missing.
        pub force_trailing_slash: bool,
    }

    impl DetectorVars {
        /// Build detector variables from the relocate section.
        pub fn from_config(config: &RelocateConfig) -> Self {
            Self {
                prefix_name: config.prefix.clone(),
                pattern: config.pattern.clone(),
                force_trailing_slash: config.force_trailing_slash,
            }
        }
    }

    impl TemplateVars for DetectorVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TOLA_PREFIX_NAME__", &self.prefix_name)
                .replace("__TOLA_MOUNT_PATTERN__", &pattern_expr(&self.pattern))
                .replace(
                    "__TOLA_FORCE_TRAILING_SLASH__",
                    if self.force_trailing_slash { "true" } else { "false" },
                )
        }
    }

    /// Variables for basename.js.
    pub struct RelocatorVars {
        /// Name of the page-wide prefix global, also the build-time prefix.
        pub prefix_name: String,
    }

    impl RelocatorVars {
        /// Build relocator variables from the relocate section.
        pub fn from_config(config: &RelocateConfig) -> Self {
            Self {
                prefix_name: config.prefix.clone(),
            }
        }
    }

    impl TemplateVars for RelocatorVars {
        fn apply(&self, content: &str) -> String {
            let escaped = regex::escape(&self.prefix_name);
            content
                .replace("__TOLA_PREFIX_NAME__", &self.prefix_name)
                .replace(
                    "__TOLA_PREFIX_PATTERN__",
                    &serde_json::to_string(&escaped).unwrap_or_else(|_| "\"\"".into()),
                )
        }
    }

    /// Turn the configured detection pattern into a JS expression.
    ///
    /// - `/^\/ipfs\/[^/]+/i` -> embedded verbatim as a regex literal
    /// - `^/ipfs/[^/]+`      -> `new RegExp("^/ipfs/[^/]+")`
    pub fn pattern_expr(pattern: &str) -> String {
        if is_regex_literal(pattern) {
            pattern.to_string()
        } else {
            let source = serde_json::to_string(pattern).unwrap_or_else(|_| "\"\"".into());
            format!("new RegExp({source})")
        }
    }

    fn is_regex_literal(pattern: &str) -> bool {
        let Some(body) = pattern.strip_prefix('/') else {
            return false;
        };
        match body.rfind('/') {
            Some(end) if end > 0 => body[end + 1..].chars().all(|c| REGEX_FLAGS.contains(c)),
            _ => false,
        }
    }

    /// Prefix detector, injected right after `<head>`.
    pub const HEAD_PREFIX_JS: Template<DetectorVars> =
        Template::new(include_str!("runtime/head-prefix.js"));

    /// Basename relocator, injected right before `</body>`.
    pub const BASENAME_JS: Template<RelocatorVars> =
        Template::new(include_str!("runtime/basename.js"));
}

#[cfg(test)]
mod tests {
    use super::runtime::*;
    use crate::utils::minify::{minify_js, parses_as_js};

    fn detector(pattern: &str, force_trailing_slash: bool) -> String {
        HEAD_PREFIX_JS.render(&DetectorVars {
            prefix_name: "__relocate__".into(),
            pattern: pattern.into(),
            force_trailing_slash,
        })
    }

    #[test]
    fn test_detector_substitutes_all_placeholders() {
        let rendered = detector(r"/^\/(ipfs|ipns)\/[^/]+/", true);
        assert!(rendered.contains("'__relocate__'"));
        assert!(rendered.contains(r"match(/^\/(ipfs|ipns)\/[^/]+/)"));
        assert!(rendered.contains("if (true &&"));
        assert!(!rendered.contains("__TOLA_"));
        assert!(parses_as_js(&rendered));
    }

    #[test]
    fn test_detector_without_trailing_slash() {
        let rendered = detector("/^\\/bzz\\/[^/]+/", false);
        assert!(rendered.contains("if (false &&"));
        assert!(minify_js(&rendered).is_some());
    }

    #[test]
    fn test_detector_wraps_bare_pattern() {
        let rendered = detector("^/ipfs/[^/]+", false);
        assert!(rendered.contains(r#"new RegExp("^/ipfs/[^/]+")"#));
        assert!(parses_as_js(&rendered));
    }

    #[test]
    fn test_detector_rejects_broken_literal() {
        let rendered = detector("/[/", false);
        assert!(!parses_as_js(&rendered));
    }

    #[test]
    fn test_pattern_expr_forms() {
        assert_eq!(pattern_expr("/abc/gi"), "/abc/gi");
        assert_eq!(pattern_expr("/abc/"), "/abc/");
        assert_eq!(pattern_expr("abc"), r#"new RegExp("abc")"#);
        // Trailing text that is not a flag set means it is not a literal.
        assert_eq!(pattern_expr("/ipfs/x"), r#"new RegExp("/ipfs/x")"#);
        assert_eq!(pattern_expr("/"), r#"new RegExp("/")"#);
    }

    #[test]
    fn test_relocator_escapes_prefix() {
        let rendered = BASENAME_JS.render(&RelocatorVars {
            prefix_name: "$prefix".into(),
        });
        assert!(rendered.contains("var name = '$prefix'"));
        assert!(rendered.contains(r#"'^/?' + "\\$prefix" + '/'"#));
        assert!(!rendered.contains("__TOLA_"));
        assert!(parses_as_js(&rendered));
        assert!(minify_js(&rendered).is_some());
    }

    fn relocator() -> String {
        BASENAME_JS.render(&RelocatorVars {
            prefix_name: "__relocate__".into(),
        })
    }

    /// Source of the two relocation patterns, in the order the runtime tries them.
    const RELOCATION_PATTERNS: [&str; 2] = ["^/?__relocate__/", r"^(\.?\./)+"];

    /// Same first-match replacement as `relocate()` in basename.js.
    fn relocate(url: &str, basename: &str) -> Option<String> {
        RELOCATION_PATTERNS.iter().find_map(|source| {
            let re = regex::Regex::new(source).unwrap();
            re.is_match(url)
                .then(|| re.replace(url, regex::NoExpand(basename)).into_owned())
        })
    }

    #[test]
    fn test_relocator_builds_both_patterns() {
        let rendered = relocator();
        assert!(rendered.contains(r#"new RegExp('^/?' + "__relocate__" + '/')"#));
        assert!(rendered.contains(r"/^(\.?\.\/)+/"));
        assert!(rendered.find("'^/?'") < rendered.find(r"/^(\.?\.\/)+/"));
    }

    #[test]
    fn test_relocator_converges() {
        let basename = "/mount/app/";
        let once = relocate("/__relocate__/img.png", basename).unwrap();
        assert_eq!(once, "/mount/app/img.png");
        assert_eq!(relocate(&once, basename), None);

        assert_eq!(
            relocate("../../app-1234.js", basename).as_deref(),
            Some("/mount/app/app-1234.js")
        );
        assert_eq!(relocate("__relocate__/a.css", basename).as_deref(), Some("/mount/app/a.css"));
        assert_eq!(relocate("https://cdn.example.com/x.js", basename), None);
    }

    #[test]
    fn test_relocator_splits_srcset() {
        let rendered = relocator();
        assert!(rendered.contains("attr === 'srcset' ? relocateSrcset(value) : relocate(value)"));
        assert!(rendered.contains("value.split(',')"));
        assert!(rendered.contains("sets.join(', ')"));
    }

    #[test]
    fn test_relocator_clones_scripts() {
        let rendered = relocator();
        assert!(!rendered.contains("createElement"));
        assert!(rendered.contains("var fixed = node.cloneNode(true);"));

        let minified = minify_js(&rendered).unwrap();
        assert!(!minified.contains("createElement"));
        assert!(minified.contains("cloneNode(!0)") || minified.contains("cloneNode(true)"));
    }

    #[test]
    fn test_template_content_is_raw() {
        assert!(HEAD_PREFIX_JS.content().contains("__TOLA_MOUNT_PATTERN__"));
        assert!(BASENAME_JS.content().contains("srcset"));
    }
}
