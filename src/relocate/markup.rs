//! HTML rewriting: absolute prefixed references become relative.
//!
//! Markup is treated as text. Upstream generators emit well-formed
//! attributes, so anchors are found with a pattern instead of a parser.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::{Captures, Regex};

use super::inject::is_injected;
use super::{PrefixPath, Rewriter};
use crate::config::RelocateConfig;

/// `<a ... href="...">` with the value in group 2 (double) or 3 (single).
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(<a(?:[ \t\r\n][^>]*?)?[ \t\r\n]href[ \t\r\n]*=[ \t\r\n]*)(?:"([^"]*)"|'([^']*)')"#,
    )
    .unwrap()
});

/// Schemes whose hrefs never name a directory.
const SLASH_SAFE_SCHEMES: &[&str] = &["http", "https"];

pub struct MarkupRewriter {
    prefix: PrefixPath,
    force_trailing_slash: bool,
}

impl MarkupRewriter {
    pub fn new(config: &RelocateConfig) -> Result<Self> {
        Ok(Self {
            prefix: PrefixPath::new(&config.prefix)?,
            force_trailing_slash: config.force_trailing_slash,
        })
    }
}

impl Rewriter for MarkupRewriter {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn rewrite(&self, rel: &Path, content: &str) -> Option<String> {
        // The injected runtime names the prefix, so an already relocated
        // document would otherwise pass the mention check.
        if is_injected(content) || !self.prefix.mentioned_in(content) {
            return None;
        }

        let content = if self.force_trailing_slash {
            add_anchor_slashes(content)
        } else {
            Cow::Borrowed(content)
        };

        Some(self.prefix.relativize(&content, rel).into_owned())
    }
}

/// Append a missing trailing slash to every anchor href.
pub fn add_anchor_slashes(html: &str) -> Cow<'_, str> {
    ANCHOR_HREF.replace_all(html, |caps: &Captures| {
        let (quote, href) = match (caps.get(2), caps.get(3)) {
            (Some(value), _) => ('"', value.as_str()),
            (None, Some(value)) => ('\'', value.as_str()),
            (None, None) => return caps[0].to_string(),
        };
        let href = with_trailing_slash(href).unwrap_or(Cow::Borrowed(href));
        format!("{}{quote}{href}{quote}", &caps[1])
    })
}

/// Href with a trailing slash on its path, or `None` when it must stay.
///
/// Query and fragment are kept. Fragment-only and empty hrefs, non-http
/// schemes and paths ending in a file name with an extension are left alone.
fn with_trailing_slash(href: &str) -> Option<Cow<'_, str>> {
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let split = href.find(['?', '#']).unwrap_or(href.len());
    let (path, rest) = href.split_at(split);

    if let Some((scheme, after)) = path.split_once(':')
        && !scheme.contains('/')
    {
        if !SLASH_SAFE_SCHEMES
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
        {
            return None;
        }
        // Bare origin: `https://host` -> `https://host/`
        if let Some(authority) = after.strip_prefix("//")
            && !authority.contains('/')
        {
            return Some(Cow::Owned(format!("{path}/{rest}")));
        }
    }

    if path.is_empty() || path.ends_with('/') {
        return None;
    }
    let last = path.rsplit('/').next().unwrap_or(path);
    if Path::new(last).extension().is_some() {
        return None;
    }

    Some(Cow::Owned(format!("{path}/{rest}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_relocate_config;

    fn rewriter(force_trailing_slash: bool) -> MarkupRewriter {
        let mut config = test_relocate_config(Path::new("public"), "").relocate;
        config.force_trailing_slash = force_trailing_slash;
        MarkupRewriter::new(&config).unwrap()
    }

    #[test]
    fn test_rewrite_by_depth() {
        let html = r#"<link href="/__relocate__/style.css"><a href="/__relocate__/docs/">d</a>"#;
        assert_eq!(
            rewriter(false)
                .rewrite(Path::new("index.html"), html)
                .unwrap(),
            r#"<link href="./style.css"><a href="./docs/">d</a>"#
        );
        assert_eq!(
            rewriter(false)
                .rewrite(Path::new("a/b/c.html"), html)
                .unwrap(),
            r#"<link href="../../style.css"><a href="../../docs/">d</a>"#
        );
    }

    #[test]
    fn test_skips_files_without_prefix() {
        let html = r#"<a href="/docs">d</a>"#;
        assert!(rewriter(true).rewrite(Path::new("index.html"), html).is_none());
    }

    #[test]
    fn test_skips_injected_documents() {
        let html = concat!(
            "<html><head><script data-tola-relocate>var name='__relocate__'</script></head>",
            r#"<body><a href="/docs">d</a></body></html>"#,
        );
        assert!(rewriter(true).rewrite(Path::new("index.html"), html).is_none());
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let html = r#"<a href="/__relocate__/docs">d</a><img src="/__relocate__/a.png">"#;
        let rewriter = rewriter(true);
        let once = rewriter.rewrite(Path::new("x/index.html"), html).unwrap();
        assert_eq!(once, r#"<a href="../docs/">d</a><img src="../a.png">"#);
        let twice = rewriter
            .rewrite(Path::new("x/index.html"), &once)
            .unwrap_or_else(|| once.clone());
        assert_eq!(twice, once);
    }

    #[test]
    fn test_trailing_slash_on_anchor() {
        assert_eq!(
            add_anchor_slashes(r#"<a href="/foo">x</a>"#),
            r#"<a href="/foo/">x</a>"#
        );
        assert_eq!(
            add_anchor_slashes("<a class='nav'\n  href='/foo?page=2#top'>x</a>"),
            "<a class='nav'\n  href='/foo/?page=2#top'>x</a>"
        );
    }

    #[test]
    fn test_trailing_slash_only_touches_anchors() {
        let html = r#"<link href="/foo"><abbr href="/foo"><a data-href="/x" href="/bar">"#;
        assert_eq!(
            add_anchor_slashes(html),
            r#"<link href="/foo"><abbr href="/foo"><a data-href="/x" href="/bar/">"#
        );
    }

    #[test]
    fn test_trailing_slash_leaves_special_hrefs() {
        for href in [
            "",
            "#top",
            "/docs/",
            "/file.pdf",
            "mailto:me@example.com",
            "tel:+100",
            "javascript:void(0)",
            "?page=2",
        ] {
            assert!(with_trailing_slash(href).is_none(), "{href}");
        }
    }

    #[test]
    fn test_trailing_slash_urls() {
        assert_eq!(
            with_trailing_slash("https://example.com").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(
            with_trailing_slash("https://example.com/a/b#c").as_deref(),
            Some("https://example.com/a/b/#c")
        );
        assert_eq!(with_trailing_slash("../up").as_deref(), Some("../up/"));
    }
}
