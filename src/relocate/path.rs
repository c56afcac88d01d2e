//! Relative path math for prefix replacement.

use std::borrow::Cow;
use std::path::{Component, Path};

use regex::Regex;

/// Relative prefix that reaches the output root from a file.
///
/// `rel` is the file path relative to the output root. Each directory
/// between the root and the file adds one `../`; files directly under the
/// root get `./`.
///
/// ```ignore
/// relative_prefix(Path::new("index.html"))    -> "./"
/// relative_prefix(Path::new("a/index.html"))  -> "../"
/// relative_prefix(Path::new("a/b/c.html"))    -> "../../"
/// ```
pub fn relative_prefix(rel: &Path) -> String {
    let depth = rel
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
        .saturating_sub(1);
    if depth > 0 {
        "../".repeat(depth)
    } else {
        "./".to_string()
    }
}

/// Matcher for the absolute prefixed path `/<prefix>/`.
#[derive(Debug, Clone)]
pub struct PrefixPath {
    prefix: String,
    pattern: Regex,
}

impl PrefixPath {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("/{}/", regex::escape(prefix)))?;
        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
        })
    }

    /// Cheap pre-check: the literal prefix appears anywhere.
    pub fn mentioned_in(&self, content: &str) -> bool {
        content.contains(&self.prefix)
    }

    /// Replace every `/<prefix>/` with the file's relative prefix.
    pub fn relativize<'c>(&self, content: &'c str, rel: &Path) -> Cow<'c, str> {
        let replacement = relative_prefix(rel);
        self.pattern
            .replace_all(content, regex::NoExpand(&replacement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_prefix_depth() {
        assert_eq!(relative_prefix(Path::new("index.html")), "./");
        assert_eq!(relative_prefix(Path::new("a/index.html")), "../");
        assert_eq!(relative_prefix(Path::new("a/b/c.html")), "../../");
        assert_eq!(relative_prefix(Path::new("./a/b/c.html")), "../../");
    }

    #[test]
    fn test_relativize_replaces_every_occurrence() {
        let prefix = PrefixPath::new("__relocate__").unwrap();
        let html = r#"<a href="/__relocate__/docs/">x</a><img src="/__relocate__/img.png">"#;
        assert_eq!(
            prefix.relativize(html, Path::new("blog/post/index.html")),
            r#"<a href="../../docs/">x</a><img src="../../img.png">"#
        );
    }

    #[test]
    fn test_relativize_is_idempotent() {
        let prefix = PrefixPath::new("__relocate__").unwrap();
        let once = prefix
            .relativize("url(/__relocate__/a.png)", Path::new("css/site.css"))
            .into_owned();
        let twice = prefix.relativize(&once, Path::new("css/site.css"));
        assert_eq!(once, "url(../a.png)");
        assert_eq!(twice, once);
    }

    #[test]
    fn test_relativize_escapes_prefix() {
        let prefix = PrefixPath::new("a.b").unwrap();
        assert_eq!(
            prefix.relativize("/a.b/x /axb/y", Path::new("index.html")),
            "./x /axb/y"
        );
    }

    #[test]
    fn test_relativize_needs_both_slashes() {
        let prefix = PrefixPath::new("p").unwrap();
        let content = "/p /px/ p/";
        assert!(prefix.mentioned_in(content));
        assert!(matches!(
            prefix.relativize(content, Path::new("index.html")),
            Cow::Borrowed(_)
        ));
    }
}
