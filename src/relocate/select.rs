//! Output tree file selection.
//!
//! Every rewriter works on one [`FileKind`] of the output tree. Kinds are
//! decided by content type, so `.htm`/`.xhtml` count as markup and
//! `.mjs`/`.cjs` as scripts. Exclusion globs follow gitignore matching:
//! slash-free patterns match the file name at any depth, other patterns
//! match the path relative to the output root.

use std::path::{Path, PathBuf};

use gix::{bstr::ByteSlice, glob::wildmatch};
use jwalk::WalkDir;

use crate::utils::mime;

const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// File categories, one per rewriter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// HTML documents.
    Markup,
    /// JavaScript sources.
    Script,
    /// Everything else; text filtering happens per file.
    Asset,
}

impl FileKind {
    pub fn of(path: &Path) -> Self {
        match mime::from_path(path) {
            mime::types::HTML => Self::Markup,
            mime::types::JAVASCRIPT => Self::Script,
            _ => Self::Asset,
        }
    }
}

/// Enumerates output files, honoring exclusion globs.
#[derive(Debug)]
pub struct FileSelector {
    root: PathBuf,
    exclude: Vec<String>,
}

impl FileSelector {
    pub fn new(root: &Path, exclude: &[String]) -> Self {
        let exclude = exclude
            .iter()
            .map(|pattern| {
                let pattern = pattern.trim().trim_start_matches('/');
                // `dir/` excludes everything below `dir`.
                if pattern.ends_with('/') {
                    format!("{pattern}**")
                } else {
                    pattern.to_string()
                }
            })
            .collect();

        Self {
            root: root.to_path_buf(),
            exclude,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All files of `kind`, sorted by path.
    pub fn select(&self, kind: FileKind) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .sort(true)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_str().unwrap_or_default();
                !IGNORED_FILES.contains(&name)
            })
            .map(|e| e.path())
            .filter(|path| FileKind::of(path) == kind && !self.is_excluded(path))
            .collect()
    }

    /// Whether an exclusion glob matches `path`.
    pub fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        let rel = rel.to_string_lossy().replace('\\', "/");
        let name = rel.rsplit_once('/').map_or(rel.as_str(), |(_, name)| name);

        self.exclude.iter().any(|pattern| {
            let target = if pattern.contains('/') { rel.as_str() } else { name };
            wildmatch(
                pattern.as_bytes().as_bstr(),
                target.into(),
                wildmatch::Mode::NO_MATCH_SLASH_LITERAL,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        dir
    }

    fn names(selector: &FileSelector, kind: FileKind) -> Vec<String> {
        selector
            .select(kind)
            .iter()
            .map(|p| {
                p.strip_prefix(selector.root())
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::of(Path::new("a/index.html")), FileKind::Markup);
        assert_eq!(FileKind::of(Path::new("page.HTM")), FileKind::Markup);
        assert_eq!(FileKind::of(Path::new("app.js")), FileKind::Script);
        assert_eq!(FileKind::of(Path::new("chunk.mjs")), FileKind::Script);
        assert_eq!(FileKind::of(Path::new("style.css")), FileKind::Asset);
        assert_eq!(FileKind::of(Path::new("CNAME")), FileKind::Asset);
    }

    #[test]
    fn test_select_by_kind() {
        let dir = tree(&[
            "index.html",
            "blog/post/index.html",
            "app.js",
            "css/site.css",
            "logo.png",
            ".DS_Store",
        ]);
        let selector = FileSelector::new(dir.path(), &[]);

        assert_eq!(
            names(&selector, FileKind::Markup),
            vec!["blog/post/index.html", "index.html"]
        );
        assert_eq!(names(&selector, FileKind::Script), vec!["app.js"]);
        assert_eq!(
            names(&selector, FileKind::Asset),
            vec!["css/site.css", "logo.png"]
        );
    }

    #[test]
    fn test_exclude_globs() {
        let dir = tree(&[
            "app.js",
            "app.js.map",
            "vendor/lib.js",
            "docs/vendor/keep.js",
            "admin/index.html",
        ]);
        let exclude = vec![
            "*.map".to_string(),
            "/vendor/**".to_string(),
            "admin/".to_string(),
        ];
        let selector = FileSelector::new(dir.path(), &exclude);

        assert_eq!(
            names(&selector, FileKind::Script),
            vec!["app.js", "docs/vendor/keep.js"]
        );
        assert!(names(&selector, FileKind::Asset).is_empty());
        assert!(names(&selector, FileKind::Markup).is_empty());
    }
}
