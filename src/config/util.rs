//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Extract the path component of a URL, without surrounding slashes.
///
/// Port, credentials, query and fragment never leak into the result.
/// Returns `None` if the URL does not parse.
///
/// # Examples
/// ```ignore
/// extract_url_path("https://gateway.example/__relocate__/") -> Some("__relocate__")
/// extract_url_path("https://gateway.example/ipfs/site")     -> Some("ipfs/site")
/// extract_url_path("https://gateway.example")               -> Some("")
/// extract_url_path("gateway.example/x")                     -> None
/// ```
pub fn extract_url_path(url_str: &str) -> Option<String> {
    let parsed = url::Url::parse(url_str).ok()?;
    Some(parsed.path().trim_matches('/').to_string())
}

/// Find the config file, searching upward from the current directory.
///
/// An absolute `config_name` is used as-is when it exists.
///
/// ```text
/// /home/user/site/public/docs/   ← cwd
/// /home/user/site/relocate.toml  ← found
/// ```
pub fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }
    let cwd = std::env::current_dir().ok()?;
    find_upward(&cwd, config_name)
}

fn find_upward(start: &Path, config_name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// tests
// ============================================================================
