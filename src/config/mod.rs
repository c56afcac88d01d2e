//! Site configuration management for `relocate.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── relocate   # [relocate]
//! │   └── site       # [site]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! ├── util.rs        # URL path extraction, config discovery
//! └── mod.rs         # SiteConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section      | Purpose                                            |
//! |--------------|----------------------------------------------------|
//! | `[site]`     | Site URL and the path prefix baked into the output |
//! | `[relocate]` | Prefix, runtime pattern, rewriter settings         |

pub mod section;
pub mod types;
mod util;

use util::{extract_url_path, find_config_file};

pub use section::{RelocateConfig, SiteSectionConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, RelocateArgs},
    log,
};
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing relocate.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Site URL and path prefix
    #[serde(default)]
    pub site: SiteSectionConfig,

    /// Relocation settings
    #[serde(default)]
    pub relocate: RelocateConfig,
}

impl SiteConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let Some(config_path) = find_config_file(&cli.config) else {
            bail!(ConfigError::Validation(format!(
                "config file '{}' not found",
                cli.config.display()
            )));
        };

        let mut config = Self::from_path(&config_path)?;
        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.config_path = crate::utils::path::normalize_path(&config_path);
        config.finalize(cli, &root);
        config.validate(cli.is_run())?;

        Ok(config)
    }

    /// Finalize configuration after loading: CLI overrides, paths, prefix.
    fn finalize(&mut self, cli: &Cli, root: &Path) {
        self.apply_relocate_args(cli.relocate_args());
        Self::update_option(&mut self.relocate.output, cli.output.as_ref());
        self.normalize_paths(root);
        self.sync_path_prefix_from_url();
    }

    /// Derive `path_prefix` from `site.url` unless set explicitly.
    ///
    /// - `https://gateway.example/__relocate__` -> `__relocate__`
    fn sync_path_prefix_from_url(&mut self) {
        if !self.site.prefix().is_empty() {
            return;
        }
        if let Some(ref url) = self.site.url
            && let Some(path) = extract_url_path(url)
            && !path.is_empty()
        {
            self.site.path_prefix = path;
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Unknown fields never stop a run; the tool runs unattended in builds.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> &Path {
        &self.relocate.output
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply relocation arguments from CLI.
    fn apply_relocate_args(&mut self, args: &RelocateArgs) {
        crate::logger::set_verbose(args.verbose);

        Self::update_option(&mut self.relocate.enable, args.prefix_paths.as_ref());
        Self::update_option(&mut self.relocate.prefix, args.prefix.as_ref());
        Self::update_option(&mut self.relocate.pattern, args.pattern.as_ref());
        Self::update_option(
            &mut self.relocate.force_trailing_slash,
            args.force_trailing_slash.as_ref(),
        );
        Self::update_option(&mut self.relocate.use_basename, args.use_basename.as_ref());
        Self::update_option(&mut self.relocate.concurrency, args.concurrency.as_ref());

        // A CLI url replaces both the configured url and any derived prefix.
        if let Some(ref url) = args.site_url {
            self.site.url = Some(url.clone());
            self.site.path_prefix.clear();
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Normalize paths relative to the root directory.
    fn normalize_paths(&mut self, root: &Path) {
        let root = crate::utils::path::normalize_path(root);
        self.relocate.output = crate::utils::path::normalize_path(&root.join(&self.relocate.output));
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting every problem before reporting.
    ///
    /// This is the guard that runs before any file is touched. `require_output`
    /// additionally checks that the output tree exists.
    pub fn validate(&self, require_output: bool) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        if self.relocate.enable {
            self.site.validate(true, &mut diag);
            self.relocate.validate(&self.site, &mut diag);

            if require_output && !self.relocate.output.is_dir() {
                diag.error_with_hint(
                    RelocateConfig::FIELDS.output,
                    format!(
                        "output directory '{}' does not exist",
                        self.relocate.output.display()
                    ),
                    "run the site build first, or point --output at the generated site",
                );
            }
        } else {
            self.site.validate(false, &mut diag);
        }

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from inline TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SiteConfig {
    let (parsed, ignored) = SiteConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Parse a valid, enabled config whose output tree is `output`.
#[cfg(test)]
pub fn test_relocate_config(output: &Path, extra: &str) -> SiteConfig {
    let mut config = test_parse_config(&format!(
        "[site]\npath_prefix = \"__relocate__\"\n[relocate]\nprefix = \"__relocate__\"\npattern = \"/^\\\\/(ipfs|ipns)\\\\/[^/]+/\"\n{extra}"
    ));
    config.relocate.output = output.to_path_buf();
    config
}

// ============================================================================
// tests
// ============================================================================
