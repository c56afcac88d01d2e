//! `[site]` section configuration.
//!
//! Describes where the generated site believes it lives. The relocation
//! only runs against output that was built with a path prefix.
//!
//! # Example
//!
//! ```toml
//! [site]
//! url = "https://gateway.example/__relocate__"   # path component becomes path_prefix
//! # path_prefix = "__relocate__"                 # explicit override
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};

/// Site-wide URL and path prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSectionConfig {
    /// Site URL, path used as prefix (e.g., "https://example.com/__relocate__").
    pub url: Option<String>,

    /// Site-wide path prefix the generator baked into the output.
    /// Derived from `url` when left empty.
    pub path_prefix: String,
}

/// Field paths of `[site]`.
pub struct SiteFields {
    pub url: FieldPath,
    pub path_prefix: FieldPath,
}

impl SiteSectionConfig {
    pub const FIELDS: SiteFields = SiteFields {
        url: FieldPath::new("site.url"),
        path_prefix: FieldPath::new("site.path_prefix"),
    };

    /// Path prefix without surrounding slashes.
    pub fn prefix(&self) -> &str {
        self.path_prefix.trim_matches('/')
    }

    /// Validate site configuration.
    ///
    /// # Checks
    /// - `url` must be a valid http(s) URL with a host
    /// - if `required`, a non-empty path prefix must be known
    pub fn validate(&self, required: bool, diag: &mut ConfigDiagnostics) {
        if let Some(url_str) = &self.url {
            match url::Url::parse(url_str) {
                Ok(parsed) => {
                    if !matches!(parsed.scheme(), "http" | "https") {
                        diag.error_with_hint(
                            Self::FIELDS.url,
                            format!(
                                "scheme '{}' not supported, must be http or https",
                                parsed.scheme()
                            ),
                            "use format like https://example.com/__relocate__",
                        );
                    }
                    if parsed.host_str().is_none() {
                        diag.error_with_hint(
                            Self::FIELDS.url,
                            "URL must have a valid host",
                            "use format like https://example.com/__relocate__",
                        );
                    }
                }
                Err(e) => {
                    diag.error_with_hint(
                        Self::FIELDS.url,
                        format!("invalid URL: {}", e),
                        "use format like https://example.com/__relocate__",
                    );
                }
            }
        }

        if required && self.prefix().is_empty() {
            diag.error_with_hint(
                Self::FIELDS.path_prefix,
                "you must set a site-wide path prefix when prefix paths are enabled",
                format!(
                    "set {} with a path component, or set {}",
                    Self::FIELDS.url,
                    Self::FIELDS.path_prefix
                ),
            );
        }
    }
}
