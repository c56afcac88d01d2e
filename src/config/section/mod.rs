//! Configuration section definitions.
//!
//! Each module corresponds to a section in `relocate.toml`:
//!
//! | Module     | TOML Section   | Purpose                                |
//! |------------|----------------|----------------------------------------|
//! | `relocate` | `[relocate]`   | Prefix, runtime pattern, rewriters     |
//! | `site`     | `[site]`       | Site URL and baked-in path prefix      |

mod relocate;
mod site;

pub use relocate::RelocateConfig;
pub use site::SiteSectionConfig;
