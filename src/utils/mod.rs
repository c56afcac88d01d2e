//! Utility modules.
//!
//! | Module   | Purpose                                       |
//! |----------|-----------------------------------------------|
//! | `mime`   | Content-type guessing, text detection         |
//! | `minify` | JavaScript minification and parse checks      |
//! | `path`   | Path normalization                            |
//! | `plural` | Count formatting for log lines                |

pub mod mime;
pub mod minify;
pub mod path;
mod plural;

pub use plural::plural_count;
