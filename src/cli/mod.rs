//! Command-line interface module.

mod args;
pub mod check;
pub mod run;

pub use args::{Cli, Commands, RelocateArgs};
