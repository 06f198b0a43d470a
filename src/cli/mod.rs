//! Command-line interface module.

mod args;
pub mod build;
mod common;
pub mod dev;
pub mod plan;

pub use args::{Cli, Commands};
