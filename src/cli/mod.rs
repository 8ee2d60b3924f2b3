//! Command-line interface

pub mod args;
pub mod commands;
mod runtime;

pub use args::{Cli, Commands};
pub use runtime::{NetworkMode, Runtime};
