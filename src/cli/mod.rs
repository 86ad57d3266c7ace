//! Command-line interface: argument parsing and output rendering.

pub mod commands;
pub mod render;

pub use commands::{Cli, Commands, run};
