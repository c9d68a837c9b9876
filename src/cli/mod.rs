//! CLI module for the cascade timer.
//!
//! This module provides the command-line host:
//! - `commands`: Command definitions using clap derive
//! - `run`: Terminal host that drives a sequence and prints events
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod run;

pub use commands::{Cli, Commands, RunArgs, ValidateArgs};
pub use display::Display;
