//! Command definitions for the cascade timer CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::types::TimerSpec;

// ============================================================================
// CLI Structure
// ============================================================================

/// Cascade Timer - countdown timers with warning/final phases, run back to back
#[derive(Parser, Debug)]
#[command(
    name = "cascade-timer",
    version,
    about = "警告・最終フェーズ付きのカウントダウンタイマーを連続実行するCLI",
    long_about = "複数のタイマーをグループに並べ、アラーム時に次のタイマーへ自動的に切り替えます。\n\
                  タイマーは START[:WARNING[:FINAL]]（秒）の形式で指定します。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a sequence of timers in the terminal
    Run(RunArgs),

    /// Validate a timer file and show its layout
    Validate(ValidateArgs),

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Timer as START[:WARNING[:FINAL]] seconds; repeat for a sequence
    #[arg(short, long = "timer", value_parser = parse_timer_spec)]
    pub timers: Vec<TimerSpec>,

    /// JSON file with timer groups (array of arrays of timer specs)
    #[arg(short, long, conflicts_with = "timers")]
    pub file: Option<PathBuf>,

    /// Start the next timer automatically at each alarm
    #[arg(short, long)]
    pub auto_cascade: bool,

    /// Keep cascading around the sequence until interrupted
    #[arg(short = 'l', long = "loop", requires = "auto_cascade")]
    pub repeat: bool,

    /// Driver polling period in milliseconds (10-1000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(10..=1000))]
    pub poll_ms: Option<u64>,
}

// ============================================================================
// Validate Command Arguments
// ============================================================================

/// Arguments for the validate command
#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// JSON file with timer groups
    #[arg(short, long)]
    pub file: PathBuf,
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Parses a `START[:WARNING[:FINAL]]` timer argument.
fn parse_timer_spec(s: &str) -> Result<TimerSpec, String> {
    s.parse::<TimerSpec>().map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
