//! Cascade Timer Library
//!
//! This library provides a countdown timer engine and a sequencing model
//! for running several timers back to back. It includes:
//! - Timer engine with warning/final thresholds and a derived mode machine
//! - Wall-clock driven ticks that never drift under delayed callbacks
//! - Grouped timer sequences with capacity limits and circular cascading
//! - A tokio tick driver for hosts that share a sequence across tasks
//! - Host configuration and a small terminal host

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod sequence;
pub mod types;

// Re-export commonly used types for convenience
pub use config::HostConfig;
pub use engine::{DriverOptions, SharedSequence, TickDriver, TimerEngine, TimerEvent};
pub use error::{ConfigError, TimerError};
pub use sequence::{Position, TimerSequence};
pub use types::{RunningMode, SequenceLimits, TimerId, TimerMode, TimerRecord, TimerSpec};
