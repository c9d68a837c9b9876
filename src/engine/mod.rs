//! Timer engine module.
//!
//! This module contains the clock-side functionality:
//! - `timer`: per-timer state machine, ticks and events
//! - `driver`: background task that ticks a shared sequence

pub mod driver;
pub mod timer;

pub use driver::{DriverOptions, SharedSequence, TickDriver, MIN_POLL_INTERVAL};
pub use timer::{TimerEngine, TimerEvent};
