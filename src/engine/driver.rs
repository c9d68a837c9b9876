//! Background clock that ticks a shared timer sequence.
//!
//! The driver is the only clock source for the sequence it owns a handle to.
//! It polls at a sub-second interval; the engines turn those polls into
//! whole-second ticks from wall-clock deltas, so a late or skipped poll never
//! causes drift.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant, MissedTickBehavior};

use crate::sequence::TimerSequence;

/// A timer sequence shared between the host and the driver.
pub type SharedSequence = Arc<Mutex<TimerSequence>>;

/// Default polling period of the driver.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Shortest polling period the driver accepts; tokio intervals cannot be zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

// ============================================================================
// DriverOptions
// ============================================================================

/// Behavior of a [`TickDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverOptions {
    /// How often the sequence is polled
    pub poll_interval: Duration,
    /// Start the next timer automatically when the current one alarms
    pub auto_cascade: bool,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            auto_cascade: false,
        }
    }
}

// ============================================================================
// TickDriver
// ============================================================================

/// Handle to a running driver task.
pub struct TickDriver {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TickDriver {
    /// Spawns the driver on the current tokio runtime.
    ///
    /// A poll interval below [`MIN_POLL_INTERVAL`] is raised to it.
    pub fn spawn(sequence: SharedSequence, mut options: DriverOptions) -> Self {
        if options.poll_interval < MIN_POLL_INTERVAL {
            tracing::warn!(
                requested = ?options.poll_interval,
                "poll interval too short, using {:?}",
                MIN_POLL_INTERVAL
            );
            options.poll_interval = MIN_POLL_INTERVAL;
        }
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(drive(sequence, options, shutdown_rx));
        Self {
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    /// Returns true if the driver task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stops the driver and waits for the task to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.handle).await {
            tracing::warn!("tick driver task failed: {}", e);
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        if self.shutdown_tx.is_some() {
            self.handle.abort();
        }
    }
}

async fn drive(
    sequence: SharedSequence,
    options: DriverOptions,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval(options.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::debug!(?options, "tick driver started");

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {
                let mut guard = sequence.lock().await;
                guard.tick_at(Instant::now().into_std());
                if options.auto_cascade {
                    guard.advance_on_alarm();
                }
            }
        }
    }

    tracing::debug!("tick driver stopped");
}

// ============================================================================
// Tests
// ============================================================================
