//! Countdown engine for a single timer.
//!
//! This module provides the per-timer state machine:
//! - Mode transitions (Stopped → Countdown → Warning → Final → Alarm)
//! - Pause/resume that remembers the running phase
//! - Wall-clock driven ticks that never drift
//! - Event firing for ticks and mode transitions

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::types::{RunningMode, TimerId, TimerMode, TimerSpec};

// ============================================================================
// TimerEvent
// ============================================================================

/// Events emitted to the host for display, haptics or audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed, or the initial snapshot after (re)starting
    Tick {
        /// Timer that ticked
        id: TimerId,
        /// Seconds remaining
        current_time: u32,
        /// Mode after the tick
        mode: TimerMode,
    },
    /// The timer's mode changed
    Transition {
        /// Timer that changed mode
        id: TimerId,
        /// Mode before the change
        from: TimerMode,
        /// Mode after the change
        to: TimerMode,
    },
}

impl TimerEvent {
    /// Returns the id of the timer that emitted the event.
    pub fn timer_id(&self) -> TimerId {
        match self {
            TimerEvent::Tick { id, .. } | TimerEvent::Transition { id, .. } => *id,
        }
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Countdown state machine for one timer.
///
/// All mutation goes through `&mut self`; hosts that share an engine across
/// tasks wrap its owner in a mutex so ticks and commands are serialized.
#[derive(Debug)]
pub struct TimerEngine {
    id: TimerId,
    spec: TimerSpec,
    /// Seconds remaining, always within `[0, spec.starting_time]`
    current_time: u32,
    is_running: bool,
    /// Running phase remembered by `pause()`
    paused_from: Option<RunningMode>,
    /// Last mode reported to observers
    mode: TimerMode,
    /// Wall-clock reference of the previous tick; `None` until the first
    /// callback of a run
    last_tick: Option<Instant>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates a stopped engine with a fresh id.
    pub fn new(spec: TimerSpec, event_tx: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self::with_id(TimerId::new(), spec, event_tx)
    }

    /// Creates a stopped engine with a known id, used when restoring records.
    pub fn with_id(
        id: TimerId,
        spec: TimerSpec,
        event_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        Self {
            id,
            spec,
            current_time: spec.starting_time(),
            is_running: false,
            paused_from: None,
            mode: TimerMode::Stopped,
            last_tick: None,
            event_tx,
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn spec(&self) -> &TimerSpec {
        &self.spec
    }

    pub fn current_time(&self) -> u32 {
        self.current_time
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Returns the current mode.
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Starts a fresh run from the starting time.
    ///
    /// Any previous run is replaced: the tick reference is discarded, so a
    /// clock that belonged to the old run cannot decrement the new one.
    /// Timers without a starting time cannot run.
    pub fn start(&mut self) {
        if !self.spec.is_configured() {
            tracing::debug!(timer = %self.id, "start ignored: timer has no starting time");
            return;
        }

        self.set_current_time(self.spec.starting_time());
        self.is_running = true;
        self.paused_from = None;
        self.last_tick = None;
        tracing::info!(timer = %self.id, seconds = self.current_time, "timer started");
        self.refresh_mode();
    }

    /// Pauses a running timer.
    ///
    /// Returns false (and does nothing) unless the timer is counting down.
    pub fn pause(&mut self) -> bool {
        let Some(phase) = self.mode.running() else {
            return false;
        };
        if !self.is_running {
            return false;
        }

        self.is_running = false;
        self.paused_from = Some(phase);
        self.last_tick = None;
        tracing::info!(timer = %self.id, seconds = self.current_time, "timer paused");
        self.refresh_mode();
        true
    }

    /// Resumes a paused timer without changing the remaining time.
    ///
    /// Returns false if the timer was not paused.
    pub fn resume(&mut self) -> bool {
        self.resume_at(Instant::now())
    }

    /// Resumes a paused timer, counting running time from `now`.
    ///
    /// The paused interval is not caught up; the first whole second after
    /// `now` decrements as usual.
    pub fn resume_at(&mut self, now: Instant) -> bool {
        if self.paused_from.take().is_none() {
            return false;
        }

        self.is_running = true;
        self.last_tick = Some(now);
        tracing::info!(timer = %self.id, seconds = self.current_time, "timer resumed");
        self.refresh_mode();
        true
    }

    /// Stops the timer and resets it to the starting time.
    pub fn stop(&mut self) {
        self.is_running = false;
        self.paused_from = None;
        self.last_tick = None;
        self.set_current_time(self.spec.starting_time());
        tracing::info!(timer = %self.id, "timer stopped");
        self.refresh_mode();
    }

    /// Skips straight to the alarm.
    pub fn end(&mut self) {
        self.is_running = false;
        self.paused_from = None;
        self.last_tick = None;
        self.set_current_time(0);
        tracing::info!(timer = %self.id, "timer ended");
        self.refresh_mode();
    }

    // ------------------------------------------------------------------------
    // Clock
    // ------------------------------------------------------------------------

    /// Advances the timer using the current wall-clock time.
    pub fn tick(&mut self) -> u32 {
        self.tick_at(Instant::now())
    }

    /// Advances the timer to `now`.
    ///
    /// Only whole elapsed seconds count; the sub-second remainder is carried
    /// into the next call. Each elapsed second is applied as its own tick, so
    /// a delayed callback emits the same events as on-time ones. The first
    /// call after `start()` only seeds the reference and reports a snapshot.
    ///
    /// Returns the number of seconds the countdown moved.
    pub fn tick_at(&mut self, now: Instant) -> u32 {
        if !self.is_running {
            return 0;
        }

        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            self.emit_tick();
            return 0;
        };

        let elapsed = now.saturating_duration_since(last).as_secs();
        if elapsed == 0 {
            return 0;
        }

        self.last_tick = Some(last + Duration::from_secs(elapsed));
        let steps = elapsed.min(u64::from(self.current_time)) as u32;
        if u64::from(steps) < elapsed {
            tracing::debug!(timer = %self.id, elapsed, "tick gap exceeds remaining time");
        }

        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Applies a single one-second decrement.
    fn step(&mut self) {
        self.set_current_time(self.current_time.saturating_sub(1));
        if self.current_time == 0 {
            self.is_running = false;
            self.last_tick = None;
        }
        self.refresh_mode();
        self.emit_tick();
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn set_current_time(&mut self, seconds: u32) {
        self.current_time = seconds.min(self.spec.starting_time());
    }

    /// Re-derives the mode and reports it if it changed.
    fn refresh_mode(&mut self) {
        let next = TimerMode::derive(
            &self.spec,
            self.current_time,
            self.is_running,
            self.paused_from,
        );
        if next == self.mode {
            return;
        }

        let from = std::mem::replace(&mut self.mode, next);
        tracing::debug!(timer = %self.id, %from, to = %next, "mode transition");
        self.send(TimerEvent::Transition {
            id: self.id,
            from,
            to: next,
        });
    }

    fn emit_tick(&self) {
        self.send(TimerEvent::Tick {
            id: self.id,
            current_time: self.current_time,
            mode: self.mode,
        });
    }

    fn send(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::debug!(timer = %self.id, "event receiver dropped");
        }
    }

    /// Sets the remaining time directly (for testing).
    #[cfg(test)]
    pub(crate) fn set_current_time_for_test(&mut self, seconds: u32) {
        self.set_current_time(seconds);
    }
}

// ============================================================================
// Tests
// ============================================================================
