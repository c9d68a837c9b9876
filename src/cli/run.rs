//! Terminal host for running a timer sequence.
//!
//! The host owns the sequence, spawns the tick driver and prints events until
//! the last timer alarms or the user presses Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::sync::{mpsc, Mutex};

use crate::config::HostConfig;
use crate::engine::{TickDriver, TimerEvent};
use crate::sequence::TimerSequence;
use crate::types::{TimerId, TimerMode, TimerSpec};

use super::commands::{RunArgs, ValidateArgs};
use super::display::Display;

// ============================================================================
// Timer Files
// ============================================================================

/// Reads a timer file: a JSON array of groups, each an array of timer specs.
pub fn load_timer_file(path: &Path) -> Result<Vec<Vec<TimerSpec>>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("タイマーファイルを読み込めません: {:?}", path))?;
    let groups: Vec<Vec<TimerSpec>> = serde_json::from_str(&content)
        .with_context(|| format!("タイマーファイルの形式が不正です: {:?}", path))?;
    Ok(groups)
}

/// Collects the timer groups from the command line or a timer file.
fn timer_groups(args: &RunArgs, config: &HostConfig) -> Result<Vec<Vec<TimerSpec>>> {
    if let Some(path) = &args.file {
        return load_timer_file(path);
    }
    if args.timers.is_empty() {
        bail!("タイマーを --timer または --file で指定してください");
    }
    Ok(args
        .timers
        .chunks(config.group_capacity.max(1))
        .map(<[TimerSpec]>::to_vec)
        .collect())
}

// ============================================================================
// Commands
// ============================================================================

/// Validates a timer file against the configured limits.
pub fn validate(args: &ValidateArgs, config: &HostConfig) -> Result<()> {
    let groups = load_timer_file(&args.file)?;
    let (tx, _rx) = mpsc::unbounded_channel();
    let sequence = TimerSequence::from_groups(groups, config.limits()?, tx)
        .context("タイマーファイルを構成できません")?;

    Display::show_layout(&sequence);
    Display::show_valid(&sequence);
    Ok(())
}

/// Runs a sequence in the terminal.
pub async fn run(args: &RunArgs, mut config: HostConfig) -> Result<()> {
    if args.auto_cascade {
        config = config.with_auto_cascade(true);
    }
    if let Some(poll_ms) = args.poll_ms {
        config = config.with_poll_interval_ms(poll_ms);
    }
    config.validate()?;

    let groups = timer_groups(args, &config)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut sequence = TimerSequence::from_groups(groups, config.limits()?, tx)
        .context("タイマーを構成できません")?;

    let configured: Vec<TimerId> = sequence
        .iter()
        .filter(|engine| engine.spec().is_configured())
        .map(|engine| engine.id())
        .collect();
    let Some(&last_id) = configured.last() else {
        bail!("開始時間が設定されたタイマーがありません");
    };
    if !sequence.current().spec().is_configured() {
        sequence.next();
    }

    Display::show_layout(&sequence);
    sequence.current_mut().start();

    let finish = FinishRule {
        auto_cascade: config.auto_cascade,
        repeat: args.repeat && configured.len() > 1,
        last_id,
    };

    let shared = Arc::new(Mutex::new(sequence));
    let driver = TickDriver::spawn(shared.clone(), config.driver_options());
    tracing::info!(timers = configured.len(), "sequence running");

    let outcome = loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    break Ok(());
                };
                Display::show_event(&event);
                if finish.is_done(&event) {
                    Display::show_finished();
                    break Ok(());
                }
            }
            signal = tokio::signal::ctrl_c() => {
                Display::show_interrupted();
                break signal.context("シグナルの待機に失敗しました");
            }
        }
    };

    driver.shutdown().await;
    shared.lock().await.current_mut().stop();
    outcome
}

// ============================================================================
// FinishRule
// ============================================================================

/// Decides when a terminal run is over.
#[derive(Debug, Clone, Copy)]
struct FinishRule {
    auto_cascade: bool,
    repeat: bool,
    last_id: TimerId,
}

impl FinishRule {
    fn is_done(&self, event: &TimerEvent) -> bool {
        let TimerEvent::Transition {
            id,
            to: TimerMode::Alarm,
            ..
        } = event
        else {
            return false;
        };

        if !self.auto_cascade {
            return true;
        }
        !self.repeat && *id == self.last_id
    }
}

// ============================================================================
// Tests
// ============================================================================
