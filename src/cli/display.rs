//! Display utilities for the cascade timer CLI.
//!
//! This module provides formatted output for:
//! - Sequence layout
//! - Tick and transition events
//! - Error messages

use crate::engine::TimerEvent;
use crate::sequence::TimerSequence;
use crate::types::{TimerMode, TimerSpec};

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Shows the groups and timers of a sequence.
    pub fn show_layout(sequence: &TimerSequence) {
        print!("{}", Self::format_layout(sequence));
    }

    /// Shows a timer event.
    pub fn show_event(event: &TimerEvent) {
        println!("{}", Self::format_event(event));
    }

    /// Shows a success message for validation.
    pub fn show_valid(sequence: &TimerSequence) {
        println!("* タイマーファイルは有効です（{}個）", sequence.len());
    }

    /// Shows that the run was interrupted.
    pub fn show_interrupted() {
        println!("[] 中断しました");
    }

    /// Shows that every timer finished.
    pub fn show_finished() {
        println!("* すべてのタイマーが終了しました");
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }

    /// Formats the sequence layout, one line per timer.
    pub fn format_layout(sequence: &TimerSequence) -> String {
        let mut out = String::new();
        let current = sequence.current_id();
        for (group, timers) in sequence.groups().enumerate() {
            out.push_str(&format!("グループ {}\n", group + 1));
            for engine in timers {
                let marker = if engine.id() == current { ">" } else { " " };
                out.push_str(&format!(
                    " {} [{}] {}\n",
                    marker,
                    engine.id().short(),
                    Self::format_spec(engine.spec())
                ));
            }
        }
        out
    }

    /// Formats a spec as `mm:ss (警告 mm:ss / 最終 mm:ss)`.
    pub fn format_spec(spec: &TimerSpec) -> String {
        if !spec.is_configured() {
            return "未設定".to_string();
        }
        let mut text = Self::format_clock(spec.starting_time());
        let mut phases = Vec::new();
        if spec.warning_time() > 0 {
            phases.push(format!("警告 {}", Self::format_clock(spec.warning_time())));
        }
        if spec.final_time() > 0 {
            phases.push(format!("最終 {}", Self::format_clock(spec.final_time())));
        }
        if !phases.is_empty() {
            text.push_str(&format!(" ({})", phases.join(" / ")));
        }
        text
    }

    /// Formats a timer event as a single line.
    pub fn format_event(event: &TimerEvent) -> String {
        match event {
            TimerEvent::Tick {
                id,
                current_time,
                mode,
            } => format!(
                "  [{}] {} {}",
                id.short(),
                Self::format_clock(*current_time),
                Self::mode_label(mode)
            ),
            TimerEvent::Transition { id, from, to } => {
                let prefix = if *to == TimerMode::Alarm { "!!" } else { ">" };
                format!(
                    "{} [{}] {} → {}",
                    prefix,
                    id.short(),
                    Self::mode_label(from),
                    Self::mode_label(to)
                )
            }
        }
    }

    /// Returns the label shown for a mode.
    pub fn mode_label(mode: &TimerMode) -> &'static str {
        match mode {
            TimerMode::Stopped => "停止中",
            TimerMode::Countdown => "カウントダウン",
            TimerMode::Warning => "警告",
            TimerMode::Final => "最終",
            TimerMode::Alarm => "アラーム",
            TimerMode::Paused { .. } => "一時停止中",
        }
    }

    /// Formats seconds as `m:ss`.
    pub fn format_clock(total_seconds: u32) -> String {
        let (minutes, seconds) = Self::format_time(total_seconds);
        format!("{}:{:02}", minutes, seconds)
    }

    /// Formats remaining seconds as (minutes, seconds).
    fn format_time(total_seconds: u32) -> (u32, u32) {
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        (minutes, seconds)
    }
}

// ============================================================================
// Tests
// ============================================================================
