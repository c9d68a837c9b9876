//! Error types for the timer engine and sequence.
//!
//! All errors are local and recoverable: they are returned to the host,
//! which decides how to present them. None of them indicate a crash.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TimerId;

/// Errors returned by timer and sequence operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Thresholds violate `final <= warning <= start`.
    #[error(
        "しきい値が不正です（開始: {starting_time}秒, 警告: {warning_time}秒, 最終: {final_time}秒）"
    )]
    InvalidThresholds {
        starting_time: u32,
        warning_time: u32,
        final_time: u32,
    },

    /// A timer description could not be parsed.
    #[error("タイマー指定を解析できません: '{0}'（START[:WARNING[:FINAL]] の形式で指定してください）")]
    Parse(String),

    /// Removing the only timer of a sequence.
    #[error("最後のタイマーは削除できません")]
    LastTimer,

    /// The target group is already at its capacity.
    #[error("グループ {group} は満杯です（最大 {capacity} 個）")]
    CapacityExceeded { group: usize, capacity: usize },

    /// The sequence already holds its maximum number of timers.
    #[error("タイマー数が上限に達しています（最大 {limit} 個）")]
    LimitExceeded { limit: usize },

    /// No timer with the given id.
    #[error("タイマー {0} が見つかりません")]
    NotFound(TimerId),

    /// No timer at the given flat index.
    #[error("インデックス {0} のタイマーが見つかりません")]
    IndexNotFound(usize),

    /// A position does not address an occupied slot or insertion point.
    #[error("位置が不正です（グループ {group}, スロット {slot}）")]
    InvalidPosition { group: usize, slot: usize },

    /// A sequence cannot be built without timers.
    #[error("タイマーが1つもありません")]
    EmptySequence,

    /// Two restored records share an id.
    #[error("タイマー {0} が重複しています")]
    DuplicateId(TimerId),
}

impl TimerError {
    /// Returns true if the error is a lookup failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::IndexNotFound(_))
    }

    /// Returns true if the error is caused by a sequence or group limit.
    #[must_use]
    pub fn is_capacity_error(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::LimitExceeded { .. }
        )
    }

    /// Returns true if the error comes from an invalid timer configuration.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidThresholds { .. } | Self::Parse(_))
    }
}

/// Errors raised while loading or validating host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("設定ファイルを読み込めません: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape.
    #[error("設定ファイルの形式が不正です: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is out of range.
    #[error("設定値が不正です: {0}")]
    Invalid(String),
}
