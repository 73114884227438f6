//! Audio Playback - 播放状态

use chrono::{DateTime, Utc};
use serde::Serialize;

/// 播放状态
///
/// 只能从 `Idle` 或 `Stopped` 进入 `Acquiring`；`Playing` 时再次播放须先停止并释放。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Idle,
    Acquiring,
    Playing,
    Stopped,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Acquiring => "acquiring",
            PlaybackState::Playing => "playing",
            PlaybackState::Stopped => "stopped",
        }
    }

    pub fn can_acquire(&self) -> bool {
        matches!(self, PlaybackState::Idle | PlaybackState::Stopped)
    }
}

/// 播放只读快照
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackSnapshot {
    pub state: PlaybackState,
    /// 当前持有资源的缓冲区标识
    pub buffer_id: Option<String>,
    pub duration_ms: Option<u64>,
    pub last_error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PlaybackSnapshot {
    pub fn idle() -> Self {
        Self {
            state: PlaybackState::Idle,
            buffer_id: None,
            duration_ms: None,
            last_error: None,
            updated_at: Utc::now(),
        }
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
