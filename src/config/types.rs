//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 协作方后端配置
    #[serde(default)]
    pub backend: BackendConfig,

    /// 会话生命周期配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 音频播放配置
    #[serde(default)]
    pub audio: AudioConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 协作方后端配置
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// 后端基础 URL
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_backend_timeout")]
    pub timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_backend_timeout() -> u64 {
    60
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_backend_timeout(),
        }
    }
}

/// 会话生命周期配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 同一资源两次拆除之间的冷却时间（毫秒）
    #[serde(default = "default_teardown_cooldown")]
    pub teardown_cooldown_ms: u64,
}

fn default_teardown_cooldown() -> u64 {
    3000
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            teardown_cooldown_ms: default_teardown_cooldown(),
        }
    }
}

impl SessionConfig {
    pub fn teardown_cooldown(&self) -> Duration {
        Duration::from_millis(self.teardown_cooldown_ms)
    }
}

/// 音频播放配置
#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// 临时音频缓冲区目录
    #[serde(default = "default_buffer_dir")]
    pub buffer_dir: PathBuf,
}

fn default_buffer_dir() -> PathBuf {
    std::env::temp_dir().join("echoframe")
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            buffer_dir: default_buffer_dir(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
