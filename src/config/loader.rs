//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `ECHOFRAME_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `ECHOFRAME_BACKEND__BASE_URL=http://backend:8000`
/// - `ECHOFRAME_SESSION__TEARDOWN_COOLDOWN_MS=5000`
/// - `ECHOFRAME_LOG__JSON=true`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("backend.base_url", defaults.backend.base_url.clone())?
        .set_default("backend.timeout_secs", defaults.backend.timeout_secs)?
        .set_default(
            "session.teardown_cooldown_ms",
            defaults.session.teardown_cooldown_ms,
        )?
        .set_default(
            "audio.buffer_dir",
            defaults.audio.buffer_dir.to_string_lossy().to_string(),
        )?
        .set_default("log.level", defaults.log.level.clone())?
        .set_default("log.json", defaults.log.json)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: ECHOFRAME_BACKEND__BASE_URL=http://backend:8000
    builder = builder.add_source(
        Environment::with_prefix("ECHOFRAME")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.backend.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Backend URL cannot be empty".to_string(),
        ));
    }

    if config.backend.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Backend timeout cannot be 0".to_string(),
        ));
    }

    if config.session.teardown_cooldown_ms == 0 {
        return Err(ConfigError::ValidationError(
            "Teardown cooldown cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Client Configuration ===");
    tracing::info!("Backend URL: {}", config.backend.base_url);
    tracing::info!("Backend Timeout: {}s", config.backend.timeout_secs);
    tracing::info!(
        "Teardown Cooldown: {}ms",
        config.session.teardown_cooldown_ms
    );
    tracing::info!("Audio Buffer Directory: {:?}", config.audio.buffer_dir);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("============================");
}
