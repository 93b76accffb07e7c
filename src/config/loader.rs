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

/// 已知的语音传输实现
const KNOWN_TRANSPORTS: &[&str] = &["loopback"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `SOUNDPOST_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `SOUNDPOST_GATEWAY__BOT_USER_ID=1234`
/// - `SOUNDPOST_DATABASE__PATH=/data/soundpost.db`
/// - `SOUNDPOST_STORAGE__SOUNDS_DIR=/data/sounds`
/// - `SOUNDPOST_VOICE__CONNECT_TIMEOUT_SECS=5`
///
/// # 返回
/// - `Ok(AppConfig)` - 成功加载的配置
/// - `Err(ConfigError)` - 加载失败
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("gateway.bot_user_id", 0)?
        .set_default("database.path", "data/soundpost.db")?
        .set_default("database.max_connections", 5)?
        .set_default("storage.sounds_dir", "data/sounds")?
        .set_default("fetch.timeout_secs", 30)?
        .set_default("fetch.max_concurrent", 4)?
        .set_default("fetch.max_download_bytes", 10 * 1024 * 1024)?
        .set_default("voice.transport", "loopback")?
        .set_default("voice.connect_timeout_secs", 10)?
        .set_default("voice.loopback_playback_ms", 250)?
        .set_default("log.level", "info")?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        // 搜索默认配置文件
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 前缀: SOUNDPOST_
    // 层级分隔符: __ (双下划线)
    // 例如: SOUNDPOST_DATABASE__PATH=/data/soundpost.db
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix("SOUNDPOST")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 构建配置
    let config = builder.build()?;

    // 5. 反序列化为 AppConfig
    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    // 6. 验证配置
    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // 验证数据库路径
    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.database.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "Database max connections cannot be 0".to_string(),
        ));
    }

    // 验证存储目录
    if config.storage.sounds_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Sounds directory cannot be empty".to_string(),
        ));
    }

    // 验证下载配置
    if config.fetch.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Fetch timeout cannot be 0".to_string(),
        ));
    }

    if config.fetch.max_concurrent == 0 {
        return Err(ConfigError::ValidationError(
            "Fetch max concurrent cannot be 0".to_string(),
        ));
    }

    // 验证传输实现
    if !KNOWN_TRANSPORTS.contains(&config.voice.transport.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "Unknown voice transport: {} (known: {})",
            config.voice.transport,
            KNOWN_TRANSPORTS.join(", ")
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Bot User Id: {}", config.gateway.bot_user_id);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Sounds Directory: {:?}", config.storage.sounds_dir);
    tracing::info!("Fetch Timeout: {}s", config.fetch.timeout_secs);
    tracing::info!("Fetch Max Concurrent: {}", config.fetch.max_concurrent);
    tracing::info!("Fetch Size Limit: {} bytes", config.fetch.max_download_bytes);
    tracing::info!("Voice Transport: {}", config.voice.transport);
    tracing::info!("Voice Connect Timeout: {}s", config.voice.connect_timeout_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, "data/soundpost.db");
        assert_eq!(config.voice.transport, "loopback");
    }

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_empty_db_path() {
        let mut config = AppConfig::default();
        config.database.path = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_connections() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_unknown_transport() {
        let mut config = AppConfig::default();
        config.voice.transport = "webrtc".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_zero_fetch_timeout() {
        let mut config = AppConfig::default();
        config.fetch.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }
}
