//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 网关配置
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 下载配置
    #[serde(default)]
    pub fetch: FetchConfig,

    /// 语音会话配置
    #[serde(default)]
    pub voice: VoiceConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
            fetch: FetchConfig::default(),
            voice: VoiceConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// 网关配置
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// 机器人自身的用户 id (自发消息过滤用)
    #[serde(default)]
    pub bot_user_id: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { bot_user_id: 0 }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/soundpost.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 效果音 blob 存储目录
    #[serde(default = "default_sounds_dir")]
    pub sounds_dir: PathBuf,
}

fn default_sounds_dir() -> PathBuf {
    PathBuf::from("data/sounds")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sounds_dir: default_sounds_dir(),
        }
    }
}

/// 下载配置
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// 最大并发下载数
    #[serde(default = "default_fetch_concurrent")]
    pub max_concurrent: usize,

    /// 响应体大小上限（字节），0 表示不限制
    #[serde(default = "default_max_download")]
    pub max_download_bytes: u64,
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_fetch_concurrent() -> usize {
    4
}

fn default_max_download() -> u64 {
    10 * 1024 * 1024 // 10 MB
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_concurrent: default_fetch_concurrent(),
            max_download_bytes: default_max_download(),
        }
    }
}

/// 语音会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// 传输实现
    /// 可选: loopback
    #[serde(default = "default_transport")]
    pub transport: String,

    /// 语音频道连接超时（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// loopback 传输的模拟播放时长（毫秒）
    #[serde(default = "default_loopback_playback")]
    pub loopback_playback_ms: u64,
}

fn default_transport() -> String {
    "loopback".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_loopback_playback() -> u64 {
    250
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            transport: default_transport(),
            connect_timeout_secs: default_connect_timeout(),
            loopback_playback_ms: default_loopback_playback(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, "data/soundpost.db");
        assert_eq!(config.storage.sounds_dir, PathBuf::from("data/sounds"));
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.voice.transport, "loopback");
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/soundpost.db?mode=rwc");
    }
}
