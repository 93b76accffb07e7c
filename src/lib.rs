//! Soundpost - 社区效果音机器人核心
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Soundboard Context: 效果音注册表上下文
//! - Playback Context: 语音会话与播放上下文
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SoundRepository, ContentStore, HttpFetcher, VoiceTransport, SessionRegistry）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - Gateway: 聊天事件分发与命令路由
//! - Voice: 按社区隔离的语音会话 actor
//! - Persistence: SQLite 存储
//! - Adapters: HTTP 下载器、内容寻址文件存储、语音传输
//! - Events: 会话事件广播

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
