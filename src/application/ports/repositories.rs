//! Repository Ports - 出站端口
//!
//! 定义效果音注册表持久化的抽象接口
//! 具体实现在 infrastructure 层（SQLite）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::soundboard::{GuildId, SoundEffect};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 每社区效果音数量统计 (启动摘要用)
#[derive(Debug, Clone)]
pub struct GuildEffectCount {
    pub guild_id: GuildId,
    pub count: i64,
}

/// Sound Repository Port
///
/// 约定:
/// - upsert 幂等, 同 (guild_id, name) 覆盖而非新增
/// - find 按原始触发文本精确查找, 缺失返回 Ok(None)
/// - remove 删除不存在的 key 视为成功的 no-op
#[async_trait]
pub trait SoundRepositoryPort: Send + Sync {
    /// 保存或覆盖效果音映射
    async fn upsert(&self, effect: &SoundEffect) -> Result<(), RepositoryError>;

    /// 按名称精确查找效果音
    async fn find(&self, guild_id: GuildId, name: &str) -> Result<Option<SoundEffect>, RepositoryError>;

    /// 删除效果音映射
    async fn remove(&self, guild_id: GuildId, name: &str) -> Result<(), RepositoryError>;

    /// 获取社区的全部效果音
    async fn list(&self, guild_id: GuildId) -> Result<Vec<SoundEffect>, RepositoryError>;

    /// 按社区统计效果音数量
    async fn count_by_guild(&self) -> Result<Vec<GuildEffectCount>, RepositoryError>;
}
