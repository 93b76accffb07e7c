//! Content Store Port - 出站端口
//!
//! 定义音频 blob 落盘的抽象接口
//! 路径方案: <root>/<guild_id>/<content_key><ext>

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::soundboard::{ContentKey, ContentLocator, GuildId};

/// 内容存储错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Blob not found: {0}")]
    BlobNotFound(String),
}

/// Content Store Port
///
/// 约定:
/// - put 覆盖同 key 已有 blob, 中间目录按需创建
/// - put 失败时不留下半写文件
/// - blob 一经写入不自动回收 (孤儿 blob 可接受)
#[async_trait]
pub trait ContentStorePort: Send + Sync {
    /// 计算 blob 的落盘路径
    fn blob_path(&self, guild_id: GuildId, key: &ContentKey, extension: Option<&str>) -> PathBuf;

    /// 写入完整 blob, 返回定位符
    async fn put(
        &self,
        guild_id: GuildId,
        key: &ContentKey,
        extension: Option<&str>,
        data: &[u8],
    ) -> Result<ContentLocator, StoreError>;

    /// 读取 blob 内容
    async fn read(&self, locator: &ContentLocator) -> Result<Vec<u8>, StoreError>;

    /// 检查 blob 是否存在
    async fn exists(&self, locator: &ContentLocator) -> bool;
}
