//! Soundboard Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContentLocator, EffectName, GuildId, SourceUrl};

/// SoundEffect 聚合根
///
/// 不变量:
/// - (guild_id, name) 唯一, 重复注册覆盖 locator (last-write-wins)
/// - locator 仅在内容落盘且映射写入成功后才有效
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundEffect {
    guild_id: GuildId,
    name: EffectName,
    locator: ContentLocator,
    source_url: SourceUrl,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SoundEffect {
    /// 注册新效果音
    pub fn new(
        guild_id: GuildId,
        name: EffectName,
        locator: ContentLocator,
        source_url: SourceUrl,
    ) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            name,
            locator,
            source_url,
            created_at: now,
            updated_at: now,
        }
    }

    /// 重新注册 - 替换 locator 与来源, 保留创建时间
    pub fn reregister(&mut self, locator: ContentLocator, source_url: SourceUrl) {
        self.locator = locator;
        self.source_url = source_url;
        self.updated_at = Utc::now();
    }

    /// 从持久化记录还原聚合
    pub fn restore(
        guild_id: GuildId,
        name: EffectName,
        locator: ContentLocator,
        source_url: SourceUrl,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            guild_id,
            name,
            locator,
            source_url,
            created_at,
            updated_at,
        }
    }

    // Getters
    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    pub fn name(&self) -> &EffectName {
        &self.name
    }

    pub fn locator(&self) -> &ContentLocator {
        &self.locator
    }

    pub fn source_url(&self) -> &SourceUrl {
        &self.source_url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
