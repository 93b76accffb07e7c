//! Effect Command Handlers

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::commands::{RegisterEffect, RemoveEffect};
use crate::application::error::ApplicationError;
use crate::application::ports::{ContentStorePort, HttpFetcherPort, SoundRepositoryPort};
use crate::application::reply::Reply;
use crate::domain::soundboard::{ContentKey, EffectName, GuildId, SoundEffect, SourceUrl};

// ============================================================================
// RegisterEffect
// ============================================================================

/// RegisterEffect Handler
///
/// 不变量:
/// - 同 (guild_id, name) 的注册按锁获取顺序串行化 (FIFO 锁),
///   慢下载不会覆盖更新的已完成注册
/// - 下载失败不产生任何映射
/// - 映射写入失败时 blob 已落盘, 作为孤儿保留而不回滚
pub struct RegisterEffectHandler {
    sound_repo: Arc<dyn SoundRepositoryPort>,
    fetcher: Arc<dyn HttpFetcherPort>,
    content_store: Arc<dyn ContentStorePort>,
    locks: DashMap<(GuildId, String), Arc<Mutex<()>>>,
}

impl RegisterEffectHandler {
    pub fn new(
        sound_repo: Arc<dyn SoundRepositoryPort>,
        fetcher: Arc<dyn HttpFetcherPort>,
        content_store: Arc<dyn ContentStorePort>,
    ) -> Self {
        Self {
            sound_repo,
            fetcher,
            content_store,
            locks: DashMap::new(),
        }
    }

    pub async fn handle(&self, command: RegisterEffect) -> Result<Reply, ApplicationError> {
        let name = match EffectName::new(command.name.clone()) {
            Ok(name) => name,
            Err(reason) => {
                return Ok(Reply::InvalidRequest {
                    reason: reason.to_string(),
                })
            }
        };
        let url = match SourceUrl::parse(command.url.clone()) {
            Ok(url) => url,
            Err(reason) => {
                return Ok(Reply::InvalidRequest {
                    reason: reason.to_string(),
                })
            }
        };

        // 同 key 注册按到达顺序排队, 锁覆盖下载和映射写入全程
        let lock_key = (command.guild_id, command.name.clone());
        let lock = self
            .locks
            .entry(lock_key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock().await;
        let reply = self.register_locked(command.guild_id, &name, &url).await;
        drop(guard);
        drop(lock);
        // 无等待者时回收锁条目, map 不随历史 key 无界增长
        self.locks.remove_if(&lock_key, |_, l| Arc::strong_count(l) == 1);

        Ok(reply)
    }

    /// 持锁执行下载 -> 落盘 -> 写映射, 所有失败路径折叠为用户可见回复
    async fn register_locked(&self, guild_id: GuildId, name: &EffectName, url: &SourceUrl) -> Reply {
        let response = match self.fetcher.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    guild_id = %guild_id,
                    effect = %name,
                    url = %url,
                    error = %e,
                    "Effect download failed"
                );
                return Reply::DownloadFailed {
                    name: name.as_str().to_string(),
                    url: url.as_str().to_string(),
                    status: None,
                };
            }
        };

        if !response.is_success() {
            tracing::warn!(
                guild_id = %guild_id,
                effect = %name,
                url = %url,
                status = response.status,
                "Effect download returned non-success status"
            );
            return Reply::DownloadFailed {
                name: name.as_str().to_string(),
                url: url.as_str().to_string(),
                status: Some(response.status),
            };
        }

        let key = ContentKey::derive(url);
        let extension = url.extension();
        let locator = match self
            .content_store
            .put(guild_id, &key, extension.as_deref(), &response.body)
            .await
        {
            Ok(locator) => locator,
            Err(e) => {
                tracing::error!(
                    guild_id = %guild_id,
                    effect = %name,
                    key = %key,
                    error = %e,
                    "Effect blob write failed"
                );
                return Reply::StorageFailed {
                    name: name.as_str().to_string(),
                };
            }
        };

        let effect = SoundEffect::new(guild_id, name.clone(), locator, url.clone());
        if let Err(e) = self.sound_repo.upsert(&effect).await {
            // blob 已落盘, 作为孤儿保留
            tracing::warn!(
                guild_id = %guild_id,
                effect = %name,
                path = %effect.locator().path().display(),
                error = %e,
                "Registry write failed, orphaned blob left on disk"
            );
            return Reply::StorageFailed {
                name: name.as_str().to_string(),
            };
        }

        tracing::info!(
            guild_id = %guild_id,
            effect = %name,
            url = %url,
            key = %key,
            "Sound effect registered"
        );

        Reply::EffectRegistered {
            name: name.as_str().to_string(),
        }
    }
}

// ============================================================================
// RemoveEffect
// ============================================================================

/// RemoveEffect Handler
///
/// 删除不存在的名称同样回复成功 (no-op)
pub struct RemoveEffectHandler {
    sound_repo: Arc<dyn SoundRepositoryPort>,
}

impl RemoveEffectHandler {
    pub fn new(sound_repo: Arc<dyn SoundRepositoryPort>) -> Self {
        Self { sound_repo }
    }

    pub async fn handle(&self, command: RemoveEffect) -> Result<Reply, ApplicationError> {
        self.sound_repo
            .remove(command.guild_id, &command.name)
            .await?;

        tracing::info!(
            guild_id = %command.guild_id,
            effect = %command.name,
            "Sound effect removed"
        );

        Ok(Reply::EffectRemoved { name: command.name })
    }
}
