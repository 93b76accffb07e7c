//! Event Publisher Implementation
//!
//! 语音会话状态变更的进程内广播

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::soundboard::{ChannelRef, GuildId};

/// 会话事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum SessionEvent {
    /// 已连接语音频道
    Connected {
        guild_id: GuildId,
        channel: ChannelRef,
    },
    /// 播放开始
    PlaybackStarted {
        guild_id: GuildId,
        track_id: Uuid,
        effect: String,
    },
    /// 播放结束
    PlaybackFinished {
        guild_id: GuildId,
        track_id: Uuid,
        truncated: bool,
    },
    /// 会话断开
    Disconnected { guild_id: GuildId },
}

/// 事件发布器
pub struct EventPublisher {
    /// guild_id -> broadcast sender (for per-community subscriptions)
    guild_channels: DashMap<GuildId, broadcast::Sender<SessionEvent>>,
    /// Global broadcast channel carrying every session event
    global_channel: broadcast::Sender<SessionEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            guild_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全部社区的事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<SessionEvent> {
        self.global_channel.subscribe()
    }

    /// 注册指定社区的事件通道
    pub fn register_guild(&self, guild_id: GuildId) -> broadcast::Receiver<SessionEvent> {
        if let Some(sender) = self.guild_channels.get(&guild_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(100);
        self.guild_channels.insert(guild_id, tx);
        rx
    }

    /// 取消注册社区通道
    pub fn unregister_guild(&self, guild_id: GuildId) {
        self.guild_channels.remove(&guild_id);
    }

    /// 获取指定社区的事件接收器
    pub fn subscribe(&self, guild_id: GuildId) -> Option<broadcast::Receiver<SessionEvent>> {
        self.guild_channels.get(&guild_id).map(|s| s.subscribe())
    }

    /// 发布连接建立事件
    pub fn publish_connected(&self, guild_id: GuildId, channel: ChannelRef) {
        self.publish(guild_id, SessionEvent::Connected { guild_id, channel });
    }

    /// 发布播放开始事件
    pub fn publish_playback_started(&self, guild_id: GuildId, track_id: Uuid, effect: &str) {
        self.publish(
            guild_id,
            SessionEvent::PlaybackStarted {
                guild_id,
                track_id,
                effect: effect.to_string(),
            },
        );
    }

    /// 发布播放结束事件
    pub fn publish_playback_finished(&self, guild_id: GuildId, track_id: Uuid, truncated: bool) {
        self.publish(
            guild_id,
            SessionEvent::PlaybackFinished {
                guild_id,
                track_id,
                truncated,
            },
        );
    }

    /// 发布会话断开事件
    pub fn publish_disconnected(&self, guild_id: GuildId) {
        self.publish(guild_id, SessionEvent::Disconnected { guild_id });
    }

    /// 发布事件到指定社区通道和全局通道
    fn publish(&self, guild_id: GuildId, event: SessionEvent) {
        if let Some(sender) = self.guild_channels.get(&guild_id) {
            if let Err(e) = sender.send(event.clone()) {
                tracing::debug!(
                    guild_id = %guild_id,
                    error = %e,
                    "Failed to publish event (no receivers)"
                );
            }
        }

        // 全局通道在无订阅者时发送失败是常态, 静默忽略
        let _ = self.global_channel.send(event);
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
