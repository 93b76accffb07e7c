//! Voice Session Registry - 会话注册表
//!
//! 以社区为键的 actor 拥有表: 首次连接时创建条目, 断开时由 actor 自行移除
//! 不同社区之间没有共享状态, 各自的会话完全并行

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::{
    JoinOutcome, LeaveOutcome, SessionRegistryPort, VoiceTransportPort,
};
use crate::domain::playback::PlaybackError;
use crate::domain::soundboard::{ChannelRef, GuildId, SoundEffect};
use crate::infrastructure::events::EventPublisher;

use super::session::{SessionCommand, SessionMap, VoiceSession, VoiceSessionConfig};

/// 语音会话注册表
pub struct VoiceSessionRegistry {
    sessions: SessionMap,
    transport: Arc<dyn VoiceTransportPort>,
    events: Arc<EventPublisher>,
    config: VoiceSessionConfig,
}

impl VoiceSessionRegistry {
    pub fn new(
        config: VoiceSessionConfig,
        transport: Arc<dyn VoiceTransportPort>,
        events: Arc<EventPublisher>,
    ) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            transport,
            events,
            config,
        }
    }

    /// 当前持有会话的社区数
    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// 取出现有会话句柄, 或为该社区启动新 actor
    ///
    /// connect_channel 为 None 时不允许新建: 没有可连接的频道,
    /// 拒绝且不触发任何连接尝试
    fn ensure_session(
        &self,
        guild_id: GuildId,
        connect_channel: Option<ChannelRef>,
    ) -> Result<mpsc::Sender<SessionCommand>, PlaybackError> {
        match self.sessions.entry(guild_id) {
            Entry::Occupied(entry) => Ok(entry.get().tx.clone()),
            Entry::Vacant(entry) => {
                if connect_channel.is_none() {
                    return Err(PlaybackError::NotInVoice);
                }
                let handle = VoiceSession::spawn(
                    guild_id,
                    self.config.clone(),
                    self.transport.clone(),
                    self.events.clone(),
                    self.sessions.clone(),
                );
                let tx = handle.tx.clone();
                entry.insert(handle);
                Ok(tx)
            }
        }
    }
}

#[async_trait]
impl SessionRegistryPort for VoiceSessionRegistry {
    async fn join(
        &self,
        guild_id: GuildId,
        channel: ChannelRef,
    ) -> Result<JoinOutcome, PlaybackError> {
        // 句柄指向的 actor 可能恰在终止中, 整体重试一次
        for _ in 0..2 {
            let tx = self.ensure_session(guild_id, Some(channel))?;
            let (respond, outcome) = oneshot::channel();
            if tx
                .send(SessionCommand::Join { channel, respond })
                .await
                .is_err()
            {
                continue;
            }
            if let Ok(result) = outcome.await {
                return result;
            }
        }
        Err(PlaybackError::Connect {
            reason: "voice session terminated".to_string(),
        })
    }

    async fn request_playback(
        &self,
        guild_id: GuildId,
        effect: SoundEffect,
        author_channel: Option<ChannelRef>,
    ) -> Result<(), PlaybackError> {
        for _ in 0..2 {
            let tx = self.ensure_session(guild_id, author_channel)?;
            let (respond, outcome) = oneshot::channel();
            if tx
                .send(SessionCommand::Play {
                    effect: effect.clone(),
                    connect_to: author_channel,
                    respond,
                })
                .await
                .is_err()
            {
                continue;
            }
            if let Ok(result) = outcome.await {
                return result;
            }
        }
        Err(PlaybackError::Transport {
            reason: "voice session terminated".to_string(),
        })
    }

    async fn leave(&self, guild_id: GuildId) -> LeaveOutcome {
        let tx = match self.sessions.get(&guild_id) {
            Some(handle) => handle.tx.clone(),
            None => return LeaveOutcome::NotConnected,
        };

        let (respond, outcome) = oneshot::channel();
        if tx.send(SessionCommand::Leave { respond }).await.is_err() {
            // actor 已自行终止, 等价于无会话
            return LeaveOutcome::NotConnected;
        }
        outcome.await.unwrap_or(LeaveOutcome::NotConnected)
    }
}
