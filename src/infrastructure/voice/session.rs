//! Voice Session Actor - 单社区语音会话
//!
//! 一个社区的连接与播放仲裁全部串行经过这个 actor,
//! "是否空闲" 的检查与 "开始播放" 的写入因此是原子的,
//! 不会出现双连接或双播放的丢失更新

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::application::ports::{
    JoinOutcome, LeaveOutcome, TransportError, VoiceConnectionPort, VoiceTransportPort,
};
use crate::domain::playback::{PlaybackEnd, PlaybackError, SessionState};
use crate::domain::soundboard::{ChannelRef, GuildId, SoundEffect};
use crate::infrastructure::events::EventPublisher;

/// 会话 actor 配置
#[derive(Debug, Clone)]
pub struct VoiceSessionConfig {
    /// 语音频道连接超时（秒）
    pub connect_timeout_secs: u64,
    /// 邮箱容量
    pub mailbox_capacity: usize,
}

impl Default for VoiceSessionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            mailbox_capacity: 32,
        }
    }
}

/// 会话邮箱消息
pub(crate) enum SessionCommand {
    Join {
        channel: ChannelRef,
        respond: oneshot::Sender<Result<JoinOutcome, PlaybackError>>,
    },
    Play {
        effect: SoundEffect,
        connect_to: Option<ChannelRef>,
        respond: oneshot::Sender<Result<(), PlaybackError>>,
    },
    Leave {
        respond: oneshot::Sender<LeaveOutcome>,
    },
}

/// 注册表持有的会话句柄
pub(crate) struct SessionHandle {
    pub(crate) actor_id: Uuid,
    pub(crate) tx: mpsc::Sender<SessionCommand>,
}

/// 社区 -> 会话句柄的拥有表
pub(crate) type SessionMap = Arc<DashMap<GuildId, SessionHandle>>;

/// 在播音轨
struct ActiveTrack {
    track_id: Uuid,
    effect: String,
    finished: oneshot::Receiver<PlaybackEnd>,
}

/// 事件循环的唤醒来源
enum Step {
    Command(Option<SessionCommand>),
    Finished(Result<PlaybackEnd, oneshot::error::RecvError>),
}

/// 语音会话 actor
///
/// 首次连接时由注册表创建, 断开后自行从注册表移除
pub(crate) struct VoiceSession {
    guild_id: GuildId,
    actor_id: Uuid,
    config: VoiceSessionConfig,
    mailbox: mpsc::Receiver<SessionCommand>,
    transport: Arc<dyn VoiceTransportPort>,
    events: Arc<EventPublisher>,
    sessions: SessionMap,
    connection: Option<Box<dyn VoiceConnectionPort>>,
    active: Option<ActiveTrack>,
}

impl VoiceSession {
    /// 创建 actor 并启动事件循环, 返回注册表句柄
    pub(crate) fn spawn(
        guild_id: GuildId,
        config: VoiceSessionConfig,
        transport: Arc<dyn VoiceTransportPort>,
        events: Arc<EventPublisher>,
        sessions: SessionMap,
    ) -> SessionHandle {
        let actor_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(config.mailbox_capacity);

        let session = Self {
            guild_id,
            actor_id,
            config,
            mailbox: rx,
            transport,
            events,
            sessions,
            connection: None,
            active: None,
        };
        tokio::spawn(session.run());

        SessionHandle { actor_id, tx }
    }

    async fn run(mut self) {
        tracing::debug!(
            guild_id = %self.guild_id,
            actor_id = %self.actor_id,
            "Voice session actor started"
        );

        loop {
            // 邮箱与完成通知分属不同字段, 拆开借用供 select 独立轮询
            let mailbox = &mut self.mailbox;
            let active = &mut self.active;

            let step = tokio::select! {
                cmd = mailbox.recv() => Step::Command(cmd),
                end = async {
                    match active.as_mut() {
                        Some(track) => (&mut track.finished).await,
                        None => std::future::pending().await,
                    }
                } => Step::Finished(end),
            };

            match step {
                Step::Command(Some(SessionCommand::Join { channel, respond })) => {
                    let _ = respond.send(self.handle_join(channel).await);
                }
                Step::Command(Some(SessionCommand::Play {
                    effect,
                    connect_to,
                    respond,
                })) => {
                    let _ = respond.send(self.handle_play(effect, connect_to).await);
                }
                Step::Command(Some(SessionCommand::Leave { respond })) => {
                    // 先移除注册表条目再应答, 应答方随后的 join 一定拿到新 actor
                    let outcome = self.handle_leave().await;
                    self.remove_from_registry();
                    let _ = respond.send(outcome);
                    break;
                }
                Step::Command(None) => {
                    // 注册表整体被丢弃, 收尾断开
                    self.handle_leave().await;
                    break;
                }
                Step::Finished(end) => self.finish_playback(end),
            }

            // 连接不存在的 actor 没有存在价值 (新建连接失败或传输链路已死)
            if self.connection.is_none() {
                break;
            }
        }

        // 所有退出路径统一收尾
        self.teardown().await;
        self.remove_from_registry();
        tracing::debug!(
            guild_id = %self.guild_id,
            actor_id = %self.actor_id,
            "Voice session actor stopped"
        );
    }

    async fn handle_join(&mut self, channel: ChannelRef) -> Result<JoinOutcome, PlaybackError> {
        if self.connection.is_some() {
            return Ok(JoinOutcome::AlreadyConnected);
        }
        self.connect(channel).await?;
        Ok(JoinOutcome::Joined)
    }

    async fn handle_play(
        &mut self,
        effect: SoundEffect,
        connect_to: Option<ChannelRef>,
    ) -> Result<(), PlaybackError> {
        if self.active.is_some() {
            tracing::debug!(
                guild_id = %self.guild_id,
                effect = %effect.name(),
                state = %self.state(),
                "Playback rejected, session busy"
            );
            return Err(PlaybackError::Busy);
        }

        if self.connection.is_none() {
            // 无连接时按需建立; 请求者不在语音频道则直接拒绝
            match connect_to {
                Some(channel) => self.connect(channel).await?,
                None => return Err(PlaybackError::NotInVoice),
            }
        }

        let play_result = match self.connection.as_mut() {
            Some(connection) => connection.play(effect.locator()).await,
            None => return Err(PlaybackError::NotInVoice),
        };

        let handle = match play_result {
            Ok(handle) => handle,
            Err(TransportError::ConnectionClosed) => {
                // 传输链路已死, 销毁会话, 下次触发重新连接
                tracing::warn!(
                    guild_id = %self.guild_id,
                    effect = %effect.name(),
                    "Transport connection closed, tearing down session"
                );
                self.teardown().await;
                return Err(PlaybackError::Transport {
                    reason: "connection closed".to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    guild_id = %self.guild_id,
                    effect = %effect.name(),
                    error = %e,
                    "Transport play failed"
                );
                return Err(PlaybackError::Transport {
                    reason: e.to_string(),
                });
            }
        };

        tracing::info!(
            guild_id = %self.guild_id,
            effect = %effect.name(),
            track_id = %handle.track_id,
            "Playback started"
        );
        self.events
            .publish_playback_started(self.guild_id, handle.track_id, effect.name().as_str());
        self.active = Some(ActiveTrack {
            track_id: handle.track_id,
            effect: effect.name().as_str().to_string(),
            finished: handle.finished,
        });
        Ok(())
    }

    async fn handle_leave(&mut self) -> LeaveOutcome {
        if self.connection.is_none() {
            return LeaveOutcome::NotConnected;
        }
        self.teardown().await;
        LeaveOutcome::Left
    }

    /// 建立传输连接, 带超时
    async fn connect(&mut self, channel: ChannelRef) -> Result<(), PlaybackError> {
        let timeout = std::time::Duration::from_secs(self.config.connect_timeout_secs);
        let connected =
            tokio::time::timeout(timeout, self.transport.connect(self.guild_id, channel)).await;

        let connection = match connected {
            Ok(Ok(connection)) => connection,
            Ok(Err(e)) => {
                tracing::warn!(
                    guild_id = %self.guild_id,
                    channel = %channel,
                    error = %e,
                    "Voice connect failed"
                );
                return Err(PlaybackError::Connect {
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                tracing::warn!(
                    guild_id = %self.guild_id,
                    channel = %channel,
                    timeout_secs = self.config.connect_timeout_secs,
                    "Voice connect timed out"
                );
                return Err(PlaybackError::Connect {
                    reason: format!(
                        "connect timed out after {}s",
                        self.config.connect_timeout_secs
                    ),
                });
            }
        };

        self.connection = Some(connection);
        // 社区事件通道与连接同生命周期, 断开时在 teardown 注销
        let _ = self.events.register_guild(self.guild_id);
        self.events.publish_connected(self.guild_id, channel);
        tracing::info!(
            guild_id = %self.guild_id,
            channel = %channel,
            "Voice session connected"
        );
        Ok(())
    }

    /// 播放完成通知, 回到空闲态
    fn finish_playback(&mut self, end: Result<PlaybackEnd, oneshot::error::RecvError>) {
        let track = match self.active.take() {
            Some(track) => track,
            None => return,
        };

        // 发送端被丢弃按截断处理
        let end = end.unwrap_or(PlaybackEnd::Truncated);
        tracing::info!(
            guild_id = %self.guild_id,
            track_id = %track.track_id,
            effect = %track.effect,
            truncated = end.is_truncated(),
            state = %self.state(),
            "Playback finished"
        );
        self.events
            .publish_playback_finished(self.guild_id, track.track_id, end.is_truncated());
    }

    /// 断开传输并清理在播状态, 可重复调用
    async fn teardown(&mut self) {
        if let Some(track) = self.active.take() {
            // 主动断开即截断, 完成通知不会再来
            self.events
                .publish_playback_finished(self.guild_id, track.track_id, true);
        }
        if let Some(mut connection) = self.connection.take() {
            if let Err(e) = connection.disconnect().await {
                tracing::warn!(guild_id = %self.guild_id, error = %e, "Transport disconnect failed");
            }
            // 先发布断开事件再注销通道, 既有订阅者耗尽缓冲后收到 Closed
            self.events.publish_disconnected(self.guild_id);
            self.events.unregister_guild(self.guild_id);
            tracing::info!(guild_id = %self.guild_id, "Voice session disconnected");
        }
    }

    /// 仅移除属于自己的条目, 不碰后继 actor 的注册
    fn remove_from_registry(&self) {
        self.sessions
            .remove_if(&self.guild_id, |_, handle| handle.actor_id == self.actor_id);
    }

    fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Playing
        } else if self.connection.is_some() {
            SessionState::Idle
        } else {
            SessionState::Disconnected
        }
    }
}
