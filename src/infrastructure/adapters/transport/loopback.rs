//! Loopback Transport - 进程内语音传输模拟
//!
//! 不接入真实网关, 连接与播放都在进程内模拟;
//! 开发环境的默认传输, 也是会话场景测试的基础

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::ports::{
    PlaybackHandle, TransportError, VoiceConnectionPort, VoiceTransportPort,
};
use crate::domain::playback::PlaybackEnd;
use crate::domain::soundboard::{ChannelRef, ContentLocator, GuildId};

/// Loopback Transport 配置
#[derive(Debug, Clone)]
pub struct LoopbackTransportConfig {
    /// 模拟播放时长（毫秒）
    pub playback_ms: u64,
    /// 模拟连接延迟（毫秒）
    pub connect_delay_ms: u64,
}

impl Default for LoopbackTransportConfig {
    fn default() -> Self {
        Self {
            playback_ms: 250,
            connect_delay_ms: 0,
        }
    }
}

/// Loopback Transport
pub struct LoopbackTransport {
    config: LoopbackTransportConfig,
    connect_count: Arc<AtomicUsize>,
}

impl LoopbackTransport {
    pub fn new(config: LoopbackTransportConfig) -> Self {
        Self {
            config,
            connect_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(LoopbackTransportConfig::default())
    }

    /// 累计连接次数
    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoiceTransportPort for LoopbackTransport {
    async fn connect(
        &self,
        guild_id: GuildId,
        channel: ChannelRef,
    ) -> Result<Box<dyn VoiceConnectionPort>, TransportError> {
        if self.config.connect_delay_ms > 0 {
            tokio::time::sleep(tokio::time::Duration::from_millis(
                self.config.connect_delay_ms,
            ))
            .await;
        }
        self.connect_count.fetch_add(1, Ordering::SeqCst);

        tracing::debug!(
            guild_id = %guild_id,
            channel = %channel,
            "Loopback transport connected"
        );

        Ok(Box::new(LoopbackConnection {
            guild_id,
            playback_ms: self.config.playback_ms,
            playing: None,
        }))
    }
}

/// Loopback 连接
///
/// 同一连接同一时刻只允许一路在播音轨, 与真实传输一致
struct LoopbackConnection {
    guild_id: GuildId,
    playback_ms: u64,
    playing: Option<JoinHandle<()>>,
}

#[async_trait]
impl VoiceConnectionPort for LoopbackConnection {
    async fn play(&mut self, locator: &ContentLocator) -> Result<PlaybackHandle, TransportError> {
        if let Some(handle) = &self.playing {
            if !handle.is_finished() {
                return Err(TransportError::PlaybackFailed(
                    "already playing".to_string(),
                ));
            }
        }

        let track_id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        let duration = tokio::time::Duration::from_millis(self.playback_ms);

        tracing::debug!(
            guild_id = %self.guild_id,
            track_id = %track_id,
            path = %locator.path().display(),
            "Loopback playback started"
        );

        // 任务被 abort 时 tx 随之丢弃, 接收端按截断处理
        self.playing = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(PlaybackEnd::Completed);
        }));

        Ok(PlaybackHandle {
            track_id,
            finished: rx,
        })
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        if let Some(handle) = self.playing.take() {
            handle.abort();
        }
        tracing::debug!(guild_id = %self.guild_id, "Loopback transport disconnected");
        Ok(())
    }
}
