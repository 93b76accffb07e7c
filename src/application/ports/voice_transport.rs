//! Voice Transport Port - 出站端口
//!
//! 定义实时语音传输的抽象接口
//! 传输层保证每个连接同一时刻最多一路在播音轨

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::domain::playback::PlaybackEnd;
use crate::domain::soundboard::{ChannelRef, ContentLocator, GuildId};

/// 传输层错误
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    ConnectFailed(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    #[error("Connection closed")]
    ConnectionClosed,
}

/// 在播音轨句柄
///
/// finished 在播放结束时收到完成通知; 发送端被丢弃视为截断
#[derive(Debug)]
pub struct PlaybackHandle {
    pub track_id: Uuid,
    pub finished: oneshot::Receiver<PlaybackEnd>,
}

/// Voice Transport Port
///
/// 连接的建立入口; 连接本身由 VoiceConnectionPort 表示
#[async_trait]
pub trait VoiceTransportPort: Send + Sync {
    /// 连接到指定语音频道
    async fn connect(
        &self,
        guild_id: GuildId,
        channel: ChannelRef,
    ) -> Result<Box<dyn VoiceConnectionPort>, TransportError>;
}

/// 单个社区的活跃语音连接
#[async_trait]
pub trait VoiceConnectionPort: Send {
    /// 开始播放定位符指向的音频, 返回完成通知句柄
    async fn play(&mut self, locator: &ContentLocator) -> Result<PlaybackHandle, TransportError>;

    /// 断开连接, 丢弃任何在播音轨
    async fn disconnect(&mut self) -> Result<(), TransportError>;
}
