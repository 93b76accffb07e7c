//! Session Registry Port - 出站端口
//!
//! 定义每社区语音会话仲裁的抽象接口
//! 具体实现是 infrastructure/voice 的 actor 注册表

use async_trait::async_trait;

use crate::domain::playback::PlaybackError;
use crate::domain::soundboard::{ChannelRef, GuildId, SoundEffect};

/// join 请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// 新建会话并连接成功
    Joined,
    /// 已有会话, 保持原频道不动
    AlreadyConnected,
}

/// leave 请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// 会话已断开并销毁
    Left,
    /// 本来就没有会话
    NotConnected,
}

/// Session Registry Port
///
/// 约定:
/// - 每社区最多一个活跃会话, 所有请求经由该会话串行处理
/// - request_playback 在无会话且作者在语音频道时隐式建立连接
/// - 播放中的新播放请求返回 Busy, 不打断在播音轨
#[async_trait]
pub trait SessionRegistryPort: Send + Sync {
    /// 显式加入语音频道
    async fn join(
        &self,
        guild_id: GuildId,
        channel: ChannelRef,
    ) -> Result<JoinOutcome, PlaybackError>;

    /// 请求播放效果音
    ///
    /// author_channel 用于无会话时的按需连接;
    /// 为 None 且无会话时返回 NotInVoice, 不做任何连接尝试
    async fn request_playback(
        &self,
        guild_id: GuildId,
        effect: SoundEffect,
        author_channel: Option<ChannelRef>,
    ) -> Result<(), PlaybackError>;

    /// 显式断开并销毁会话
    async fn leave(&self, guild_id: GuildId) -> LeaveOutcome;
}
