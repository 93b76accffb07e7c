//! Session Command Handlers

use std::sync::Arc;

use crate::application::commands::{JoinChannel, LeaveChannel};
use crate::application::error::ApplicationError;
use crate::application::ports::{JoinOutcome, LeaveOutcome, SessionRegistryPort};
use crate::application::reply::Reply;
use crate::domain::playback::PlaybackError;

// ============================================================================
// JoinChannel
// ============================================================================

/// JoinChannel Handler
///
/// 执行者不在语音频道时直接拒绝, 不做连接尝试
pub struct JoinChannelHandler {
    sessions: Arc<dyn SessionRegistryPort>,
}

impl JoinChannelHandler {
    pub fn new(sessions: Arc<dyn SessionRegistryPort>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, command: JoinChannel) -> Result<Reply, ApplicationError> {
        let channel = match command.author_channel {
            Some(channel) => channel,
            None => return Ok(Reply::NotInVoice),
        };

        match self.sessions.join(command.guild_id, channel).await {
            Ok(JoinOutcome::Joined) => {
                tracing::info!(
                    guild_id = %command.guild_id,
                    channel = %channel,
                    "Joined voice channel"
                );
                Ok(Reply::Joined {
                    channel: channel.value(),
                })
            }
            Ok(JoinOutcome::AlreadyConnected) => Ok(Reply::AlreadyConnected),
            Err(PlaybackError::Connect { reason }) | Err(PlaybackError::Transport { reason }) => {
                tracing::warn!(
                    guild_id = %command.guild_id,
                    channel = %channel,
                    reason = %reason,
                    "Voice connect failed"
                );
                Ok(Reply::VoiceConnectFailed { reason })
            }
            Err(e) => Ok(Reply::VoiceConnectFailed {
                reason: e.to_string(),
            }),
        }
    }
}

// ============================================================================
// LeaveChannel
// ============================================================================

/// LeaveChannel Handler
///
/// 断开无条件执行, 在播音轨被截断
pub struct LeaveChannelHandler {
    sessions: Arc<dyn SessionRegistryPort>,
}

impl LeaveChannelHandler {
    pub fn new(sessions: Arc<dyn SessionRegistryPort>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, command: LeaveChannel) -> Result<Reply, ApplicationError> {
        match self.sessions.leave(command.guild_id).await {
            LeaveOutcome::Left => {
                tracing::info!(guild_id = %command.guild_id, "Left voice channel");
                Ok(Reply::Left)
            }
            LeaveOutcome::NotConnected => Ok(Reply::NotConnected),
        }
    }
}
