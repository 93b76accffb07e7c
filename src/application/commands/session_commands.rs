//! Session Commands - 语音会话命令

use crate::domain::soundboard::{ChannelRef, GuildId};

/// 加入语音频道命令 (join)
#[derive(Debug, Clone)]
pub struct JoinChannel {
    pub guild_id: GuildId,
    /// 命令执行者当前所在的语音频道 (不在则为 None)
    pub author_channel: Option<ChannelRef>,
}

/// 退出语音频道命令 (disc)
#[derive(Debug, Clone)]
pub struct LeaveChannel {
    pub guild_id: GuildId,
}
