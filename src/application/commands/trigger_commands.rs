//! Trigger Commands - 触发消息

use crate::domain::soundboard::{AuthorId, ChannelRef, GuildId};

/// 入站聊天消息 (触发候选)
///
/// content 原文与注册表精确匹配, 不做规范化
#[derive(Debug, Clone)]
pub struct TriggerMessage {
    pub guild_id: GuildId,
    pub author_id: AuthorId,
    /// 消息作者当前所在的语音频道快照
    pub author_channel: Option<ChannelRef>,
    pub content: String,
}
