//! Gateway Port - 入站事件与回复出口
//!
//! 外部网关客户端推送入站事件, 核心只消费不拉取;
//! 命令参数解析发生在网关侧, 到达时已经是结构化请求

use async_trait::async_trait;
use thiserror::Error;

use crate::application::reply::Reply;
use crate::domain::soundboard::{AuthorId, ChannelRef, GuildId};

/// 网关错误 (回复发送失败)
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Send failed: {0}")]
    SendFailed(String),
}

/// 回复目的地 - 对核心不透明 (文本频道 / 交互令牌的代理)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTarget(u64);

impl ReplyTarget {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ReplyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 结构化命令请求 (网关侧已完成参数解析)
#[derive(Debug, Clone)]
pub enum CommandRequest {
    /// se_add - 注册效果音
    AddEffect { name: String, url: String },
    /// se_del - 删除效果音
    RemoveEffect { name: String },
    /// se_list - 效果音一览
    ListEffects,
    /// join - 加入命令执行者所在语音频道
    Join,
    /// disc - 退出语音频道
    Leave,
    /// help - 命令一览
    Help,
}

impl CommandRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddEffect { .. } => "se_add",
            Self::RemoveEffect { .. } => "se_del",
            Self::ListEffects => "se_list",
            Self::Join => "join",
            Self::Leave => "disc",
            Self::Help => "help",
        }
    }
}

/// 入站事件种类
#[derive(Debug, Clone)]
pub enum GatewayEventKind {
    /// 普通聊天消息 (触发候选)
    Message { content: String },
    /// 结构化命令
    Command(CommandRequest),
}

/// 入站事件
///
/// author_voice_channel 是事件到达时刻作者所在的语音频道快照
#[derive(Debug, Clone)]
pub struct GatewayEvent {
    pub guild_id: GuildId,
    pub author_id: AuthorId,
    pub author_voice_channel: Option<ChannelRef>,
    pub reply_target: ReplyTarget,
    pub kind: GatewayEventKind,
}

/// Reply Sink Port
///
/// 结构化结果的出口; 具体渲染 (纯文本 / embed) 由适配器决定
#[async_trait]
pub trait ReplySinkPort: Send + Sync {
    /// 发送回复到目的地
    async fn send(&self, target: ReplyTarget, reply: &Reply) -> Result<(), GatewayError>;
}
