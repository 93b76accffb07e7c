//! Playback Context - Errors

use thiserror::Error;

/// 播放请求的失败类别
///
/// 每一种都在触发/命令边界转换为用户可见回复, 不会终止调度进程
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("请求者不在语音频道且无可复用会话")]
    NotInVoice,

    #[error("会话正在播放中, 请求被拒绝")]
    Busy,

    #[error("语音频道连接失败: {reason}")]
    Connect { reason: String },

    #[error("传输层错误: {reason}")]
    Transport { reason: String },
}
