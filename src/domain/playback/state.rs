//! Playback Context - Session State

use serde::{Deserialize, Serialize};

/// 语音会话状态机
///
/// 不变量:
/// - 每个社区同一时刻最多一个会话
/// - Playing 状态下新的播放请求必须被拒绝, 不得打断在播音轨
/// - Playing → Idle 由传输层完成通知驱动, 不轮询
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// 未连接任何语音频道
    Disconnected,
    /// 已连接, 空闲
    Idle,
    /// 已连接, 播放中
    Playing,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Idle => "idle",
            Self::Playing => "playing",
        };
        write!(f, "{}", s)
    }
}

/// 播放结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackEnd {
    /// 音轨自然播放完毕
    Completed,
    /// 播放被截断 (断开连接或传输丢失)
    Truncated,
}

impl PlaybackEnd {
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_predicates() {
        assert!(!SessionState::Disconnected.is_connected());
        assert!(SessionState::Idle.is_connected());
        assert!(SessionState::Playing.is_connected());
        assert!(SessionState::Playing.is_playing());
        assert!(!SessionState::Idle.is_playing());
    }
}
