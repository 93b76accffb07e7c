//! Playback Context - 播放限界上下文
//!
//! 职责:
//! - 语音会话状态机 (Disconnected / Idle / Playing)
//! - 播放仲裁语义 (Busy 拒绝, 完成通知驱动回退)
//! - 播放失败类别

mod errors;
mod state;

pub use errors::PlaybackError;
pub use state::{PlaybackEnd, SessionState};
