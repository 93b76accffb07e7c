//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Soundboard Context: 效果音注册表
//! - Playback Context: 语音会话与播放仲裁

pub mod playback;
pub mod soundboard;
