//! Voice - 每社区语音会话 actor 与注册表

mod registry;
mod session;

pub use registry::VoiceSessionRegistry;
pub use session::VoiceSessionConfig;
