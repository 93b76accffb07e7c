//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod gateway;
pub mod persistence;
pub mod voice;

pub use events::EventPublisher;
pub use gateway::{BotContext, Dispatcher, LoggingReplySink};
pub use voice::{VoiceSessionConfig, VoiceSessionRegistry};
