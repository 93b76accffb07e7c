//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（Repository、ContentStore、Fetcher、Transport、SessionRegistry 等）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - reply: 用户可见结果
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;
pub mod reply;

// Re-exports
pub use commands::{
    // Effect commands
    RegisterEffect,
    RemoveEffect,
    // Session commands
    JoinChannel,
    LeaveChannel,
    // Trigger
    TriggerMessage,
    // Handlers
    handlers::{
        JoinChannelHandler, LeaveChannelHandler, RegisterEffectHandler, RemoveEffectHandler,
        TriggerMessageHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Content store
    ContentStorePort,
    StoreError,
    // Gateway
    CommandRequest,
    GatewayError,
    GatewayEvent,
    GatewayEventKind,
    ReplySinkPort,
    ReplyTarget,
    // HTTP fetcher
    FetchError,
    FetchResponse,
    HttpFetcherPort,
    // Repositories
    GuildEffectCount,
    RepositoryError,
    SoundRepositoryPort,
    // Session registry
    JoinOutcome,
    LeaveOutcome,
    SessionRegistryPort,
    // Voice transport
    PlaybackHandle,
    TransportError,
    VoiceConnectionPort,
    VoiceTransportPort,
};

pub use queries::{
    // Effect queries
    ListEffects,
    // Handlers
    handlers::ListEffectsHandler,
};

pub use reply::{CommandHelp, EffectSummary, Reply};
