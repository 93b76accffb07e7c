//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod content_store;
mod gateway;
mod http_fetcher;
mod repositories;
mod session_registry;
mod voice_transport;

pub use content_store::{ContentStorePort, StoreError};
pub use gateway::{
    CommandRequest, GatewayError, GatewayEvent, GatewayEventKind, ReplySinkPort, ReplyTarget,
};
pub use http_fetcher::{FetchError, FetchResponse, HttpFetcherPort};
pub use repositories::{GuildEffectCount, RepositoryError, SoundRepositoryPort};
pub use session_registry::{JoinOutcome, LeaveOutcome, SessionRegistryPort};
pub use voice_transport::{
    PlaybackHandle, TransportError, VoiceConnectionPort, VoiceTransportPort,
};
