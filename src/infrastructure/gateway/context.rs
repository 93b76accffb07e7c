//! Bot Context
//!
//! 包含所有 Command/Query Handlers 的应用状态;
//! 启动时构建一次, 生命周期覆盖整个进程, 不依赖环境全局量

use std::sync::Arc;

use crate::application::{
    // Command handlers
    JoinChannelHandler,
    LeaveChannelHandler,
    RegisterEffectHandler,
    RemoveEffectHandler,
    TriggerMessageHandler,
    // Query handlers
    ListEffectsHandler,
    // Ports
    ContentStorePort,
    HttpFetcherPort,
    SessionRegistryPort,
    SoundRepositoryPort,
};
use crate::domain::soundboard::AuthorId;
use crate::infrastructure::events::EventPublisher;

/// 应用状态
pub struct BotContext {
    // ========== Ports ==========
    pub sound_repo: Arc<dyn SoundRepositoryPort>,
    pub fetcher: Arc<dyn HttpFetcherPort>,
    pub content_store: Arc<dyn ContentStorePort>,
    pub sessions: Arc<dyn SessionRegistryPort>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub register_effect_handler: RegisterEffectHandler,
    pub remove_effect_handler: RemoveEffectHandler,
    pub join_channel_handler: JoinChannelHandler,
    pub leave_channel_handler: LeaveChannelHandler,
    pub trigger_message_handler: TriggerMessageHandler,

    // ========== Query Handlers ==========
    pub list_effects_handler: ListEffectsHandler,
}

impl BotContext {
    /// 创建应用状态
    pub fn new(
        bot_user_id: AuthorId,
        sound_repo: Arc<dyn SoundRepositoryPort>,
        fetcher: Arc<dyn HttpFetcherPort>,
        content_store: Arc<dyn ContentStorePort>,
        sessions: Arc<dyn SessionRegistryPort>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            // Ports
            sound_repo: sound_repo.clone(),
            fetcher: fetcher.clone(),
            content_store: content_store.clone(),
            sessions: sessions.clone(),
            event_publisher,

            // Command handlers
            register_effect_handler: RegisterEffectHandler::new(
                sound_repo.clone(),
                fetcher.clone(),
                content_store.clone(),
            ),
            remove_effect_handler: RemoveEffectHandler::new(sound_repo.clone()),
            join_channel_handler: JoinChannelHandler::new(sessions.clone()),
            leave_channel_handler: LeaveChannelHandler::new(sessions.clone()),
            trigger_message_handler: TriggerMessageHandler::new(
                bot_user_id,
                sound_repo.clone(),
                sessions.clone(),
            ),

            // Query handlers
            list_effects_handler: ListEffectsHandler::new(sound_repo.clone()),
        }
    }
}
