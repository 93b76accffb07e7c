//! Event Dispatcher
//!
//! 消费网关推送的入站事件流, 按事件种类路由到 handler,
//! 把结构化结果送到回复出口; 预期失败不会终止分发循环

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::{
    ApplicationError, CommandRequest, GatewayEvent, GatewayEventKind, JoinChannel, LeaveChannel,
    ListEffects, RegisterEffect, RemoveEffect, Reply, ReplySinkPort, TriggerMessage,
};

use super::command_table;
use super::context::BotContext;

/// 事件分发器
pub struct Dispatcher {
    context: Arc<BotContext>,
    reply_sink: Arc<dyn ReplySinkPort>,
    events: mpsc::Receiver<GatewayEvent>,
}

impl Dispatcher {
    pub fn new(
        context: Arc<BotContext>,
        reply_sink: Arc<dyn ReplySinkPort>,
        events: mpsc::Receiver<GatewayEvent>,
    ) -> Self {
        Self {
            context,
            reply_sink,
            events,
        }
    }

    /// 启动分发循环, 事件源关闭时返回
    pub async fn run(self) {
        self.run_with_shutdown(std::future::pending::<()>()).await;
    }

    /// 启动分发循环（带优雅关闭）
    pub async fn run_with_shutdown<F>(mut self, shutdown_signal: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            commands = command_table::COMMANDS.len(),
            "Dispatcher started"
        );
        tokio::pin!(shutdown_signal);

        loop {
            tokio::select! {
                event = self.events.recv() => {
                    let event = match event {
                        Some(event) => event,
                        None => {
                            tracing::info!("Gateway event stream closed");
                            break;
                        }
                    };

                    // 每个事件独立任务, 单个社区的慢 I/O 不阻塞事件流
                    let context = self.context.clone();
                    let reply_sink = self.reply_sink.clone();
                    tokio::spawn(async move {
                        Self::process_event(context, reply_sink, event).await;
                    });
                }
                _ = &mut shutdown_signal => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        tracing::info!("Dispatcher stopped");
    }

    /// 处理单个入站事件
    async fn process_event(
        context: Arc<BotContext>,
        reply_sink: Arc<dyn ReplySinkPort>,
        event: GatewayEvent,
    ) {
        let guild_id = event.guild_id;
        let reply_target = event.reply_target;

        let reply = match Self::route(context, event).await {
            Ok(Some(reply)) => reply,
            // 静默路径: 触发未命中 / 自发消息 / 播放成功
            Ok(None) => return,
            Err(e) => {
                tracing::error!(guild_id = %guild_id, error = %e, "Event handling failed");
                Reply::Internal
            }
        };

        if let Err(e) = reply_sink.send(reply_target, &reply).await {
            tracing::warn!(
                guild_id = %guild_id,
                reply_target = %reply_target,
                error = %e,
                "Reply delivery failed"
            );
        }
    }

    /// 按事件种类路由
    async fn route(
        context: Arc<BotContext>,
        event: GatewayEvent,
    ) -> Result<Option<Reply>, ApplicationError> {
        match event.kind {
            GatewayEventKind::Message { content } => {
                context
                    .trigger_message_handler
                    .handle(TriggerMessage {
                        guild_id: event.guild_id,
                        author_id: event.author_id,
                        author_channel: event.author_voice_channel,
                        content,
                    })
                    .await
            }
            GatewayEventKind::Command(request) => {
                tracing::debug!(
                    guild_id = %event.guild_id,
                    author_id = %event.author_id,
                    command = request.name(),
                    "Command received"
                );

                let reply = match request {
                    CommandRequest::AddEffect { name, url } => {
                        context
                            .register_effect_handler
                            .handle(RegisterEffect {
                                guild_id: event.guild_id,
                                name,
                                url,
                            })
                            .await?
                    }
                    CommandRequest::RemoveEffect { name } => {
                        context
                            .remove_effect_handler
                            .handle(RemoveEffect {
                                guild_id: event.guild_id,
                                name,
                            })
                            .await?
                    }
                    CommandRequest::ListEffects => {
                        let effects = context
                            .list_effects_handler
                            .handle(ListEffects {
                                guild_id: event.guild_id,
                            })
                            .await?;
                        Reply::EffectList { effects }
                    }
                    CommandRequest::Join => {
                        context
                            .join_channel_handler
                            .handle(JoinChannel {
                                guild_id: event.guild_id,
                                author_channel: event.author_voice_channel,
                            })
                            .await?
                    }
                    CommandRequest::Leave => {
                        context
                            .leave_channel_handler
                            .handle(LeaveChannel {
                                guild_id: event.guild_id,
                            })
                            .await?
                    }
                    CommandRequest::Help => command_table::help_reply(),
                };
                Ok(Some(reply))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{
        ContentStorePort, FetchError, FetchResponse, GatewayError, GuildEffectCount,
        HttpFetcherPort, JoinOutcome, LeaveOutcome, RepositoryError, ReplyTarget,
        SessionRegistryPort, SoundRepositoryPort, StoreError,
    };
    use crate::domain::playback::PlaybackError;
    use crate::domain::soundboard::{
        AuthorId, ChannelRef, ContentKey, ContentLocator, GuildId, SoundEffect, SourceUrl,
    };
    use crate::infrastructure::events::EventPublisher;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeRepo {
        effects: StdMutex<Vec<SoundEffect>>,
    }

    #[async_trait]
    impl SoundRepositoryPort for FakeRepo {
        async fn upsert(&self, effect: &SoundEffect) -> Result<(), RepositoryError> {
            let mut effects = self.effects.lock().unwrap();
            effects.retain(|e| {
                !(e.guild_id() == effect.guild_id() && e.name() == effect.name())
            });
            effects.push(effect.clone());
            Ok(())
        }

        async fn find(
            &self,
            guild_id: GuildId,
            name: &str,
        ) -> Result<Option<SoundEffect>, RepositoryError> {
            Ok(self
                .effects
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.guild_id() == guild_id && e.name().as_str() == name)
                .cloned())
        }

        async fn remove(&self, guild_id: GuildId, name: &str) -> Result<(), RepositoryError> {
            self.effects
                .lock()
                .unwrap()
                .retain(|e| !(e.guild_id() == guild_id && e.name().as_str() == name));
            Ok(())
        }

        async fn list(&self, guild_id: GuildId) -> Result<Vec<SoundEffect>, RepositoryError> {
            Ok(self
                .effects
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.guild_id() == guild_id)
                .cloned()
                .collect())
        }

        async fn count_by_guild(&self) -> Result<Vec<GuildEffectCount>, RepositoryError> {
            Ok(vec![])
        }
    }

    struct FakeFetcher;

    #[async_trait]
    impl HttpFetcherPort for FakeFetcher {
        async fn get(&self, _url: &SourceUrl) -> Result<FetchResponse, FetchError> {
            Ok(FetchResponse {
                status: 200,
                body: vec![0u8; 16],
            })
        }
    }

    struct FakeStore;

    #[async_trait]
    impl ContentStorePort for FakeStore {
        fn blob_path(
            &self,
            guild_id: GuildId,
            key: &ContentKey,
            extension: Option<&str>,
        ) -> PathBuf {
            let file = match extension {
                Some(ext) => format!("{}.{}", key, ext),
                None => key.as_str().to_string(),
            };
            PathBuf::from("/tmp/sounds")
                .join(guild_id.value().to_string())
                .join(file)
        }

        async fn put(
            &self,
            guild_id: GuildId,
            key: &ContentKey,
            extension: Option<&str>,
            _data: &[u8],
        ) -> Result<ContentLocator, StoreError> {
            Ok(ContentLocator::new(
                key.clone(),
                self.blob_path(guild_id, key, extension),
            ))
        }

        async fn read(&self, _locator: &ContentLocator) -> Result<Vec<u8>, StoreError> {
            Ok(vec![])
        }

        async fn exists(&self, _locator: &ContentLocator) -> bool {
            true
        }
    }

    struct FakeSessions;

    #[async_trait]
    impl SessionRegistryPort for FakeSessions {
        async fn join(
            &self,
            _guild_id: GuildId,
            _channel: ChannelRef,
        ) -> Result<JoinOutcome, PlaybackError> {
            Ok(JoinOutcome::Joined)
        }

        async fn request_playback(
            &self,
            _guild_id: GuildId,
            _effect: SoundEffect,
            _author_channel: Option<ChannelRef>,
        ) -> Result<(), PlaybackError> {
            Ok(())
        }

        async fn leave(&self, _guild_id: GuildId) -> LeaveOutcome {
            LeaveOutcome::Left
        }
    }

    #[derive(Default)]
    struct CollectingReplySink {
        sent: StdMutex<Vec<(ReplyTarget, Reply)>>,
    }

    impl CollectingReplySink {
        fn sent(&self) -> Vec<(ReplyTarget, Reply)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReplySinkPort for CollectingReplySink {
        async fn send(&self, target: ReplyTarget, reply: &Reply) -> Result<(), GatewayError> {
            self.sent.lock().unwrap().push((target, reply.clone()));
            Ok(())
        }
    }

    fn make_context() -> Arc<BotContext> {
        Arc::new(BotContext::new(
            AuthorId::new(999),
            Arc::new(FakeRepo::default()),
            Arc::new(FakeFetcher),
            Arc::new(FakeStore),
            Arc::new(FakeSessions),
            EventPublisher::new().arc(),
        ))
    }

    fn command_event(guild: u64, request: CommandRequest) -> GatewayEvent {
        GatewayEvent {
            guild_id: GuildId::new(guild),
            author_id: AuthorId::new(1),
            author_voice_channel: Some(ChannelRef::new(5)),
            reply_target: ReplyTarget::new(100),
            kind: GatewayEventKind::Command(request),
        }
    }

    fn message_event(guild: u64, content: &str) -> GatewayEvent {
        GatewayEvent {
            guild_id: GuildId::new(guild),
            author_id: AuthorId::new(1),
            author_voice_channel: Some(ChannelRef::new(5)),
            reply_target: ReplyTarget::new(100),
            kind: GatewayEventKind::Message {
                content: content.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_help_command_renders_static_table() {
        let context = make_context();
        let sink = Arc::new(CollectingReplySink::default());

        Dispatcher::process_event(
            context,
            sink.clone(),
            command_event(1, CommandRequest::Help),
        )
        .await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        match &sent[0].1 {
            Reply::Help { commands } => {
                assert_eq!(commands.len(), command_table::COMMANDS.len())
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_message_miss_is_silent() {
        let context = make_context();
        let sink = Arc::new(CollectingReplySink::default());

        Dispatcher::process_event(context, sink.clone(), message_event(1, "nothing here")).await;

        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_register_list_remove_flow() {
        let context = make_context();
        let sink = Arc::new(CollectingReplySink::default());

        Dispatcher::process_event(
            context.clone(),
            sink.clone(),
            command_event(
                1,
                CommandRequest::AddEffect {
                    name: "boing".into(),
                    url: "https://example.com/boing.mp3".into(),
                },
            ),
        )
        .await;
        Dispatcher::process_event(
            context.clone(),
            sink.clone(),
            command_event(1, CommandRequest::ListEffects),
        )
        .await;
        Dispatcher::process_event(
            context.clone(),
            sink.clone(),
            command_event(1, CommandRequest::RemoveEffect { name: "boing".into() }),
        )
        .await;
        Dispatcher::process_event(
            context,
            sink.clone(),
            command_event(1, CommandRequest::ListEffects),
        )
        .await;

        let sent = sink.sent();
        assert_eq!(sent.len(), 4);
        assert!(matches!(&sent[0].1, Reply::EffectRegistered { name } if name == "boing"));
        match &sent[1].1 {
            Reply::EffectList { effects } => {
                assert_eq!(effects.len(), 1);
                assert_eq!(effects[0].name, "boing");
                assert_eq!(effects[0].source_url, "https://example.com/boing.mp3");
            }
            other => panic!("unexpected reply: {:?}", other),
        }
        assert!(matches!(&sent[2].1, Reply::EffectRemoved { name } if name == "boing"));
        assert!(matches!(&sent[3].1, Reply::EffectList { effects } if effects.is_empty()));
    }

    #[tokio::test]
    async fn test_trigger_hit_plays_without_reply() {
        let context = make_context();
        let sink = Arc::new(CollectingReplySink::default());

        Dispatcher::process_event(
            context.clone(),
            sink.clone(),
            command_event(
                1,
                CommandRequest::AddEffect {
                    name: "boing".into(),
                    url: "https://example.com/boing.mp3".into(),
                },
            ),
        )
        .await;
        Dispatcher::process_event(context, sink.clone(), message_event(1, "boing")).await;

        // 注册回复之外不应出现新回复, 播放成功是静默的
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_run_with_shutdown_stops_on_signal() {
        let context = make_context();
        let sink = Arc::new(CollectingReplySink::default());
        let (event_tx, event_rx) = mpsc::channel(16);
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let dispatcher = Dispatcher::new(context, sink.clone(), event_rx);
        let task = tokio::spawn(dispatcher.run_with_shutdown(async move {
            let _ = shutdown_rx.await;
        }));

        event_tx
            .send(command_event(1, CommandRequest::Help))
            .await
            .unwrap();

        let mut tries = 0;
        while sink.sent().is_empty() && tries < 100 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            tries += 1;
        }
        assert_eq!(sink.sent().len(), 1);

        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("dispatcher did not stop")
            .unwrap();
    }
}
