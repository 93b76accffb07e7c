//! Trigger Handlers - 触发解析

use std::sync::Arc;

use crate::application::commands::TriggerMessage;
use crate::application::error::ApplicationError;
use crate::application::ports::{SessionRegistryPort, SoundRepositoryPort};
use crate::application::reply::Reply;
use crate::domain::playback::PlaybackError;
use crate::domain::soundboard::AuthorId;

/// TriggerMessage Handler
///
/// 约定:
/// - 机器人自己的消息直接忽略
/// - 消息原文精确匹配注册表; 未命中静默忽略, 无回复无日志告警
/// - 命中后的任何拒绝 (Busy / 不在语音频道 / 传输失败)
///   转换为引用效果音名称的简短回复, 不影响其他社区
pub struct TriggerMessageHandler {
    bot_user_id: AuthorId,
    sound_repo: Arc<dyn SoundRepositoryPort>,
    sessions: Arc<dyn SessionRegistryPort>,
}

impl TriggerMessageHandler {
    pub fn new(
        bot_user_id: AuthorId,
        sound_repo: Arc<dyn SoundRepositoryPort>,
        sessions: Arc<dyn SessionRegistryPort>,
    ) -> Self {
        Self {
            bot_user_id,
            sound_repo,
            sessions,
        }
    }

    pub async fn handle(&self, command: TriggerMessage) -> Result<Option<Reply>, ApplicationError> {
        if command.author_id == self.bot_user_id {
            return Ok(None);
        }

        let effect = match self
            .sound_repo
            .find(command.guild_id, &command.content)
            .await?
        {
            Some(effect) => effect,
            None => return Ok(None),
        };

        let name = effect.name().as_str().to_string();
        tracing::debug!(
            guild_id = %command.guild_id,
            effect = %name,
            "Trigger matched"
        );

        match self
            .sessions
            .request_playback(command.guild_id, effect, command.author_channel)
            .await
        {
            Ok(()) => Ok(None),
            Err(PlaybackError::NotInVoice) => Ok(Some(Reply::NotInVoice)),
            Err(PlaybackError::Busy) => Ok(Some(Reply::Busy { name })),
            Err(PlaybackError::Connect { reason }) | Err(PlaybackError::Transport { reason }) => {
                tracing::warn!(
                    guild_id = %command.guild_id,
                    effect = %name,
                    reason = %reason,
                    "Playback request failed"
                );
                Ok(Some(Reply::PlaybackFailed { name, reason }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{JoinOutcome, LeaveOutcome, RepositoryError};
    use crate::domain::soundboard::{
        ChannelRef, ContentKey, ContentLocator, EffectName, GuildId, SoundEffect, SourceUrl,
    };
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn effect(guild: u64, name: &str) -> SoundEffect {
        let url = SourceUrl::parse(format!("https://example.com/{}.mp3", name)).unwrap();
        let key = ContentKey::derive(&url);
        let path = PathBuf::from(format!("/tmp/sounds/{}/{}.mp3", guild, key));
        SoundEffect::new(
            GuildId::new(guild),
            EffectName::new(name).unwrap(),
            ContentLocator::new(key, path),
            url,
        )
    }

    struct FixedRepo {
        effects: Vec<SoundEffect>,
    }

    #[async_trait]
    impl SoundRepositoryPort for FixedRepo {
        async fn upsert(&self, _effect: &SoundEffect) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn find(
            &self,
            guild_id: GuildId,
            name: &str,
        ) -> Result<Option<SoundEffect>, RepositoryError> {
            Ok(self
                .effects
                .iter()
                .find(|e| e.guild_id() == guild_id && e.name().as_str() == name)
                .cloned())
        }

        async fn remove(&self, _guild_id: GuildId, _name: &str) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn list(&self, _guild_id: GuildId) -> Result<Vec<SoundEffect>, RepositoryError> {
            Ok(self.effects.clone())
        }

        async fn count_by_guild(
            &self,
        ) -> Result<Vec<crate::application::ports::GuildEffectCount>, RepositoryError> {
            Ok(vec![])
        }
    }

    struct ScriptedSessions {
        playback_calls: AtomicUsize,
        result: StdMutex<Option<Result<(), PlaybackError>>>,
    }

    impl ScriptedSessions {
        fn returning(result: Result<(), PlaybackError>) -> Self {
            Self {
                playback_calls: AtomicUsize::new(0),
                result: StdMutex::new(Some(result)),
            }
        }
    }

    #[async_trait]
    impl SessionRegistryPort for ScriptedSessions {
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
            self.playback_calls.fetch_add(1, Ordering::SeqCst);
            self.result.lock().unwrap().take().unwrap_or(Ok(()))
        }

        async fn leave(&self, _guild_id: GuildId) -> LeaveOutcome {
            LeaveOutcome::NotConnected
        }
    }

    fn handler(
        effects: Vec<SoundEffect>,
        sessions: Arc<ScriptedSessions>,
    ) -> TriggerMessageHandler {
        TriggerMessageHandler::new(AuthorId::new(999), Arc::new(FixedRepo { effects }), sessions)
    }

    fn message(guild: u64, author: u64, content: &str) -> TriggerMessage {
        TriggerMessage {
            guild_id: GuildId::new(guild),
            author_id: AuthorId::new(author),
            author_channel: Some(ChannelRef::new(7)),
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn test_miss_is_silent() {
        let sessions = Arc::new(ScriptedSessions::returning(Ok(())));
        let handler = handler(vec![], sessions.clone());

        let reply = handler.handle(message(1, 5, "nothing here")).await.unwrap();

        assert!(reply.is_none());
        assert_eq!(sessions.playback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_own_message_ignored_even_on_match() {
        let sessions = Arc::new(ScriptedSessions::returning(Ok(())));
        let handler = handler(vec![effect(1, "boing")], sessions.clone());

        let reply = handler.handle(message(1, 999, "boing")).await.unwrap();

        assert!(reply.is_none());
        assert_eq!(sessions.playback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_hit_starts_playback_silently() {
        let sessions = Arc::new(ScriptedSessions::returning(Ok(())));
        let handler = handler(vec![effect(1, "boing")], sessions.clone());

        let reply = handler.handle(message(1, 5, "boing")).await.unwrap();

        assert!(reply.is_none());
        assert_eq!(sessions.playback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_is_case_and_whitespace_exact() {
        let sessions = Arc::new(ScriptedSessions::returning(Ok(())));
        let handler = handler(vec![effect(1, "boing")], sessions.clone());

        let reply = handler.handle(message(1, 5, "Boing ")).await.unwrap();

        assert!(reply.is_none());
        assert_eq!(sessions.playback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_busy_reply_quotes_effect_name() {
        let sessions = Arc::new(ScriptedSessions::returning(Err(PlaybackError::Busy)));
        let handler = handler(vec![effect(1, "boing")], sessions);

        let reply = handler.handle(message(1, 5, "boing")).await.unwrap();

        match reply {
            Some(Reply::Busy { name }) => assert_eq!(name, "boing"),
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_not_in_voice_surfaces_to_user() {
        let sessions = Arc::new(ScriptedSessions::returning(Err(PlaybackError::NotInVoice)));
        let handler = handler(vec![effect(1, "boing")], sessions);

        let reply = handler.handle(message(1, 5, "boing")).await.unwrap();

        assert!(matches!(reply, Some(Reply::NotInVoice)));
    }
}
