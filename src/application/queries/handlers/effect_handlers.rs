//! Effect Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::SoundRepositoryPort;
use crate::application::queries::ListEffects;
use crate::application::reply::EffectSummary;

/// ListEffects Handler
///
/// 无注册时返回空列表, 不是错误
pub struct ListEffectsHandler {
    sound_repo: Arc<dyn SoundRepositoryPort>,
}

impl ListEffectsHandler {
    pub fn new(sound_repo: Arc<dyn SoundRepositoryPort>) -> Self {
        Self { sound_repo }
    }

    pub async fn handle(&self, query: ListEffects) -> Result<Vec<EffectSummary>, ApplicationError> {
        let effects = self.sound_repo.list(query.guild_id).await?;
        Ok(effects
            .into_iter()
            .map(|e| EffectSummary {
                name: e.name().as_str().to_string(),
                source_url: e.source_url().as_str().to_string(),
            })
            .collect())
    }
}
