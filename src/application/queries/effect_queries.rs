//! Effect Queries - 效果音查询

use crate::domain::soundboard::GuildId;

/// 效果音一览查询 (se_list)
#[derive(Debug, Clone)]
pub struct ListEffects {
    pub guild_id: GuildId,
}
