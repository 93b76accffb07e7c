//! Effect Commands - 效果音注册表命令

use crate::domain::soundboard::GuildId;

/// 注册效果音命令 (se_add)
#[derive(Debug, Clone)]
pub struct RegisterEffect {
    pub guild_id: GuildId,
    pub name: String,
    pub url: String,
}

/// 删除效果音命令 (se_del)
#[derive(Debug, Clone)]
pub struct RemoveEffect {
    pub guild_id: GuildId,
    pub name: String,
}
