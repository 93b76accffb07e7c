//! Soundboard Context - 效果音限界上下文
//!
//! 职责:
//! - 效果音注册表 (名称 → 内容定位符)
//! - 内容 key 派生
//! - 注册 / 删除 / 查找语义

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::SoundEffect;
pub use errors::SoundboardError;
pub use value_objects::{
    AuthorId, ChannelRef, ContentKey, ContentLocator, EffectName, GuildId, SourceUrl,
};
