//! SQLite Persistence - SQLite 数据库持久化实现

mod database;
mod sound_repo;

pub use database::*;
pub use sound_repo::*;
