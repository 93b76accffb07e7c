//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：处理所有写操作

mod effect_commands;
mod session_commands;
mod trigger_commands;

pub mod handlers;

pub use effect_commands::*;
pub use session_commands::*;
pub use trigger_commands::*;
