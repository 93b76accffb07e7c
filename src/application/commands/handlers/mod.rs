//! Command Handlers 实现
//!
//! 所有 CommandHandler 的具体实现

mod effect_handlers;
mod session_handlers;
mod trigger_handlers;

pub use effect_handlers::*;
pub use session_handlers::*;
pub use trigger_handlers::*;
