//! Query Handlers 实现
//!
//! 所有 QueryHandler 的具体实现

mod effect_handlers;

pub use effect_handlers::*;
