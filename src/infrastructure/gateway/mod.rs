//! Gateway - 入站事件分发
//!
//! 外部网关客户端推送事件, 这里只做消费与路由

mod command_table;
mod context;
mod dispatcher;
mod reply_sink;

pub use command_table::{help_reply, CommandDescriptor, COMMANDS};
pub use context::BotContext;
pub use dispatcher::Dispatcher;
pub use reply_sink::LoggingReplySink;
