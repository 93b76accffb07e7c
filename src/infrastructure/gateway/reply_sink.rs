//! Logging Reply Sink
//!
//! 开发环境的回复出口: 不接真实文本频道, 把渲染结果写进日志

use async_trait::async_trait;

use crate::application::{GatewayError, Reply, ReplySinkPort, ReplyTarget};

/// 日志回复出口
pub struct LoggingReplySink;

#[async_trait]
impl ReplySinkPort for LoggingReplySink {
    async fn send(&self, target: ReplyTarget, reply: &Reply) -> Result<(), GatewayError> {
        tracing::info!(reply_target = %target, reply = %reply, "Reply");
        Ok(())
    }
}
