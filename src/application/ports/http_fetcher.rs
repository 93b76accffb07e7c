//! HTTP Fetcher Port - 出站端口
//!
//! 定义远程音频内容获取的抽象接口
//! 非 2xx 状态作为数据返回, 由注册路径判定失败

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::soundboard::SourceUrl;

/// 获取错误 (传输层失败; 非 2xx 状态不算)
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Response body too large: limit {limit} bytes")]
    TooLarge { limit: u64 },
}

/// 获取结果
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP 状态码
    pub status: u16,
    /// 完整响应体
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP Fetcher Port
#[async_trait]
pub trait HttpFetcherPort: Send + Sync {
    /// 获取 URL 的完整响应体
    async fn get(&self, url: &SourceUrl) -> Result<FetchResponse, FetchError>;
}
