//! Reqwest Fetcher - 远程音频内容获取
//!
//! 实现 HttpFetcherPort trait
//!
//! 并发受信号量约束, 慢速远端不会阻塞无关社区的事件处理;
//! 非 2xx 状态不是错误, 作为数据交给注册路径判定

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::application::ports::{FetchError, FetchResponse, HttpFetcherPort};
use crate::domain::soundboard::SourceUrl;

/// Fetcher 配置
#[derive(Debug, Clone)]
pub struct ReqwestFetcherConfig {
    /// 单次请求超时时间（秒）
    pub timeout_secs: u64,
    /// 最大并发下载数
    pub max_concurrent: usize,
    /// 响应体大小上限（字节, 0 表示不限制）
    pub max_download_bytes: u64,
}

impl Default for ReqwestFetcherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_concurrent: 4,
            max_download_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ReqwestFetcherConfig {
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }
}

/// Reqwest Fetcher
pub struct ReqwestFetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
    config: ReqwestFetcherConfig,
}

impl ReqwestFetcher {
    pub fn new(config: ReqwestFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
        })
    }

    pub fn with_default_config() -> Result<Self, FetchError> {
        Self::new(ReqwestFetcherConfig::default())
    }
}

#[async_trait]
impl HttpFetcherPort for ReqwestFetcher {
    async fn get(&self, url: &SourceUrl) -> Result<FetchResponse, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::NetworkError("fetch pool closed".to_string()))?;

        tracing::debug!(url = %url, "Fetching remote content");

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else if e.is_connect() {
                FetchError::NetworkError(format!("Cannot connect to remote host: {}", e))
            } else {
                FetchError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();

        let limit = self.config.max_download_bytes;
        if limit > 0 {
            if let Some(length) = response.content_length() {
                if length > limit {
                    return Err(FetchError::TooLarge { limit });
                }
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::NetworkError(e.to_string())
                }
            })?
            .to_vec();

        // Content-Length 缺失或不实时以实际字节数为准
        if limit > 0 && body.len() as u64 > limit {
            return Err(FetchError::TooLarge { limit });
        }

        tracing::debug!(url = %url, status, bytes = body.len(), "Fetch completed");

        Ok(FetchResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ReqwestFetcherConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_concurrent, 4);
        assert_eq!(config.max_download_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_config_builder() {
        let config = ReqwestFetcherConfig::default()
            .with_timeout(5)
            .with_max_concurrent(2);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_concurrent, 2);
    }
}
