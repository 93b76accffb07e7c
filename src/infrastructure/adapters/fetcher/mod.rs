//! Fetcher Adapter - HTTP 内容下载实现

mod http_fetcher;

pub use http_fetcher::{ReqwestFetcher, ReqwestFetcherConfig};
