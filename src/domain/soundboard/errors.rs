//! Soundboard Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SoundboardError {
    #[error("无效的效果音名称: {0}")]
    InvalidName(String),

    #[error("无效的来源 URL: {0}")]
    InvalidUrl(String),
}
