//! Soundboard Context - Value Objects

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// 社区 (Guild) 唯一标识
///
/// 所有注册表和会话状态的隔离边界
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GuildId(u64);

impl GuildId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for GuildId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GuildId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

/// 消息作者唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthorId(u64);

impl AuthorId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AuthorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语音频道引用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelRef(u64);

impl ChannelRef {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 效果音名称
///
/// 不变量:
/// - 作为不透明 key 使用, 不做任何规范化
/// - 查找时与原始触发文本精确匹配 (大小写和空白敏感)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectName(String);

impl EffectName {
    pub fn new(name: impl Into<String>) -> Result<Self, &'static str> {
        let name = name.into();
        if name.is_empty() {
            return Err("效果音名称不能为空");
        }
        if name.len() > 100 {
            return Err("效果音名称长度不能超过100字符");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EffectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 效果音来源 URL
///
/// 不变量:
/// - 必须是 http / https 协议
/// - 保留原始字符串, content key 按原文派生
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrl(String);

impl SourceUrl {
    pub fn parse(raw: impl Into<String>) -> Result<Self, &'static str> {
        let raw = raw.into();
        let parsed = url::Url::parse(&raw).map_err(|_| "无效的 URL")?;
        match parsed.scheme() {
            "http" | "https" => Ok(Self(raw)),
            _ => Err("URL 必须是 http 或 https 协议"),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 从 URL 路径部分推断文件扩展名 (不含点)
    ///
    /// 查询串不参与; 无扩展名的路径返回 None
    pub fn extension(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.0).ok()?;
        Path::new(parsed.path())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_string())
    }
}

impl std::fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 内容 key - 由来源 URL 原文派生
///
/// 不变量:
/// - 同一 URL 派生结果恒等 (与下载到的字节无关)
/// - 使用抗碰撞哈希, 不同 URL 不会共享 key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn derive(url: &SourceUrl) -> Self {
        Self(format!("{:x}", Sha256::digest(url.as_str().as_bytes())))
    }

    pub fn from_string(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 内容定位符 - 指向已落盘音频 blob 的不透明引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLocator {
    key: ContentKey,
    path: PathBuf,
}

impl ContentLocator {
    pub fn new(key: ContentKey, path: PathBuf) -> Self {
        Self { key, path }
    }

    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
