//! File Content Store - 文件系统 blob 存储实现
//!
//! 实现 ContentStorePort trait
//!
//! 路径方案: <root>/<guild_id>/<content_key><ext>

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{ContentStorePort, StoreError};
use crate::domain::soundboard::{ContentKey, ContentLocator, GuildId};

/// 文件系统内容存储
pub struct FileContentStore {
    /// 存储根目录
    base_dir: PathBuf,
}

impl FileContentStore {
    /// 创建新的内容存储
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保根目录存在
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        Ok(Self { base_dir })
    }

    /// 获取存储根目录
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn guild_dir(&self, guild_id: GuildId) -> PathBuf {
        self.base_dir.join(guild_id.to_string())
    }
}

#[async_trait]
impl ContentStorePort for FileContentStore {
    fn blob_path(&self, guild_id: GuildId, key: &ContentKey, extension: Option<&str>) -> PathBuf {
        let file_name = match extension {
            Some(ext) => format!("{}.{}", key, ext),
            None => key.to_string(),
        };
        self.guild_dir(guild_id).join(file_name)
    }

    async fn put(
        &self,
        guild_id: GuildId,
        key: &ContentKey,
        extension: Option<&str>,
        data: &[u8],
    ) -> Result<ContentLocator, StoreError> {
        let guild_dir = self.guild_dir(guild_id);

        // 确保社区目录存在
        fs::create_dir_all(&guild_dir)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))?;

        let path = self.blob_path(guild_id, key, extension);

        // 先写暂存文件再改名落位, 覆盖失败时既有 blob 保持原样
        let staging = {
            let mut name = path.clone().into_os_string();
            name.push(".part");
            PathBuf::from(name)
        };

        let result: Result<(), std::io::Error> = async {
            let mut file = fs::File::create(&staging).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&staging, &path).await?;
            Ok(())
        }
        .await;

        // 失败只清理暂存文件, 不碰已落位的内容
        if let Err(e) = result {
            let _ = fs::remove_file(&staging).await;
            return Err(StoreError::IoError(e.to_string()));
        }

        tracing::debug!(
            guild_id = %guild_id,
            key = %key,
            bytes = data.len(),
            "Saved content blob"
        );

        Ok(ContentLocator::new(key.clone(), path))
    }

    async fn read(&self, locator: &ContentLocator) -> Result<Vec<u8>, StoreError> {
        let path = locator.path();

        if !path.exists() {
            return Err(StoreError::BlobNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        fs::read(path)
            .await
            .map_err(|e| StoreError::IoError(e.to_string()))
    }

    async fn exists(&self, locator: &ContentLocator) -> bool {
        locator.path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::soundboard::SourceUrl;
    use tempfile::tempdir;

    fn key_for(url: &str) -> ContentKey {
        ContentKey::derive(&SourceUrl::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_put_and_read_blob() {
        let temp_dir = tempdir().unwrap();
        let store = FileContentStore::new(temp_dir.path()).await.unwrap();

        let key = key_for("https://example.com/boing.mp3");
        let locator = store
            .put(GuildId::new(1), &key, Some("mp3"), b"fake mp3 data")
            .await
            .unwrap();

        assert!(store.exists(&locator).await);
        assert_eq!(store.read(&locator).await.unwrap(), b"fake mp3 data");
    }

    #[tokio::test]
    async fn test_path_is_guild_namespaced() {
        let temp_dir = tempdir().unwrap();
        let store = FileContentStore::new(temp_dir.path()).await.unwrap();

        let key = key_for("https://example.com/boing.mp3");
        let path = store.blob_path(GuildId::new(42), &key, Some("mp3"));

        assert!(path.starts_with(temp_dir.path().join("42")));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            format!("{}.mp3", key)
        );
    }

    #[tokio::test]
    async fn test_blob_without_extension() {
        let temp_dir = tempdir().unwrap();
        let store = FileContentStore::new(temp_dir.path()).await.unwrap();

        let key = key_for("https://example.com/boing");
        let locator = store
            .put(GuildId::new(1), &key, None, b"data")
            .await
            .unwrap();

        assert_eq!(
            locator.path().file_name().unwrap().to_str().unwrap(),
            key.as_str()
        );
        assert!(store.exists(&locator).await);
    }

    #[tokio::test]
    async fn test_put_same_key_overwrites() {
        let temp_dir = tempdir().unwrap();
        let store = FileContentStore::new(temp_dir.path()).await.unwrap();

        let key = key_for("https://example.com/boing.mp3");
        store
            .put(GuildId::new(1), &key, Some("mp3"), b"old bytes")
            .await
            .unwrap();
        let locator = store
            .put(GuildId::new(1), &key, Some("mp3"), b"new bytes")
            .await
            .unwrap();

        assert_eq!(store.read(&locator).await.unwrap(), b"new bytes");

        // 暂存文件不残留
        let entries = std::fs::read_dir(temp_dir.path().join("1")).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_failed_overwrite_preserves_existing_blob() {
        let temp_dir = tempdir().unwrap();
        let store = FileContentStore::new(temp_dir.path()).await.unwrap();

        let key = key_for("https://example.com/boing.mp3");
        let locator = store
            .put(GuildId::new(1), &key, Some("mp3"), b"old bytes")
            .await
            .unwrap();

        // 占住暂存路径, 迫使覆盖写入失败
        let staging = {
            let mut name = locator.path().as_os_str().to_os_string();
            name.push(".part");
            PathBuf::from(name)
        };
        fs::create_dir_all(&staging).await.unwrap();

        let result = store
            .put(GuildId::new(1), &key, Some("mp3"), b"new bytes")
            .await;
        assert!(result.is_err());
        assert_eq!(store.read(&locator).await.unwrap(), b"old bytes");
    }

    #[tokio::test]
    async fn test_same_key_distinct_per_guild() {
        let temp_dir = tempdir().unwrap();
        let store = FileContentStore::new(temp_dir.path()).await.unwrap();

        let key = key_for("https://example.com/boing.mp3");
        let a = store
            .put(GuildId::new(1), &key, Some("mp3"), b"guild one")
            .await
            .unwrap();
        let b = store
            .put(GuildId::new(2), &key, Some("mp3"), b"guild two")
            .await
            .unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(store.read(&a).await.unwrap(), b"guild one");
        assert_eq!(store.read(&b).await.unwrap(), b"guild two");
    }

    #[tokio::test]
    async fn test_read_missing_blob_is_not_found() {
        let temp_dir = tempdir().unwrap();
        let store = FileContentStore::new(temp_dir.path()).await.unwrap();

        let key = key_for("https://example.com/ghost.mp3");
        let locator = ContentLocator::new(key.clone(), store.blob_path(GuildId::new(1), &key, None));

        assert!(matches!(
            store.read(&locator).await,
            Err(StoreError::BlobNotFound(_))
        ));
    }
}
