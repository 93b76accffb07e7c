//! SQLite Sound Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::path::PathBuf;

use super::DbPool;
use crate::application::ports::{GuildEffectCount, RepositoryError, SoundRepositoryPort};
use crate::domain::soundboard::{
    ContentKey, ContentLocator, EffectName, GuildId, SoundEffect, SourceUrl,
};

/// SQLite Sound Repository
pub struct SqliteSoundRepository {
    pool: DbPool,
}

impl SqliteSoundRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SoundRow {
    guild_id: String,
    name: String,
    content_key: String,
    file_path: String,
    source_url: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SoundRow> for SoundEffect {
    type Error = RepositoryError;

    fn try_from(row: SoundRow) -> Result<Self, Self::Error> {
        let guild_id: GuildId = row
            .guild_id
            .parse()
            .map_err(|e: std::num::ParseIntError| {
                RepositoryError::SerializationError(e.to_string())
            })?;
        let name = EffectName::new(row.name)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let source_url = SourceUrl::parse(row.source_url)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;
        let locator = ContentLocator::new(
            ContentKey::from_string(row.content_key),
            PathBuf::from(row.file_path),
        );
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&row.updated_at)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
            .with_timezone(&Utc);

        Ok(SoundEffect::restore(
            guild_id, name, locator, source_url, created_at, updated_at,
        ))
    }
}

#[derive(FromRow)]
struct CountRow {
    guild_id: String,
    count: i64,
}

#[async_trait]
impl SoundRepositoryPort for SqliteSoundRepository {
    async fn upsert(&self, effect: &SoundEffect) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO sound_effects (guild_id, name, content_key, file_path, source_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(guild_id, name) DO UPDATE SET
                content_key = excluded.content_key,
                file_path = excluded.file_path,
                source_url = excluded.source_url,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(effect.guild_id().to_string())
        .bind(effect.name().as_str())
        .bind(effect.locator().key().as_str())
        .bind(effect.locator().path().to_string_lossy().to_string())
        .bind(effect.source_url().as_str())
        .bind(effect.created_at().to_rfc3339())
        .bind(effect.updated_at().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find(
        &self,
        guild_id: GuildId,
        name: &str,
    ) -> Result<Option<SoundEffect>, RepositoryError> {
        let row: Option<SoundRow> = sqlx::query_as(
            r#"
            SELECT guild_id, name, content_key, file_path, source_url, created_at, updated_at
            FROM sound_effects WHERE guild_id = ? AND name = ?
            "#,
        )
        .bind(guild_id.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(SoundEffect::try_from).transpose()
    }

    async fn remove(&self, guild_id: GuildId, name: &str) -> Result<(), RepositoryError> {
        // 删除不存在的行也是成功 (no-op)
        sqlx::query("DELETE FROM sound_effects WHERE guild_id = ? AND name = ?")
            .bind(guild_id.to_string())
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn list(&self, guild_id: GuildId) -> Result<Vec<SoundEffect>, RepositoryError> {
        let rows: Vec<SoundRow> = sqlx::query_as(
            r#"
            SELECT guild_id, name, content_key, file_path, source_url, created_at, updated_at
            FROM sound_effects WHERE guild_id = ?
            "#,
        )
        .bind(guild_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter().map(SoundEffect::try_from).collect()
    }

    async fn count_by_guild(&self) -> Result<Vec<GuildEffectCount>, RepositoryError> {
        let rows: Vec<CountRow> = sqlx::query_as(
            "SELECT guild_id, COUNT(*) as count FROM sound_effects GROUP BY guild_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                let guild_id: GuildId = row.guild_id.parse().map_err(
                    |e: std::num::ParseIntError| {
                        RepositoryError::SerializationError(e.to_string())
                    },
                )?;
                Ok(GuildEffectCount {
                    guild_id,
                    count: row.count,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteSoundRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteSoundRepository::new(pool)
    }

    fn effect(guild: u64, name: &str, url: &str) -> SoundEffect {
        let source_url = SourceUrl::parse(url).unwrap();
        let key = ContentKey::derive(&source_url);
        let path = PathBuf::from(format!("/data/sounds/{}/{}.mp3", guild, key));
        SoundEffect::new(
            GuildId::new(guild),
            EffectName::new(name).unwrap(),
            ContentLocator::new(key, path),
            source_url,
        )
    }

    #[tokio::test]
    async fn test_upsert_then_find_returns_registered_locator() {
        let repo = repo().await;
        let e = effect(1, "boing", "https://example.com/boing.mp3");
        repo.upsert(&e).await.unwrap();

        let found = repo.find(GuildId::new(1), "boing").await.unwrap().unwrap();
        assert_eq!(found.locator(), e.locator());
        assert_eq!(found.source_url(), e.source_url());
    }

    #[tokio::test]
    async fn test_reregistration_replaces_without_duplicates() {
        let repo = repo().await;
        repo.upsert(&effect(1, "boing", "https://example.com/a.mp3"))
            .await
            .unwrap();
        let second = effect(1, "boing", "https://example.com/b.mp3");
        repo.upsert(&second).await.unwrap();

        let found = repo.find(GuildId::new(1), "boing").await.unwrap().unwrap();
        assert_eq!(found.locator().key(), second.locator().key());

        let all = repo.list(GuildId::new(1)).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_find_missing_name_is_none() {
        let repo = repo().await;
        let found = repo.find(GuildId::new(1), "ghost").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_lookup_is_exact_match() {
        let repo = repo().await;
        repo.upsert(&effect(1, "boing", "https://example.com/a.mp3"))
            .await
            .unwrap();

        assert!(repo.find(GuildId::new(1), "Boing").await.unwrap().is_none());
        assert!(repo.find(GuildId::new(1), "boing ").await.unwrap().is_none());
        assert!(repo.find(GuildId::new(1), "boing").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_absent_is_noop() {
        let repo = repo().await;
        repo.upsert(&effect(1, "boing", "https://example.com/a.mp3"))
            .await
            .unwrap();

        repo.remove(GuildId::new(1), "ghost").await.unwrap();

        let all = repo.list(GuildId::new(1)).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_list_empty_guild_returns_empty() {
        let repo = repo().await;
        let all = repo.list(GuildId::new(42)).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_effects_scoped_per_guild() {
        let repo = repo().await;
        repo.upsert(&effect(1, "boing", "https://example.com/a.mp3"))
            .await
            .unwrap();
        repo.upsert(&effect(2, "boing", "https://example.com/b.mp3"))
            .await
            .unwrap();

        assert_eq!(repo.list(GuildId::new(1)).await.unwrap().len(), 1);
        assert_eq!(repo.list(GuildId::new(2)).await.unwrap().len(), 1);

        repo.remove(GuildId::new(1), "boing").await.unwrap();
        assert!(repo.find(GuildId::new(2), "boing").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_count_by_guild() {
        let repo = repo().await;
        repo.upsert(&effect(1, "boing", "https://example.com/a.mp3"))
            .await
            .unwrap();
        repo.upsert(&effect(1, "tada", "https://example.com/b.mp3"))
            .await
            .unwrap();
        repo.upsert(&effect(2, "boing", "https://example.com/c.mp3"))
            .await
            .unwrap();

        let counts = repo.count_by_guild().await.unwrap();
        let for_guild = |g: u64| {
            counts
                .iter()
                .find(|c| c.guild_id == GuildId::new(g))
                .map(|c| c.count)
        };
        assert_eq!(for_guild(1), Some(2));
        assert_eq!(for_guild(2), Some(1));
    }
}
