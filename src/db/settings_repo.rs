use sqlx::SqlitePool;

use crate::models::Settings;

/// Durable singleton record holding the full settings structure as one JSON
/// blob. Last write wins; merging is the caller's job before `save`.
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Current settings, or defaults if never initialized. Defaults are
    /// persisted lazily on first read so later reads are consistent.
    ///
    /// A blob that is not valid JSON is a durability failure, not a reason to
    /// silently fall back to defaults; missing fields in an otherwise valid
    /// blob still fill in from defaults.
    pub async fn get(&self) -> Result<Settings, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some((data,)) => {
                serde_json::from_str(&data).map_err(|e| sqlx::Error::Decode(Box::new(e)))
            }
            None => {
                let defaults = Settings::default();
                self.save(&defaults).await?;
                Ok(defaults)
            }
        }
    }

    /// Full overwrite of the singleton record.
    pub async fn save(&self, settings: &Settings) -> Result<(), sqlx::Error> {
        let data = serde_json::to_string(settings)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        sqlx::query("INSERT OR REPLACE INTO settings (id, data) VALUES (1, ?)")
            .bind(&data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Drop the record entirely; the next `get` re-seeds defaults.
    pub async fn clear(&self) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM settings").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    struct TestContext {
        repo: SettingsRepository,
        pool: sqlx::SqlitePool,
        _temp_dir: TempDir,
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(db_path).await.unwrap();
        TestContext {
            repo: SettingsRepository::new(pool.clone()),
            pool,
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn test_get_seeds_defaults() {
        let ctx = setup_repo().await;

        let settings = ctx.repo.get().await.unwrap();
        assert_eq!(settings, Settings::default());

        // Defaults were persisted, not just returned
        let again = ctx.repo.get().await.unwrap();
        assert_eq!(again, settings);
    }

    #[tokio::test]
    async fn test_save_and_get_roundtrip() {
        let ctx = setup_repo().await;

        let mut settings = Settings::default();
        settings.switch_tank("Tank 3");
        settings.set_shrimp_count(45);
        settings.tank_prices.insert("Tank 3".into(), "60".into());
        settings.team_name = "Night shift".into();

        ctx.repo.save(&settings).await.unwrap();
        let loaded = ctx.repo.get().await.unwrap();
        assert_eq!(loaded, settings);
    }

    #[tokio::test]
    async fn test_save_is_last_write_wins() {
        let ctx = setup_repo().await;

        let mut first = Settings::default();
        first.team_name = "First".into();
        ctx.repo.save(&first).await.unwrap();

        let mut second = Settings::default();
        second.team_name = "Second".into();
        ctx.repo.save(&second).await.unwrap();

        let loaded = ctx.repo.get().await.unwrap();
        assert_eq!(loaded.team_name, "Second");
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_an_error() {
        let ctx = setup_repo().await;

        sqlx::query("INSERT OR REPLACE INTO settings (id, data) VALUES (1, 'not json{')")
            .execute(&ctx.pool)
            .await
            .unwrap();

        assert!(ctx.repo.get().await.is_err());
    }

    #[tokio::test]
    async fn test_partial_blob_fills_defaults() {
        let ctx = setup_repo().await;

        sqlx::query(
            r#"INSERT OR REPLACE INTO settings (id, data) VALUES (1, '{"team_name":"Night shift"}')"#,
        )
        .execute(&ctx.pool)
        .await
        .unwrap();

        let loaded = ctx.repo.get().await.unwrap();
        assert_eq!(loaded.team_name, "Night shift");
        assert_eq!(loaded.active_tank, Settings::default().active_tank);
        assert_eq!(loaded.crate_weight, Settings::default().crate_weight);
    }

    #[tokio::test]
    async fn test_clear_reseeds_defaults_on_next_get() {
        let ctx = setup_repo().await;

        let mut settings = Settings::default();
        settings.team_name = "Custom".into();
        ctx.repo.save(&settings).await.unwrap();

        ctx.repo.clear().await.unwrap();
        let loaded = ctx.repo.get().await.unwrap();
        assert_eq!(loaded, Settings::default());
    }
}
