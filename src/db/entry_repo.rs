use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::Entry;

/// Durable keyed store for the measurement log.
///
/// This is the sole source of truth for entries; a failed operation surfaces
/// as an error rather than falling back to stale in-memory state.
pub struct EntryRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    tank: String,
    count: i64,
    weight: f64,
    crate_weight: Option<f64>,
    crate_count: i64,
    team: String,
    timestamp: String,
    synced: bool,
}

impl EntryRow {
    fn into_entry(self) -> Entry {
        Entry {
            id: self.id,
            tank: self.tank,
            count: self.count,
            weight: self.weight,
            crate_weight: self.crate_weight,
            crate_count: self.crate_count,
            team: self.team,
            timestamp: DateTime::parse_from_rfc3339(&self.timestamp)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            synced: self.synced,
        }
    }
}

impl EntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite by id. Used both for new entries and full-record
    /// edits; the weight > 0 rule is the add path's contract, not the store's.
    pub async fn put(&self, entry: &Entry) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO entries
                (id, tank, count, weight, crate_weight, crate_count, team, timestamp, synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.tank)
        .bind(entry.count)
        .bind(entry.weight)
        .bind(entry.crate_weight)
        .bind(entry.crate_count)
        .bind(&entry.team)
        .bind(entry.timestamp.to_rfc3339())
        .bind(entry.synced)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Every entry, newest first as a convenience; consumers that need other
    /// orderings sort for themselves.
    pub async fn get_all(&self) -> Result<Vec<Entry>, sqlx::Error> {
        let rows: Vec<EntryRow> = sqlx::query_as("SELECT * FROM entries ORDER BY timestamp DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    /// Entries not yet pushed to the bridge.
    pub async fn get_unsynced(&self) -> Result<Vec<Entry>, sqlx::Error> {
        let rows: Vec<EntryRow> =
            sqlx::query_as("SELECT * FROM entries WHERE synced = 0 ORDER BY timestamp DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    /// Deleting a missing id is a no-op, not an error.
    pub async fn delete_one(&self, id: &str) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Batch delete in a single transaction, all-or-nothing.
    pub async fn delete_many(&self, ids: &[String]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("DELETE FROM entries WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Total entry count without materializing the log.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Flip `synced` for each named id in one transaction; ids not present
    /// are skipped silently.
    pub async fn mark_synced(&self, ids: &[String]) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("UPDATE entries SET synced = 1 WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Irreversible wipe of the whole log (reset path).
    pub async fn clear_all(&self) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM entries").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use chrono::TimeZone;
    use tempfile::TempDir;

    struct TestContext {
        repo: EntryRepository,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(db_path).await.unwrap();
        TestContext {
            repo: EntryRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn sample(tank: &str, weight: f64) -> Entry {
        Entry::new(tank, weight)
            .with_count(30)
            .with_crate_count(1)
            .with_team("Team A")
    }

    #[tokio::test]
    async fn test_put_and_get_all() {
        let ctx = setup_repo().await;

        let entry = sample("Tank 1", 12.0).with_crate_weight(1.8);
        ctx.repo.put(&entry).await.unwrap();

        let all = ctx.repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], entry.clone().with_timestamp(all[0].timestamp));
        assert_eq!(all[0].id, entry.id);
        assert_eq!(all[0].crate_weight, Some(1.8));
    }

    #[tokio::test]
    async fn test_put_overwrites_by_id() {
        let ctx = setup_repo().await;

        let entry = sample("Tank 1", 12.0);
        ctx.repo.put(&entry).await.unwrap();

        let mut edited = entry.clone();
        edited.weight = 14.5;
        edited.tank = "Tank 2".to_string();
        ctx.repo.put(&edited).await.unwrap();

        let all = ctx.repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].weight, 14.5);
        assert_eq!(all[0].tank, "Tank 2");
    }

    #[tokio::test]
    async fn test_get_all_newest_first() {
        let ctx = setup_repo().await;

        let old = sample("Tank 1", 1.0)
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap());
        let new = sample("Tank 1", 2.0)
            .with_timestamp(Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap());
        ctx.repo.put(&old).await.unwrap();
        ctx.repo.put(&new).await.unwrap();

        let all = ctx.repo.get_all().await.unwrap();
        assert_eq!(all[0].id, new.id);
        assert_eq!(all[1].id, old.id);
    }

    #[tokio::test]
    async fn test_delete_one_missing_is_noop() {
        let ctx = setup_repo().await;

        let entry = sample("Tank 1", 5.0);
        ctx.repo.put(&entry).await.unwrap();

        ctx.repo.delete_one("no-such-id").await.unwrap();
        assert_eq!(ctx.repo.count().await.unwrap(), 1);

        ctx.repo.delete_one(&entry.id).await.unwrap();
        assert_eq!(ctx.repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_many() {
        let ctx = setup_repo().await;

        let a = sample("Tank 1", 1.0);
        let b = sample("Tank 1", 2.0);
        let c = sample("Tank 2", 3.0);
        for e in [&a, &b, &c] {
            ctx.repo.put(e).await.unwrap();
        }

        ctx.repo
            .delete_many(&[a.id.clone(), c.id.clone(), "missing".to_string()])
            .await
            .unwrap();

        let all = ctx.repo.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, b.id);
    }

    #[tokio::test]
    async fn test_count_independent_of_get_all() {
        let ctx = setup_repo().await;
        assert_eq!(ctx.repo.count().await.unwrap(), 0);

        ctx.repo.put(&sample("Tank 1", 1.0)).await.unwrap();
        ctx.repo.put(&sample("Tank 2", 2.0)).await.unwrap();
        assert_eq!(ctx.repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mark_synced_skips_missing_ids() {
        let ctx = setup_repo().await;

        let a = sample("Tank 1", 1.0);
        let b = sample("Tank 1", 2.0);
        ctx.repo.put(&a).await.unwrap();
        ctx.repo.put(&b).await.unwrap();

        ctx.repo
            .mark_synced(&[a.id.clone(), "ghost".to_string()])
            .await
            .unwrap();

        let all = ctx.repo.get_all().await.unwrap();
        let synced_a = all.iter().find(|e| e.id == a.id).unwrap();
        let synced_b = all.iter().find(|e| e.id == b.id).unwrap();
        assert!(synced_a.synced);
        assert!(!synced_b.synced);
    }

    #[tokio::test]
    async fn test_get_unsynced() {
        let ctx = setup_repo().await;

        let a = sample("Tank 1", 1.0);
        let b = sample("Tank 1", 2.0).with_synced(true);
        ctx.repo.put(&a).await.unwrap();
        ctx.repo.put(&b).await.unwrap();

        let unsynced = ctx.repo.get_unsynced().await.unwrap();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0].id, a.id);
    }

    #[tokio::test]
    async fn test_clear_all() {
        let ctx = setup_repo().await;

        ctx.repo.put(&sample("Tank 1", 1.0)).await.unwrap();
        ctx.repo.put(&sample("Tank 2", 2.0)).await.unwrap();

        ctx.repo.clear_all().await.unwrap();
        assert_eq!(ctx.repo.count().await.unwrap(), 0);
        assert!(ctx.repo.get_all().await.unwrap().is_empty());
    }
}
