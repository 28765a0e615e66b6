//! Version ledger repository: the synchronization watermark.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use locus_core::{Error, Result, VersionLedger, VersionRecord};

/// SQLite implementation of [`VersionLedger`].
///
/// Rows are only ever appended; the latest row by `recorded_at` (id as a
/// tiebreak for appends within one clock tick) is the watermark.
#[derive(Clone)]
pub struct SqliteVersionLedger {
    pool: SqlitePool,
}

impl SqliteVersionLedger {
    /// Create a new ledger over the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VersionLedger for SqliteVersionLedger {
    async fn record(&self, version: i64) -> Result<()> {
        sqlx::query("INSERT INTO zotero_version (version, recorded_at) VALUES (?, ?)")
            .bind(version)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn latest(&self) -> Result<Option<VersionRecord>> {
        let record = sqlx::query_as::<_, VersionRecord>(
            "SELECT id, version, recorded_at FROM zotero_version \
             ORDER BY recorded_at DESC, id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_fixtures::memory_db;
    use locus_core::VersionLedger;

    #[tokio::test]
    async fn test_empty_ledger_means_never_synced() {
        let db = memory_db().await;
        assert!(db.versions.latest().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_appends_and_latest_wins() {
        let db = memory_db().await;
        db.versions.record(10).await.unwrap();
        db.versions.record(12).await.unwrap();

        let latest = db.versions.latest().await.unwrap().unwrap();
        assert_eq!(latest.version, 12);

        // Prior rows are kept, never updated in place.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM zotero_version")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
