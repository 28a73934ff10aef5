//! # Stats Repository
//!
//! Reads and patches the singleton stats row.
//!
//! ## Patch Semantics
//! ```text
//! StatsPatch { total_value: Some(-20_000), total_low_stock: Some(1), .. }
//!      │
//!      ▼
//! UPDATE stats SET
//!     total_low_stock   = total_low_stock   + COALESCE(?3, 0),   -- +1
//!     total_value_cents = total_value_cents + COALESCE(?9, 0),   -- -20000
//!     ...                                                         -- +0
//! WHERE id = 1
//! ```
//!
//! Deltas are applied in place, so two transactions patching the row never
//! overwrite each other's counters.

use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use medstock_core::{Stats, StatsPatch};

const SELECT_STATS: &str = r#"
    SELECT
        total_users,
        total_products,
        total_low_stock,
        total_out_of_stock,
        total_stocks_added,
        total_stocks_added_value_cents,
        total_stocks_removed,
        total_stocks_removed_value_cents,
        total_value_cents
    FROM stats
    WHERE id = 1
"#;

/// Repository for the stats row.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Creates a new StatsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Reads the stats row through `executor`.
    pub async fn read<'e, E>(&self, executor: E) -> DbResult<Stats>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Stats>(SELECT_STATS)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| DbError::QueryFailed("stats row is missing".to_string()))
    }

    /// Reads the current stats.
    pub async fn get(&self) -> DbResult<Stats> {
        self.read(&self.pool).await
    }

    /// Applies a patch in place. An empty patch issues no statement.
    pub async fn patch<'e, E>(&self, executor: E, patch: &StatsPatch) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        if patch.is_empty() {
            return Ok(());
        }

        debug!(?patch, "Patching stats");

        let result = sqlx::query(
            r#"
            UPDATE stats SET
                total_users = total_users + COALESCE(?1, 0),
                total_products = total_products + COALESCE(?2, 0),
                total_low_stock = total_low_stock + COALESCE(?3, 0),
                total_out_of_stock = total_out_of_stock + COALESCE(?4, 0),
                total_stocks_added = total_stocks_added + COALESCE(?5, 0),
                total_stocks_added_value_cents = total_stocks_added_value_cents + COALESCE(?6, 0),
                total_stocks_removed = total_stocks_removed + COALESCE(?7, 0),
                total_stocks_removed_value_cents = total_stocks_removed_value_cents + COALESCE(?8, 0),
                total_value_cents = total_value_cents + COALESCE(?9, 0)
            WHERE id = 1
            "#,
        )
        .bind(patch.total_users)
        .bind(patch.total_products)
        .bind(patch.total_low_stock)
        .bind(patch.total_out_of_stock)
        .bind(patch.total_stocks_added)
        .bind(patch.total_stocks_added_value)
        .bind(patch.total_stocks_removed)
        .bind(patch.total_stocks_removed_value)
        .bind(patch.total_value)
        .execute(executor)
        .await?;

        if result.rows_affected() != 1 {
            return Err(DbError::QueryFailed("stats row is missing".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_stats_are_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.stats().get().await.unwrap(), Stats::default());
    }

    #[tokio::test]
    async fn test_patch_applies_only_supplied_fields() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.stats();

        let patch = StatsPatch {
            total_products: Some(2),
            total_value: Some(1_500),
            ..Default::default()
        };
        repo.patch(db.pool(), &patch).await.unwrap();

        let patch = StatsPatch {
            total_value: Some(-500),
            total_low_stock: Some(1),
            ..Default::default()
        };
        repo.patch(db.pool(), &patch).await.unwrap();

        let stats = repo.get().await.unwrap();
        assert_eq!(stats.total_products, 2);
        assert_eq!(stats.total_value_cents, 1_000);
        assert_eq!(stats.total_low_stock, 1);
        assert_eq!(stats.total_users, 0);
        assert_eq!(stats.total_stocks_added, 0);
    }

    #[tokio::test]
    async fn test_empty_patch_is_noop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.stats()
            .patch(db.pool(), &StatsPatch::default())
            .await
            .unwrap();
        assert_eq!(db.stats().get().await.unwrap(), Stats::default());
    }

    #[tokio::test]
    async fn test_missing_row_is_internal() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DELETE FROM stats").execute(db.pool()).await.unwrap();

        let err = db
            .stats()
            .patch(db.pool(), &StatsPatch::user_created())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), medstock_core::ErrorKind::Internal);
        assert!(db.stats().get().await.is_err());
    }
}
