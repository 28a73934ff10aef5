//! # Movement Repository
//!
//! The append-only stock ledger.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  movements                                                              │
//! │                                                                         │
//! │  INSERT  ✅  (inside the stock transaction only)                        │
//! │  SELECT  ✅  joined with product and user names                         │
//! │  UPDATE  ❌  trigger: RAISE(ABORT, 'movements are append-only')         │
//! │  DELETE  ❌  trigger: RAISE(ABORT, 'movements are append-only')         │
//! │                                                                         │
//! │  Σ(+q for ADD, −q for REMOVE) over a product == its stock               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use medstock_core::validation::validate_movement_filter;
use medstock_core::{CoreError, Movement, MovementFilter, MovementType, NewMovement, PageInfo};

/// Columns of a movement joined with its product and user names.
const SELECT_MOVEMENT: &str = r#"
    SELECT
        m.id,
        m.product_id,
        m.quantity,
        m.price_cents,
        m.movement_type,
        m.note,
        m.performed_by,
        m.created_at,
        p.name AS product_name,
        u.name AS user_name
    FROM movements m
    INNER JOIN products p ON p.id = m.product_id
    INNER JOIN users u ON u.id = m.performed_by
"#;

/// Repository for the movement ledger.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Appends a movement and returns its id.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - product or user row doesn't exist
    pub async fn insert<'e, E>(&self, executor: E, movement: &NewMovement) -> DbResult<i64>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(
            product_id = movement.product_id,
            quantity = movement.quantity,
            movement_type = movement.movement_type.as_str(),
            "Recording movement"
        );

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO movements (
                product_id, quantity, price_cents, movement_type,
                note, performed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.quantity)
        .bind(movement.price_cents)
        .bind(movement.movement_type.as_str())
        .bind(&movement.note)
        .bind(movement.performed_by)
        .bind(Utc::now())
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    /// Fetches one movement with its product and user names.
    pub async fn get<'e, E>(&self, executor: E, id: i64) -> DbResult<Movement>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Movement>(&format!("{SELECT_MOVEMENT} WHERE m.id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| DbError::not_found("Movement", id))
    }

    /// Lists movements newest first with page info. Filters are ANDed.
    pub async fn list(&self, filter: &MovementFilter) -> DbResult<(Vec<Movement>, PageInfo)> {
        validate_movement_filter(filter).map_err(CoreError::from)?;

        let movement_type = filter.movement_type.map(|t| t.as_str());
        debug!(
            product_id = ?filter.product_id,
            movement_type = ?movement_type,
            "Listing movements"
        );

        const WHERE: &str = r#"
            WHERE (?1 IS NULL OR m.product_id = ?1)
            AND (?2 IS NULL OR m.movement_type = ?2)
            AND (?3 IS NULL OR m.created_at >= ?3)
            AND (?4 IS NULL OR m.created_at < ?4)
        "#;

        let movements = sqlx::query_as::<_, Movement>(&format!(
            "{SELECT_MOVEMENT} {WHERE} ORDER BY m.created_at DESC, m.id DESC LIMIT ?5 OFFSET ?6"
        ))
        .bind(filter.product_id)
        .bind(movement_type)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.pagination.limit())
        .bind(filter.pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM movements m {WHERE}"))
                .bind(filter.product_id)
                .bind(movement_type)
                .bind(filter.start_date)
                .bind(filter.end_date)
                .fetch_one(&self.pool)
                .await?;

        let page = PageInfo::calculate(u64::try_from(total).unwrap_or(0), &filter.pagination);
        Ok((movements, page))
    }

    /// The `limit` most recent movements of one type.
    pub async fn recent(&self, movement_type: MovementType, limit: u32) -> DbResult<Vec<Movement>> {
        let movements = sqlx::query_as::<_, Movement>(&format!(
            "{SELECT_MOVEMENT} WHERE m.movement_type = ?1 ORDER BY m.created_at DESC, m.id DESC LIMIT ?2"
        ))
        .bind(movement_type.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Replays the ledger for one product: Σ(+q ADD, −q REMOVE).
    pub async fn ledger_balance(&self, product_id: i64) -> DbResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(CASE movement_type WHEN 'ADD' THEN quantity ELSE -quantity END), 0)
            FROM movements
            WHERE product_id = ?1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance)
    }

    /// Counts movements, optionally for one product.
    pub async fn count(&self, product_id: Option<i64>) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM movements WHERE ?1 IS NULL OR product_id = ?1")
                .bind(product_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
