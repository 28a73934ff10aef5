//! # User Repository
//!
//! Staff accounts that perform stock movements. Users are soft-deleted so
//! the ledger can keep naming who did what.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use medstock_core::{CoreError, NewUser, User};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user. Emails are stored trimmed and lowercased.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - A live user already has this email
    pub async fn insert<'e, E>(&self, executor: E, user: &NewUser) -> DbResult<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let email = user.email.trim().to_lowercase();
        debug!(email = %email, role = ?user.role, "Inserting user");

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, phone_number, role, deleted, created_at)
            VALUES (?1, ?2, ?3, ?4, 0, ?5)
            RETURNING *
            "#,
        )
        .bind(user.name.trim())
        .bind(&email)
        .bind(user.phone_number.trim())
        .bind(user.role)
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&email))
    }

    /// Fails with `UserNotFound` unless `id` is a live user.
    pub async fn ensure_live<'e, E>(&self, executor: E, id: i64) -> DbResult<()>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE id = ?1 AND deleted = 0")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        match found {
            Some(_) => Ok(()),
            None => Err(CoreError::UserNotFound(id).into()),
        }
    }

    /// Soft-deletes a user and returns the row as it was.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: i64) -> DbResult<User>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id, "Soft-deleting user");

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET deleted = 1 WHERE id = ?1 AND deleted = 0 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        user.ok_or_else(|| CoreError::UserNotFound(id).into())
    }

    /// Gets a live user by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1 AND deleted = 0")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Gets a live user by email (case-insensitive).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1 AND deleted = 0")
                .bind(email.trim().to_lowercase())
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }
}
