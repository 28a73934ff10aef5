//! # Product Repository
//!
//! Database operations for products, including the stock mutator.
//!
//! ## Key Operations
//! - Atomic stock increments (the only way `stock` changes)
//! - Sparse catalog updates and soft delete
//! - Filtered, paginated listing
//!
//! ## Stock Mutation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: read, compute, write back (lost update under load)       │
//! │     SELECT stock ...;  UPDATE products SET stock = 7 WHERE id = ?   │
//! │                                                                     │
//! │  ✅ CORRECT: one in-place delta, post-state returned                │
//! │     UPDATE products SET stock = stock + ?2                          │
//! │     WHERE id = ?1 AND deleted = 0 RETURNING *                       │
//! │                                                                     │
//! │  Request A: +30 ─┐                                                  │
//! │  Request B: -20 ─┴─► serialized by the write lock, final = +10      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Methods that take an `executor` run inside the caller's transaction
//! (`&mut *tx`) or directly on the pool.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use medstock_core::validation::validate_search_query;
use medstock_core::{
    CoreError, LowStockItem, NewProduct, PageInfo, Product, ProductFilter, ProductUpdate,
};

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Transaction-scoped writes
    // =========================================================================

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted row
    /// * `Err(DbError::UniqueViolation)` - A live product already has this name
    pub async fn insert<'e, E>(&self, executor: E, product: &NewProduct) -> DbResult<Product>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(name = %product.name, stock = product.stock, "Inserting product");

        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, description, price_cents, stock,
                low_stock_threshold, category, unit, deleted, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
            RETURNING *
            "#,
        )
        .bind(product.name.trim())
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(product.low_stock_threshold)
        .bind(product.category.trim())
        .bind(product.unit.trim())
        .bind(Utc::now())
        .fetch_one(executor)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(product.name.trim()))
    }

    /// Adds `delta` to a live product's stock in place and returns the row
    /// as it stands afterwards.
    ///
    /// `delta` is signed: positive for stock in, negative for stock out. No
    /// bound is enforced here; the caller checks the post-state before
    /// committing.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Post-mutation row
    /// * `Err(CoreError::ProductNotFound)` - Missing or soft-deleted
    pub async fn update_stock<'e, E>(&self, executor: E, id: i64, delta: i64) -> DbResult<Product>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id, delta, "Updating stock");

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock + ?2
            WHERE id = ?1 AND deleted = 0
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await?;

        product.ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Takes the write lock and returns a live product unchanged.
    ///
    /// SQLite has no `SELECT ... FOR UPDATE`; a no-op write makes the
    /// transaction a writer before it reads anything it will act on.
    pub async fn lock<'e, E>(&self, executor: E, id: i64) -> DbResult<Product>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET deleted = deleted WHERE id = ?1 AND deleted = 0 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        product.ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Applies a sparse catalog update; unset fields keep their value.
    pub async fn update_fields<'e, E>(
        &self,
        executor: E,
        id: i64,
        update: &ProductUpdate,
    ) -> DbResult<Product>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id, "Updating product");

        let name = update.name.as_deref().map(str::trim);
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                price_cents = COALESCE(?4, price_cents),
                category = COALESCE(?5, category),
                unit = COALESCE(?6, unit),
                low_stock_threshold = COALESCE(?7, low_stock_threshold)
            WHERE id = ?1 AND deleted = 0
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(&update.description)
        .bind(update.price_cents)
        .bind(update.category.as_deref().map(str::trim))
        .bind(update.unit.as_deref().map(str::trim))
        .bind(update.low_stock_threshold)
        .fetch_optional(executor)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(name.unwrap_or_default()))?;

        product.ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    /// Soft-deletes a product and returns it as it was.
    ///
    /// Movements keep pointing at the row, so it is never physically removed.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: i64) -> DbResult<Product>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        debug!(id, "Soft-deleting product");

        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET deleted = 1 WHERE id = ?1 AND deleted = 0 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        product.ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a live product by its ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = ?1 AND deleted = 0",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists live products, newest first.
    ///
    /// ## Filters
    /// - `search`: case-insensitive substring of the name
    /// - `status`: `in_stock` (stock > 0), `out_of_stock` (stock ≤ 0),
    ///   `low_stock` (0 < stock ≤ threshold)
    pub async fn list(&self, filter: &ProductFilter) -> DbResult<(Vec<Product>, PageInfo)> {
        let search = validate_search_query(filter.search.as_deref())
            .map_err(CoreError::from)?
            .map(|s| format!("%{}%", s.to_lowercase()));
        let status = filter.status.map(|s| s.as_str());

        debug!(search = ?search, status = ?status, "Listing products");

        const WHERE: &str = r#"
            WHERE deleted = 0
            AND (?1 IS NULL OR LOWER(name) LIKE ?1)
            AND (?2 IS NULL
                OR (?2 = 'in_stock' AND stock > 0)
                OR (?2 = 'out_of_stock' AND stock <= 0)
                OR (?2 = 'low_stock' AND stock > 0 AND stock <= low_stock_threshold))
        "#;

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT * FROM products {WHERE} ORDER BY created_at DESC, id DESC LIMIT ?3 OFFSET ?4"
        ))
        .bind(&search)
        .bind(status)
        .bind(filter.pagination.limit())
        .bind(filter.pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products {WHERE}"))
            .bind(&search)
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        let page = PageInfo::calculate(u64::try_from(total).unwrap_or(0), &filter.pagination);
        debug!(count = products.len(), total, "Listed products");
        Ok((products, page))
    }

    /// Live products at or below their low-stock threshold, emptiest first.
    /// Includes out-of-stock products.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<LowStockItem>> {
        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT id, name, stock, low_stock_threshold
            FROM products
            WHERE deleted = 0 AND stock <= low_stock_threshold
            ORDER BY stock ASC, name ASC
            LIMIT ?1
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts live products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted = 0")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use medstock_core::{Pagination, ProductStatus};

    fn new_product(name: &str, stock: i64, threshold: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price_cents: 250,
            stock,
            low_stock_threshold: threshold,
            category: "General".to_string(),
            unit: "box".to_string(),
        }
    }

    async fn setup() -> (Database, ProductRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        (db, repo)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (db, repo) = setup().await;
        let product = repo
            .insert(db.pool(), &new_product("Saline 0.9%", 12, 5))
            .await
            .unwrap();

        let fetched = repo.get_by_id(product.id).await.unwrap().unwrap();
        assert_eq!(fetched, product);
        assert_eq!(fetched.stock, 12);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let (db, repo) = setup().await;
        repo.insert(db.pool(), &new_product("Saline 0.9%", 0, 5))
            .await
            .unwrap();

        let err = repo
            .insert(db.pool(), &new_product("Saline 0.9%", 0, 5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, ref value } if field == "name" && value == "Saline 0.9%"
        ));
    }

    #[tokio::test]
    async fn test_update_stock_returns_post_state() {
        let (db, repo) = setup().await;
        let product = repo
            .insert(db.pool(), &new_product("Gauze", 10, 2))
            .await
            .unwrap();

        let after = repo.update_stock(db.pool(), product.id, 15).await.unwrap();
        assert_eq!(after.stock, 25);

        let after = repo.update_stock(db.pool(), product.id, -5).await.unwrap();
        assert_eq!(after.stock, 20);
    }

    #[tokio::test]
    async fn test_update_stock_missing_or_deleted() {
        let (db, repo) = setup().await;
        let err = repo.update_stock(db.pool(), 999, 1).await.unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(999))));

        let product = repo
            .insert(db.pool(), &new_product("Gauze", 10, 2))
            .await
            .unwrap();
        repo.soft_delete(db.pool(), product.id).await.unwrap();

        let err = repo.update_stock(db.pool(), product.id, 1).await.unwrap_err();
        assert_eq!(err.kind(), medstock_core::ErrorKind::NotFound);
        assert!(repo.get_by_id(product.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_fields_is_sparse() {
        let (db, repo) = setup().await;
        let product = repo
            .insert(db.pool(), &new_product("Gauze", 10, 2))
            .await
            .unwrap();

        let update = ProductUpdate {
            price_cents: Some(300),
            ..Default::default()
        };
        let updated = repo
            .update_fields(db.pool(), product.id, &update)
            .await
            .unwrap();
        assert_eq!(updated.price_cents, 300);
        assert_eq!(updated.name, "Gauze");
        assert_eq!(updated.stock, 10);
    }

    #[tokio::test]
    async fn test_list_filters_and_pagination() {
        let (db, repo) = setup().await;
        for (name, stock) in [
            ("Aspirin", 0),
            ("Bandage", 3),
            ("Cough Syrup", 40),
            ("Dextrose", 8),
        ] {
            repo.insert(db.pool(), &new_product(name, stock, 10))
                .await
                .unwrap();
        }

        let all = ProductFilter::default();
        let (products, page) = repo.list(&all).await.unwrap();
        assert_eq!(products.len(), 4);
        assert_eq!(page.total, 4);

        let out = ProductFilter {
            status: Some(ProductStatus::OutOfStock),
            ..Default::default()
        };
        let (products, _) = repo.list(&out).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Aspirin");

        let low = ProductFilter {
            status: Some(ProductStatus::LowStock),
            ..Default::default()
        };
        let (products, page) = repo.list(&low).await.unwrap();
        assert_eq!(page.total, 2);
        assert!(products.iter().all(|p| p.stock > 0 && p.stock <= 10));

        let in_stock = ProductFilter {
            status: Some(ProductStatus::InStock),
            ..Default::default()
        };
        assert_eq!(repo.list(&in_stock).await.unwrap().1.total, 3);

        let search = ProductFilter {
            search: Some("SYRUP".to_string()),
            ..Default::default()
        };
        let (products, _) = repo.list(&search).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Cough Syrup");

        let paged = ProductFilter {
            pagination: Pagination::new(2, 3),
            ..Default::default()
        };
        let (products, page) = repo.list(&paged).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[tokio::test]
    async fn test_low_stock_includes_out_of_stock() {
        let (db, repo) = setup().await;
        repo.insert(db.pool(), &new_product("Aspirin", 0, 10))
            .await
            .unwrap();
        repo.insert(db.pool(), &new_product("Bandage", 4, 10))
            .await
            .unwrap();
        repo.insert(db.pool(), &new_product("Cough Syrup", 40, 10))
            .await
            .unwrap();

        let items = repo.low_stock(10).await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin", "Bandage"]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }
}
