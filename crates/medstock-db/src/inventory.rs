//! # Inventory Service
//!
//! The transaction coordinator. Every operation that changes stock, the
//! catalog, or the user list runs here as one all-or-nothing transaction.
//!
//! ## Stock Movement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_stock / remove_stock                                               │
//! │                                                                         │
//! │  validate(quantity, note)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ─────────────────────────────────────────────────────────┐      │
//! │  │ 1. UPDATE products SET stock = stock ± q ... RETURNING *     │      │
//! │  │      └─ missing/deleted → NOT_FOUND                          │      │
//! │  │      └─ remove and post < 0 → INVALID (rollback)             │      │
//! │  │ 2. performing user live?            └─ no → NOT_FOUND        │      │
//! │  │ 3. INSERT movement (price snapshot from step 1)              │      │
//! │  │ 4. UPDATE stats SET col = col + Δ (StatsPatch)               │      │
//! │  COMMIT ◄───────────────────────────────────────────────────────┘      │
//! │                                                                         │
//! │  Any `?` before COMMIT drops the transaction, which rolls back.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement of every transaction is a write, so the connection
//! holds SQLite's write lock before it reads anything it acts on. Writers
//! queue on that lock (up to the configured busy timeout); no
//! application-level lock exists.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::repository::movement::MovementRepository;
use crate::repository::product::ProductRepository;
use crate::repository::stats::StatsRepository;
use crate::repository::user::UserRepository;
use medstock_core::validation::{
    validate_new_product, validate_new_user, validate_product_update, validate_stock_change,
};
use medstock_core::{
    CoreError, DashboardData, Movement, MovementFilter, MovementType, NewMovement, NewProduct,
    NewUser, PageInfo, Product, ProductFilter, ProductUpdate, Stats, StatsPatch, StockChange,
    StockTransition, User, OPENING_STOCK_NOTE,
};

/// Coordinates stock mutations, the movement ledger and the stats row.
///
/// ## Usage
/// ```rust,ignore
/// let inventory = db.inventory();
///
/// let product = inventory
///     .remove_stock(StockChange::new(product_id, user_id, 12).with_note("Ward 3"))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct InventoryService {
    pool: SqlitePool,
    products: ProductRepository,
    movements: MovementRepository,
    stats: StatsRepository,
    users: UserRepository,
}

impl InventoryService {
    pub fn new(pool: SqlitePool) -> Self {
        InventoryService {
            products: ProductRepository::new(pool.clone()),
            movements: MovementRepository::new(pool.clone()),
            stats: StatsRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    // =========================================================================
    // Stock movements
    // =========================================================================

    /// Receives `change.quantity` units into stock.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product after the add
    /// * `Err(NOT_FOUND)` - Unknown/deleted product or performing user
    /// * `Err(INVALID)` - Quantity not positive, note too long
    pub async fn add_stock(&self, change: StockChange) -> DbResult<Product> {
        validate_stock_change(&change).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let product = self
            .products
            .update_stock(&mut *tx, change.product_id, change.quantity)
            .await?;
        self.users.ensure_live(&mut *tx, change.performed_by).await?;

        let transition = StockTransition::after_add(
            product.stock,
            change.quantity,
            product.low_stock_threshold,
        );

        self.record(&mut tx, &product, &change, MovementType::Add)
            .await?;

        let patch = StatsPatch::for_stock_added(&transition, change.quantity, product.price())?;
        self.stats.patch(&mut *tx, &patch).await?;

        tx.commit().await?;

        info!(
            product_id = product.id,
            quantity = change.quantity,
            pre = transition.pre,
            post = transition.post,
            performed_by = change.performed_by,
            "Stock added"
        );
        Ok(product)
    }

    /// Issues `change.quantity` units out of stock.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The product after the removal
    /// * `Err(NOT_FOUND)` - Unknown/deleted product or performing user
    /// * `Err(INVALID)` - Not enough stock; nothing was changed
    pub async fn remove_stock(&self, change: StockChange) -> DbResult<Product> {
        validate_stock_change(&change).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let product = self
            .products
            .update_stock(&mut *tx, change.product_id, -change.quantity)
            .await?;

        if product.stock < 0 {
            tx.rollback().await?;
            let available = product.stock + change.quantity;
            warn!(
                product_id = product.id,
                available,
                requested = change.quantity,
                "Insufficient stock"
            );
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available,
                requested: change.quantity,
            }
            .into());
        }

        self.users.ensure_live(&mut *tx, change.performed_by).await?;

        let transition = StockTransition::after_remove(
            product.stock,
            change.quantity,
            product.low_stock_threshold,
        );

        self.record(&mut tx, &product, &change, MovementType::Remove)
            .await?;

        let patch =
            StatsPatch::for_stock_removed(&transition, change.quantity, product.price())?;
        self.stats.patch(&mut *tx, &patch).await?;

        tx.commit().await?;

        info!(
            product_id = product.id,
            quantity = change.quantity,
            pre = transition.pre,
            post = transition.post,
            performed_by = change.performed_by,
            "Stock removed"
        );
        Ok(product)
    }

    /// Appends the movement for a mutation that already happened in `tx`.
    async fn record(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        product: &Product,
        change: &StockChange,
        movement_type: MovementType,
    ) -> DbResult<i64> {
        let movement = NewMovement {
            product_id: product.id,
            quantity: change.quantity,
            movement_type,
            price_cents: product.price_cents,
            note: change.note.clone(),
            performed_by: change.performed_by,
        };
        self.movements.insert(&mut **tx, &movement).await
    }

    /// Lists movements newest first.
    pub async fn list_movements(
        &self,
        filter: &MovementFilter,
    ) -> DbResult<(Vec<Movement>, PageInfo)> {
        self.movements.list(filter).await
    }

    /// Current aggregate statistics.
    pub async fn get_stats(&self) -> DbResult<Stats> {
        self.stats.get().await
    }

    // =========================================================================
    // Product lifecycle
    // =========================================================================

    /// Creates a product. Positive opening stock is recorded as an `ADD`
    /// movement by `performed_by`.
    pub async fn create_product(&self, new: NewProduct, performed_by: i64) -> DbResult<Product> {
        validate_new_product(&new).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let product = self.products.insert(&mut *tx, &new).await?;
        self.users.ensure_live(&mut *tx, performed_by).await?;

        if product.stock > 0 {
            let opening = StockChange::new(product.id, performed_by, product.stock)
                .with_note(OPENING_STOCK_NOTE);
            self.record(&mut tx, &product, &opening, MovementType::Add)
                .await?;
        }

        let patch = StatsPatch::for_product_created(&product)?;
        self.stats.patch(&mut *tx, &patch).await?;

        tx.commit().await?;

        info!(
            product_id = product.id,
            name = %product.name,
            stock = product.stock,
            "Product created"
        );
        Ok(product)
    }

    /// Updates catalog fields; stock is untouched.
    pub async fn update_product(&self, id: i64, update: ProductUpdate) -> DbResult<Product> {
        validate_product_update(&update).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let before = self.products.lock(&mut *tx, id).await?;
        if update.is_empty() {
            tx.rollback().await?;
            return Ok(before);
        }

        let after = self.products.update_fields(&mut *tx, id, &update).await?;

        let patch = StatsPatch::for_product_updated(&before, &after)?;
        self.stats.patch(&mut *tx, &patch).await?;

        tx.commit().await?;

        info!(
            product_id = id,
            price_cents = after.price_cents,
            low_stock_threshold = after.low_stock_threshold,
            "Product updated"
        );
        Ok(after)
    }

    /// Soft-deletes a product and backs its contribution out of the stats.
    pub async fn delete_product(&self, id: i64) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;

        let product = self.products.soft_delete(&mut *tx, id).await?;
        let patch = StatsPatch::for_product_deleted(&product)?;
        self.stats.patch(&mut *tx, &patch).await?;

        tx.commit().await?;

        info!(product_id = id, stock = product.stock, "Product deleted");
        Ok(product)
    }

    pub async fn get_product(&self, id: i64) -> DbResult<Product> {
        self.products
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(id).into())
    }

    pub async fn list_products(&self, filter: &ProductFilter) -> DbResult<(Vec<Product>, PageInfo)> {
        self.products.list(filter).await
    }

    // =========================================================================
    // User lifecycle
    // =========================================================================

    pub async fn create_user(&self, new: NewUser) -> DbResult<User> {
        validate_new_user(&new).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let user = self.users.insert(&mut *tx, &new).await?;
        self.stats
            .patch(&mut *tx, &StatsPatch::user_created())
            .await?;

        tx.commit().await?;

        info!(user_id = user.id, role = ?user.role, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, id: i64) -> DbResult<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(id).into())
    }

    /// Soft-deletes a user. Their past movements keep their name.
    pub async fn delete_user(&self, id: i64) -> DbResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = self.users.soft_delete(&mut *tx, id).await?;
        self.stats
            .patch(&mut *tx, &StatsPatch::user_deleted())
            .await?;

        tx.commit().await?;

        info!(user_id = id, "User deleted");
        Ok(user)
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// Stats, depleted products and the latest movements in each direction.
    pub async fn dashboard(&self, limit: u32) -> DbResult<DashboardData> {
        debug!(limit, "Loading dashboard");

        let (stats, low_stock, recent_stock_in, recent_stock_out) = tokio::try_join!(
            self.stats.get(),
            self.products.low_stock(limit),
            self.movements.recent(MovementType::Add, limit),
            self.movements.recent(MovementType::Remove, limit),
        )?;

        Ok(DashboardData {
            stats,
            low_stock,
            recent_stock_in,
            recent_stock_out,
        })
    }
}
