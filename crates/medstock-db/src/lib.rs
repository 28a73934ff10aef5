//! # medstock-db: Storage and Transactions for MedStock
//!
//! SQLite storage via sqlx, and the [`InventoryService`] that runs every
//! stock movement as one transaction over the product row, the movement
//! ledger and the stats row.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MedStock Data Flow                               │
//! │                                                                         │
//! │  Request layer (add-stock, remove-stock, movements, stats)             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   medstock-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ InventoryServ │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (inventory.rs)│    │  (embedded)  │  │   │
//! │  │   │               │    │       │       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  Repositories │    │ 001_initial_ │  │   │
//! │  │   │ DbConfig      │    │  product      │    │  schema.sql  │  │   │
//! │  │   │ from_env()    │    │  movement     │    │              │  │   │
//! │  │   │               │    │  stats, user  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Environment-driven configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types and the caller-facing error response
//! - [`repository`] - Repository implementations (product, movement, stats, user)
//! - [`inventory`] - The transaction coordinator
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medstock_db::{Database, DbConfig};
//! use medstock_core::StockChange;
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let product = db
//!     .inventory()
//!     .add_stock(StockChange::new(product_id, user_id, 50))
//!     .await?;
//! let stats = db.inventory().get_stats().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod inventory;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::ConfigError;
pub use error::{DbError, DbResult, ErrorResponse};
pub use inventory::InventoryService;
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::stats::StatsRepository;
pub use repository::user::UserRepository;
