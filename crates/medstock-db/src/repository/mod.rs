//! # Repository Module
//!
//! Database repository implementations for MedStock.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  InventoryService                                                      │
//! │       │                                                                 │
//! │       │  let mut tx = pool.begin().await?;                             │
//! │       │  products.update_stock(&mut *tx, id, delta)                    │
//! │       │  movements.insert(&mut *tx, &movement)                         │
//! │       │  stats.patch(&mut *tx, &patch)                                 │
//! │       │  tx.commit().await?;                                           │
//! │       ▼                                                                 │
//! │  ProductRepository / MovementRepository / StatsRepository              │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Write methods take an executor so the service can run several of      │
//! │  them in one transaction; read methods go straight to the pool.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products and the stock mutator
//! - [`MovementRepository`](movement::MovementRepository) - Append-only ledger
//! - [`StatsRepository`](stats::StatsRepository) - Singleton aggregate row
//! - [`UserRepository`](user::UserRepository) - Staff accounts

pub mod movement;
pub mod product;
pub mod stats;
pub mod user;
