//! # medstock-core: Pure Inventory Logic for MedStock
//!
//! This crate holds every decision the stock engine makes that does not need
//! a database: money arithmetic, how a stock level is classified against its
//! low-stock threshold, which dashboard counters move when a product crosses
//! a threshold, and the sparse [`StatsPatch`] changeset that carries those
//! counter adjustments to storage.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        MedStock Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Request layer (HTTP, auth, cache)                   │   │
//! │  │    add-stock, remove-stock, movements, stats, products          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               medstock-db (InventoryService)                    │   │
//! │  │      one transaction: stock → movement → stats patch            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ asks                                   │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ medstock-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   stock   │  │   stats   │  │ validation│  │   │
//! │  │   │  Product  │  │StockLevel │  │StatsPatch │  │   rules   │  │   │
//! │  │   │  Movement │  │Transition │  │  (sparse) │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Movement, Stats, User, filters)
//! - [`money`] - Money type with integer arithmetic
//! - [`stock`] - Stock levels and threshold transitions
//! - [`stats`] - The sparse stats changeset and its constructors
//! - [`pagination`] - Page/offset math and page info
//! - [`error`] - Domain error types and the error taxonomy
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use medstock_core::{Money, StatsPatch, StockTransition};
//!
//! // 50 units of a 5.00 item arrive for a product that was out of stock
//! let transition = StockTransition::after_add(50, 50, 10);
//! let patch = StatsPatch::for_stock_added(&transition, 50, Money::from_cents(500)).unwrap();
//!
//! assert_eq!(patch.total_out_of_stock, Some(-1));
//! assert_eq!(patch.total_value, Some(25_000));
//! assert_eq!(patch.total_low_stock, None);
//! ```

pub mod error;
pub mod money;
pub mod pagination;
pub mod stats;
pub mod stock;
pub mod types;
pub mod validation;

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use pagination::{PageInfo, Pagination};
pub use stats::StatsPatch;
pub use stock::{LevelShift, StockLevel, StockTransition};
pub use types::*;

/// Largest quantity a single movement may carry.
///
/// Keeps `quantity * price` comfortably inside `i64` cents and catches
/// typos like an extra three zeros on a stock-in form.
pub const MAX_MOVEMENT_QUANTITY: i64 = 1_000_000;

/// Largest page a list query may return.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Note attached to the movement recorded for a product's opening stock.
pub const OPENING_STOCK_NOTE: &str = "Opening stock";
