//! # Domain Types
//!
//! Core domain types used throughout MedStock.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Movement     │   │     Stats       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product_id     │   │  singleton row  │       │
//! │  │  price_cents    │   │  quantity (>0)  │   │  counters       │       │
//! │  │  stock          │   │  ADD | REMOVE   │   │  value totals   │       │
//! │  │  threshold      │   │  price snapshot │   │                 │       │
//! │  └─────────────────┘   │  performed_by ──┼──►│  User           │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are the storage engine's integer row ids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::pagination::Pagination;
use crate::stock::StockLevel;

// =============================================================================
// Product
// =============================================================================

/// A catalog item whose on-hand quantity is tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in cents.
    pub price_cents: i64,
    /// On-hand quantity. Never negative in a committed state.
    pub stock: i64,
    /// At or below this (and above zero) the product counts as low stock.
    pub low_stock_threshold: i64,
    pub category: String,
    /// Unit of measure ("box", "vial", "strip", ...).
    pub unit: String,
    /// Soft-delete flag.
    pub deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Which dashboard bucket the product currently falls in.
    #[inline]
    pub fn level(&self) -> StockLevel {
        StockLevel::classify(self.stock, self.low_stock_threshold)
    }

    /// `stock × price`, `None` on overflow.
    pub fn inventory_value(&self) -> Option<Money> {
        self.price().checked_mul_quantity(self.stock)
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price_cents: i64,
    /// Opening stock; recorded as an `ADD` movement when positive.
    pub stock: i64,
    pub low_stock_threshold: i64,
    pub category: String,
    pub unit: String,
}

/// Sparse update of a product's catalog fields.
///
/// Stock is deliberately absent: quantity only changes through stock
/// movements.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price_cents.is_none()
            && self.category.is_none()
            && self.unit.is_none()
            && self.low_stock_threshold.is_none()
    }
}

/// Stock-status filter for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    InStock,
    OutOfStock,
    LowStock,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::InStock => "in_stock",
            ProductStatus::OutOfStock => "out_of_stock",
            ProductStatus::LowStock => "low_stock",
        }
    }
}

/// Filter for listing products. Conditions are ANDed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductFilter {
    pub pagination: Pagination,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
    pub status: Option<ProductStatus>,
}

// =============================================================================
// Movement
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Stock in.
    Add,
    /// Stock out.
    Remove,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Add => "ADD",
            MovementType::Remove => "REMOVE",
        }
    }

    /// Sign applied to the movement quantity when replaying the ledger.
    #[inline]
    pub fn sign(&self) -> i64 {
        match self {
            MovementType::Add => 1,
            MovementType::Remove => -1,
        }
    }
}

/// Immutable audit record of one stock change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Movement {
    pub id: i64,
    pub product_id: i64,
    /// Magnitude, always positive; the sign comes from `movement_type`.
    pub quantity: i64,
    /// Unit price at the time of the movement (snapshot, not a live join).
    pub price_cents: i64,
    pub movement_type: MovementType,
    pub note: Option<String>,
    pub performed_by: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    // Denormalized for reads
    pub product_name: String,
    pub user_name: String,
}

impl Movement {
    /// Signed quantity (`+q` for ADD, `-q` for REMOVE).
    #[inline]
    pub fn signed_quantity(&self) -> i64 {
        self.movement_type.sign() * self.quantity
    }

    /// Unit price snapshot as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A movement about to be appended to the ledger.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: i64,
    pub quantity: i64,
    pub movement_type: MovementType,
    pub price_cents: i64,
    pub note: Option<String>,
    pub performed_by: i64,
}

/// Filter for listing movements. Conditions are ANDed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovementFilter {
    pub pagination: Pagination,
    pub product_id: Option<i64>,
    pub movement_type: Option<MovementType>,
    /// Inclusive lower bound on `created_at`.
    pub start_date: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    pub end_date: Option<DateTime<Utc>>,
}

/// A request to move stock in or out of one product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockChange {
    pub product_id: i64,
    pub performed_by: i64,
    pub quantity: i64,
    pub note: Option<String>,
}

impl StockChange {
    pub fn new(product_id: i64, performed_by: i64, quantity: i64) -> Self {
        StockChange {
            product_id,
            performed_by,
            quantity,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

// =============================================================================
// Stats
// =============================================================================

/// The singleton running-aggregate row behind the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Stats {
    pub total_users: i64,
    pub total_products: i64,
    pub total_low_stock: i64,
    pub total_out_of_stock: i64,
    /// Cumulative units added.
    pub total_stocks_added: i64,
    pub total_stocks_added_value_cents: i64,
    /// Cumulative units removed.
    pub total_stocks_removed: i64,
    pub total_stocks_removed_value_cents: i64,
    /// Current value of everything on hand.
    pub total_value_cents: i64,
}

impl Stats {
    #[inline]
    pub fn total_value(&self) -> Money {
        Money::from_cents(self.total_value_cents)
    }

    #[inline]
    pub fn total_stocks_added_value(&self) -> Money {
        Money::from_cents(self.total_stocks_added_value_cents)
    }

    #[inline]
    pub fn total_stocks_removed_value(&self) -> Money {
        Money::from_cents(self.total_stocks_removed_value_cents)
    }
}

// =============================================================================
// User
// =============================================================================

/// Role of a staff account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Default for Role {
    fn default() -> Self {
        Role::Staff
    }
}

/// A person who performs stock movements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub deleted: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
}

// =============================================================================
// Dashboard
// =============================================================================

/// A product at or below its low-stock threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LowStockItem {
    pub id: i64,
    pub name: String,
    pub stock: i64,
    pub low_stock_threshold: i64,
}

/// Everything the dashboard landing page shows.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardData {
    pub stats: Stats,
    pub low_stock: Vec<LowStockItem>,
    pub recent_stock_in: Vec<Movement>,
    pub recent_stock_out: Vec<Movement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, threshold: i64, price_cents: i64) -> Product {
        Product {
            id: 1,
            name: "Paracetamol 500mg".to_string(),
            description: None,
            price_cents,
            stock,
            low_stock_threshold: threshold,
            category: "Analgesics".to_string(),
            unit: "box".to_string(),
            deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_level_and_value() {
        let p = product(8, 10, 500);
        assert_eq!(p.level(), StockLevel::Low);
        assert_eq!(p.inventory_value(), Some(Money::from_cents(4000)));

        assert_eq!(product(0, 10, 500).level(), StockLevel::OutOfStock);
        assert_eq!(product(11, 10, 500).level(), StockLevel::Healthy);
    }

    #[test]
    fn test_movement_signed_quantity() {
        let mut m = Movement {
            id: 1,
            product_id: 1,
            quantity: 12,
            price_cents: 500,
            movement_type: MovementType::Add,
            note: None,
            performed_by: 1,
            created_at: Utc::now(),
            product_name: "Gauze".to_string(),
            user_name: "Amina".to_string(),
        };
        assert_eq!(m.signed_quantity(), 12);
        m.movement_type = MovementType::Remove;
        assert_eq!(m.signed_quantity(), -12);
    }

    #[test]
    fn test_movement_type_wire_format() {
        assert_eq!(MovementType::Add.as_str(), "ADD");
        assert_eq!(MovementType::Remove.as_str(), "REMOVE");
    }

    #[test]
    fn test_product_update_is_empty() {
        assert!(ProductUpdate::default().is_empty());
        let update = ProductUpdate {
            price_cents: Some(650),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_stock_change_builder() {
        let change = StockChange::new(3, 9, 40).with_note("Supplier delivery");
        assert_eq!(change.quantity, 40);
        assert_eq!(change.note.as_deref(), Some("Supplier delivery"));
    }
}
