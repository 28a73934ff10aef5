//! # Stock Levels
//!
//! Classifies a product's on-hand quantity against its low-stock threshold
//! and works out which dashboard counter a stock change moves.
//!
//! ## Levels
//! ```text
//!   stock ≤ 0                 0 < stock ≤ threshold         stock > threshold
//! ┌──────────────┐          ┌──────────────────────┐      ┌──────────────────┐
//! │ OUT OF STOCK │ ◄──────► │         LOW          │ ◄──► │     HEALTHY      │
//! │ out_of_stock │          │  total_low_stock     │      │  (no counter)    │
//! └──────────────┘          └──────────────────────┘      └──────────────────┘
//!         ▲                                                        │
//!         └────────────────────────────────────────────────────────┘
//! ```
//!
//! Each live product sits in exactly one level. A change that moves it from
//! one level to another decrements the counter it leaves and increments the
//! counter it enters, so the counters always equal a recount of the products
//! table. A change that stays within one level touches no counter.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which dashboard bucket a stock quantity falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    OutOfStock,
    Low,
    Healthy,
}

impl StockLevel {
    /// Classifies `stock` against `threshold`.
    ///
    /// ```rust
    /// use medstock_core::StockLevel;
    ///
    /// assert_eq!(StockLevel::classify(0, 10), StockLevel::OutOfStock);
    /// assert_eq!(StockLevel::classify(10, 10), StockLevel::Low);
    /// assert_eq!(StockLevel::classify(11, 10), StockLevel::Healthy);
    /// ```
    pub fn classify(stock: i64, threshold: i64) -> Self {
        if stock <= 0 {
            StockLevel::OutOfStock
        } else if stock <= threshold {
            StockLevel::Low
        } else {
            StockLevel::Healthy
        }
    }

    /// `(low_stock, out_of_stock)` counter contribution of one product at
    /// this level.
    #[inline]
    pub fn counters(&self) -> (i64, i64) {
        match self {
            StockLevel::OutOfStock => (0, 1),
            StockLevel::Low => (1, 0),
            StockLevel::Healthy => (0, 0),
        }
    }
}

/// A move from one level to a different one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelShift {
    pub from: StockLevel,
    pub to: StockLevel,
}

impl LevelShift {
    /// `None` when `from == to`.
    pub fn between(from: StockLevel, to: StockLevel) -> Option<Self> {
        if from == to {
            None
        } else {
            Some(LevelShift { from, to })
        }
    }

    /// Counter deltas `(low_stock, out_of_stock)` for this shift.
    pub fn counter_deltas(&self) -> (i64, i64) {
        let (low_from, out_from) = self.from.counters();
        let (low_to, out_to) = self.to.counters();
        (low_to - low_from, out_to - out_from)
    }
}

/// Stock before and after one mutation, with the threshold in force.
///
/// Only the post-mutation quantity is read back from storage; the
/// pre-mutation quantity is reconstructed from it and the movement
/// quantity, which is exact because the mutation was a single atomic
/// increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockTransition {
    pub pre: i64,
    pub post: i64,
    pub threshold: i64,
}

impl StockTransition {
    /// Transition for an add of `quantity` that produced `post`.
    pub fn after_add(post: i64, quantity: i64, threshold: i64) -> Self {
        StockTransition {
            pre: post - quantity,
            post,
            threshold,
        }
    }

    /// Transition for a remove of `quantity` that produced `post`.
    pub fn after_remove(post: i64, quantity: i64, threshold: i64) -> Self {
        StockTransition {
            pre: post + quantity,
            post,
            threshold,
        }
    }

    pub fn pre_level(&self) -> StockLevel {
        StockLevel::classify(self.pre, self.threshold)
    }

    pub fn post_level(&self) -> StockLevel {
        StockLevel::classify(self.post, self.threshold)
    }

    pub fn shift(&self) -> Option<LevelShift> {
        LevelShift::between(self.pre_level(), self.post_level())
    }
}
