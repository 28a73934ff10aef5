//! # Stats Patch
//!
//! The sparse changeset applied to the singleton stats row.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StatsPatch                                                             │
//! │                                                                         │
//! │   field = None     → column untouched                                   │
//! │   field = Some(d)  → column = column + d   (applied in place)           │
//! │                                                                         │
//! │   Every event that moves a counter has one constructor here, so the     │
//! │   rules for "which counters move" live in one file.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deltas rather than absolute values: the storage layer applies them as
//! `col = col + ?`, which composes under concurrent writers.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stock::{LevelShift, StockLevel, StockTransition};
use crate::types::{Product, Stats};

/// Signed per-field deltas. Money fields are in cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsPatch {
    pub total_users: Option<i64>,
    pub total_products: Option<i64>,
    pub total_low_stock: Option<i64>,
    pub total_out_of_stock: Option<i64>,
    pub total_stocks_added: Option<i64>,
    pub total_stocks_added_value: Option<i64>,
    pub total_stocks_removed: Option<i64>,
    pub total_stocks_removed_value: Option<i64>,
    pub total_value: Option<i64>,
}

/// Folds `delta` into `slot`. Zero deltas leave the slot as it was.
fn bump(slot: &mut Option<i64>, delta: i64, what: &'static str) -> CoreResult<()> {
    if delta == 0 {
        return Ok(());
    }
    let next = slot
        .unwrap_or(0)
        .checked_add(delta)
        .ok_or(CoreError::ArithmeticOverflow(what))?;
    *slot = Some(next);
    Ok(())
}

fn movement_value(price: Money, quantity: i64) -> CoreResult<i64> {
    price
        .checked_mul_quantity(quantity)
        .map(|m| m.cents())
        .ok_or(CoreError::ArithmeticOverflow("movement value"))
}

impl StatsPatch {
    /// True when applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.total_users.is_none()
            && self.total_products.is_none()
            && self.total_low_stock.is_none()
            && self.total_out_of_stock.is_none()
            && self.total_stocks_added.is_none()
            && self.total_stocks_added_value.is_none()
            && self.total_stocks_removed.is_none()
            && self.total_stocks_removed_value.is_none()
            && self.total_value.is_none()
    }

    fn level_shift(&mut self, shift: Option<LevelShift>) -> CoreResult<()> {
        if let Some(shift) = shift {
            let (low, out) = shift.counter_deltas();
            bump(&mut self.total_low_stock, low, "total_low_stock")?;
            bump(&mut self.total_out_of_stock, out, "total_out_of_stock")?;
        }
        Ok(())
    }

    fn enter_level(&mut self, level: StockLevel, sign: i64) -> CoreResult<()> {
        let (low, out) = level.counters();
        bump(&mut self.total_low_stock, sign * low, "total_low_stock")?;
        bump(&mut self.total_out_of_stock, sign * out, "total_out_of_stock")
    }

    // =========================================================================
    // Stock movements
    // =========================================================================

    /// Counters moved by an `ADD` of `quantity` units at unit `price`.
    pub fn for_stock_added(
        transition: &StockTransition,
        quantity: i64,
        price: Money,
    ) -> CoreResult<StatsPatch> {
        let value = movement_value(price, quantity)?;
        let mut patch = StatsPatch::default();

        bump(&mut patch.total_stocks_added, quantity, "total_stocks_added")?;
        bump(&mut patch.total_stocks_added_value, value, "total_stocks_added_value")?;
        bump(&mut patch.total_value, value, "total_value")?;
        patch.level_shift(transition.shift())?;

        Ok(patch)
    }

    /// Counters moved by a `REMOVE` of `quantity` units at unit `price`.
    pub fn for_stock_removed(
        transition: &StockTransition,
        quantity: i64,
        price: Money,
    ) -> CoreResult<StatsPatch> {
        let value = movement_value(price, quantity)?;
        let mut patch = StatsPatch::default();

        bump(&mut patch.total_stocks_removed, quantity, "total_stocks_removed")?;
        bump(
            &mut patch.total_stocks_removed_value,
            value,
            "total_stocks_removed_value",
        )?;
        bump(&mut patch.total_value, -value, "total_value")?;
        patch.level_shift(transition.shift())?;

        Ok(patch)
    }

    // =========================================================================
    // Product lifecycle
    // =========================================================================

    /// A new product enters its level; opening stock counts as added stock.
    pub fn for_product_created(product: &Product) -> CoreResult<StatsPatch> {
        let mut patch = StatsPatch::default();
        bump(&mut patch.total_products, 1, "total_products")?;
        patch.enter_level(product.level(), 1)?;

        if product.stock > 0 {
            let value = movement_value(product.price(), product.stock)?;
            bump(&mut patch.total_stocks_added, product.stock, "total_stocks_added")?;
            bump(&mut patch.total_stocks_added_value, value, "total_stocks_added_value")?;
            bump(&mut patch.total_value, value, "total_value")?;
        }

        Ok(patch)
    }

    /// A deleted product leaves its level and takes its value with it.
    ///
    /// Cumulative added/removed counters are history and stay as they are.
    pub fn for_product_deleted(product: &Product) -> CoreResult<StatsPatch> {
        let mut patch = StatsPatch::default();
        bump(&mut patch.total_products, -1, "total_products")?;
        patch.enter_level(product.level(), -1)?;

        let value = movement_value(product.price(), product.stock)?;
        bump(&mut patch.total_value, -value, "total_value")?;

        Ok(patch)
    }

    /// Revalues on-hand stock after a price change and reclassifies after a
    /// threshold change. Stock itself is the same on both sides.
    pub fn for_product_updated(before: &Product, after: &Product) -> CoreResult<StatsPatch> {
        let mut patch = StatsPatch::default();

        let price_delta = after
            .price()
            .checked_sub(before.price())
            .ok_or(CoreError::ArithmeticOverflow("price delta"))?;
        let value = movement_value(price_delta, after.stock)?;
        bump(&mut patch.total_value, value, "total_value")?;
        patch.level_shift(LevelShift::between(before.level(), after.level()))?;

        Ok(patch)
    }

    // =========================================================================
    // User lifecycle
    // =========================================================================

    pub fn user_created() -> StatsPatch {
        StatsPatch {
            total_users: Some(1),
            ..Default::default()
        }
    }

    pub fn user_deleted() -> StatsPatch {
        StatsPatch {
            total_users: Some(-1),
            ..Default::default()
        }
    }
}

impl Stats {
    /// Returns a copy with `patch` applied, the same arithmetic storage does.
    pub fn apply(&self, patch: &StatsPatch) -> CoreResult<Stats> {
        fn add(base: i64, delta: Option<i64>, what: &'static str) -> CoreResult<i64> {
            base.checked_add(delta.unwrap_or(0))
                .ok_or(CoreError::ArithmeticOverflow(what))
        }

        Ok(Stats {
            total_users: add(self.total_users, patch.total_users, "total_users")?,
            total_products: add(self.total_products, patch.total_products, "total_products")?,
            total_low_stock: add(self.total_low_stock, patch.total_low_stock, "total_low_stock")?,
            total_out_of_stock: add(
                self.total_out_of_stock,
                patch.total_out_of_stock,
                "total_out_of_stock",
            )?,
            total_stocks_added: add(
                self.total_stocks_added,
                patch.total_stocks_added,
                "total_stocks_added",
            )?,
            total_stocks_added_value_cents: add(
                self.total_stocks_added_value_cents,
                patch.total_stocks_added_value,
                "total_stocks_added_value",
            )?,
            total_stocks_removed: add(
                self.total_stocks_removed,
                patch.total_stocks_removed,
                "total_stocks_removed",
            )?,
            total_stocks_removed_value_cents: add(
                self.total_stocks_removed_value_cents,
                patch.total_stocks_removed_value,
                "total_stocks_removed_value",
            )?,
            total_value_cents: add(self.total_value_cents, patch.total_value, "total_value")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(stock: i64, threshold: i64, price_cents: i64) -> Product {
        Product {
            id: 1,
            name: "Amoxicillin 250mg".to_string(),
            description: None,
            price_cents,
            stock,
            low_stock_threshold: threshold,
            category: "Antibiotics".to_string(),
            unit: "strip".to_string(),
            deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_then_remove_round_trip() {
        let price = Money::from_cents(500);
        let added =
            StatsPatch::for_stock_added(&StockTransition::after_add(50, 50, 10), 50, price).unwrap();
        let removed =
            StatsPatch::for_stock_removed(&StockTransition::after_remove(10, 40, 10), 40, price)
                .unwrap();

        let stats = Stats {
            total_products: 1,
            total_out_of_stock: 1,
            ..Default::default()
        };
        let stats = stats.apply(&added).unwrap();
        assert_eq!(stats.total_out_of_stock, 0);
        assert_eq!(stats.total_low_stock, 0);
        assert_eq!(stats.total_value_cents, 25_000);

        let stats = stats.apply(&removed).unwrap();
        assert_eq!(stats.total_low_stock, 1);
        assert_eq!(stats.total_value_cents, 5_000);
        assert_eq!(stats.total_stocks_added, 50);
        assert_eq!(stats.total_stocks_added_value_cents, 25_000);
        assert_eq!(stats.total_stocks_removed, 40);
        assert_eq!(stats.total_stocks_removed_value_cents, 20_000);
    }

    #[test]
    fn test_same_level_touches_no_counter() {
        let patch = StatsPatch::for_stock_added(
            &StockTransition::after_add(60, 10, 10),
            10,
            Money::from_cents(100),
        )
        .unwrap();
        assert_eq!(patch.total_low_stock, None);
        assert_eq!(patch.total_out_of_stock, None);
        assert_eq!(patch.total_stocks_added, Some(10));
    }

    #[test]
    fn test_product_created_with_and_without_stock() {
        let empty = StatsPatch::for_product_created(&product(0, 5, 300)).unwrap();
        assert_eq!(empty.total_products, Some(1));
        assert_eq!(empty.total_out_of_stock, Some(1));
        assert_eq!(empty.total_value, None);

        let stocked = StatsPatch::for_product_created(&product(4, 5, 300)).unwrap();
        assert_eq!(stocked.total_low_stock, Some(1));
        assert_eq!(stocked.total_out_of_stock, None);
        assert_eq!(stocked.total_stocks_added, Some(4));
        assert_eq!(stocked.total_value, Some(1200));
    }

    #[test]
    fn test_product_deleted_backs_out_value_and_level() {
        let patch = StatsPatch::for_product_deleted(&product(3, 5, 1000)).unwrap();
        assert_eq!(patch.total_products, Some(-1));
        assert_eq!(patch.total_low_stock, Some(-1));
        assert_eq!(patch.total_value, Some(-3000));
        assert_eq!(patch.total_stocks_removed, None);
    }

    #[test]
    fn test_product_updated_revalues_and_reclassifies() {
        let before = product(20, 10, 500);
        let mut after = before.clone();
        after.price_cents = 450;
        after.low_stock_threshold = 25;

        let patch = StatsPatch::for_product_updated(&before, &after).unwrap();
        assert_eq!(patch.total_value, Some(-1000));
        assert_eq!(patch.total_low_stock, Some(1));
        assert_eq!(patch.total_out_of_stock, None);

        let unchanged = StatsPatch::for_product_updated(&before, &before).unwrap();
        assert!(unchanged.is_empty());
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = StatsPatch::for_stock_added(
            &StockTransition::after_add(10, 10, 0),
            10,
            Money::from_cents(i64::MAX / 2),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ArithmeticOverflow(_)));
    }

    #[test]
    fn test_user_patches() {
        assert_eq!(StatsPatch::user_created().total_users, Some(1));
        assert_eq!(StatsPatch::user_deleted().total_users, Some(-1));
        assert!(StatsPatch::default().is_empty());
    }
}
