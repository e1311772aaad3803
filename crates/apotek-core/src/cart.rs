//! # Cart Module
//!
//! The single source of truth for what is currently in the cart, plus the
//! arithmetic that derives its totals.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI Event              Operation                  Effect                │
//! │  ────────              ─────────                  ──────                │
//! │  Pick product ───────► add_product(ref) ────────► new line (amount 1)   │
//! │                                                   or merge: amount += 1 │
//! │  [+] on a row ───────► increment_amount(i) ─────► amount += 1           │
//! │  [-] on a row ───────► decrement_amount(i) ─────► amount -= 1, min 1    │
//! │  Trash icon ─────────► remove_item(i) ──────────► line deleted          │
//! │  Order accepted ─────► clear() ─────────────────► empty cart            │
//! │                                                                         │
//! │  Any read ───────────► totals() ────────────────► recomputed each time  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every line has `amount >= 1` (`u32`, never stored at zero)
//! - At most one line per product id
//! - `grand_total == subtotal + tax`, with nothing cached between reads

use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{ProductRef, TaxRate};

// =============================================================================
// Cart Line Item
// =============================================================================

/// One cart row: a frozen product snapshot and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Line id (UUID v4), stable for the life of the line.
    pub id: String,

    /// Product data at pick time.
    pub product: ProductRef,

    /// Quantity, always >= 1.
    pub amount: u32,
}

impl CartLineItem {
    fn new(product: ProductRef) -> Self {
        CartLineItem {
            id: Uuid::new_v4().to_string(),
            product,
            amount: 1,
        }
    }

    /// `amount * unit price`. Derived, never stored.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price * self.amount
    }

    /// `amount * unit price`, `None` if it does not fit.
    #[inline]
    pub fn checked_line_total(&self) -> Option<Money> {
        self.product.price.checked_multiply_quantity(self.amount)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Totals derived from the current line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Σ amount across lines (not the number of lines).
    pub item_count: u64,

    /// Number of distinct lines.
    pub line_count: usize,

    /// Σ amount × price.
    pub subtotal: Money,

    /// PPN on the subtotal.
    pub tax: Money,

    /// subtotal + tax.
    pub grand_total: Money,
}

impl CartTotals {
    /// Checks `grand_total == subtotal + tax`.
    pub fn reconcile(&self) -> CoreResult<()> {
        if self.subtotal + self.tax != self.grand_total {
            return Err(CoreError::TotalsMismatch {
                subtotal: self.subtotal.rupiah(),
                tax: self.tax.rupiah(),
                grand_total: self.grand_total.rupiah(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// Line items are private: the operations below are the only way to change
/// them, and readers get shared slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartLineItem>,
    tax_rate: TaxRate,
}

impl Cart {
    /// Creates an empty cart taxed at `tax_rate`.
    pub fn new(tax_rate: TaxRate) -> Self {
        Cart {
            items: Vec::new(),
            tax_rate,
        }
    }

    /// Adds a picked product.
    ///
    /// ## Behavior
    /// - Product not in cart: appends a line with `amount = 1`
    /// - Product already in cart (same id): that line's amount goes up by one
    ///
    /// ## Returns
    /// Index of the line that now holds the product.
    ///
    /// ## Errors
    /// - `NegativePrice` if the product carries a price below zero
    /// - `AmountOverflow` if the new totals would not fit; the cart is unchanged
    pub fn add_product(&mut self, product: ProductRef) -> CoreResult<usize> {
        if let Some(index) = self.items.iter().position(|i| i.product.id == product.id) {
            self.increment_amount(index)?;
            return Ok(index);
        }

        if product.price.is_negative() {
            return Err(CoreError::NegativePrice {
                product_id: product.id,
            });
        }

        self.items.push(CartLineItem::new(product));
        if let Err(e) = self.try_totals() {
            self.items.pop();
            return Err(e);
        }
        Ok(self.items.len() - 1)
    }

    /// Increases a line's amount by one. No stock check happens here.
    ///
    /// ## Returns
    /// The new amount.
    ///
    /// Refused with `AmountOverflow` if the new totals would not fit.
    pub fn increment_amount(&mut self, index: usize) -> CoreResult<u32> {
        let item = self.line_mut(index)?;
        let amount = item
            .amount
            .checked_add(1)
            .ok_or(CoreError::QuantityOverflow { index })?;
        item.amount = amount;

        if let Err(e) = self.try_totals() {
            self.line_mut(index)?.amount = amount - 1;
            return Err(e);
        }
        Ok(amount)
    }

    /// Decreases a line's amount by one, stopping at 1.
    ///
    /// Decrementing a line at 1 leaves it untouched; use
    /// [`Cart::remove_item`] to drop it.
    ///
    /// ## Returns
    /// The new amount.
    pub fn decrement_amount(&mut self, index: usize) -> CoreResult<u32> {
        let item = self.line_mut(index)?;
        if item.amount > 1 {
            item.amount -= 1;
        }
        Ok(item.amount)
    }

    /// Deletes a line regardless of its amount.
    ///
    /// ## Returns
    /// The removed line.
    pub fn remove_item(&mut self, index: usize) -> CoreResult<CartLineItem> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Derives totals from the current lines.
    ///
    /// ## Formulas
    /// ```text
    /// item_count  = Σ amount
    /// subtotal    = Σ amount × price
    /// tax         = subtotal × rate   (rounded half up)
    /// grand_total = subtotal + tax
    /// ```
    ///
    /// Mutations refuse any change whose totals would not fit in `i64`, so
    /// the saturating arithmetic here never actually saturates.
    pub fn totals(&self) -> CartTotals {
        let subtotal: Money = self.items.iter().map(CartLineItem::line_total).sum();
        let tax = subtotal.calculate_tax(self.tax_rate);

        let totals = CartTotals {
            item_count: self.items.iter().map(|i| u64::from(i.amount)).sum(),
            line_count: self.items.len(),
            subtotal,
            tax,
            grand_total: subtotal + tax,
        };
        debug_assert!(totals.reconcile().is_ok());
        totals
    }

    /// Derives totals with checked arithmetic.
    ///
    /// ## Errors
    /// `AmountOverflow` if any line total, the subtotal, the tax or the
    /// grand total does not fit in `i64`.
    pub fn try_totals(&self) -> CoreResult<CartTotals> {
        let mut subtotal = Money::zero();
        for item in &self.items {
            subtotal = item
                .checked_line_total()
                .and_then(|line| subtotal.checked_add(line))
                .ok_or(CoreError::AmountOverflow)?;
        }
        let tax = subtotal
            .checked_tax(self.tax_rate)
            .ok_or(CoreError::AmountOverflow)?;
        let grand_total = subtotal.checked_add(tax).ok_or(CoreError::AmountOverflow)?;

        Ok(CartTotals {
            item_count: self.items.iter().map(|i| u64::from(i.amount)).sum(),
            line_count: self.items.len(),
            subtotal,
            tax,
            grand_total,
        })
    }

    /// Current line items, in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Tax rate applied to the subtotal.
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    fn check_index(&self, index: usize) -> CoreResult<()> {
        if index >= self.items.len() {
            return Err(CoreError::LineOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }

    fn line_mut(&mut self, index: usize) -> CoreResult<&mut CartLineItem> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(CoreError::LineOutOfRange { index, len })
    }
}

impl Default for Cart {
    /// Empty cart at the PPN rate.
    fn default() -> Self {
        Cart::new(TaxRate::ppn())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64) -> ProductRef {
        ProductRef::new(
            id,
            format!("Product {}", id),
            format!("CODE-{}", id),
            Money::from_rupiah(price),
        )
    }

    fn assert_consistent(cart: &Cart) {
        let totals = cart.totals();
        let expected_subtotal: i64 = cart
            .items()
            .iter()
            .map(|i| i.amount as i64 * i.product.price.rupiah())
            .sum();
        assert_eq!(totals.subtotal.rupiah(), expected_subtotal);
        assert_eq!(totals.grand_total, totals.subtotal + totals.tax);
        assert!(totals.reconcile().is_ok());
        assert!(cart.items().iter().all(|i| i.amount >= 1));
    }

    #[test]
    fn test_worked_example() {
        let mut cart = Cart::default();
        let a = cart.add_product(product("A", 10_000)).unwrap();
        let b = cart.add_product(product("B", 5_000)).unwrap();
        cart.increment_amount(a).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal.rupiah(), 25_000);
        assert_eq!(totals.tax.rupiah(), 2_500);
        assert_eq!(totals.grand_total.rupiah(), 27_500);
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.line_count, 2);

        cart.increment_amount(b).unwrap();
        let totals = cart.totals();
        assert_eq!(totals.subtotal.rupiah(), 30_000);
        assert_eq!(totals.tax.rupiah(), 3_000);
        assert_eq!(totals.grand_total.rupiah(), 33_000);
    }

    #[test]
    fn test_add_same_product_merges() {
        let mut cart = Cart::default();
        let first = cart.add_product(product("A", 10_000)).unwrap();
        let second = cart.add_product(product("A", 10_000)).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].amount, 2);
    }

    #[test]
    fn test_merge_keeps_original_snapshot() {
        let mut cart = Cart::default();
        cart.add_product(product("A", 10_000)).unwrap();
        // Catalog price changed after the first pick
        cart.add_product(product("A", 12_000)).unwrap();

        assert_eq!(cart.items()[0].product.price.rupiah(), 10_000);
        assert_eq!(cart.totals().subtotal.rupiah(), 20_000);
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let mut cart = Cart::default();
        cart.add_product(product("A", 10_000)).unwrap();
        cart.increment_amount(0).unwrap();

        assert_eq!(cart.decrement_amount(0).unwrap(), 1);
        assert_eq!(cart.decrement_amount(0).unwrap(), 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].amount, 1);
    }

    #[test]
    fn test_remove_item_regardless_of_amount() {
        let mut cart = Cart::default();
        cart.add_product(product("A", 10_000)).unwrap();
        cart.add_product(product("B", 5_000)).unwrap();
        for _ in 0..4 {
            cart.increment_amount(0).unwrap();
        }

        let removed = cart.remove_item(0).unwrap();
        assert_eq!(removed.product.id, "A");
        assert_eq!(removed.amount, 5);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].product.id, "B");
    }

    #[test]
    fn test_out_of_range_index_fails() {
        let mut cart = Cart::default();
        cart.add_product(product("A", 10_000)).unwrap();

        assert!(matches!(
            cart.increment_amount(1),
            Err(CoreError::LineOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            cart.decrement_amount(5),
            Err(CoreError::LineOutOfRange { .. })
        ));
        assert!(matches!(
            cart.remove_item(1),
            Err(CoreError::LineOutOfRange { .. })
        ));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_clear_zeroes_everything() {
        let mut cart = Cart::default();
        cart.add_product(product("A", 10_000)).unwrap();
        cart.add_product(product("B", 5_000)).unwrap();

        cart.clear();
        let totals = cart.totals();
        assert!(cart.is_empty());
        assert_eq!(totals.item_count, 0);
        assert!(totals.subtotal.is_zero());
        assert!(totals.tax.is_zero());
        assert!(totals.grand_total.is_zero());
    }

    #[test]
    fn test_amount_overflow_refused() {
        let mut cart = Cart::default();
        let index = cart.add_product(product("A", i64::MAX / 2 + 1)).unwrap();

        // Doubling the line would overflow the subtotal
        assert!(matches!(
            cart.increment_amount(index),
            Err(CoreError::AmountOverflow)
        ));
        assert!(matches!(
            cart.add_product(product("A", i64::MAX / 2 + 1)),
            Err(CoreError::AmountOverflow)
        ));
        assert_eq!(cart.items()[index].amount, 1);

        // The refused attempts left a cart whose totals still fit
        let totals = cart.try_totals().unwrap();
        assert_eq!(totals, cart.totals());
        assert!(totals.reconcile().is_ok());
    }

    #[test]
    fn test_new_line_that_overflows_is_not_kept() {
        let mut cart = Cart::new(TaxRate::from_bps(0));
        cart.add_product(product("A", i64::MAX - 10)).unwrap();

        let err = cart.add_product(product("B", 20)).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.totals().grand_total.rupiah(), i64::MAX - 10);
        assert!(cart.try_totals().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut cart = Cart::default();
        let err = cart.add_product(product("A", -1)).unwrap_err();
        assert!(matches!(err, CoreError::NegativePrice { product_id } if product_id == "A"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_line_ids_are_unique() {
        let mut cart = Cart::default();
        cart.add_product(product("A", 1)).unwrap();
        cart.add_product(product("B", 1)).unwrap();
        assert_ne!(cart.items()[0].id, cart.items()[1].id);
    }

    #[test]
    fn test_custom_tax_rate() {
        let mut cart = Cart::new(TaxRate::from_bps(1100));
        cart.add_product(product("A", 10_000)).unwrap();
        assert_eq!(cart.totals().tax.rupiah(), 1_100);
    }

    #[test]
    fn test_totals_mismatch_detected() {
        let bad = CartTotals {
            item_count: 1,
            line_count: 1,
            subtotal: Money::from_rupiah(100),
            tax: Money::from_rupiah(10),
            grand_total: Money::from_rupiah(111),
        };
        assert!(matches!(
            bad.reconcile(),
            Err(CoreError::TotalsMismatch { .. })
        ));
    }

    /// Drives a long pseudo-random sequence of mutations and checks the
    /// totals invariants after every step.
    #[test]
    fn test_invariants_hold_across_mutation_sequences() {
        let catalog: Vec<ProductRef> = [("A", 10_000), ("B", 5_000), ("C", 1_250), ("D", 37)]
            .iter()
            .map(|(id, price)| product(id, *price))
            .collect();

        let mut cart = Cart::default();
        let mut seed: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            seed
        };

        for _ in 0..2_000 {
            let roll = next();
            let op = roll % 4;
            match op {
                0 => {
                    let pick = catalog[(roll / 4) as usize % catalog.len()].clone();
                    cart.add_product(pick).unwrap();
                }
                _ if cart.is_empty() => continue,
                1 => {
                    let index = (roll / 4) as usize % cart.len();
                    cart.increment_amount(index).unwrap();
                }
                2 => {
                    let index = (roll / 4) as usize % cart.len();
                    let before = cart.items()[index].amount;
                    let after = cart.decrement_amount(index).unwrap();
                    assert_eq!(after, before.saturating_sub(1).max(1));
                }
                _ => {
                    let index = (roll / 4) as usize % cart.len();
                    let before = cart.len();
                    cart.remove_item(index).unwrap();
                    assert_eq!(cart.len(), before - 1);
                }
            }
            assert_consistent(&cart);
        }
    }
}
