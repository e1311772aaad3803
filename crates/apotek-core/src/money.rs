//! # Money Module
//!
//! Provides the `Money` type for handling rupiah amounts safely, and
//! `CurrencyFormat` for turning them into display strings.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A dashboard that sums line totals as floats drifts from what the      │
//! │  order endpoint records.                                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Rupiah                                           │
//! │    Every amount is an i64 count of the smallest unit.                   │
//! │    Tax is computed once on the subtotal with explicit rounding.         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use apotek_core::money::{CurrencyFormat, Money};
//!
//! let price = Money::from_rupiah(12_500);
//! let line = price * 2;
//! assert_eq!(line.rupiah(), 25_000);
//!
//! // Display only - never feeds back into stored values
//! assert_eq!(CurrencyFormat::idr().format(line), "Rp 25.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (rupiah).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction never wraps, discounts can go negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serializes as a bare number**: the order endpoint expects plain integers
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  ProductRef.price ──► CartLineItem.line_total ──► CartTotals.subtotal   │
/// │                                                        │                │
/// │                                      calculate_tax(PPN)│                │
/// │                                                        ▼                │
/// │                           CartTotals.tax ──► CartTotals.grand_total     │
/// │                                                        │                │
/// │                                                        ▼                │
/// │                                  CheckoutPayload.expenditure            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    ///
    /// ## Example
    /// ```rust
    /// use apotek_core::money::Money;
    ///
    /// let price = Money::from_rupiah(10_000);
    /// assert_eq!(price.rupiah(), 10_000);
    /// ```
    #[inline]
    pub const fn from_rupiah(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax at the given rate, rounding half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`.
    /// The +5000 is the half-unit (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use apotek_core::money::Money;
    /// use apotek_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_rupiah(25_000);
    /// let ppn = TaxRate::from_bps(1000); // 10%
    /// assert_eq!(subtotal.calculate_tax(ppn).rupiah(), 2_500);
    ///
    /// // 15 × 10% = 1.5 → 2
    /// assert_eq!(Money::from_rupiah(15).calculate_tax(ppn).rupiah(), 2);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        self.checked_tax(rate).unwrap_or(if self.0 < 0 {
            Money(i64::MIN)
        } else {
            Money(i64::MAX)
        })
    }

    /// Like [`Money::calculate_tax`], `None` if the tax does not fit in `i64`.
    pub fn checked_tax(&self, rate: TaxRate) -> Option<Money> {
        // i128 so large subtotals cannot overflow the intermediate product
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        i64::try_from(tax).ok().map(Money)
    }

    /// Multiplies money by a line quantity, `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use apotek_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(5_000);
    /// assert_eq!(unit_price.checked_multiply_quantity(3), Some(Money::from_rupiah(15_000)));
    /// assert_eq!(Money::from_rupiah(i64::MAX).checked_multiply_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Money> {
        match self.0.checked_mul(qty as i64) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display using the IDR format.
///
/// ## Note
/// UI strings should go through the configured [`CurrencyFormat`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CurrencyFormat::idr().format(*self))
    }
}

// Operators saturate at the i64 bounds. Cart totals go through the
// checked_* methods instead and report overflow as an error.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

/// Multiplication by a line quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Currency Formatting
// =============================================================================

/// Display formatter for monetary amounts.
///
/// Pure presentation: formatting never changes a stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyFormat {
    /// Currency symbol, e.g. "Rp".
    pub symbol: String,

    /// Put a space between symbol and amount.
    pub space_after_symbol: bool,

    /// Digit group separator ("." for id-ID).
    pub thousands_separator: char,

    /// Separator before minor digits ("," for id-ID).
    pub decimal_separator: char,

    /// How many of the amount's trailing digits are minor units.
    /// Rupiah has none in practice.
    pub minor_digits: u8,
}

impl CurrencyFormat {
    /// Indonesian rupiah: `Rp 27.500`.
    pub fn idr() -> Self {
        CurrencyFormat {
            symbol: "Rp".to_string(),
            space_after_symbol: true,
            thousands_separator: '.',
            decimal_separator: ',',
            minor_digits: 0,
        }
    }

    /// Formats an amount as a display string.
    ///
    /// ## Example
    /// ```rust
    /// use apotek_core::money::{CurrencyFormat, Money};
    ///
    /// let idr = CurrencyFormat::idr();
    /// assert_eq!(idr.format(Money::from_rupiah(1_234_567)), "Rp 1.234.567");
    /// assert_eq!(idr.format(Money::from_rupiah(-5_000)), "-Rp 5.000");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let value = amount.rupiah().unsigned_abs();
        let divisor = 10_u64.pow(u32::from(self.minor_digits));
        let whole = group_digits(value / divisor, self.thousands_separator);

        let mut out = String::new();
        if amount.is_negative() {
            out.push('-');
        }
        out.push_str(&self.symbol);
        if self.space_after_symbol {
            out.push(' ');
        }
        out.push_str(&whole);
        if self.minor_digits > 0 {
            out.push(self.decimal_separator);
            out.push_str(&format!(
                "{:0width$}",
                value % divisor,
                width = usize::from(self.minor_digits)
            ));
        }
        out
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::idr()
    }
}

/// Inserts `sep` between every group of three digits, from the right.
fn group_digits(value: u64, sep: char) -> String {
    let digits = value.to_string();
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Unit Tests
// =============================================================================
