//! # Error Types
//!
//! Domain-specific error types for apotek-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  apotek-core errors (this file)                                        │
//! │  ├── CoreError        - Cart invariant violations                      │
//! │  └── ValidationError  - Checkout input failures (recoverable)          │
//! │                                                                         │
//! │  apotek-pos errors (app crate)                                         │
//! │  ├── GatewayError     - Order endpoint failures                        │
//! │  ├── CheckoutError    - Orchestrator refusals / failures               │
//! │  └── ApiError         - What the UI sees (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CheckoutError → ApiError → UI     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Cart and checkout domain errors.
///
/// The cart variants indicate the caller broke a precondition (stale index,
/// runaway quantity). They are returned, never swallowed, so the bug surfaces.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A line item was addressed by an index the cart does not have.
    ///
    /// ## When This Occurs
    /// - The UI kept a row index after the row was removed
    /// - Two screens raced on a stale copy of the item list
    #[error("Cart line {index} out of range (cart has {len} lines)")]
    LineOutOfRange { index: usize, len: usize },

    /// Incrementing would overflow the line quantity.
    #[error("Quantity overflow on cart line {index}")]
    QuantityOverflow { index: usize },

    /// A line total, the subtotal or the grand total would not fit in `i64`.
    #[error("Cart total exceeds the largest representable amount")]
    AmountOverflow,

    /// A picked product carries a price below zero.
    #[error("Product {product_id} has a negative price")]
    NegativePrice { product_id: String },

    /// Derived totals failed to reconcile (`grand_total != subtotal + tax`).
    #[error("Cart totals do not reconcile: subtotal {subtotal} + tax {tax} != total {grand_total}")]
    TotalsMismatch {
        subtotal: i64,
        tax: i64,
        grand_total: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Checkout input validation errors.
///
/// These block the move out of the Collecting phase; nothing is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required selection is missing.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. letters in a phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Mutually exclusive options were chosen together.
    #[error("{first} and {second} cannot both be selected")]
    Conflicting { first: String, second: String },

    /// Nothing to check out.
    #[error("Cart is empty")]
    EmptyCart,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
