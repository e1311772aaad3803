//! # apotek-core: Pure Cart & Checkout Logic for Apotek POS
//!
//! Everything the point-of-sale flow computes lives here: picked line items,
//! subtotal / PPN / grand total, the prescription vs. over-the-counter rule,
//! and the order payload sent to the order-creation endpoint.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Apotek POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Dashboard UI                                 │   │
//! │  │    Catalog ──► Cart Summary ──► Checkout Dialog                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          apotek-pos (CartState, CheckoutState, gateway)         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ apotek-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │ProductRef │  │   Money   │  │   Cart    │  │  Payload  │  │   │
//! │  │   │ TxType    │  │  TaxRate  │  │ LineItem  │  │ OrderLine │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ProductRef, TransactionType, PaymentMethod, ...)
//! - [`money`] - Integer money and IDR display formatting
//! - [`cart`] - The cart and its derived totals
//! - [`checkout`] - Checkout inputs and payload assembly
//! - [`validation`] - Field validators
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use apotek_core::{Cart, Money, ProductRef};
//!
//! let mut cart = Cart::default(); // PPN 10%
//! cart.add_product(ProductRef::new("p-1", "Paracetamol 500mg", "PCT-500", Money::from_rupiah(10_000))).unwrap();
//! cart.increment_amount(0).unwrap();
//!
//! let totals = cart.totals();
//! assert_eq!(totals.subtotal.rupiah(), 20_000);
//! assert_eq!(totals.tax.rupiah(), 2_000);
//! assert_eq!(totals.grand_total.rupiah(), 22_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem, CartTotals};
pub use checkout::{CheckoutInput, CheckoutPayload, OrderLine, ValidatedCheckout};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{CurrencyFormat, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// PPN (value-added tax) applied to the cart subtotal, in basis points.
///
/// 1000 bps = 10%.
pub const PPN_RATE_BPS: u32 = 1000;

/// Maximum length of a buyer phone number, counted in characters.
pub const MAX_PHONE_LENGTH: usize = 15;

/// Maximum length of a buyer name.
pub const MAX_BUYER_NAME_LENGTH: usize = 100;
