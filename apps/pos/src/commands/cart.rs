//! # Cart Commands
//!
//! Commands for cart manipulation from the product screens and the cart
//! panel.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐        │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Accepted │        │
//! │  │  Cart    │     │          │     │  Dialog  │     │  Order   │        │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘        │
//! │       ▲                │                                  │             │
//! │       │           add_to_cart                             │             │
//! │       │           increment / decrement                   │             │
//! │       │           remove_from_cart                        │             │
//! │       │                                                   │             │
//! │       └──────────── cleared by the accepted submission ◄──┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows are addressed by their position in the item list the UI last
//! received.

use apotek_core::{Cart, CartLineItem, CartTotals, ProductRef};
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartState, ConfigState};

/// Display strings for the totals panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedTotals {
    pub subtotal: String,
    pub tax: String,
    pub grand_total: String,
}

/// Cart response including items and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLineItem>,
    pub totals: CartTotals,
    pub formatted: FormattedTotals,
    /// PPN rate shown next to the tax line.
    pub tax_rate_percent: f64,
    /// True while an order submission holds the cart.
    pub locked: bool,
}

impl CartResponse {
    fn build(cart: &Cart, config: &ConfigState, locked: bool) -> Self {
        let totals = cart.totals();
        CartResponse {
            items: cart.items().to_vec(),
            totals,
            formatted: FormattedTotals {
                subtotal: config.format_currency(totals.subtotal),
                tax: config.format_currency(totals.tax),
                grand_total: config.format_currency(totals.grand_total),
            },
            tax_rate_percent: cart.tax_rate().percentage(),
            locked,
        }
    }
}

/// Gets the current cart contents.
///
/// ## Returns
/// Current cart with items and calculated totals
pub fn get_cart(cart: &CartState, config: &ConfigState) -> CartResponse {
    debug!("get_cart command");
    let locked = cart.is_locked();
    cart.with_cart(|c| CartResponse::build(c, config, locked))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Product already in cart: its amount increases by one
/// - Otherwise: appended as a new line with amount 1
/// - Price is captured at the moment of picking
pub fn add_to_cart(
    cart: &CartState,
    config: &ConfigState,
    product: ProductRef,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product.id, code = %product.code, "add_to_cart command");

    cart.add_product(product)?;
    Ok(get_cart(cart, config))
}

/// Increases the amount on line `index` by one.
pub fn increment_cart_item(
    cart: &CartState,
    config: &ConfigState,
    index: usize,
) -> Result<CartResponse, ApiError> {
    debug!(index, "increment_cart_item command");

    cart.increment_amount(index)?;
    Ok(get_cart(cart, config))
}

/// Decreases the amount on line `index` by one, never below 1.
///
/// Use [`remove_from_cart`] to drop the line.
pub fn decrement_cart_item(
    cart: &CartState,
    config: &ConfigState,
    index: usize,
) -> Result<CartResponse, ApiError> {
    debug!(index, "decrement_cart_item command");

    cart.decrement_amount(index)?;
    Ok(get_cart(cart, config))
}

/// Removes line `index`; later rows shift up by one.
pub fn remove_from_cart(
    cart: &CartState,
    config: &ConfigState,
    index: usize,
) -> Result<CartResponse, ApiError> {
    debug!(index, "remove_from_cart command");

    let removed = cart.remove_item(index)?;
    debug!(product_id = %removed.product.id, "Line removed");
    Ok(get_cart(cart, config))
}
