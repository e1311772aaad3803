//! # Commands Module
//!
//! All commands exposed to the dashboard UI.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── checkout.rs  ◄─── Checkout dialog and order submission
//! └── config.rs    ◄─── Configuration retrieval
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the cart (and config for display strings)
//! fn get_cart(cart: &CartState, config: &ConfigState) -> CartResponse
//!
//! // Checkout reaches the cart through its own handle
//! async fn submit_checkout(checkout: &CheckoutState, config: &ConfigState)
//! ```
//!
//! Every fallible command returns `Result<T, ApiError>` so the UI sees one
//! error shape.

pub mod cart;
pub mod checkout;
pub mod config;
