//! # Checkout Commands
//!
//! Commands behind the checkout dialog: open it, fill it in, confirm.

use apotek_core::{BuyerInfo, PaymentMethod, TransactionType};
use serde::Serialize;
use tracing::{debug, info};

use crate::checkout::{CheckoutState, CheckoutView};
use crate::commands::cart::{get_cart, CartResponse};
use crate::error::ApiError;
use crate::state::ConfigState;

/// Everything the checkout dialog renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub checkout: CheckoutView,
    pub cart: CartResponse,
}

/// Result of an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub order_id: Option<String>,
    pub summary: CheckoutSummary,
}

fn summarize(checkout: &CheckoutState, config: &ConfigState, view: CheckoutView) -> CheckoutSummary {
    CheckoutSummary {
        checkout: view,
        cart: get_cart(checkout.cart(), config),
    }
}

/// Opens the checkout dialog with fresh inputs.
pub fn open_checkout(
    checkout: &CheckoutState,
    config: &ConfigState,
) -> Result<CheckoutSummary, ApiError> {
    debug!("open_checkout command");
    let view = checkout.open()?;
    Ok(summarize(checkout, config, view))
}

/// Gets the dialog state and the cart it will submit.
pub fn get_checkout_summary(checkout: &CheckoutState, config: &ConfigState) -> CheckoutSummary {
    debug!("get_checkout_summary command");
    summarize(checkout, config, checkout.view())
}

pub fn set_buyer_info(checkout: &CheckoutState, buyer: BuyerInfo) -> Result<CheckoutView, ApiError> {
    debug!("set_buyer_info command");
    Ok(checkout.set_buyer_info(buyer)?)
}

pub fn set_transaction_type(
    checkout: &CheckoutState,
    transaction_type: TransactionType,
) -> Result<CheckoutView, ApiError> {
    debug!(?transaction_type, "set_transaction_type command");
    Ok(checkout.set_transaction_type(transaction_type)?)
}

/// Sets the transaction type from the two checkboxes.
///
/// Exactly one must be ticked.
pub fn set_transaction_flags(
    checkout: &CheckoutState,
    prescription: bool,
    over_the_counter: bool,
) -> Result<CheckoutView, ApiError> {
    debug!(prescription, over_the_counter, "set_transaction_flags command");
    Ok(checkout.set_transaction_flags(prescription, over_the_counter)?)
}

pub fn set_payment_method(
    checkout: &CheckoutState,
    payment_method: PaymentMethod,
) -> Result<CheckoutView, ApiError> {
    debug!(?payment_method, "set_payment_method command");
    Ok(checkout.set_payment_method(payment_method)?)
}

/// Confirms the checkout and submits the order.
///
/// ## Errors
/// - `VALIDATION_ERROR`: inputs incomplete or cart empty, nothing sent
/// - `CHECKOUT_IN_FLIGHT`: an earlier confirmation is still running
/// - `SUBMISSION_FAILED`: nothing changed, safe to retry
pub async fn submit_checkout(
    checkout: &CheckoutState,
    config: &ConfigState,
) -> Result<SubmitResponse, ApiError> {
    debug!("submit_checkout command");
    let ack = checkout.submit().await?;
    info!(order_id = ack.order_id.as_deref().unwrap_or("-"), "Checkout complete");

    Ok(SubmitResponse {
        order_id: ack.order_id,
        summary: get_checkout_summary(checkout, config),
    })
}

/// Dismisses the checkout dialog.
pub fn close_checkout(checkout: &CheckoutState) -> CheckoutView {
    debug!("close_checkout command");
    checkout.close()
}
