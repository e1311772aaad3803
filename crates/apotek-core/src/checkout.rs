//! # Checkout Module
//!
//! Checkout inputs, their validation, and assembly of the order payload.
//!
//! ## Payload Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CheckoutInput ──validate()──► ValidatedCheckout ─┐                     │
//! │  (buyer, tx type?, payment?)   (all required set) │                     │
//! │                                                   ├─► CheckoutPayload   │
//! │  Cart snapshot ──totals()──► CartTotals ──────────┤   (built once,      │
//! │               ──items()───► CartLineItem[] ─1:1──►┘    sent once)       │
//! │                                                                         │
//! │  expenditure = totals.grand_total   (copied, never recomputed)          │
//! │  tax_amount  = totals.tax                                               │
//! │  line_total  = unit_price × qty                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartLineItem};
use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{BuyerInfo, PaymentMethod, TransactionType};
use crate::validation::ValidationResult;

// =============================================================================
// Checkout Input
// =============================================================================

/// What the checkout dialog collects beyond the cart itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutInput {
    pub buyer: BuyerInfo,
    pub transaction_type: Option<TransactionType>,
    pub payment_method: Option<PaymentMethod>,
}

impl CheckoutInput {
    /// Checks the input is complete enough to submit.
    ///
    /// ## Rules
    /// - a payment method is selected
    /// - a transaction type is selected
    /// - buyer fields, when given, pass their field rules
    ///
    /// Buyer name and phone are optional (walk-in sales).
    pub fn validate(&self) -> ValidationResult<ValidatedCheckout> {
        let payment_method = self.payment_method.ok_or_else(|| ValidationError::Required {
            field: "payment method".to_string(),
        })?;

        let transaction_type = self.transaction_type.ok_or_else(|| ValidationError::Required {
            field: "transaction type".to_string(),
        })?;

        let buyer = self.buyer.normalized();
        buyer.validate()?;

        Ok(ValidatedCheckout {
            buyer,
            transaction_type,
            payment_method,
        })
    }
}

/// Checkout input that passed [`CheckoutInput::validate`].
///
/// Only obtainable through validation, so a payload can never be built from
/// an incomplete form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCheckout {
    buyer: BuyerInfo,
    transaction_type: TransactionType,
    payment_method: PaymentMethod,
}

impl ValidatedCheckout {
    pub fn buyer(&self) -> &BuyerInfo {
        &self.buyer
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }
}

// =============================================================================
// Order Line
// =============================================================================

/// One line of the submitted order, derived from a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub code: String,
    pub qty: u32,
    pub unit_price: Money,
    /// No discounting exists in the cart; always zero.
    pub discount: Money,
    pub line_total: Money,
}

impl From<&CartLineItem> for OrderLine {
    fn from(item: &CartLineItem) -> Self {
        OrderLine {
            product_id: item.product.id.clone(),
            product_name: item.product.name.clone(),
            code: item.product.code.clone(),
            qty: item.amount,
            unit_price: item.product.price,
            discount: Money::zero(),
            line_total: item.line_total(),
        }
    }
}

// =============================================================================
// Checkout Payload
// =============================================================================

/// The order sent to the order-creation endpoint.
///
/// ## Lifecycle
/// Built right before submission from a cart snapshot, sent once, dropped
/// when the request resolves. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutPayload {
    /// Client-generated reference (UUID v4) for log correlation.
    pub reference: String,

    pub buyer_name: Option<String>,
    pub buyer_phone: Option<String>,

    /// Grand total (subtotal + PPN).
    pub expenditure: Money,

    pub subtotal: Money,
    pub tax_amount: Money,

    pub is_prescription: bool,
    pub payment_method: PaymentMethod,

    pub items: Vec<OrderLine>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CheckoutPayload {
    /// Assembles the payload from the cart as it is right now.
    ///
    /// ## Errors
    /// - `Validation(EmptyCart)` if there is nothing to sell
    /// - `AmountOverflow` if the totals do not fit in `i64`
    /// - `TotalsMismatch` if the derived totals fail to reconcile
    pub fn build(cart: &Cart, checkout: &ValidatedCheckout) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(ValidationError::EmptyCart.into());
        }

        let totals = cart.try_totals()?;
        totals.reconcile()?;

        Ok(CheckoutPayload {
            reference: Uuid::new_v4().to_string(),
            buyer_name: checkout.buyer().name.clone(),
            buyer_phone: checkout.buyer().phone.clone(),
            expenditure: totals.grand_total,
            subtotal: totals.subtotal,
            tax_amount: totals.tax,
            is_prescription: checkout.transaction_type().is_prescription(),
            payment_method: checkout.payment_method(),
            items: cart.items().iter().map(OrderLine::from).collect(),
            created_at: Utc::now(),
        })
    }

    /// Σ qty over order lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|l| u64::from(l.qty)).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
