//! # Checkout Orchestrator
//!
//! Collects buyer / transaction-type / payment inputs, validates them,
//! builds the order payload from the cart and drives exactly one submission
//! per confirmation.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Closed ──open()──► Collecting ◄────────── edit ──────────┐            │
//! │     ▲                    │                                 │            │
//! │     │                submit()                              │            │
//! │     │                    │ validate (under session lock)   │            │
//! │     │           invalid ─┤                                 │            │
//! │     │      (stay, report)│ ok                              │            │
//! │     │                    ▼                                 │            │
//! │   close()           Submitting ──── gateway error ───► Failed           │
//! │     │                    │     (cart untouched,     (inputs kept,       │
//! │     │                    │      error logged)        retryable)         │
//! │     │                    │ accepted                                     │
//! │     │                    ▼                                              │
//! │     └────────────── Succeeded  (cart cleared once)                      │
//! │                                                                         │
//! │  Submitting is exclusive: submit(), edits and open() are refused with   │
//! │  InFlight, and the cart itself refuses mutation until the call ends.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dismissal and Cancellation
//! `close()` during a submission detaches the session from it: the eventual
//! response no longer changes the session, though an accepted order still
//! clears the cart. Dropping the `submit()` future releases the cart
//! unchanged and returns the session to Collecting.

mod gateway;

pub use gateway::{GatewayError, HttpGatewayConfig, HttpOrderGateway, OrderAck, OrderGateway};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use apotek_core::{
    BuyerInfo, CheckoutInput, CheckoutPayload, CoreError, PaymentMethod, TransactionType,
    ValidationError,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::state::{CartState, SubmissionLock};

// =============================================================================
// Phase & Errors
// =============================================================================

/// Where the checkout session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// Dialog not open.
    Closed,
    /// Editing inputs.
    Collecting,
    /// One order request in flight.
    Submitting,
    /// Order accepted, cart cleared.
    Succeeded,
    /// Last attempt failed; inputs kept for retry.
    Failed,
}

impl CheckoutPhase {
    fn accepts_input(self) -> bool {
        matches!(self, CheckoutPhase::Collecting | CheckoutPhase::Failed)
    }
}

/// Why a checkout action was refused or failed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Checkout is not open")]
    NotOpen,

    #[error("An order is already being submitted")]
    InFlight,

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Order submission failed: {0}")]
    Submission(#[from] GatewayError),

    #[error(transparent)]
    Core(CoreError),
}

impl From<CoreError> for CheckoutError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => CheckoutError::Validation(e),
            other => CheckoutError::Core(other),
        }
    }
}

/// Session snapshot for the checkout dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub phase: CheckoutPhase,
    pub input: CheckoutInput,
    /// User-visible message from the last refused or failed submit.
    pub last_error: Option<String>,
    /// Server order id of the last accepted order.
    pub last_order_id: Option<String>,
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug)]
struct Session {
    phase: CheckoutPhase,
    input: CheckoutInput,
    last_error: Option<String>,
    last_order_id: Option<String>,
    /// Bumped by open()/close(); a submission only writes back to the
    /// session generation it started in.
    generation: u64,
}

impl Session {
    fn view(&self) -> CheckoutView {
        CheckoutView {
            phase: self.phase,
            input: self.input.clone(),
            last_error: self.last_error.clone(),
            last_order_id: self.last_order_id.clone(),
        }
    }

    fn editable(&mut self) -> Result<&mut CheckoutInput, CheckoutError> {
        match self.phase {
            CheckoutPhase::Submitting => Err(CheckoutError::InFlight),
            phase if phase.accepts_input() => {
                self.phase = CheckoutPhase::Collecting;
                Ok(&mut self.input)
            }
            _ => Err(CheckoutError::NotOpen),
        }
    }
}

/// Ends a submission however the `submit()` future finishes.
///
/// Holds the cart lock; if the future is dropped mid-request the session
/// falls back to Collecting and the cart is released untouched.
struct InFlight {
    session: Arc<Mutex<Session>>,
    generation: u64,
    cart_lock: Option<SubmissionLock>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut session = lock_session(&self.session);
        if session.generation == self.generation && session.phase == CheckoutPhase::Submitting {
            warn!("Order submission abandoned before a response arrived");
            session.phase = CheckoutPhase::Collecting;
        }
    }
}

fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Checkout State
// =============================================================================

/// The checkout orchestrator.
///
/// Cloning yields another handle to the same session and cart.
#[derive(Clone)]
pub struct CheckoutState {
    cart: CartState,
    gateway: Arc<dyn OrderGateway>,
    session: Arc<Mutex<Session>>,
}

impl fmt::Debug for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutState")
            .field("cart", &self.cart)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl CheckoutState {
    /// Creates a closed checkout session over `cart`.
    pub fn new(cart: CartState, gateway: Arc<dyn OrderGateway>) -> Self {
        CheckoutState {
            cart,
            gateway,
            session: Arc::new(Mutex::new(Session {
                phase: CheckoutPhase::Closed,
                input: CheckoutInput::default(),
                last_error: None,
                last_order_id: None,
                generation: 0,
            })),
        }
    }

    /// The cart this checkout reads from.
    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    /// Opens the dialog with fresh inputs.
    pub fn open(&self) -> Result<CheckoutView, CheckoutError> {
        let mut session = self.lock();
        if session.phase == CheckoutPhase::Submitting || self.cart.is_locked() {
            return Err(CheckoutError::InFlight);
        }

        session.generation += 1;
        session.phase = CheckoutPhase::Collecting;
        session.input = CheckoutInput::default();
        session.last_error = None;
        session.last_order_id = None;
        debug!(generation = session.generation, "Checkout opened");
        Ok(session.view())
    }

    /// Dismisses the dialog.
    pub fn close(&self) -> CheckoutView {
        let mut session = self.lock();
        if session.phase == CheckoutPhase::Submitting {
            warn!("Checkout closed while an order is in flight");
        }
        session.generation += 1;
        session.phase = CheckoutPhase::Closed;
        session.view()
    }

    /// Current session snapshot.
    pub fn view(&self) -> CheckoutView {
        self.lock().view()
    }

    pub fn set_buyer_info(&self, buyer: BuyerInfo) -> Result<CheckoutView, CheckoutError> {
        self.edit(|input| input.buyer = buyer)
    }

    pub fn set_transaction_type(
        &self,
        transaction_type: TransactionType,
    ) -> Result<CheckoutView, CheckoutError> {
        self.edit(|input| input.transaction_type = Some(transaction_type))
    }

    /// Sets the transaction type from the resep / bebas checkbox pair.
    ///
    /// An invalid pair clears the selection, so a later submit is refused
    /// until exactly one box is ticked.
    pub fn set_transaction_flags(
        &self,
        prescription: bool,
        over_the_counter: bool,
    ) -> Result<CheckoutView, CheckoutError> {
        let parsed = TransactionType::from_flags(prescription, over_the_counter);
        let view = self.edit(|input| input.transaction_type = parsed.as_ref().ok().copied())?;
        parsed?;
        Ok(view)
    }

    pub fn set_payment_method(
        &self,
        payment_method: PaymentMethod,
    ) -> Result<CheckoutView, CheckoutError> {
        self.edit(|input| input.payment_method = Some(payment_method))
    }

    /// Validates, submits the order once, and clears the cart iff accepted.
    ///
    /// ## Errors
    /// - `NotOpen` / `InFlight`: refused, nothing sent
    /// - `Validation`: inputs incomplete or cart empty, nothing sent
    /// - `Submission`: the gateway failed; cart and inputs untouched
    pub async fn submit(&self) -> Result<OrderAck, CheckoutError> {
        let (payload, mut in_flight) = {
            let mut session = self.lock();
            match session.phase {
                CheckoutPhase::Submitting => {
                    warn!("Duplicate submit ignored while an order is in flight");
                    return Err(CheckoutError::InFlight);
                }
                phase if !phase.accepts_input() => return Err(CheckoutError::NotOpen),
                _ => {}
            }

            let checkout = match session.input.validate() {
                Ok(checkout) => checkout,
                Err(e) => {
                    warn!(reason = %e, "Checkout validation failed");
                    session.phase = CheckoutPhase::Collecting;
                    session.last_error = Some(e.to_string());
                    return Err(e.into());
                }
            };

            let Some(cart_lock) = self.cart.begin_submission() else {
                warn!("Cart already held by another submission");
                return Err(CheckoutError::InFlight);
            };

            let payload = match CheckoutPayload::build(&cart_lock.snapshot(), &checkout) {
                Ok(payload) => payload,
                Err(e) => {
                    let e = CheckoutError::from(e);
                    warn!(reason = %e, "Checkout payload not built");
                    session.phase = CheckoutPhase::Collecting;
                    session.last_error = Some(e.to_string());
                    return Err(e);
                }
            };

            session.phase = CheckoutPhase::Submitting;
            session.last_error = None;
            let in_flight = InFlight {
                session: Arc::clone(&self.session),
                generation: session.generation,
                cart_lock: Some(cart_lock),
            };
            (payload, in_flight)
        };

        info!(
            reference = %payload.reference,
            lines = payload.items.len(),
            expenditure = payload.expenditure.rupiah(),
            prescription = payload.is_prescription,
            "Submitting order"
        );

        let result = self.gateway.create_order(&payload).await;

        let mut session = self.lock();
        let current = session.generation == in_flight.generation;
        match result {
            Ok(ack) => {
                if let Some(cart_lock) = in_flight.cart_lock.take() {
                    cart_lock.clear_cart();
                }
                info!(
                    reference = %payload.reference,
                    order_id = ack.order_id.as_deref().unwrap_or("-"),
                    "Order accepted, cart cleared"
                );
                if current {
                    session.phase = CheckoutPhase::Succeeded;
                    session.input = CheckoutInput::default();
                    session.last_order_id = ack.order_id.clone();
                }
                Ok(ack)
            }
            Err(e) => {
                error!(reference = %payload.reference, error = %e, "Order submission failed");
                if current {
                    session.phase = CheckoutPhase::Failed;
                    session.last_error = Some(e.to_string());
                }
                Err(e.into())
            }
        }
    }

    fn edit<F>(&self, f: F) -> Result<CheckoutView, CheckoutError>
    where
        F: FnOnce(&mut CheckoutInput),
    {
        let mut session = self.lock();
        f(session.editable()?);
        Ok(session.view())
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        lock_session(&self.session)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use apotek_core::{Cart, Money, ProductRef};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    // -------------------------------------------------------------------------
    // Test gateways
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct RecordingGateway {
        calls: AtomicUsize,
        payloads: Mutex<Vec<CheckoutPayload>>,
        fail_first: bool,
    }

    #[async_trait]
    impl OrderGateway for RecordingGateway {
        async fn create_order(&self, payload: &CheckoutPayload) -> Result<OrderAck, GatewayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.payloads.lock().unwrap().push(payload.clone());
            if self.fail_first && call == 0 {
                return Err(GatewayError::Rejected {
                    status: 503,
                    message: "service unavailable".to_string(),
                });
            }
            Ok(OrderAck {
                order_id: Some(format!("TRX-{}", call + 1)),
            })
        }
    }

    #[derive(Default)]
    struct BlockingGateway {
        calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl OrderGateway for BlockingGateway {
        async fn create_order(&self, _payload: &CheckoutPayload) -> Result<OrderAck, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(OrderAck { order_id: None })
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn stocked_cart() -> CartState {
        let cart = CartState::default();
        cart.add_product(ProductRef::new("A", "Product A", "PA", Money::from_rupiah(10_000)))
            .unwrap();
        cart.add_product(ProductRef::new("B", "Product B", "PB", Money::from_rupiah(5_000)))
            .unwrap();
        cart.increment_amount(0).unwrap();
        cart
    }

    fn ready_checkout(gateway: Arc<dyn OrderGateway>) -> CheckoutState {
        let checkout = CheckoutState::new(stocked_cart(), gateway);
        checkout.open().unwrap();
        checkout
            .set_transaction_type(TransactionType::OverTheCounter)
            .unwrap();
        checkout.set_payment_method(PaymentMethod::Cash).unwrap();
        checkout
    }

    fn snapshot(checkout: &CheckoutState) -> Cart {
        checkout.cart().with_cart(Cart::clone)
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_submit_requires_payment_method() {
        let gateway = Arc::new(RecordingGateway::default());
        let checkout = CheckoutState::new(stocked_cart(), gateway.clone());
        checkout.open().unwrap();
        checkout
            .set_transaction_type(TransactionType::Prescription)
            .unwrap();

        let err = checkout.submit().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::Required { .. })));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(checkout.view().phase, CheckoutPhase::Collecting);
        assert!(checkout.view().last_error.is_some());
    }

    #[tokio::test]
    async fn test_submit_requires_transaction_type() {
        let gateway = Arc::new(RecordingGateway::default());
        let checkout = CheckoutState::new(stocked_cart(), gateway.clone());
        checkout.open().unwrap();
        checkout.set_payment_method(PaymentMethod::Debit).unwrap();

        assert!(checkout.submit().await.is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_both_transaction_flags_rejected() {
        let gateway = Arc::new(RecordingGateway::default());
        let checkout = ready_checkout(gateway.clone());

        let err = checkout.set_transaction_flags(true, true).unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::Conflicting { .. })));
        assert_eq!(checkout.view().input.transaction_type, None);

        assert!(checkout.submit().await.is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(snapshot(&checkout).len(), 2);
    }

    #[tokio::test]
    async fn test_flags_select_transaction_type() {
        let checkout = ready_checkout(Arc::new(RecordingGateway::default()));
        let view = checkout.set_transaction_flags(true, false).unwrap();
        assert_eq!(view.input.transaction_type, Some(TransactionType::Prescription));
    }

    #[tokio::test]
    async fn test_empty_cart_not_submitted() {
        let gateway = Arc::new(RecordingGateway::default());
        let checkout = CheckoutState::new(CartState::default(), gateway.clone());
        checkout.open().unwrap();
        checkout.set_transaction_type(TransactionType::Prescription).unwrap();
        checkout.set_payment_method(PaymentMethod::Cash).unwrap();

        let err = checkout.submit().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert!(!checkout.cart().is_locked());
    }

    #[tokio::test]
    async fn test_submit_requires_open_session() {
        let checkout = CheckoutState::new(stocked_cart(), Arc::new(RecordingGateway::default()));
        assert!(matches!(checkout.submit().await, Err(CheckoutError::NotOpen)));
        assert!(matches!(
            checkout.set_payment_method(PaymentMethod::Cash),
            Err(CheckoutError::NotOpen)
        ));
    }

    // -------------------------------------------------------------------------
    // Submission outcomes
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_success_clears_cart_once() {
        let gateway = Arc::new(RecordingGateway::default());
        let checkout = ready_checkout(gateway.clone());
        let totals = checkout.cart().with_cart(|c| c.totals());

        let ack = checkout.submit().await.unwrap();
        assert_eq!(ack.order_id.as_deref(), Some("TRX-1"));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert!(snapshot(&checkout).is_empty());
        assert!(!checkout.cart().is_locked());

        let view = checkout.view();
        assert_eq!(view.phase, CheckoutPhase::Succeeded);
        assert_eq!(view.last_order_id.as_deref(), Some("TRX-1"));

        let sent = gateway.payloads.lock().unwrap();
        assert_eq!(sent[0].expenditure, totals.grand_total);
        assert_eq!(sent[0].tax_amount, totals.tax);
        assert!(!sent[0].is_prescription);
        assert_eq!(sent[0].items.len(), 2);

        // A finished session accepts no further submits
        drop(sent);
        assert!(matches!(checkout.submit().await, Err(CheckoutError::NotOpen)));
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_cart_and_inputs() {
        let gateway = Arc::new(RecordingGateway {
            fail_first: true,
            ..RecordingGateway::default()
        });
        let checkout = ready_checkout(gateway.clone());
        let before = snapshot(&checkout);

        let err = checkout.submit().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Submission(_)));
        assert_eq!(snapshot(&checkout), before);
        assert!(!checkout.cart().is_locked());

        let view = checkout.view();
        assert_eq!(view.phase, CheckoutPhase::Failed);
        assert_eq!(view.input.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(view.input.transaction_type, Some(TransactionType::OverTheCounter));
        assert!(view.last_error.unwrap().contains("service unavailable"));

        // Retry without re-entering anything
        checkout.submit().await.unwrap();
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
        assert!(snapshot(&checkout).is_empty());
    }

    #[tokio::test]
    async fn test_cart_edits_allowed_after_failure() {
        let gateway = Arc::new(RecordingGateway {
            fail_first: true,
            ..RecordingGateway::default()
        });
        let checkout = ready_checkout(gateway);
        assert!(checkout.submit().await.is_err());

        checkout.cart().remove_item(1).unwrap();
        assert_eq!(snapshot(&checkout).len(), 1);
    }

    // -------------------------------------------------------------------------
    // In-flight exclusivity
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_refused_retry_returns_to_collecting() {
        let gateway = Arc::new(RecordingGateway {
            fail_first: true,
            ..RecordingGateway::default()
        });
        let checkout = ready_checkout(gateway.clone());
        assert!(checkout.submit().await.is_err());
        assert_eq!(checkout.view().phase, CheckoutPhase::Failed);

        // Emptying the cart after the failure makes the retry a refusal
        checkout.cart().remove_item(1).unwrap();
        checkout.cart().remove_item(0).unwrap();
        let err = checkout.submit().await.unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ValidationError::EmptyCart)));
        assert_eq!(checkout.view().phase, CheckoutPhase::Collecting);

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_double_submit_sends_one_request() {
        let gateway = Arc::new(BlockingGateway::default());
        let checkout = ready_checkout(gateway.clone());

        let first = {
            let checkout = checkout.clone();
            tokio::spawn(async move { checkout.submit().await })
        };
        gateway.entered.notified().await;

        assert_eq!(checkout.view().phase, CheckoutPhase::Submitting);
        assert!(matches!(checkout.submit().await, Err(CheckoutError::InFlight)));
        assert!(matches!(
            checkout.set_payment_method(PaymentMethod::Debit),
            Err(CheckoutError::InFlight)
        ));
        assert!(matches!(checkout.open(), Err(CheckoutError::InFlight)));
        assert!(checkout.cart().increment_amount(0).is_err());

        gateway.release.notify_one();
        first.await.unwrap().unwrap();

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert!(snapshot(&checkout).is_empty());
    }

    #[tokio::test]
    async fn test_dropped_submit_releases_cart() {
        let gateway = Arc::new(BlockingGateway::default());
        let checkout = ready_checkout(gateway.clone());
        let before = snapshot(&checkout);

        let outcome = tokio::time::timeout(Duration::from_millis(20), checkout.submit()).await;
        assert!(outcome.is_err());

        assert!(!checkout.cart().is_locked());
        assert_eq!(snapshot(&checkout), before);
        assert_eq!(checkout.view().phase, CheckoutPhase::Collecting);
        assert_eq!(checkout.view().input.payment_method, Some(PaymentMethod::Cash));
    }

    #[tokio::test]
    async fn test_close_while_in_flight_detaches_session() {
        let gateway = Arc::new(BlockingGateway::default());
        let checkout = ready_checkout(gateway.clone());

        let pending = {
            let checkout = checkout.clone();
            tokio::spawn(async move { checkout.submit().await })
        };
        gateway.entered.notified().await;

        assert_eq!(checkout.close().phase, CheckoutPhase::Closed);

        gateway.release.notify_one();
        pending.await.unwrap().unwrap();

        // Accepted order still empties the cart; the closed session stays closed
        assert!(snapshot(&checkout).is_empty());
        assert_eq!(checkout.view().phase, CheckoutPhase::Closed);
        assert!(checkout.open().is_ok());
    }

    #[tokio::test]
    async fn test_open_resets_inputs() {
        let checkout = ready_checkout(Arc::new(RecordingGateway::default()));
        checkout
            .set_buyer_info(BuyerInfo {
                name: Some("Ani".to_string()),
                phone: None,
            })
            .unwrap();

        let view = checkout.open().unwrap();
        assert_eq!(view.phase, CheckoutPhase::Collecting);
        assert_eq!(view.input, CheckoutInput::default());
    }
}
