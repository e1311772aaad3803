//! # Cart State
//!
//! The shared handle every screen uses to reach the one cart.
//!
//! ## Ownership
//! Screens that can pick a product and the checkout dialog all hold a clone
//! of the same `CartState`; clones share the underlying cart, they never copy
//! it. Line items change only through the four edit methods (add, increment,
//! decrement, remove). Emptying the cart takes a [`SubmissionLock`].
//!
//! ## Submission Lock
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart During Checkout                                 │
//! │                                                                         │
//! │  begin_submission() ──► SubmissionLock ──┬── clear_cart()  (success)    │
//! │        │                                 └── drop          (failure)    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  while held: add / increment / decrement / remove ──► Err(Locked)       │
//! │              begin_submission() ──► None                                │
//! │              with_cart() ──► still fine (read only)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use apotek_core::{Cart, CartLineItem, CoreError, ProductRef, TaxRate};
use thiserror::Error;

/// Returned when a mutation is attempted while an order is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cart is locked while an order is being submitted")]
pub struct CartLocked;

/// Why a cart edit was refused.
#[derive(Debug, Error)]
pub enum CartUpdateError {
    #[error(transparent)]
    Locked(#[from] CartLocked),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Shared cart handle.
///
/// `Arc<Mutex<Cart>>` because several command handlers reach the same cart;
/// the atomic flag freezes it for the duration of a submission.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
    submitting: Arc<AtomicBool>,
}

impl CartState {
    /// Creates a handle to a new empty cart.
    pub fn new(tax_rate: TaxRate) -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new(tax_rate))),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use apotek_core::TaxRate;
    /// use apotek_pos::state::CartState;
    ///
    /// let cart = CartState::new(TaxRate::ppn());
    /// let totals = cart.with_cart(|c| c.totals());
    /// assert!(totals.grand_total.is_zero());
    /// ```
    ///
    /// Read access cannot empty the cart:
    /// ```compile_fail
    /// use apotek_pos::state::CartState;
    ///
    /// let cart = CartState::default();
    /// cart.with_cart(|c| c.clear());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Adds a picked product, merging with its existing line.
    ///
    /// ## Returns
    /// Index of the line holding the product.
    pub fn add_product(&self, product: ProductRef) -> Result<usize, CartUpdateError> {
        Ok(self.edit(|c| c.add_product(product))??)
    }

    /// Increases line `index` by one; returns the new amount.
    pub fn increment_amount(&self, index: usize) -> Result<u32, CartUpdateError> {
        Ok(self.edit(|c| c.increment_amount(index))??)
    }

    /// Decreases line `index` by one, never below 1; returns the new amount.
    pub fn decrement_amount(&self, index: usize) -> Result<u32, CartUpdateError> {
        Ok(self.edit(|c| c.decrement_amount(index))??)
    }

    /// Removes line `index`; returns the removed line.
    pub fn remove_item(&self, index: usize) -> Result<CartLineItem, CartUpdateError> {
        Ok(self.edit(|c| c.remove_item(index))??)
    }

    /// Runs an edit unless a submission holds the cart.
    fn edit<F, R>(&self, f: F) -> Result<R, CartLocked>
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.lock();
        // Checked under the mutex so a lock taken after this point cannot
        // interleave with the mutation.
        if self.submitting.load(Ordering::Acquire) {
            return Err(CartLocked);
        }
        Ok(f(&mut cart))
    }

    /// Whether a submission currently holds the cart.
    pub fn is_locked(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Freezes the cart for a submission.
    ///
    /// Returns `None` if another submission already holds it.
    pub fn begin_submission(&self) -> Option<SubmissionLock> {
        let _cart = self.lock();
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmissionLock {
                state: self.clone(),
            })
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CartState {
    fn default() -> Self {
        CartState::new(TaxRate::ppn())
    }
}

/// Exclusive hold on the cart for one submission.
///
/// Dropping it releases the cart unchanged; [`SubmissionLock::clear_cart`] is
/// the only way to empty it.
#[derive(Debug)]
pub struct SubmissionLock {
    state: CartState,
}

impl SubmissionLock {
    /// Copy of the cart as it is frozen.
    pub fn snapshot(&self) -> Cart {
        self.state.with_cart(Cart::clone)
    }

    /// Empties the cart, then releases it.
    pub fn clear_cart(self) {
        self.state.lock().clear();
    }
}

impl Drop for SubmissionLock {
    fn drop(&mut self) {
        self.state.submitting.store(false, Ordering::Release);
    }
}
