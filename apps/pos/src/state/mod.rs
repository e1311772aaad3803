//! # State Module
//!
//! Separate state types instead of a single `AppState`: each command names
//! exactly the state it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐           │
//! │  │  CartState   │  │  CheckoutState   │  │   ConfigState    │           │
//! │  │              │  │  (checkout/)     │  │                  │           │
//! │  │  Arc<Mutex<  │  │  session phase   │  │  tax rate        │           │
//! │  │    Cart      │  │  form inputs     │  │  currency format │           │
//! │  │  >> + lock   │  │  gateway         │  │  order API URL   │           │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘           │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartState: Arc<Mutex<T>> plus a submission flag                      │
//! │  • CheckoutState: Arc<Mutex<Session>>, lock never held across .await    │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;

pub use cart::{CartLocked, CartState, CartUpdateError, SubmissionLock};
pub use config::{ConfigError, ConfigState};
