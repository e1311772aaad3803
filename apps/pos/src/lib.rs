//! # Apotek POS Library
//!
//! Application layer of the pharmacy dashboard: the shared cart, the
//! checkout session and the order gateway, exposed as plain command
//! functions for the UI shell.
//!
//! ## Module Organization
//! ```text
//! apotek_pos/
//! ├── lib.rs          ◄─── You are here (bootstrap & tracing)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── Shared cart handle + submission freeze
//! │   └── config.rs   ◄─── Configuration state
//! ├── checkout/
//! │   ├── mod.rs      ◄─── Checkout session state machine
//! │   └── gateway.rs  ◄─── Order-creation endpoint client
//! ├── commands/
//! │   ├── cart.rs     ◄─── Cart manipulation commands
//! │   ├── checkout.rs ◄─── Checkout dialog commands
//! │   └── config.rs   ◄─── Configuration retrieval
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## Startup
//! ```rust,no_run
//! # async fn demo() -> Result<(), apotek_pos::error::ApiError> {
//! use apotek_pos::{commands, init_tracing, App};
//!
//! init_tracing();
//! let app = App::from_env()?;
//! let cart = commands::cart::get_cart(&app.cart, &app.config);
//! assert!(cart.items.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod checkout;
pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use checkout::{CheckoutState, HttpGatewayConfig, HttpOrderGateway, OrderGateway};
use error::ApiError;
use state::{CartState, ConfigState};

/// The state objects one dashboard session needs.
///
/// `checkout` holds a clone of `cart`; both address the same line items.
#[derive(Debug, Clone)]
pub struct App {
    pub config: ConfigState,
    pub cart: CartState,
    pub checkout: CheckoutState,
}

impl App {
    /// Builds the app from `APOTEK_*` environment variables with the HTTP
    /// order gateway.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  1. Load ConfigState (env overrides defaults)                       │
    /// │  2. Build the HTTP gateway (base URL, token, timeout)               │
    /// │  3. Create the empty cart at the configured PPN rate                │
    /// │  4. Attach a closed checkout session to that cart                   │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    pub fn from_env() -> Result<Self, ApiError> {
        let config = ConfigState::from_env()?;
        let gateway = HttpOrderGateway::new(HttpGatewayConfig::from(&config))
            .map_err(|e| ApiError::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(App::with_gateway(config, Arc::new(gateway)))
    }

    /// Builds the app around any order gateway.
    pub fn with_gateway(config: ConfigState, gateway: Arc<dyn OrderGateway>) -> Self {
        let cart = CartState::new(config.tax_rate());
        let checkout = CheckoutState::new(cart.clone(), gateway);

        info!(
            store = %config.store_name,
            tax_rate_bps = config.tax_rate_bps,
            order_api = %config.order_api_url,
            "Apotek POS state initialized"
        );

        App {
            config,
            cart,
            checkout,
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=apotek_pos=trace` - Trace for this crate only
/// - Default: `info,apotek=debug`
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,apotek=debug"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
