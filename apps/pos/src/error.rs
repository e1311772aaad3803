//! # API Error Type
//!
//! Unified error type for POS commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Apotek POS                             │
//! │                                                                         │
//! │  Command Function  Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── CartLocked ──────────────► CART_LOCKED                      │
//! │         ├── CoreError::LineOutOfRange ► CART_ERROR                      │
//! │         ├── ValidationError ─────────► VALIDATION_ERROR                 │
//! │         ├── CheckoutError::InFlight ─► CHECKOUT_IN_FLIGHT               │
//! │         ├── CheckoutError::Submission► SUBMISSION_FAILED (retryable)    │
//! │         └── Success ─────────────────────────────────────────────────►  │
//! │                                                                         │
//! │  Frontend reads e.code to branch and e.message to display.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use apotek_core::{CoreError, ValidationError};
use serde::Serialize;

use crate::checkout::CheckoutError;
use crate::state::{CartLocked, CartUpdateError, ConfigError};

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SUBMISSION_FAILED",
///   "message": "Order submission failed: order rejected (503): busy",
///   "retryable": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Whether repeating the same action may succeed
    pub retryable: bool,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Checkout inputs incomplete or invalid
    ValidationError,

    /// Cart operation failed (stale index, overflow)
    CartError,

    /// Cart frozen by an in-flight submission
    CartLocked,

    /// Checkout dialog not open
    CheckoutClosed,

    /// A submission is already running
    CheckoutInFlight,

    /// The order endpoint failed or rejected the order
    SubmissionFailed,

    /// Bad configuration
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new non-retryable API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }

    /// Marks the error as retryable.
    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineOutOfRange { .. }
            | CoreError::QuantityOverflow { .. }
            | CoreError::AmountOverflow
            | CoreError::NegativePrice { .. } => ApiError::cart(err.to_string()),
            CoreError::TotalsMismatch { .. } => {
                tracing::error!("{}", err);
                ApiError::internal("Cart totals are inconsistent")
            }
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<CartLocked> for ApiError {
    fn from(err: CartLocked) -> Self {
        ApiError::new(ErrorCode::CartLocked, err.to_string()).retryable()
    }
}

impl From<CartUpdateError> for ApiError {
    fn from(err: CartUpdateError) -> Self {
        match err {
            CartUpdateError::Locked(e) => e.into(),
            CartUpdateError::Core(e) => e.into(),
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::NotOpen => ApiError::new(ErrorCode::CheckoutClosed, err.to_string()),
            CheckoutError::InFlight => ApiError::new(ErrorCode::CheckoutInFlight, err.to_string()),
            CheckoutError::Validation(e) => e.into(),
            CheckoutError::Submission(_) => {
                ApiError::new(ErrorCode::SubmissionFailed, err.to_string()).retryable()
            }
            CheckoutError::Core(e) => e.into(),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
