//! # Validation Module
//!
//! Field validators for checkout input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Dashboard form                                               │
//! │  ├── maxlength on the phone input                                      │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CheckoutInput::validate (checkout.rs)                        │
//! │  ├── payment method chosen, transaction type chosen                    │
//! │  └── THIS MODULE: per-field rules                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Order endpoint                                               │
//! │  └── Server-side schema checks                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_BUYER_NAME_LENGTH, MAX_PHONE_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a buyer phone number.
///
/// ## Rules
/// - At most `MAX_PHONE_LENGTH` (15) characters
/// - Digits only, with an optional leading `+`
///
/// ## Example
/// ```rust
/// use apotek_core::validation::validate_phone;
///
/// assert!(validate_phone("081234567890").is_ok());
/// assert!(validate_phone("+6281234567890").is_ok());
/// assert!(validate_phone("0812-ABC").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.chars().count() > MAX_PHONE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: MAX_PHONE_LENGTH,
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, optionally prefixed with +".to_string(),
        });
    }

    Ok(())
}

/// Validates a buyer name.
///
/// ## Rules
/// - At most `MAX_BUYER_NAME_LENGTH` (100) characters
pub fn validate_buyer_name(name: &str) -> ValidationResult<()> {
    if name.trim().chars().count() > MAX_BUYER_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_BUYER_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
