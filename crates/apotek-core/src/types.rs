//! # Domain Types
//!
//! Core domain types used throughout Apotek POS.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ProductRef    │   │ TransactionType │   │  PaymentMethod  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  Prescription   │   │  Cash           │       │
//! │  │  name           │   │  (resep)        │   │  Debit          │       │
//! │  │  code           │   │  OverTheCounter │   │                 │       │
//! │  │  price          │   │  (bebas)        │   │  no default     │       │
//! │  │  unit           │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │   BuyerInfo     │                             │
//! │  │  bps (u32)      │   │  name?  phone?  │                             │
//! │  │  1000 = 10%     │   └─────────────────┘                             │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_buyer_name, validate_phone, ValidationResult};
use crate::PPN_RATE_BPS;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so 1000 bps = 10% PPN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for configuration input).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// The PPN rate applied to every cart.
    #[inline]
    pub const fn ppn() -> Self {
        TaxRate(PPN_RATE_BPS)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::ppn()
    }
}

// =============================================================================
// Product Reference
// =============================================================================

/// Snapshot of a catalog product taken when it was picked into the cart.
///
/// Later catalog price changes never reach a line already in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    /// Catalog product id.
    pub id: String,

    /// Display name at pick time (frozen).
    pub name: String,

    /// Product code at pick time (frozen).
    pub code: String,

    /// Unit price at pick time (frozen).
    pub price: Money,

    /// Selling unit ("strip", "botol", ...), display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ProductRef {
    /// Creates a product reference without a unit label.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        code: impl Into<String>,
        price: Money,
    ) -> Self {
        ProductRef {
            id: id.into(),
            name: name.into(),
            code: code.into(),
            price,
            unit: None,
        }
    }

    /// Sets the selling unit label.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

// =============================================================================
// Transaction Type
// =============================================================================

/// Whether the sale is against a prescription (resep) or over the counter (bebas).
///
/// One value, two variants: "both" and "neither" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Resep: the sale requires a prescription.
    Prescription,
    /// Bebas: no prescription required.
    OverTheCounter,
}

impl TransactionType {
    /// Converts the dashboard's pair of checkboxes into a transaction type.
    ///
    /// ## Rules
    /// - exactly one flag set → that type
    /// - both set → `Conflicting`
    /// - neither set → `Required`
    ///
    /// ## Example
    /// ```rust
    /// use apotek_core::types::TransactionType;
    ///
    /// assert_eq!(
    ///     TransactionType::from_flags(true, false).unwrap(),
    ///     TransactionType::Prescription
    /// );
    /// assert!(TransactionType::from_flags(true, true).is_err());
    /// assert!(TransactionType::from_flags(false, false).is_err());
    /// ```
    pub fn from_flags(prescription: bool, over_the_counter: bool) -> ValidationResult<Self> {
        match (prescription, over_the_counter) {
            (true, false) => Ok(TransactionType::Prescription),
            (false, true) => Ok(TransactionType::OverTheCounter),
            (true, true) => Err(ValidationError::Conflicting {
                first: "prescription".to_string(),
                second: "over-the-counter".to_string(),
            }),
            (false, false) => Err(ValidationError::Required {
                field: "transaction type".to_string(),
            }),
        }
    }

    /// True for resep sales.
    #[inline]
    pub const fn is_prescription(&self) -> bool {
        matches!(self, TransactionType::Prescription)
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the buyer pays. Must be chosen explicitly; there is no default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Debit card on the counter terminal.
    Debit,
}

// =============================================================================
// Buyer Info
// =============================================================================

/// Optional buyer details collected in the checkout dialog.
///
/// Walk-in sales leave both fields empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BuyerInfo {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl BuyerInfo {
    /// Trims both fields and turns blank strings into `None`.
    pub fn normalized(&self) -> BuyerInfo {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        BuyerInfo {
            name: clean(&self.name),
            phone: clean(&self.phone),
        }
    }

    /// Validates whichever fields are present.
    pub fn validate(&self) -> ValidationResult<()> {
        if let Some(name) = &self.name {
            validate_buyer_name(name)?;
        }
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_defaults_to_ppn() {
        let rate = TaxRate::default();
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(11.0).bps(), 1100);
        assert_eq!(TaxRate::from_percentage(8.25).bps(), 825);
    }

    #[test]
    fn test_transaction_type_from_flags() {
        assert_eq!(
            TransactionType::from_flags(false, true).unwrap(),
            TransactionType::OverTheCounter
        );
        assert!(matches!(
            TransactionType::from_flags(true, true),
            Err(ValidationError::Conflicting { .. })
        ));
        assert!(matches!(
            TransactionType::from_flags(false, false),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_transaction_type_serializes_snake_case() {
        let json = serde_json::to_string(&TransactionType::OverTheCounter).unwrap();
        assert_eq!(json, "\"over_the_counter\"");
        let json = serde_json::to_string(&PaymentMethod::Debit).unwrap();
        assert_eq!(json, "\"debit\"");
    }

    #[test]
    fn test_buyer_info_normalized() {
        let buyer = BuyerInfo {
            name: Some("  Siti  ".to_string()),
            phone: Some("   ".to_string()),
        };
        let normalized = buyer.normalized();
        assert_eq!(normalized.name.as_deref(), Some("Siti"));
        assert_eq!(normalized.phone, None);
    }

    #[test]
    fn test_buyer_info_validate() {
        assert!(BuyerInfo::default().validate().is_ok());

        let ok = BuyerInfo {
            name: Some("Budi".to_string()),
            phone: Some("081234567890".to_string()),
        };
        assert!(ok.validate().is_ok());

        let too_long = BuyerInfo {
            name: None,
            phone: Some("0812345678901234567".to_string()),
        };
        assert!(matches!(
            too_long.validate(),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_product_ref_with_unit() {
        let product = ProductRef::new("p-1", "Amoxicillin 500mg", "AMX-500", Money::from_rupiah(12_000))
            .with_unit("strip");
        assert_eq!(product.unit.as_deref(), Some("strip"));
    }
}
