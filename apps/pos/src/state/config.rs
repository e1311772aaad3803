//! # Configuration State
//!
//! Application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`APOTEK_*`)
//! 2. Defaults (this file)
//!
//! ## Thread Safety
//! Read-only after initialization, so no mutex needed.

use std::time::Duration;

use apotek_core::{CurrencyFormat, Money, TaxRate, PPN_RATE_BPS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Pharmacy name shown in the dashboard header.
    pub store_name: String,

    /// PPN rate in basis points (1000 = 10%).
    pub tax_rate_bps: u32,

    /// Display formatting for amounts.
    pub currency: CurrencyFormat,

    /// Base URL of the order-creation API.
    pub order_api_url: String,

    /// Bearer token for the order API.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,

    /// Request timeout for order submission, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ConfigState {
    /// Development defaults: PPN 10%, IDR display, local API.
    fn default() -> Self {
        ConfigState {
            store_name: "Apotek Dev Store".to_string(),
            tax_rate_bps: PPN_RATE_BPS,
            currency: CurrencyFormat::idr(),
            order_api_url: "http://localhost:8000/api".to_string(),
            api_token: None,
            request_timeout_secs: 30,
        }
    }
}

impl ConfigState {
    /// Loads configuration from the process environment.
    ///
    /// ## Environment Variables
    /// - `APOTEK_STORE_NAME`: store name
    /// - `APOTEK_TAX_RATE`: PPN percent (e.g. "11")
    /// - `APOTEK_ORDER_API_URL`: order API base URL
    /// - `APOTEK_API_TOKEN`: bearer token
    /// - `APOTEK_REQUEST_TIMEOUT_SECS`: submission timeout
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ConfigState::default();

        if let Some(store_name) = lookup("APOTEK_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(rate) = lookup("APOTEK_TAX_RATE") {
            let pct: f64 = rate
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("APOTEK_TAX_RATE".to_string()))?;
            if !(0.0..=100.0).contains(&pct) {
                return Err(ConfigError::InvalidValue("APOTEK_TAX_RATE".to_string()));
            }
            config.tax_rate_bps = TaxRate::from_percentage(pct).bps();
        }

        if let Some(url) = lookup("APOTEK_ORDER_API_URL") {
            config.order_api_url = url.trim_end_matches('/').to_string();
        }

        config.api_token = lookup("APOTEK_API_TOKEN").filter(|t| !t.is_empty());

        if let Some(secs) = lookup("APOTEK_REQUEST_TIMEOUT_SECS") {
            config.request_timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::InvalidValue("APOTEK_REQUEST_TIMEOUT_SECS".to_string())
            })?;
        }

        Ok(config)
    }

    /// PPN rate applied to new carts.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Order submission timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Formats an amount for display.
    pub fn format_currency(&self, amount: Money) -> String {
        self.currency.format(amount)
    }
}
