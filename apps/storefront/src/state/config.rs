//! # Configuration State
//!
//! Storefront settings loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`READNEST_*`)
//! 2. Defaults (this file)
//!
//! Endpoint settings (BaaS URL, catalog URL, keys) live in
//! `readnest_remote::RemoteConfig`, which also reads the TOML file.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no lock is needed.

use readnest_core::recommend::DEFAULT_RECOMMENDATION_LIMIT;
use readnest_core::types::TaxRate;
use readnest_core::validation::validate_price_cents;
use readnest_core::{Money, DEFAULT_SHIPPING_CENTS, DEFAULT_TAX_RATE_BPS};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Storefront configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Store name (page headers)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places for currency
    pub currency_decimals: u8,

    /// Sales tax in basis points, applied to the cart subtotal
    /// e.g., 800 = 8%
    pub tax_rate_bps: u32,

    /// Flat shipping fee in cents, charged on non-empty carts
    pub shipping_cents: i64,

    /// How many personalized picks the recommendations page shows
    pub recommendation_limit: usize,

    /// How many "Readers also liked" books the book and cart pages show
    pub similar_books_k: usize,

    /// Catalog results fetched per category on the browse page
    pub browse_per_category: u32,

    /// Catalog results fetched for a browse search
    pub search_results: u32,
}

impl Default for ConfigState {
    /// ## Default Values
    /// - Store: "ReadNest"
    /// - Currency: USD ($)
    /// - Tax: 8%, shipping $4.99
    /// - 8 recommendations, 3 similar books
    /// - 12 books per category, 20 search results
    fn default() -> Self {
        ConfigState {
            store_name: "ReadNest".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
            shipping_cents: DEFAULT_SHIPPING_CENTS,
            recommendation_limit: DEFAULT_RECOMMENDATION_LIMIT,
            similar_books_k: 3,
            browse_per_category: 12,
            search_results: 20,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `READNEST_STORE_NAME`: Override store name
    /// - `READNEST_TAX_RATE`: Override tax rate in percent (e.g., "8.25")
    /// - `READNEST_SHIPPING_CENTS`: Override the shipping fee
    /// - `READNEST_RECOMMENDATION_LIMIT`: Override the number of picks
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Ok(store_name) = std::env::var("READNEST_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(tax_rate_str) = std::env::var("READNEST_TAX_RATE") {
            match tax_rate_str.parse::<f64>() {
                Ok(rate) if rate >= 0.0 => config.tax_rate_bps = TaxRate::from_percentage(rate).bps(),
                _ => warn!(value = %tax_rate_str, "Ignoring invalid READNEST_TAX_RATE"),
            }
        }

        if let Ok(shipping) = std::env::var("READNEST_SHIPPING_CENTS") {
            match parse_shipping_cents(&shipping) {
                Some(cents) => config.shipping_cents = cents,
                None => warn!(value = %shipping, "Ignoring invalid READNEST_SHIPPING_CENTS"),
            }
        }

        if let Ok(limit) = std::env::var("READNEST_RECOMMENDATION_LIMIT") {
            match limit.parse::<usize>() {
                Ok(n) if n > 0 => config.recommendation_limit = n,
                _ => warn!(value = %limit, "Ignoring invalid READNEST_RECOMMENDATION_LIMIT"),
            }
        }

        config
    }

    /// The configured tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// The configured shipping fee.
    pub fn shipping_fee(&self) -> Money {
        Money::from_cents(self.shipping_cents)
    }

    /// Formats a cent amount as a currency string.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(1234), "$12.34");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let divisor = 10_i64.pow(self.currency_decimals as u32);
        let whole = cents / divisor;
        let frac = (cents % divisor).abs();

        format!(
            "{}{}{}",
            if cents < 0 { "-" } else { "" },
            self.currency_symbol,
            if self.currency_decimals > 0 {
                format!(
                    "{}.{:0width$}",
                    whole.abs(),
                    frac,
                    width = self.currency_decimals as usize
                )
            } else {
                whole.abs().to_string()
            }
        )
    }

    /// Formats a Money amount.
    pub fn format_money(&self, amount: Money) -> String {
        self.format_currency(amount.cents())
    }
}

fn parse_shipping_cents(value: &str) -> Option<i64> {
    let cents = value.trim().parse::<i64>().ok()?;
    validate_price_cents("shipping", cents).ok()?;
    Some(cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigState::default();
        assert_eq!(config.tax_rate_bps, 800);
        assert_eq!(config.shipping_cents, 499);
        assert_eq!(config.recommendation_limit, 8);
        assert_eq!(config.similar_books_k, 3);
        assert_eq!(config.browse_per_category, 12);
        assert_eq!(config.search_results, 20);
    }

    #[test]
    fn test_format_currency_positive() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(1234), "$12.34");
        assert_eq!(config.format_currency(100), "$1.00");
        assert_eq!(config.format_currency(1), "$0.01");
        assert_eq!(config.format_currency(0), "$0.00");
    }

    #[test]
    fn test_format_currency_negative() {
        let config = ConfigState::default();
        assert_eq!(config.format_currency(-1234), "-$12.34");
    }

    #[test]
    fn test_format_money() {
        let config = ConfigState::default();
        assert_eq!(config.format_money(config.shipping_fee()), "$4.99");
    }

    #[test]
    fn test_parse_shipping_cents() {
        assert_eq!(parse_shipping_cents("0"), Some(0));
        assert_eq!(parse_shipping_cents(" 350 "), Some(350));
        assert_eq!(parse_shipping_cents("-1"), None);
        assert_eq!(parse_shipping_cents("4.99"), None);
    }
}
