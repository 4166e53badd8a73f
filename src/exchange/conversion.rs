//! Conversion arithmetic and the response payload it produces.

use serde::Serialize;

use crate::core::rates::RateSnapshot;

/// Rate from the snapshot's base to `target`; `0.0` when the target is not
/// quoted, which callers report as a zero amount rather than an error.
pub fn effective_rate(snapshot: &RateSnapshot, target: &str) -> f64 {
    snapshot.rate(target).unwrap_or(0.0)
}

/// Converted amount as returned by the conversion endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionInfo {
    pub currency_symbol: String,
    /// Symbol followed by the amount rounded to two decimals.
    pub price_tag: String,
    /// Unrounded converted amount.
    pub amount: f64,
    pub currency_code: String,
    pub currency_name: String,
}

/// Two-decimal rendering with ties rounded away from zero (`0.125` is
/// `0.13`). `{:.2}` alone rounds exact binary ties to even.
fn two_decimals(value: f64) -> String {
    let cents = (value * 100.0).round() / 100.0;
    format!("{cents:.2}")
}

impl ConversionInfo {
    pub fn new(symbol: &str, code: &str, name: &str, rate: f64, amount: f64) -> Self {
        let total = rate * amount;
        Self {
            currency_symbol: symbol.to_string(),
            price_tag: format!("{symbol}{}", two_decimals(total)),
            amount: total,
            currency_code: code.to_string(),
            currency_name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_price_tag_is_rounded_but_amount_is_not() {
        let info = ConversionInfo::new("€", "EUR", "Euro", 0.9234, 10.0);
        assert_eq!(info.price_tag, "€9.23");
        assert!((info.amount - 9.234).abs() < 1e-9);
    }

    #[test]
    fn test_price_tag_rounds_ties_up() {
        assert_eq!(ConversionInfo::new("$", "USD", "Dollar", 1.0, 0.125).price_tag, "$0.13");
        assert_eq!(ConversionInfo::new("$", "USD", "Dollar", 1.0, 10.125).price_tag, "$10.13");
        assert_eq!(ConversionInfo::new("$", "USD", "Dollar", 1.0, 2.5).price_tag, "$2.50");
        assert_eq!(ConversionInfo::new("$", "USD", "Dollar", 1.0, -0.125).price_tag, "$-0.13");
    }

    #[test]
    fn test_missing_target_rate_is_zero() {
        let snapshot = RateSnapshot::new("USD", HashMap::from([("EUR".to_string(), 0.9)]), None);
        assert_eq!(effective_rate(&snapshot, "EUR"), 0.9);
        assert_eq!(effective_rate(&snapshot, "NGN"), 0.0);

        let info = ConversionInfo::new("₦", "NGN", "Nigerian Naira", 0.0, 250.0);
        assert_eq!(info.amount, 0.0);
        assert_eq!(info.price_tag, "₦0.00");
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(ConversionInfo::new("$", "USD", "Dollar", 2.0, 1.5)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currencySymbol": "$",
                "priceTag": "$3.00",
                "amount": 3.0,
                "currencyCode": "USD",
                "currencyName": "Dollar"
            })
        );
    }
}
