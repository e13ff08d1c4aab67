//! # Currency
//!
//! The short allow-list of currencies the service will create intents in.

use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported currencies (ISO 4217)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    CAD,
}

impl Currency {
    /// Every accepted currency, in allow-list order
    pub const ALL: [Currency; 4] = [Currency::USD, Currency::EUR, Currency::GBP, Currency::CAD];

    /// Returns the lowercase ISO 4217 code Stripe expects
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::USD => "usd",
            Currency::EUR => "eur",
            Currency::GBP => "gbp",
            Currency::CAD => "cad",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    /// Case-insensitive match against the allow-list
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| PaymentError::UnsupportedCurrency {
                currency: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::USD);
        assert_eq!("EUR".parse::<Currency>().unwrap(), Currency::EUR);
        assert_eq!(" Gbp ".parse::<Currency>().unwrap(), Currency::GBP);
        assert_eq!("cAd".parse::<Currency>().unwrap(), Currency::CAD);
    }

    #[test]
    fn test_rejects_unlisted_codes() {
        for code in ["jpy", "us", "", "dollars"] {
            let err = code.parse::<Currency>().unwrap_err();
            assert!(matches!(err, PaymentError::UnsupportedCurrency { .. }));
        }
    }

    #[test]
    fn test_display_is_lowercase_code() {
        assert_eq!(Currency::GBP.to_string(), "gbp");
        assert_eq!(serde_json::to_string(&Currency::CAD).unwrap(), "\"cad\"");
    }
}
