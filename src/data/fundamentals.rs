//! Snapshot fundamentals supplied by a market data provider

use crate::types::Price;
use serde::{Deserialize, Serialize};

fn default_currency() -> String {
    "INR".to_string()
}

/// Point-in-time company data; every field is optional because providers
/// report different subsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default, rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    #[serde(default)]
    pub price_to_book: Option<f64>,
    #[serde(default)]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub current_price: Option<Price>,
    #[serde(default)]
    pub open: Option<Price>,
    #[serde(default)]
    pub day_high: Option<Price>,
    #[serde(default)]
    pub day_low: Option<Price>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for Fundamentals {
    fn default() -> Self {
        Self {
            market_cap: None,
            trailing_pe: None,
            price_to_book: None,
            dividend_yield: None,
            current_price: None,
            open: None,
            day_high: None,
            day_low: None,
            volume: None,
            currency: default_currency(),
        }
    }
}

impl Fundamentals {
    /// Session change as (absolute, percent of open).
    ///
    /// `None` unless both the current price and a non-zero open are known.
    pub fn day_change(&self) -> Option<(Price, f64)> {
        match (self.current_price, self.open) {
            (Some(current), Some(open)) if open != 0.0 => {
                let change = current - open;
                Some((change, change / open * 100.0))
            }
            _ => None,
        }
    }

    /// True when the provider reported nothing at all
    pub fn is_empty(&self) -> bool {
        self.market_cap.is_none()
            && self.trailing_pe.is_none()
            && self.price_to_book.is_none()
            && self.dividend_yield.is_none()
            && self.current_price.is_none()
            && self.open.is_none()
            && self.day_high.is_none()
            && self.day_low.is_none()
            && self.volume.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_partial_json() {
        let json = r#"{"marketCap": 1.5e12, "trailingPE": 24.3, "currentPrice": 2450.0}"#;
        let f: Fundamentals = serde_json::from_str(json).unwrap();

        assert_eq!(f.market_cap, Some(1.5e12));
        assert_eq!(f.trailing_pe, Some(24.3));
        assert!(f.dividend_yield.is_none());
        assert_eq!(f.currency, "INR");
        assert!(!f.is_empty());
    }

    #[test]
    fn test_day_change() {
        let f = Fundamentals {
            current_price: Some(110.0),
            open: Some(100.0),
            ..Default::default()
        };
        let (abs, pct) = f.day_change().unwrap();
        assert_relative_eq!(abs, 10.0);
        assert_relative_eq!(pct, 10.0);
    }

    #[test]
    fn test_day_change_needs_open() {
        let f = Fundamentals {
            current_price: Some(110.0),
            open: Some(0.0),
            ..Default::default()
        };
        assert!(f.day_change().is_none());
        assert!(Fundamentals::default().day_change().is_none());
        assert!(Fundamentals::default().is_empty());
    }
}
