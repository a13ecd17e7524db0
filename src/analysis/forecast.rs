//! Trend-line price forecast
//!
//! Fits an ordinary least-squares line through the last `days` observations
//! and extrapolates one step ahead.

use crate::types::Price;
use serde::{Deserialize, Serialize};

/// Default trailing window for the trend fit
pub const DEFAULT_FORECAST_DAYS: usize = 60;

/// Direction implied by a forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

/// One-step-ahead trend extrapolation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_price: Price,
    /// Coefficient of determination (R²) of the fit on the training window
    pub fit_score: f64,
    /// Last observed price in the training window
    pub current_price: Price,
}

impl ForecastResult {
    /// Predicted move as a percentage of the current price
    pub fn expected_change_percent(&self) -> f64 {
        (self.predicted_price - self.current_price) / self.current_price * 100.0
    }

    pub fn trend(&self) -> Trend {
        if self.predicted_price > self.current_price {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

/// Least-squares line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Fit a line through `(x, y)` pairs.
    ///
    /// A single point gives a flat line through it. `None` without points.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        match points {
            [] => return None,
            [(_, y)] => {
                return Some(Self {
                    slope: 0.0,
                    intercept: *y,
                    r_squared: 1.0,
                })
            }
            _ => {}
        }
        let n = points.len() as f64;
        let x_mean = points.iter().map(|(x, _)| x).sum::<f64>() / n;
        let y_mean = points.iter().map(|(_, y)| y).sum::<f64>() / n;

        let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
            let dx = x - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let (ss_res, ss_tot) = points.iter().fold((0.0, 0.0), |(res, tot), (x, y)| {
            let residual = y - (slope * x + intercept);
            (res + residual * residual, tot + (y - y_mean).powi(2))
        });
        // A flat target is explained perfectly by a flat line
        let r_squared = if ss_tot == 0.0 {
            if ss_res == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - ss_res / ss_tot
        };

        Some(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Forecast the next price from a series with gaps.
///
/// Undefined rows are dropped first and the remaining rows renumbered
/// 0..n. Returns `None` when `days` is 0 or fewer than `days` rows remain.
/// A one-day window predicts the last price.
pub fn predict_price(prices: &[Option<Price>], days: usize) -> Option<ForecastResult> {
    let cleaned: Vec<Price> = prices.iter().flatten().copied().collect();
    if cleaned.len() < days || days == 0 {
        log::debug!(
            "Not enough history to forecast: {} rows, {} required",
            cleaned.len(),
            days
        );
        return None;
    }

    let start = cleaned.len() - days;
    let points: Vec<(f64, f64)> = cleaned[start..]
        .iter()
        .enumerate()
        .map(|(i, &p)| ((start + i) as f64, p))
        .collect();

    let fit = LinearFit::fit(&points)?;
    let (last_x, current_price) = points[points.len() - 1];

    Some(ForecastResult {
        predicted_price: fit.predict(last_x + 1.0),
        fit_score: fit.r_squared,
        current_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_linear_fit() {
        let prices: Vec<Option<f64>> = (0..60).map(|x| Some(2.0 * x as f64 + 10.0)).collect();
        let result = predict_price(&prices, 60).unwrap();

        assert_eq!(result.fit_score, 1.0);
        assert_relative_eq!(result.predicted_price, 130.0, epsilon = 1e-9);
        assert_eq!(result.current_price, 128.0);
        assert_eq!(result.trend(), Trend::Up);
    }

    #[test]
    fn test_insufficient_history() {
        let prices: Vec<Option<f64>> = (0..59).map(|x| Some(x as f64)).collect();
        assert!(predict_price(&prices, 60).is_none());
        assert!(predict_price(&[], 60).is_none());
    }

    #[test]
    fn test_undefined_rows_are_dropped_and_renumbered() {
        // Leading gaps must not shift the x positions
        let mut prices = vec![None; 5];
        prices.extend((0..10).map(|x| Some(3.0 * x as f64 + 1.0)));

        let result = predict_price(&prices, 10).unwrap();
        assert_relative_eq!(result.predicted_price, 31.0, epsilon = 1e-9);
        assert_relative_eq!(result.fit_score, 1.0, epsilon = 1e-12);

        // Only 10 defined rows: asking for 11 is insufficient
        assert!(predict_price(&prices, 11).is_none());
    }

    #[test]
    fn test_window_uses_trailing_rows() {
        // Flat then rising: a 5-day window sees only the rise
        let mut prices: Vec<Option<f64>> = vec![Some(100.0); 20];
        prices.extend((1..=5).map(|i| Some(100.0 + i as f64)));

        let result = predict_price(&prices, 5).unwrap();
        assert_relative_eq!(result.predicted_price, 106.0, epsilon = 1e-9);
        assert_eq!(result.current_price, 105.0);
    }

    #[test]
    fn test_flat_prices() {
        let prices = vec![Some(50.0); 10];
        let result = predict_price(&prices, 10).unwrap();

        assert_eq!(result.predicted_price, 50.0);
        assert_eq!(result.fit_score, 1.0);
        assert_eq!(result.trend(), Trend::Down);
        assert_eq!(result.expected_change_percent(), 0.0);
    }

    #[test]
    fn test_noisy_fit_score_below_one() {
        let prices: Vec<Option<f64>> = (0..30)
            .map(|x| Some(x as f64 + if x % 2 == 0 { 3.0 } else { -3.0 }))
            .collect();
        let result = predict_price(&prices, 30).unwrap();

        assert!(result.fit_score < 1.0);
        assert!(result.fit_score > 0.0);
    }

    #[test]
    fn test_single_day_window() {
        let result = predict_price(&[Some(1.0), Some(2.0)], 1).unwrap();
        assert_eq!(result.predicted_price, 2.0);
        assert_eq!(result.current_price, 2.0);
        assert_eq!(result.fit_score, 1.0);

        assert!(predict_price(&[None, Some(7.5)], 1).is_some());
        assert!(predict_price(&[None], 1).is_none());
        assert!(predict_price(&[Some(1.0)], 0).is_none());
    }

    #[test]
    fn test_expected_change_percent() {
        let result = ForecastResult {
            predicted_price: 110.0,
            fit_score: 0.9,
            current_price: 100.0,
        };
        assert_relative_eq!(result.expected_change_percent(), 10.0);
    }
}
