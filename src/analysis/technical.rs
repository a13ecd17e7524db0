//! Technical analysis indicators
//!
//! Moving averages, RSI and MACD over adjusted close. Every indicator has a
//! streaming form (`update`) and a batch form (`compute`) over a slice.

use crate::config::AnalysisConfig;
use crate::data::PriceHistory;
use crate::types::Series;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Simple Moving Average (SMA)
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    window: usize,
    values: VecDeque<f64>,
}

impl SimpleMovingAverage {
    /// Create new SMA with given window size
    pub fn new(window: usize) -> Self {
        if window == 0 {
            panic!("Window size must be greater than 0");
        }
        Self {
            window,
            values: VecDeque::with_capacity(window),
        }
    }

    /// Add a value and compute current SMA
    pub fn update(&mut self, value: f64) -> Option<f64> {
        self.values.push_back(value);

        if self.values.len() > self.window {
            self.values.pop_front();
        }

        self.current()
    }

    /// Compute SMA for a slice of values
    pub fn compute(window: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut sma = Self::new(window);
        values.iter().map(|&v| sma.update(v)).collect()
    }

    /// Get current value (if window is full)
    pub fn current(&self) -> Option<f64> {
        if self.values.len() == self.window {
            Some(self.values.iter().sum::<f64>() / self.window as f64)
        } else {
            None
        }
    }
}

/// Exponentially weighted moving average, seeded with the first value
#[derive(Debug, Clone)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    current_ema: Option<f64>,
}

impl ExponentialMovingAverage {
    /// Create new EMA with given span (`alpha = 2 / (span + 1)`)
    pub fn new(span: usize) -> Self {
        if span == 0 {
            panic!("Span must be greater than 0");
        }
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
            current_ema: None,
        }
    }

    /// Update with new value
    pub fn update(&mut self, value: f64) -> f64 {
        let ema = match self.current_ema {
            None => value,
            Some(prev_ema) => self.alpha * value + (1.0 - self.alpha) * prev_ema,
        };
        self.current_ema = Some(ema);
        ema
    }

    /// Compute EMA for a slice of values
    pub fn compute(span: usize, values: &[f64]) -> Vec<f64> {
        let mut ema = Self::new(span);
        values.iter().map(|&v| ema.update(v)).collect()
    }

    /// Get current EMA value
    pub fn current(&self) -> Option<f64> {
        self.current_ema
    }
}

/// Relative Strength Index over plain rolling means of gains and losses.
///
/// The first observation has no change and counts as zero gain and zero
/// loss, so the first value is available after `period` observations.
#[derive(Debug, Clone)]
pub struct RSI {
    gains: SimpleMovingAverage,
    losses: SimpleMovingAverage,
    prev_value: Option<f64>,
}

impl RSI {
    /// Create new RSI with given period
    pub fn new(period: usize) -> Self {
        if period == 0 {
            panic!("Period must be greater than 0");
        }
        Self {
            gains: SimpleMovingAverage::new(period),
            losses: SimpleMovingAverage::new(period),
            prev_value: None,
        }
    }

    /// Update with new value and compute RSI
    pub fn update(&mut self, value: f64) -> Option<f64> {
        let (gain, loss) = match self.prev_value {
            Some(prev) => {
                let change = value - prev;
                (change.max(0.0), (-change).max(0.0))
            }
            None => (0.0, 0.0),
        };
        self.prev_value = Some(value);

        let avg_gain = self.gains.update(gain);
        let avg_loss = self.losses.update(loss);
        Self::from_averages(avg_gain?, avg_loss?)
    }

    /// RSI from average gain and loss.
    ///
    /// No losses with some gain saturates at 100; no movement at all is undefined.
    pub fn from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
        if avg_loss == 0.0 {
            return (avg_gain > 0.0).then_some(100.0);
        }
        let rs = avg_gain / avg_loss;
        Some(100.0 - (100.0 / (1.0 + rs)))
    }

    /// Compute RSI for a slice of values
    pub fn compute(period: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut rsi = Self::new(period);
        values.iter().map(|&v| rsi.update(v)).collect()
    }
}

/// Moving Average Convergence Divergence (MACD)
#[derive(Debug, Clone)]
pub struct MACD {
    fast_ema: ExponentialMovingAverage,
    slow_ema: ExponentialMovingAverage,
    signal_ema: ExponentialMovingAverage,
}

impl MACD {
    /// Create new MACD with standard parameters (12, 26, 9)
    pub fn new() -> Self {
        Self::with_params(12, 26, 9)
    }

    /// Create MACD with custom parameters
    pub fn with_params(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast_ema: ExponentialMovingAverage::new(fast),
            slow_ema: ExponentialMovingAverage::new(slow),
            signal_ema: ExponentialMovingAverage::new(signal),
        }
    }

    /// Update with new value, returns (MACD line, signal line)
    pub fn update(&mut self, value: f64) -> (f64, f64) {
        let macd_line = self.fast_ema.update(value) - self.slow_ema.update(value);
        let signal_line = self.signal_ema.update(macd_line);
        (macd_line, signal_line)
    }
}

impl Default for MACD {
    fn default() -> Self {
        Self::new()
    }
}

/// MACD and signal lines aligned with the input dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: Series,
    pub signal: Series,
}

impl MacdSeries {
    /// MACD over a history's adjusted close
    pub fn compute(history: &PriceHistory, fast: usize, slow: usize, signal: usize) -> Self {
        let mut indicator = MACD::with_params(fast, slow, signal);
        let (macd, signal): (Vec<_>, Vec<_>) = history
            .adjusted_close()
            .into_iter()
            .map(|p| {
                let (m, s) = indicator.update(p);
                (Some(m), Some(s))
            })
            .unzip();

        Self {
            macd: Series::aligned(history.dates(), macd),
            signal: Series::aligned(history.dates(), signal),
        }
    }

    /// MACD minus signal, derived on demand
    pub fn histogram(&self) -> Series {
        let values = self
            .macd
            .values()
            .iter()
            .zip(self.signal.values())
            .map(|(m, s)| m.zip(*s).map(|(m, s)| m - s))
            .collect();
        Series::aligned(self.macd.index(), values)
    }
}

/// All technical indicators for one history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub sma: BTreeMap<usize, Series>,
    pub rsi: Series,
    pub macd: MacdSeries,
}

impl TechnicalIndicators {
    /// SMA for a window, if it was computed
    pub fn sma(&self, window: usize) -> Option<&Series> {
        self.sma.get(&window)
    }
}

/// SMA of adjusted close
pub fn simple_moving_average(history: &PriceHistory, window: usize) -> Series {
    Series::aligned(
        history.dates(),
        SimpleMovingAverage::compute(window, &history.adjusted_close()),
    )
}

/// EWMA of adjusted close
pub fn exponential_moving_average(history: &PriceHistory, span: usize) -> Series {
    let values = ExponentialMovingAverage::compute(span, &history.adjusted_close())
        .into_iter()
        .map(Some)
        .collect();
    Series::aligned(history.dates(), values)
}

/// RSI of adjusted close
pub fn relative_strength_index(history: &PriceHistory, period: usize) -> Series {
    Series::aligned(history.dates(), RSI::compute(period, &history.adjusted_close()))
}

/// Moving averages, RSI and MACD with the configured parameters
pub fn calculate_technical_indicators(
    history: &PriceHistory,
    config: &AnalysisConfig,
) -> TechnicalIndicators {
    let sma = config
        .sma_windows
        .iter()
        .map(|&w| (w, simple_moving_average(history, w)))
        .collect();

    log::debug!(
        "Computed technical indicators over {} bars (SMA {:?}, RSI {}, MACD {}/{}/{})",
        history.len(),
        config.sma_windows,
        config.rsi_period,
        config.macd_fast,
        config.macd_slow,
        config.macd_signal
    );

    TechnicalIndicators {
        sma,
        rsi: relative_strength_index(history, config.rsi_period),
        macd: MacdSeries::compute(
            history,
            config.macd_fast,
            config.macd_slow,
            config.macd_signal,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::trading_days_from;
    use crate::types::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn history(prices: &[f64]) -> PriceHistory {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = trading_days_from(start, prices.len())
            .into_iter()
            .zip(prices)
            .map(|(d, &p)| PriceBar::new(d, p, p, p, p, p, 1_000))
            .collect();
        PriceHistory::new(bars).unwrap()
    }

    #[test]
    fn test_sma() {
        let mut sma = SimpleMovingAverage::new(3);

        assert_eq!(sma.update(1.0), None);
        assert_eq!(sma.update(2.0), None);
        assert_eq!(sma.update(3.0), Some(2.0)); // (1+2+3)/3 = 2
        assert_eq!(sma.update(4.0), Some(3.0)); // (2+3+4)/3 = 3
    }

    #[test]
    fn test_sma_compute() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = SimpleMovingAverage::compute(3, &values);

        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0)); // (1+2+3)/3
        assert_eq!(result[3], Some(3.0)); // (2+3+4)/3
        assert_eq!(result[4], Some(4.0)); // (3+4+5)/3
    }

    #[test]
    fn test_sma_shorter_than_window() {
        let result = SimpleMovingAverage::compute(50, &[1.0; 49]);
        assert!(result.iter().all(|v| v.is_none()));
    }

    #[test]
    fn test_ema_seed_and_recurrence() {
        let result = ExponentialMovingAverage::compute(3, &[1.0, 2.0, 3.0]);

        // alpha = 0.5
        assert_eq!(result[0], 1.0);
        assert_relative_eq!(result[1], 1.5);
        assert_relative_eq!(result[2], 2.25);
    }

    #[test]
    fn test_rsi_first_value_at_period_minus_one() {
        let values = vec![
            44.0, 44.34, 44.09, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28,
        ];
        let results = RSI::compute(14, &values);

        assert!(results[..13].iter().all(|r| r.is_none()));
        assert!(results[13].is_some());
        assert!(results[14].is_some());
        for rsi in results.iter().flatten() {
            assert!((0.0..=100.0).contains(rsi));
        }
    }

    #[test]
    fn test_rsi_known_value() {
        // Changes: +1, -1, +2 over period 3, with the zero first change
        // falling out of the window at index 3
        let results = RSI::compute(3, &[10.0, 11.0, 10.0, 12.0]);

        // Window at index 2: gains [0, 1, 0], losses [0, 0, 1] -> RS = 1 -> 50
        assert_relative_eq!(results[2].unwrap(), 50.0, epsilon = 1e-9);
        // Window at index 3: gains [1, 0, 2], losses [0, 1, 0] -> RS = 3 -> 75
        assert_relative_eq!(results[3].unwrap(), 75.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rsi_only_gains_is_100() {
        let results = RSI::compute(3, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(results[2], Some(100.0));
        assert_eq!(results[3], Some(100.0));
    }

    #[test]
    fn test_rsi_flat_is_undefined() {
        let results = RSI::compute(3, &[5.0; 6]);
        assert!(results.iter().all(|r| r.is_none()));
    }

    #[test]
    fn test_rsi_only_losses_is_zero() {
        let results = RSI::compute(3, &[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(results[3], Some(0.0));
    }

    #[test]
    fn test_macd_histogram_identity() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let macd = MacdSeries::compute(&history(&prices), 12, 26, 9);
        let histogram = macd.histogram();

        assert_eq!(histogram.len(), 60);
        for i in 0..60 {
            let (m, s) = (macd.macd.get(i).unwrap(), macd.signal.get(i).unwrap());
            assert_eq!(histogram.get(i).unwrap(), m - s);
        }
    }

    #[test]
    fn test_macd_starts_at_zero() {
        let macd = MacdSeries::compute(&history(&[100.0, 101.0]), 12, 26, 9);
        assert_eq!(macd.macd.get(0), Some(0.0));
        assert_eq!(macd.signal.get(0), Some(0.0));
    }

    #[test]
    fn test_technical_indicators_empty() {
        let indicators =
            calculate_technical_indicators(&PriceHistory::empty(), &AnalysisConfig::default());
        assert!(indicators.sma(50).unwrap().is_empty());
        assert!(indicators.sma(200).unwrap().is_empty());
        assert!(indicators.rsi.is_empty());
        assert!(indicators.macd.histogram().is_empty());
    }

    #[test]
    fn test_ewma_defined_everywhere() {
        let h = history(&[3.0, 1.0, 4.0, 1.0, 5.0]);
        let ema = exponential_moving_average(&h, 12);
        assert_eq!(ema.defined_count(), 5);
        assert_eq!(ema.get(0), Some(3.0));
    }
}
