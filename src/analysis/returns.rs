//! Returns and volatility
//!
//! Daily simple returns on adjusted close and their rolling sample standard
//! deviation.

use crate::data::PriceHistory;
use crate::types::Series;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};
use std::collections::{BTreeMap, VecDeque};

/// DailyReturns - Single period simple returns
#[derive(Debug, Clone, Default)]
pub struct DailyReturns {
    prev_price: Option<f64>,
}

impl DailyReturns {
    /// Create new DailyReturns factor
    pub fn new() -> Self {
        Self { prev_price: None }
    }

    /// Update with new price
    pub fn update(&mut self, price: f64) -> Option<f64> {
        self.update_optional(Some(price))
    }

    /// Update with a price that may be missing.
    ///
    /// A missing price, or a zero previous price, makes the return undefined.
    pub fn update_optional(&mut self, price: Option<f64>) -> Option<f64> {
        let ret = match (self.prev_price, price) {
            (Some(prev), Some(price)) if prev != 0.0 => Some((price - prev) / prev),
            _ => None,
        };
        self.prev_price = price;
        ret
    }

    /// Compute daily returns for a slice of prices
    pub fn compute(prices: &[f64]) -> Vec<Option<f64>> {
        let mut returns = Self::new();
        prices.iter().map(|&p| returns.update(p)).collect()
    }

    /// Compute daily returns for prices with gaps
    pub fn compute_optional(prices: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut returns = Self::new();
        prices.iter().map(|&p| returns.update_optional(p)).collect()
    }
}

/// Rolling sample standard deviation of returns
#[derive(Debug, Clone)]
pub struct RollingVolatility {
    window: usize,
    returns: VecDeque<Option<f64>>,
}

impl RollingVolatility {
    /// Create new rolling volatility over `window` returns
    pub fn new(window: usize) -> Self {
        if window == 0 {
            panic!("Window must be greater than 0");
        }
        Self {
            window,
            returns: VecDeque::with_capacity(window),
        }
    }

    /// Update with the next return; defined once the window holds `window` defined returns
    pub fn update(&mut self, ret: Option<f64>) -> Option<f64> {
        self.returns.push_back(ret);

        if self.returns.len() > self.window {
            self.returns.pop_front();
        }

        if self.returns.len() < self.window {
            return None;
        }

        let window: Option<Vec<f64>> = self.returns.iter().copied().collect();
        let std_dev = Data::new(window?).std_dev()?;
        // A single-observation window has no sample deviation
        std_dev.is_finite().then_some(std_dev)
    }

    /// Compute rolling volatility over a return slice
    pub fn compute(window: usize, returns: &[Option<f64>]) -> Vec<Option<f64>> {
        let mut vol = Self::new(window);
        returns.iter().map(|&r| vol.update(r)).collect()
    }
}

/// Daily returns plus one rolling volatility series per window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityAnalysis {
    pub daily_return: Series,
    pub rolling_volatility: BTreeMap<usize, Series>,
}

impl VolatilityAnalysis {
    /// Rolling volatility for a window, if it was computed
    pub fn window(&self, window: usize) -> Option<&Series> {
        self.rolling_volatility.get(&window)
    }
}

/// Daily simple returns of adjusted close; the first value is undefined
pub fn daily_returns(history: &PriceHistory) -> Series {
    Series::aligned(
        history.dates(),
        DailyReturns::compute(&history.adjusted_close()),
    )
}

/// Rolling sample standard deviation of a return series
pub fn rolling_volatility(returns: &Series, window: usize) -> Series {
    Series::aligned(
        returns.index(),
        RollingVolatility::compute(window, returns.values()),
    )
}

/// Returns and rolling volatility for every requested window
pub fn calculate_volatility(history: &PriceHistory, windows: &[usize]) -> VolatilityAnalysis {
    let daily_return = daily_returns(history);
    let rolling_volatility = windows
        .iter()
        .map(|&w| (w, rolling_volatility(&daily_return, w)))
        .collect();

    log::debug!(
        "Computed returns over {} bars for volatility windows {:?}",
        history.len(),
        windows
    );

    VolatilityAnalysis {
        daily_return,
        rolling_volatility,
    }
}
