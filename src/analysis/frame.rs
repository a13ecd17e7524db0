//! Combined per-row view of a history and its derived columns
//!
//! The forecast trains on the rows where every derived column is already
//! defined, so the frame keeps all stage outputs aligned row by row.

use super::forecast::{predict_price, ForecastResult};
use super::returns::{calculate_volatility, VolatilityAnalysis};
use super::technical::{calculate_technical_indicators, TechnicalIndicators};
use super::volume::{calculate_volume_analysis, VolumeAnalysis};
use crate::config::AnalysisConfig;
use crate::data::PriceHistory;
use crate::types::{PriceBar, Series};

/// One row of the frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRow<'a> {
    pub bar: &'a PriceBar,
    /// Derived values in column order, see [`AnalysisFrame::column_names`]
    pub values: Vec<Option<f64>>,
}

impl FrameRow<'_> {
    /// True when every derived column has a value on this row
    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| v.is_some())
    }
}

/// A history together with every single-instrument stage output
#[derive(Debug, Clone)]
pub struct AnalysisFrame {
    history: PriceHistory,
    pub volatility: VolatilityAnalysis,
    pub indicators: TechnicalIndicators,
    pub volume: VolumeAnalysis,
}

impl AnalysisFrame {
    /// Run the volatility, indicator and volume stages over a history
    pub fn build(history: PriceHistory, config: &AnalysisConfig) -> Self {
        let volatility = calculate_volatility(&history, &config.volatility_windows);
        let indicators = calculate_technical_indicators(&history, config);
        let volume = calculate_volume_analysis(&history, config.volume_ma_window);

        Self {
            history,
            volatility,
            indicators,
            volume,
        }
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Derived columns paired with their names, in a stable order
    fn columns(&self) -> Vec<(String, &Series)> {
        let mut columns = vec![("daily_return".to_string(), &self.volatility.daily_return)];
        columns.extend(
            self.volatility
                .rolling_volatility
                .iter()
                .map(|(w, s)| (format!("rolling_vol_{}", w), s)),
        );
        columns.extend(
            self.indicators
                .sma
                .iter()
                .map(|(w, s)| (format!("sma_{}", w), s)),
        );
        columns.push(("rsi".to_string(), &self.indicators.rsi));
        columns.push(("macd".to_string(), &self.indicators.macd.macd));
        columns.push(("signal".to_string(), &self.indicators.macd.signal));
        columns.push(("volume_ma".to_string(), &self.volume.volume_ma));
        columns
    }

    /// Names of the derived columns carried by each row
    pub fn column_names(&self) -> Vec<String> {
        self.columns().into_iter().map(|(name, _)| name).collect()
    }

    /// Every row with its derived values
    pub fn rows(&self) -> Vec<FrameRow<'_>> {
        let columns = self.columns();
        self.history
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| FrameRow {
                bar,
                values: columns.iter().map(|(_, s)| s.get(i)).collect(),
            })
            .collect()
    }

    /// Rows where every derived column is defined, in date order
    pub fn complete_rows(&self) -> Vec<FrameRow<'_>> {
        self.rows().into_iter().filter(|r| r.is_complete()).collect()
    }

    /// Trend forecast over the adjusted closes of the complete rows
    pub fn forecast(&self, days: usize) -> Option<ForecastResult> {
        let prices: Vec<Option<f64>> = self
            .rows()
            .iter()
            .map(|row| row.is_complete().then_some(row.bar.adjusted_close))
            .collect();
        predict_price(&prices, days)
    }
}
