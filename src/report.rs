//! Report assembly for presentation collaborators
//!
//! Runs every single-instrument stage and bundles the results into one
//! serializable value. Rendering is left entirely to the consumer.

use crate::analysis::{
    calculate_seasonal_trends, AnalysisFrame, ForecastResult, SeasonalAggregate,
    TechnicalIndicators, VolatilityAnalysis, VolumeAnalysis,
};
use crate::config::AnalysisConfig;
use crate::data::{Fundamentals, PriceHistory};
use crate::error::Result;
use crate::types::{Price, Symbol};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Most recent values of the headline indicators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub date: Option<NaiveDate>,
    pub price: Option<Price>,
    /// Last bar's close minus open, and as a percent of open
    pub change: Option<Price>,
    pub change_percent: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
    pub volatility: Vec<(usize, Option<f64>)>,
    pub sma: Vec<(usize, Option<f64>)>,
}

/// Every analysis output for one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: Symbol,
    pub rows: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub snapshot: Snapshot,
    pub volatility: VolatilityAnalysis,
    pub indicators: TechnicalIndicators,
    pub seasonal: SeasonalAggregate,
    pub volume: VolumeAnalysis,
    pub forecast: Option<ForecastResult>,
    pub fundamentals: Fundamentals,
}

impl AnalysisReport {
    /// Run all single-instrument stages over a history
    pub fn build(symbol: &str, history: &PriceHistory, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let frame = AnalysisFrame::build(history.clone(), config);
        let seasonal = calculate_seasonal_trends(&frame.volatility.daily_return);
        let forecast = frame.forecast(config.forecast_days);
        let snapshot = Self::snapshot(&frame);

        log::info!(
            "Analysis complete for {}: {} rows, forecast {}",
            symbol,
            history.len(),
            if forecast.is_some() { "available" } else { "unavailable" }
        );

        Ok(Self {
            symbol: symbol.to_string(),
            rows: history.len(),
            start_date: history.first_date(),
            end_date: history.last_date(),
            snapshot,
            volatility: frame.volatility,
            indicators: frame.indicators,
            seasonal,
            volume: frame.volume,
            forecast,
            fundamentals: Fundamentals::default(),
        })
    }

    /// Attach provider fundamentals
    pub fn with_fundamentals(mut self, fundamentals: Fundamentals) -> Self {
        self.fundamentals = fundamentals;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    fn snapshot(frame: &AnalysisFrame) -> Snapshot {
        let Some(last) = frame.len().checked_sub(1) else {
            return Snapshot::default();
        };
        let bar = frame.history().bars()[last];
        let macd = &frame.indicators.macd;

        Snapshot {
            date: Some(bar.date),
            price: Some(bar.adjusted_close),
            change: Some(bar.change()),
            change_percent: Some(bar.change_percent()),
            rsi: frame.indicators.rsi.get(last),
            macd: macd.macd.get(last),
            signal: macd.signal.get(last),
            histogram: macd.histogram().get(last),
            volatility: frame
                .volatility
                .rolling_volatility
                .iter()
                .map(|(w, s)| (*w, s.get(last)))
                .collect(),
            sma: frame
                .indicators
                .sma
                .iter()
                .map(|(w, s)| (*w, s.get(last)))
                .collect(),
        }
    }
}

/// Abbreviate large values with T/B/M/K suffixes, two decimals
pub fn format_compact(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e12 {
        format!("{:.2}T", value / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.2}K", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}
