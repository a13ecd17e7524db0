//! Market data boundary
//!
//! The analytical engine never fetches data itself. A [`MarketDataProvider`]
//! hands it a validated [`PriceHistory`]; any failure upstream reaches the
//! engine as an empty history.

pub mod csv_provider;
pub mod fundamentals;

pub use csv_provider::{CsvDirectoryProvider, CsvFormat};
pub use fundamentals::Fundamentals;

use crate::calendar::is_trading_day;
use crate::error::{AnalysisError, Result};
use crate::types::{Price, PriceBar, Symbol};
use chrono::NaiveDate;
use hashbrown::HashMap;
use std::collections::BTreeMap;

/// Validated, immutable sequence of daily bars for one instrument
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    bars: Vec<PriceBar>,
    dates: Vec<NaiveDate>,
}

impl PriceHistory {
    /// Validate and wrap a bar sequence.
    ///
    /// Dates must be strictly increasing trading days and every adjusted
    /// close must be finite.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        for (i, bar) in bars.iter().enumerate() {
            if !is_trading_day(bar.date) {
                return Err(AnalysisError::DataError(format!(
                    "Bar on {} falls on a weekend",
                    bar.date
                )));
            }
            if !bar.adjusted_close.is_finite() {
                return Err(AnalysisError::DataError(format!(
                    "Non-finite adjusted close on {}",
                    bar.date
                )));
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(AnalysisError::DataError(format!(
                    "Bar dates not strictly increasing: {} follows {}",
                    bar.date,
                    bars[i - 1].date
                )));
            }
        }

        let dates = bars.iter().map(|b| b.date).collect();
        Ok(Self { bars, dates })
    }

    /// History with no bars ("no data")
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Adjusted close prices in date order
    pub fn adjusted_close(&self) -> Vec<Price> {
        self.bars.iter().map(|b| b.adjusted_close).collect()
    }

    /// Volumes in date order, as reals for averaging
    pub fn volume(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn last_bar(&self) -> Option<&PriceBar> {
        self.bars.last()
    }
}

/// Source of raw market data for the engine
pub trait MarketDataProvider: Send + Sync {
    /// Full daily history for a symbol; an unknown symbol may return an empty history
    fn price_history(&self, symbol: &str) -> Result<PriceHistory>;

    /// Snapshot fundamentals for a symbol
    fn fundamentals(&self, _symbol: &str) -> Result<Fundamentals> {
        Ok(Fundamentals::default())
    }

    /// Adjusted-close histories for a basket of symbols.
    ///
    /// Symbols that fail or have no data are left out of the result.
    fn sector_histories(&self, symbols: &[Symbol]) -> BTreeMap<Symbol, PriceHistory> {
        let mut results = BTreeMap::new();
        for symbol in symbols {
            match self.price_history(symbol) {
                Ok(history) if !history.is_empty() => {
                    results.insert(symbol.clone(), history);
                }
                Ok(_) => {
                    log::warn!("No data found for {}", symbol);
                }
                Err(e) => {
                    log::warn!("Failed to load data for {}: {}", symbol, e);
                }
            }
        }
        results
    }
}

/// Load a history, turning any provider failure into an empty history
pub fn fetch_or_empty(provider: &dyn MarketDataProvider, symbol: &str) -> PriceHistory {
    match provider.price_history(symbol) {
        Ok(history) => history,
        Err(e) => {
            log::warn!("Failed to load data for {}: {}", symbol, e);
            PriceHistory::empty()
        }
    }
}

/// In-memory provider for callers that already hold their data
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    histories: HashMap<Symbol, PriceHistory>,
    fundamentals: HashMap<Symbol, Fundamentals>,
}

impl InMemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validated history for a symbol
    pub fn add_history(&mut self, symbol: impl Into<Symbol>, history: PriceHistory) {
        self.histories.insert(symbol.into(), history);
    }

    /// Validate and register raw bars for a symbol
    pub fn add_bars(&mut self, symbol: impl Into<Symbol>, bars: Vec<PriceBar>) -> Result<()> {
        let history = PriceHistory::new(bars)?;
        self.add_history(symbol, history);
        Ok(())
    }

    /// Register fundamentals for a symbol
    pub fn add_fundamentals(&mut self, symbol: impl Into<Symbol>, fundamentals: Fundamentals) {
        self.fundamentals.insert(symbol.into(), fundamentals);
    }

    /// Registered symbols, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.histories.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl MarketDataProvider for InMemoryProvider {
    fn price_history(&self, symbol: &str) -> Result<PriceHistory> {
        Ok(self.histories.get(symbol).cloned().unwrap_or_default())
    }

    fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        Ok(self.fundamentals.get(symbol).cloned().unwrap_or_default())
    }
}
