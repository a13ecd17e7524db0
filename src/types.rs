//! Core types and constants

use crate::error::{AnalysisError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Price type (using f64 for precision)
pub type Price = f64;

/// Traded share count for one session
pub type Volume = u64;

/// Instrument identifier (ticker symbol)
pub type Symbol = String;

/// One trading-day record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    /// Close adjusted for splits and dividends
    pub adjusted_close: Price,
    pub volume: Volume,
}

impl PriceBar {
    /// Create a new bar
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        adjusted_close: Price,
        volume: Volume,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        }
    }

    /// Intraday change (close - open)
    pub fn change(&self) -> Price {
        self.close - self.open
    }

    /// Intraday change as a percentage of the open, 0 when the open is 0
    pub fn change_percent(&self) -> f64 {
        if self.open != 0.0 {
            self.change() / self.open * 100.0
        } else {
            0.0
        }
    }

    /// Get price range (high - low)
    pub fn range(&self) -> Price {
        self.high - self.low
    }
}

/// Date-indexed sequence of values aligned 1:1 with the bars it came from.
///
/// `None` marks an undefined value (not enough history, indeterminate ratio).
/// Undefined values are never read as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    index: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl Series {
    /// Create a series, rejecting an index and value vector of different lengths
    pub fn new(index: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Result<Self> {
        if index.len() != values.len() {
            return Err(AnalysisError::DataError(format!(
                "Series index has {} dates but {} values",
                index.len(),
                values.len()
            )));
        }
        Ok(Self { index, values })
    }

    /// Build from an index the caller already knows is aligned with `values`
    pub(crate) fn aligned(index: &[NaiveDate], values: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(index.len(), values.len());
        Self {
            index: index.to_vec(),
            values,
        }
    }

    /// Empty series
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Value at position `i`; `None` when out of range or undefined
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    /// Value on a given date; `None` when the date is not in the index or undefined
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        self.index
            .binary_search(&date)
            .ok()
            .and_then(|i| self.get(i))
    }

    /// Most recent defined value with its date
    pub fn last_defined(&self) -> Option<(NaiveDate, f64)> {
        self.iter().rev().find_map(|(d, v)| v.map(|v| (d, v)))
    }

    /// Number of defined values
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Iterate over (date, value) pairs
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.index.iter().copied().zip(self.values.iter().copied())
    }

    /// Pointwise combination of two aligned series.
    ///
    /// The result is undefined wherever either side is undefined.
    pub fn combine<F>(&self, other: &Series, f: F) -> Result<Series>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.index != other.index {
            return Err(AnalysisError::DataError(
                "Cannot combine series with different date indices".to_string(),
            ));
        }
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => Some(f(*a, *b)),
                _ => None,
            })
            .collect();
        Ok(Series {
            index: self.index.clone(),
            values,
        })
    }
}
