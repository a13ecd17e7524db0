//! Cross-instrument cumulative performance
//!
//! Cumulative performance here is the running sum of simple daily returns,
//! not the compounded product.

use super::returns::DailyReturns;
use crate::data::PriceHistory;
use crate::error::{AnalysisError, Result};
use crate::types::{Series, Symbol};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Per-instrument series aligned to one common date index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorMatrix {
    index: Vec<NaiveDate>,
    columns: BTreeMap<Symbol, Vec<Option<f64>>>,
}

impl SectorMatrix {
    /// Build from columns that already share `index`
    pub fn new(index: Vec<NaiveDate>, columns: BTreeMap<Symbol, Vec<Option<f64>>>) -> Result<Self> {
        if let Some((symbol, column)) = columns.iter().find(|(_, c)| c.len() != index.len()) {
            return Err(AnalysisError::DataError(format!(
                "Column {} has {} values for an index of {} dates",
                symbol,
                column.len(),
                index.len()
            )));
        }
        if index.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalysisError::DataError(
                "Sector index dates must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { index, columns })
    }

    /// Align adjusted closes of several histories on the union of their dates.
    ///
    /// Dates an instrument did not trade are undefined in its column; empty
    /// histories contribute no column.
    pub fn from_histories(histories: &BTreeMap<Symbol, PriceHistory>) -> Self {
        let index: Vec<NaiveDate> = histories
            .values()
            .flat_map(|h| h.dates().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = histories
            .iter()
            .filter(|(_, h)| !h.is_empty())
            .map(|(symbol, history)| {
                let mut bars = history.bars().iter().peekable();
                let column = index
                    .iter()
                    .map(|date| match bars.peek() {
                        Some(bar) if bar.date == *date => bars.next().map(|b| b.adjusted_close),
                        _ => None,
                    })
                    .collect();
                (symbol.clone(), column)
            })
            .collect();

        Self { index, columns }
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    /// Instrument identifiers, sorted
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|s| s.as_str())
    }

    /// One instrument's column as a series
    pub fn column(&self, symbol: &str) -> Option<Series> {
        self.columns
            .get(symbol)
            .map(|values| Series::aligned(&self.index, values.clone()))
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Last defined value of every column
    pub fn latest(&self) -> BTreeMap<&str, Option<f64>> {
        self.columns
            .iter()
            .map(|(s, c)| (s.as_str(), c.iter().rev().find_map(|v| *v)))
            .collect()
    }
}

/// Additive running total of simple returns.
///
/// The last defined price is carried across undefined cells, so a gap row
/// adds nothing and the move across the gap lands on the next traded row.
/// Rows before the first defined price stay undefined.
pub fn cumulative_returns(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut last = None;
    let filled: Vec<Option<f64>> = prices
        .iter()
        .map(|p| {
            if p.is_some() {
                last = *p;
            }
            last
        })
        .collect();

    let mut total = 0.0;
    DailyReturns::compute_optional(&filled)
        .into_iter()
        .map(|ret| {
            ret.map(|r| {
                total += r;
                total
            })
        })
        .collect()
}

/// Cumulative performance for every instrument of a price matrix
pub fn calculate_sector_performance(prices: &SectorMatrix) -> SectorMatrix {
    let columns: BTreeMap<Symbol, Vec<Option<f64>>> = prices
        .columns
        .par_iter()
        .map(|(symbol, column)| (symbol.clone(), cumulative_returns(column)))
        .collect();

    log::debug!(
        "Computed cumulative performance for {} instruments over {} dates",
        columns.len(),
        prices.index.len()
    );

    SectorMatrix {
        index: prices.index.clone(),
        columns,
    }
}
