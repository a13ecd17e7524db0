//! Seasonal aggregation of daily returns
//!
//! Mean return per calendar month, per weekday and per year. Undefined
//! returns are excluded from every mean rather than counted as zero.

use crate::calendar::TradingWeekday;
use crate::types::Series;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running sum and count of defined observations
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub(crate) fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    /// Mean of the defined observations; undefined when there were none
    pub(crate) fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Mean daily return grouped by month, weekday and year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAggregate {
    /// Month number (1-12) to mean return, ascending; only months with rows appear
    pub monthly: BTreeMap<u32, Option<f64>>,
    /// Mean return for Monday..Friday, in that order; always five entries
    pub weekday: [Option<f64>; 5],
    /// Calendar year to mean return, ascending
    pub yearly: BTreeMap<i32, Option<f64>>,
}

impl SeasonalAggregate {
    /// Mean return for one weekday
    pub fn weekday_mean(&self, day: TradingWeekday) -> Option<f64> {
        self.weekday[day.ordinal()]
    }

    /// Weekday means in fixed Monday..Friday order
    pub fn weekdays(&self) -> impl Iterator<Item = (TradingWeekday, Option<f64>)> + '_ {
        TradingWeekday::ALL
            .iter()
            .map(move |&day| (day, self.weekday_mean(day)))
    }
}

/// Group a return series by calendar month, weekday and year
pub fn calculate_seasonal_trends(returns: &Series) -> SeasonalAggregate {
    let mut monthly: BTreeMap<u32, MeanAccumulator> = BTreeMap::new();
    let mut weekday = [MeanAccumulator::default(); 5];
    let mut yearly: BTreeMap<i32, MeanAccumulator> = BTreeMap::new();

    for (date, value) in returns.iter() {
        monthly.entry(date.month()).or_default().push(value);
        yearly.entry(date.year()).or_default().push(value);
        match TradingWeekday::from_date(date) {
            Some(day) => weekday[day.ordinal()].push(value),
            None => log::debug!("Ignoring weekend date {} in weekday grouping", date),
        }
    }

    SeasonalAggregate {
        monthly: monthly.into_iter().map(|(k, acc)| (k, acc.mean())).collect(),
        weekday: weekday.map(|acc| acc.mean()),
        yearly: yearly.into_iter().map(|(k, acc)| (k, acc.mean())).collect(),
    }
}
