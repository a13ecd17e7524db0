//! Trading calendar helpers

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A weekday on which daily bars can occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TradingWeekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl TradingWeekday {
    /// Fixed presentation order, Monday first
    pub const ALL: [TradingWeekday; 5] = [
        TradingWeekday::Monday,
        TradingWeekday::Tuesday,
        TradingWeekday::Wednesday,
        TradingWeekday::Thursday,
        TradingWeekday::Friday,
    ];

    /// Map a calendar date to its trading weekday; weekends have none
    pub fn from_date(date: NaiveDate) -> Option<Self> {
        match date.weekday() {
            Weekday::Mon => Some(TradingWeekday::Monday),
            Weekday::Tue => Some(TradingWeekday::Tuesday),
            Weekday::Wed => Some(TradingWeekday::Wednesday),
            Weekday::Thu => Some(TradingWeekday::Thursday),
            Weekday::Fri => Some(TradingWeekday::Friday),
            Weekday::Sat | Weekday::Sun => None,
        }
    }

    /// Position in [`TradingWeekday::ALL`]
    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TradingWeekday::Monday => "Monday",
            TradingWeekday::Tuesday => "Tuesday",
            TradingWeekday::Wednesday => "Wednesday",
            TradingWeekday::Thursday => "Thursday",
            TradingWeekday::Friday => "Friday",
        }
    }
}

impl fmt::Display for TradingWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Check if a date can carry a daily bar (Monday through Friday)
pub fn is_trading_day(date: NaiveDate) -> bool {
    TradingWeekday::from_date(date).is_some()
}

/// Next weekday strictly after `date`
pub fn next_trading_day(date: NaiveDate) -> NaiveDate {
    let mut current = date + Duration::days(1);
    while !is_trading_day(current) {
        current += Duration::days(1);
    }
    current
}

/// `count` consecutive trading days starting at `start` (or the first trading day after it)
pub fn trading_days_from(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut current = if is_trading_day(start) {
        start
    } else {
        next_trading_day(start)
    };
    for _ in 0..count {
        days.push(current);
        current = next_trading_day(current);
    }
    days
}
