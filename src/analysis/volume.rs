//! Volume analysis

use super::seasonal::MeanAccumulator;
use super::technical::SimpleMovingAverage;
use crate::data::PriceHistory;
use crate::types::Series;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Volume trend for one history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    /// Moving average of raw volume
    pub volume_ma: Series,
    /// Month number to mean volume; months without data are absent
    pub monthly_average_volume: BTreeMap<u32, f64>,
}

/// Volume moving average and mean volume per calendar month
pub fn calculate_volume_analysis(history: &PriceHistory, window: usize) -> VolumeAnalysis {
    let volume_ma = Series::aligned(
        history.dates(),
        SimpleMovingAverage::compute(window, &history.volume()),
    );

    let mut by_month: BTreeMap<u32, MeanAccumulator> = BTreeMap::new();
    for bar in history.bars() {
        by_month
            .entry(bar.date.month())
            .or_default()
            .push(Some(bar.volume as f64));
    }

    let monthly_average_volume = by_month
        .into_iter()
        .filter_map(|(month, acc)| acc.mean().map(|m| (month, m)))
        .collect();

    VolumeAnalysis {
        volume_ma,
        monthly_average_volume,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::trading_days_from;
    use crate::types::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn history_with_volumes(start: NaiveDate, volumes: &[u64]) -> PriceHistory {
        let bars = trading_days_from(start, volumes.len())
            .into_iter()
            .zip(volumes)
            .map(|(d, &v)| PriceBar::new(d, 10.0, 10.0, 10.0, 10.0, 10.0, v))
            .collect();
        PriceHistory::new(bars).unwrap()
    }

    #[test]
    fn test_volume_ma_warmup() {
        let volumes: Vec<u64> = (1..=25).map(|v| v * 100).collect();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let analysis = calculate_volume_analysis(&history_with_volumes(start, &volumes), 20);

        assert!(analysis.volume_ma.values()[..19].iter().all(|v| v.is_none()));
        // mean of 100..=2000 step 100
        assert_relative_eq!(analysis.volume_ma.get(19).unwrap(), 1050.0);
        assert_relative_eq!(analysis.volume_ma.get(24).unwrap(), 1550.0);
    }

    #[test]
    fn test_monthly_average_only_present_months() {
        // 2024-01-29 (Mon) .. 2024-02-02 (Fri): three January days, two February days
        let start = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();
        let analysis =
            calculate_volume_analysis(&history_with_volumes(start, &[100, 200, 300, 1000, 2000]), 20);

        assert_eq!(analysis.monthly_average_volume.len(), 2);
        assert_relative_eq!(analysis.monthly_average_volume[&1], 200.0);
        assert_relative_eq!(analysis.monthly_average_volume[&2], 1500.0);
        assert!(!analysis.monthly_average_volume.contains_key(&3));
    }

    #[test]
    fn test_monthly_average_spans_years() {
        let jan_2023 = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let jan_2024 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut bars: Vec<PriceBar> = history_with_volumes(jan_2023, &[100]).bars().to_vec();
        bars.extend_from_slice(history_with_volumes(jan_2024, &[300]).bars());

        let analysis = calculate_volume_analysis(&PriceHistory::new(bars).unwrap(), 20);
        assert_relative_eq!(analysis.monthly_average_volume[&1], 200.0);
    }

    #[test]
    fn test_empty_history() {
        let analysis = calculate_volume_analysis(&PriceHistory::empty(), 20);
        assert!(analysis.volume_ma.is_empty());
        assert!(analysis.monthly_average_volume.is_empty());
    }
}
