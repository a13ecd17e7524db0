//! End-to-end tests reading CSV exports from disk

use approx::assert_relative_eq;
use chrono::NaiveDate;
use rusty_stock_analytics::calendar::trading_days_from;
use rusty_stock_analytics::prelude::*;
use std::fmt::Write as _;
use std::fs;
use tempfile::TempDir;

fn write_history(dir: &TempDir, symbol: &str, start: NaiveDate, len: usize, base: f64) {
    let mut contents = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for (i, date) in trading_days_from(start, len).into_iter().enumerate() {
        let close = base + i as f64 + if i % 3 == 0 { 2.0 } else { -1.0 };
        writeln!(
            contents,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{}",
            date,
            close - 0.5,
            close + 1.0,
            close - 1.0,
            close,
            close * 0.99,
            50_000 + i
        )
        .unwrap();
    }
    fs::write(dir.path().join(format!("{}.csv", symbol)), contents).unwrap();
}

#[test]
fn test_report_from_csv_directory() {
    let dir = TempDir::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    write_history(&dir, "HDFCBANK.NS", start, 280, 1600.0);
    fs::write(
        dir.path().join("HDFCBANK.NS.fundamentals.json"),
        r#"{"marketCap": 12500000000000, "trailingPE": 19.4, "currentPrice": 1650.0, "open": 1640.0}"#,
    )
    .unwrap();

    let provider = CsvDirectoryProvider::new(dir.path());
    let history = fetch_or_empty(&provider, "HDFCBANK.NS");
    assert_eq!(history.len(), 280);
    assert_eq!(history.first_date(), Some(start));
    // Adjusted close drives the analysis, not close
    assert_relative_eq!(history.bars()[0].adjusted_close, 1602.0 * 0.99, epsilon = 0.01);

    let fundamentals = provider.fundamentals("HDFCBANK.NS").unwrap();
    assert_eq!(fundamentals.currency, "INR");
    assert_eq!(fundamentals.trailing_pe, Some(19.4));

    let report = AnalysisReport::build("HDFCBANK.NS", &history, &AnalysisConfig::default())
        .unwrap()
        .with_fundamentals(fundamentals);
    // 280 rows, SMA 200 leaves 81 complete rows
    assert!(report.forecast.is_some());
    assert_eq!(report.forecast.unwrap().trend(), Trend::Up);

    let json_path = dir.path().join("report.json");
    fs::write(&json_path, serde_json::to_string_pretty(&report).unwrap()).unwrap();
    let restored: AnalysisReport =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(restored.symbol, "HDFCBANK.NS");
    assert_eq!(restored.rows, 280);
    assert_eq!(restored.fundamentals.market_cap, Some(1.25e13));
}

#[test]
fn test_missing_symbol_is_no_data() {
    let dir = TempDir::new().unwrap();
    let provider = CsvDirectoryProvider::new(dir.path());

    assert!(provider.price_history("NOPE.NS").unwrap().is_empty());
    assert!(provider.fundamentals("NOPE.NS").unwrap().is_empty());
    assert!(fetch_or_empty(&provider, "NOPE.NS").is_empty());
}

#[test]
fn test_sector_from_csv_directory() {
    let dir = TempDir::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    write_history(&dir, "TCS.NS", start, 40, 3700.0);
    write_history(&dir, "INFY.NS", start, 40, 1500.0);

    let provider = CsvDirectoryProvider::new(dir.path());
    let symbols: Vec<Symbol> = ["TCS.NS", "INFY.NS", "WIPRO.NS"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let matrix = SectorMatrix::from_histories(&provider.sector_histories(&symbols));
    assert_eq!(matrix.symbols().collect::<Vec<_>>(), vec!["INFY.NS", "TCS.NS"]);

    let performance = calculate_sector_performance(&matrix);
    assert_eq!(performance.num_columns(), 2);
    assert_eq!(performance.index().len(), 40);
    // Same absolute moves on a lower base give a larger relative gain
    let latest = performance.latest();
    assert!(latest["INFY.NS"].unwrap() > latest["TCS.NS"].unwrap());
}
