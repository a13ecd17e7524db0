//! CSV-backed market data provider
//!
//! Reads one file per symbol from a directory, in the layout produced by the
//! common "download history" exports: `Date,Open,High,Low,Close,Adj Close,Volume`.

use super::{Fundamentals, MarketDataProvider, PriceHistory};
use crate::error::{AnalysisError, Result};
use crate::types::{PriceBar, Volume};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::fs;
use std::path::{Path, PathBuf};

/// CSV data format configuration
#[derive(Debug, Clone)]
pub struct CsvFormat {
    /// Date column name
    pub date_column: String,
    /// Open price column name
    pub open_column: String,
    /// High price column name
    pub high_column: String,
    /// Low price column name
    pub low_column: String,
    /// Close price column name
    pub close_column: String,
    /// Adjusted close column name
    pub adjusted_close_column: String,
    /// Volume column name
    pub volume_column: String,
    /// Date format string (e.g., "%Y-%m-%d")
    pub date_format: String,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            date_column: "Date".to_string(),
            open_column: "Open".to_string(),
            high_column: "High".to_string(),
            low_column: "Low".to_string(),
            close_column: "Close".to_string(),
            adjusted_close_column: "Adj Close".to_string(),
            volume_column: "Volume".to_string(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }
}

struct ColumnIndices {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adjusted_close: usize,
    volume: usize,
}

/// Provider reading `<dir>/<SYMBOL>.csv` and optional `<dir>/<SYMBOL>.fundamentals.json`
#[derive(Debug, Clone)]
pub struct CsvDirectoryProvider {
    dir: PathBuf,
    format: CsvFormat,
}

impl CsvDirectoryProvider {
    /// Create a provider over a directory with the default format
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            format: CsvFormat::default(),
        }
    }

    /// Create with custom format
    pub fn with_format(dir: impl Into<PathBuf>, format: CsvFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", symbol))
    }

    fn fundamentals_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.fundamentals.json", symbol))
    }

    /// Load and validate one CSV file
    pub fn load_csv(&self, path: &Path) -> Result<PriceHistory> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| AnalysisError::DataError(format!("Failed to open CSV: {}", e)))?;

        let headers = rdr.headers()?.clone();
        let cols = ColumnIndices {
            date: Self::find_column(&headers, &self.format.date_column)?,
            open: Self::find_column(&headers, &self.format.open_column)?,
            high: Self::find_column(&headers, &self.format.high_column)?,
            low: Self::find_column(&headers, &self.format.low_column)?,
            close: Self::find_column(&headers, &self.format.close_column)?,
            adjusted_close: Self::find_column(&headers, &self.format.adjusted_close_column)?,
            volume: Self::find_column(&headers, &self.format.volume_column)?,
        };

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if let Some(bar) = self.parse_record(&record, &cols)? {
                bars.push(bar);
            }
        }

        bars.sort_by_key(|b| b.date);
        log::debug!("Loaded {} bars from {}", bars.len(), path.display());
        PriceHistory::new(bars)
    }

    /// Parse one row; rows with missing price cells yield `None`
    fn parse_record(
        &self,
        record: &csv::StringRecord,
        cols: &ColumnIndices,
    ) -> Result<Option<PriceBar>> {
        let date_str = record
            .get(cols.date)
            .ok_or_else(|| AnalysisError::DataError("Missing date".to_string()))?;
        let date = NaiveDate::parse_from_str(date_str, &self.format.date_format)
            .map_err(|_| AnalysisError::ParseError(format!("Invalid date format: {}", date_str)))?;

        let fields = [
            cols.open,
            cols.high,
            cols.low,
            cols.close,
            cols.adjusted_close,
            cols.volume,
        ];
        if fields
            .iter()
            .any(|&idx| record.get(idx).map_or(true, is_missing_cell))
        {
            log::debug!("Skipping row {} with missing values", date);
            return Ok(None);
        }

        let open = parse_price(record, cols.open, "open")?;
        let high = parse_price(record, cols.high, "high")?;
        let low = parse_price(record, cols.low, "low")?;
        let close = parse_price(record, cols.close, "close")?;
        let adjusted_close = parse_price(record, cols.adjusted_close, "adjusted close")?;
        let volume = parse_volume(record, cols.volume)?;

        // Validate OHLC
        if high < low || open > high || open < low || close > high || close < low {
            return Err(AnalysisError::DataError(format!(
                "Invalid OHLC data on {}: O={} H={} L={} C={}",
                date, open, high, low, close
            )));
        }

        Ok(Some(PriceBar::new(
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        )))
    }

    /// Find column index by name
    fn find_column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| AnalysisError::DataError(format!("Column '{}' not found", name)))
    }
}

fn is_missing_cell(cell: &str) -> bool {
    cell.is_empty() || cell.eq_ignore_ascii_case("null") || cell.eq_ignore_ascii_case("nan")
}

fn parse_price(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64> {
    record
        .get(idx)
        .ok_or_else(|| AnalysisError::DataError(format!("Missing {}", name)))?
        .parse()
        .map_err(|_| AnalysisError::ParseError(format!("Invalid {} price", name)))
}

fn parse_volume(record: &csv::StringRecord, idx: usize) -> Result<Volume> {
    let cell = record
        .get(idx)
        .ok_or_else(|| AnalysisError::DataError("Missing volume".to_string()))?;
    if let Ok(v) = cell.parse::<Volume>() {
        return Ok(v);
    }
    // Some exports write volume as a float ("12345.0")
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as Volume),
        _ => Err(AnalysisError::ParseError(format!("Invalid volume: {}", cell))),
    }
}

impl MarketDataProvider for CsvDirectoryProvider {
    fn price_history(&self, symbol: &str) -> Result<PriceHistory> {
        let path = self.csv_path(symbol);
        if !path.exists() {
            log::warn!("No data file for {} at {}", symbol, path.display());
            return Ok(PriceHistory::empty());
        }
        self.load_csv(&path)
    }

    fn fundamentals(&self, symbol: &str) -> Result<Fundamentals> {
        let path = self.fundamentals_path(symbol);
        if !path.exists() {
            return Ok(Fundamentals::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &str) {
        let mut file = fs::File::create(dir.path().join(name)).unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
    }

    #[test]
    fn test_csv_provider_load() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "TCS.NS.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,3800.0,3850.0,3790.0,3840.0,3801.5,1200000\n\
             2024-01-03,3840.0,3860.0,3800.0,3810.0,3771.8,980000.0\n",
        );

        let provider = CsvDirectoryProvider::new(dir.path());
        let history = provider.price_history("TCS.NS").unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.adjusted_close(), vec![3801.5, 3771.8]);
        assert_eq!(history.bars()[1].volume, 980_000);
    }

    #[test]
    fn test_csv_provider_skips_null_rows() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "INFY.NS.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,1500,1510,1490,1505,1500,100\n\
             2024-01-03,null,null,null,null,null,null\n\
             2024-01-04,1505,1520,1500,1515,1510,200\n",
        );

        let provider = CsvDirectoryProvider::new(dir.path());
        let history = provider.price_history("INFY.NS").unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let provider = CsvDirectoryProvider::new(dir.path());
        assert!(provider.price_history("NOPE").unwrap().is_empty());
        assert_eq!(provider.fundamentals("NOPE").unwrap(), Fundamentals::default());
    }

    #[test]
    fn test_invalid_ohlc_validation() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "BAD.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,100,90,95,98,98,100\n",
        );

        let provider = CsvDirectoryProvider::new(dir.path());
        assert!(provider.price_history("BAD").is_err());
    }

    #[test]
    fn test_missing_column() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "X.csv", "Date,Open,High,Low,Close,Volume\n");

        let provider = CsvDirectoryProvider::new(dir.path());
        let err = provider.price_history("X").unwrap_err();
        assert!(err.to_string().contains("Adj Close"));
    }

    #[test]
    fn test_fundamentals_sidecar() {
        let dir = TempDir::new().unwrap();
        write_file(
            &dir,
            "WIPRO.NS.fundamentals.json",
            r#"{"marketCap": 2.5e12, "currency": "INR", "open": 450.0, "currentPrice": 459.0}"#,
        );

        let provider = CsvDirectoryProvider::new(dir.path());
        let f = provider.fundamentals("WIPRO.NS").unwrap();
        assert_eq!(f.market_cap, Some(2.5e12));
        assert!(f.day_change().is_some());
    }
}
