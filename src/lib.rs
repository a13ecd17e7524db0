//! # rusty_stock_analytics
//!
//! Analytical signals from a daily price/volume series: returns and rolling
//! volatility, technical indicators (SMA, EWMA, RSI, MACD), seasonal return
//! aggregates, volume trend, cross-instrument cumulative performance and a
//! one-step trend-line forecast.
//!
//! Every stage is a pure function of an already-loaded [`data::PriceHistory`].
//! Data fetching and chart rendering are left to collaborators: a
//! [`data::MarketDataProvider`] supplies histories and the serializable
//! [`report::AnalysisReport`] is handed to whatever draws it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rusty_stock_analytics::prelude::*;
//!
//! let provider = CsvDirectoryProvider::new("data");
//! let history = fetch_or_empty(&provider, "RELIANCE.NS");
//!
//! let volatility = calculate_volatility(&history, &[30, 90]);
//! let seasonal = calculate_seasonal_trends(&volatility.daily_return);
//!
//! let frame = AnalysisFrame::build(history, &AnalysisConfig::default());
//! if let Some(forecast) = frame.forecast(60) {
//!     println!("next close ~ {:.2} (R² {:.2})", forecast.predicted_price, forecast.fit_score);
//! }
//! ```

pub mod analysis;
pub mod calendar;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod types;

pub mod prelude {
    //! Commonly used types and functions
    pub use crate::analysis::{
        calculate_sector_performance, calculate_seasonal_trends, calculate_technical_indicators,
        calculate_volatility, calculate_volume_analysis, predict_price, AnalysisFrame,
        ForecastResult, SeasonalAggregate, SectorMatrix, Trend,
    };
    pub use crate::calendar::TradingWeekday;
    pub use crate::config::AnalysisConfig;
    pub use crate::data::{
        fetch_or_empty, CsvDirectoryProvider, Fundamentals, InMemoryProvider, MarketDataProvider,
        PriceHistory,
    };
    pub use crate::error::{AnalysisError, Result};
    pub use crate::report::AnalysisReport;
    pub use crate::types::*;
}
