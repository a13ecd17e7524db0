//! Analytical engine
//!
//! Pure stages over an already-loaded [`PriceHistory`](crate::data::PriceHistory):
//! - returns: daily returns and rolling volatility
//! - technical: SMA, EWMA, RSI, MACD
//! - seasonal: mean return by month, weekday and year
//! - volume: volume moving average and monthly mean volume
//! - sector: additive cumulative performance across instruments
//! - forecast: one-step least-squares trend extrapolation
//!
//! No stage fails. Missing history shows up as undefined values or an absent
//! forecast, and an empty history yields empty outputs.

pub mod forecast;
pub mod frame;
pub mod returns;
pub mod seasonal;
pub mod sector;
pub mod technical;
pub mod volume;

pub use forecast::{predict_price, ForecastResult, LinearFit, Trend, DEFAULT_FORECAST_DAYS};
pub use frame::{AnalysisFrame, FrameRow};
pub use returns::{
    calculate_volatility, daily_returns, rolling_volatility, DailyReturns, RollingVolatility,
    VolatilityAnalysis,
};
pub use seasonal::{calculate_seasonal_trends, SeasonalAggregate};
pub use sector::{calculate_sector_performance, cumulative_returns, SectorMatrix};
pub use technical::{
    calculate_technical_indicators, exponential_moving_average, relative_strength_index,
    simple_moving_average, ExponentialMovingAverage, MacdSeries, SimpleMovingAverage,
    TechnicalIndicators, MACD, RSI,
};
pub use volume::{calculate_volume_analysis, VolumeAnalysis};
