//! Analysis parameters

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Window and span parameters for every analysis stage.
///
/// Defaults are the conventional daily-chart settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Rolling volatility windows over daily returns
    pub volatility_windows: Vec<usize>,
    /// Simple moving average windows over adjusted close
    pub sma_windows: Vec<usize>,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    /// Moving average window over volume
    pub volume_ma_window: usize,
    /// Trailing rows used to fit the forecast trend line
    pub forecast_days: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            volatility_windows: vec![30, 90],
            sma_windows: vec![50, 200],
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            volume_ma_window: 20,
            forecast_days: 60,
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(contents)
            .map_err(|e| AnalysisError::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameters the stages cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.volatility_windows.iter().any(|&w| w == 0) {
            return Err(AnalysisError::ConfigError(
                "Volatility windows must be greater than 0".to_string(),
            ));
        }
        if self.sma_windows.iter().any(|&w| w == 0) {
            return Err(AnalysisError::ConfigError(
                "SMA windows must be greater than 0".to_string(),
            ));
        }
        if self.rsi_period == 0 || self.volume_ma_window == 0 {
            return Err(AnalysisError::ConfigError(
                "RSI period and volume MA window must be greater than 0".to_string(),
            ));
        }
        if self.macd_fast == 0 || self.macd_slow == 0 || self.macd_signal == 0 {
            return Err(AnalysisError::ConfigError(
                "MACD spans must be greater than 0".to_string(),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(AnalysisError::ConfigError(format!(
                "MACD fast span ({}) must be shorter than slow span ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if self.forecast_days < 2 {
            return Err(AnalysisError::ConfigError(
                "Forecast needs at least 2 days to fit a trend".to_string(),
            ));
        }
        Ok(())
    }
}
