//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files with environment
//! variable overrides for the market-data source. Every engine constant is a
//! named field here so no heuristic value is hard-coded in the engine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise defaults plus environment overrides
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => {
                Self::from_file(path).with_context(|| format!("Failed to load config from {}", path))
            }
            None => {
                let mut config = Config::default();
                config.apply_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    fn apply_env(&mut self) {
        if let Ok(symbol) = std::env::var("FORECAST_SYMBOL") {
            self.source.symbol = symbol;
        }
        if let Ok(interval) = std::env::var("FORECAST_INTERVAL") {
            self.source.interval = interval;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.source.limit < 2 {
            anyhow::bail!("source.limit must be at least 2, got {}", self.source.limit);
        }
        if self.schedule.refresh_secs == 0 {
            anyhow::bail!("schedule.refresh_secs must be positive");
        }
        Ok(())
    }
}

/// Engine configuration: indicator windows, adjustment constants and
/// confidence policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub indicators: IndicatorConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub confidence: ConfidenceConfig,
    /// Minimum number of prices accepted regardless of windows (default: 15)
    #[serde(default = "default_minimum_points")]
    pub minimum_points: usize,
}

fn default_minimum_points() -> usize { 15 }

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            forecast: ForecastConfig::default(),
            confidence: ConfidenceConfig::default(),
            minimum_points: default_minimum_points(),
        }
    }
}

impl EngineConfig {
    /// Shortest series the engine will accept with these windows
    pub fn min_series_len(&self) -> usize {
        [
            2,
            self.indicators.trend_window,
            self.indicators.oscillator_window + 1,
            self.forecast.divergence_lookback,
            self.minimum_points,
        ]
        .into_iter()
        .max()
        .unwrap_or(2)
    }

    pub fn validate(&self) -> Result<()> {
        if self.indicators.trend_window == 0 {
            anyhow::bail!("indicators.trend_window must be positive");
        }
        if self.indicators.oscillator_window == 0 {
            anyhow::bail!("indicators.oscillator_window must be positive");
        }
        if self.forecast.divergence_lookback == 0 {
            anyhow::bail!("forecast.divergence_lookback must be positive");
        }
        if self.confidence.floor > self.confidence.ceiling {
            anyhow::bail!(
                "confidence.floor ({}) must not exceed confidence.ceiling ({})",
                self.confidence.floor,
                self.confidence.ceiling
            );
        }
        Ok(())
    }
}

/// Indicator windows and market-state label thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    /// Trailing window for the trend average (default: 9)
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,

    /// Oscillator period; consumes `oscillator_window + 1` prices (default: 14)
    #[serde(default = "default_oscillator_window")]
    pub oscillator_window: usize,

    /// Oscillator above this is labelled Overbought (default: 70)
    #[serde(default = "default_overbought_label")]
    pub overbought_label: f64,

    /// Oscillator below this is labelled Oversold (default: 30)
    #[serde(default = "default_oversold_label")]
    pub oversold_label: f64,
}

fn default_trend_window() -> usize { 9 }
fn default_oscillator_window() -> usize { 14 }
fn default_overbought_label() -> f64 { 70.0 }
fn default_oversold_label() -> f64 { 30.0 }

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            trend_window: default_trend_window(),
            oscillator_window: default_oscillator_window(),
            overbought_label: default_overbought_label(),
            oversold_label: default_oversold_label(),
        }
    }
}

/// Fixed-magnitude forecast corrections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Oscillator strictly above this triggers the overbought correction (default: 80)
    #[serde(default = "default_overbought_trigger")]
    pub overbought_trigger: f64,

    /// Oscillator strictly below this triggers the oversold rebound (default: 20)
    #[serde(default = "default_oversold_trigger")]
    pub oversold_trigger: f64,

    /// Subtracted when overbought (default: 25)
    #[serde(default = "default_overbought_correction")]
    pub overbought_correction: f64,

    /// Added when oversold (default: 25)
    #[serde(default = "default_oversold_rebound")]
    pub oversold_rebound: f64,

    /// Applied against a drift the trend average disagrees with (default: 20)
    #[serde(default = "default_weakening_trend_correction")]
    pub weakening_trend_correction: f64,

    /// Distance back from the end of the series of the divergence reference price (default: 10)
    #[serde(default = "default_divergence_lookback")]
    pub divergence_lookback: usize,
}

fn default_overbought_trigger() -> f64 { 80.0 }
fn default_oversold_trigger() -> f64 { 20.0 }
fn default_overbought_correction() -> f64 { 25.0 }
fn default_oversold_rebound() -> f64 { 25.0 }
fn default_weakening_trend_correction() -> f64 { 20.0 }
fn default_divergence_lookback() -> usize { 10 }

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            overbought_trigger: default_overbought_trigger(),
            oversold_trigger: default_oversold_trigger(),
            overbought_correction: default_overbought_correction(),
            oversold_rebound: default_oversold_rebound(),
            weakening_trend_correction: default_weakening_trend_correction(),
            divergence_lookback: default_divergence_lookback(),
        }
    }
}

/// Confidence scoring policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceConfig {
    /// Lowest reported confidence (default: 60)
    #[serde(default = "default_floor")]
    pub floor: u8,

    /// Highest reported confidence (default: 99)
    #[serde(default = "default_ceiling")]
    pub ceiling: u8,

    /// Multiplier turning |drift| into trend strength (default: 500)
    #[serde(default = "default_trend_scale")]
    pub trend_scale: f64,

    /// Trend strength below this is penalized (default: 60)
    #[serde(default = "default_weak_trend_threshold")]
    pub weak_trend_threshold: f64,

    #[serde(default = "default_weak_trend_penalty")]
    pub weak_trend_penalty: f64,

    /// Stability below this is penalized (default: 0.995)
    #[serde(default = "default_low_stability_threshold")]
    pub low_stability_threshold: f64,

    #[serde(default = "default_low_stability_penalty")]
    pub low_stability_penalty: f64,

    /// Subtracted when a reversal is detected (default: 10)
    #[serde(default = "default_reversal_penalty")]
    pub reversal_penalty: f64,
}

fn default_floor() -> u8 { 60 }
fn default_ceiling() -> u8 { 99 }
fn default_trend_scale() -> f64 { 500.0 }
fn default_weak_trend_threshold() -> f64 { 60.0 }
fn default_weak_trend_penalty() -> f64 { 5.0 }
fn default_low_stability_threshold() -> f64 { 0.995 }
fn default_low_stability_penalty() -> f64 { 5.0 }
fn default_reversal_penalty() -> f64 { 10.0 }

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            ceiling: default_ceiling(),
            trend_scale: default_trend_scale(),
            weak_trend_threshold: default_weak_trend_threshold(),
            weak_trend_penalty: default_weak_trend_penalty(),
            low_stability_threshold: default_low_stability_threshold(),
            low_stability_penalty: default_low_stability_penalty(),
            reversal_penalty: default_reversal_penalty(),
        }
    }
}

/// Market-data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Candle interval, also the length of one horizon step (default: "1m")
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Number of candles requested (default: 30)
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_symbol() -> String { "BTCUSDT".to_string() }
fn default_interval() -> String { "1m".to_string() }
fn default_limit() -> u32 { 30 }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            interval: default_interval(),
            limit: default_limit(),
        }
    }
}

/// Periodic refresh cadence for `watch`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_refresh_secs() -> u64 { 60 }

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            refresh_secs: default_refresh_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.engine.indicators.trend_window, 9);
        assert_eq!(config.engine.indicators.oscillator_window, 14);
        assert_eq!(config.engine.confidence.floor, 60);
        assert_eq!(config.engine.confidence.ceiling, 99);
        assert_eq!(config.engine.min_series_len(), 15);
        assert_eq!(config.source.limit, 30);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "engine": { "confidence": { "floor": 30 }, "minimum_points": 5 } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.engine.confidence.floor, 30);
        assert_eq!(config.engine.confidence.ceiling, 99);
        assert_eq!(config.engine.forecast.overbought_correction, 25.0);
        // Oscillator window still requires 15 prices
        assert_eq!(config.engine.min_series_len(), 15);
    }

    #[test]
    fn test_min_series_len_follows_largest_window() {
        let mut engine = EngineConfig::default();
        engine.indicators.oscillator_window = 20;
        assert_eq!(engine.min_series_len(), 21);
        engine.minimum_points = 40;
        assert_eq!(engine.min_series_len(), 40);
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = Config::default();
        config.engine.confidence.floor = 90;
        config.engine.confidence.ceiling = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.engine.indicators.trend_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_reads_json() {
        let path = std::env::temp_dir().join("price_forecast_config_test.json");
        fs::write(&path, r#"{ "schedule": { "refresh_secs": 15 } }"#).unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.schedule.refresh_secs, 15);
        fs::remove_file(&path).ok();
    }
}
