//! Confidence scoring
//!
//! Score = trend strength x price stability, less flat penalties for a weak
//! trend, low stability and a detected reversal, rounded once and clamped into
//! the configured bounds.

use itertools::Itertools;
use serde::Serialize;
use statrs::statistics::Statistics;
use tracing::debug;

use crate::config::{ConfidenceConfig, ForecastConfig};
use crate::forecast::reversal_detected;

/// Intermediate values behind a confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceBreakdown {
    pub mean_abs_step: f64,
    /// `1 - mean_abs_step / last`; negative for extremely volatile series
    pub stability: f64,
    pub trend_strength: f64,
    pub raw_score: f64,
    pub penalty: f64,
    pub reversal: bool,
    pub score: u8,
}

/// Mean of `|p[i] - p[i-1]|` over the whole series (0.0 for fewer than two prices)
pub fn mean_abs_step_change(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    let steps: Vec<f64> = prices
        .iter()
        .tuple_windows()
        .map(|(prev, next)| (next - prev).abs())
        .collect();
    steps.iter().mean()
}

/// `1 - mean_abs_step / last_price`
pub fn stability(prices: &[f64]) -> f64 {
    match prices.last() {
        Some(&last) if last != 0.0 => 1.0 - mean_abs_step_change(prices) / last,
        _ => 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    config: ConfidenceConfig,
    reversal: ForecastConfig,
}

impl ConfidenceScorer {
    /// `reversal` supplies the same triggers the forecast corrections use
    pub fn new(config: ConfidenceConfig, reversal: ForecastConfig) -> Self {
        Self { config, reversal }
    }

    pub fn score(&self, prices: &[f64], drift: f64, oscillator: f64, divergence: Option<f64>) -> u8 {
        self.evaluate(prices, drift, oscillator, divergence).score
    }

    pub fn evaluate(
        &self,
        prices: &[f64],
        drift: f64,
        oscillator: f64,
        divergence: Option<f64>,
    ) -> ConfidenceBreakdown {
        let cfg = &self.config;

        let mean_abs_step = mean_abs_step_change(prices);
        let stability = stability(prices);
        let trend_strength = drift.abs() * cfg.trend_scale;
        let raw_score = trend_strength * stability;

        let mut penalty = 0.0;
        if trend_strength < cfg.weak_trend_threshold {
            penalty += cfg.weak_trend_penalty;
        }
        if stability < cfg.low_stability_threshold {
            penalty += cfg.low_stability_penalty;
        }
        let reversal = reversal_detected(&self.reversal, drift, oscillator, divergence);
        if reversal {
            penalty += cfg.reversal_penalty;
        }

        let score = self.finalize(raw_score - penalty);

        debug!(
            stability,
            trend_strength,
            raw_score,
            penalty,
            score,
            "Confidence scored"
        );

        ConfidenceBreakdown {
            mean_abs_step,
            stability,
            trend_strength,
            raw_score,
            penalty,
            reversal,
            score,
        }
    }

    /// Round once, then bound: floor first, ceiling last. NaN falls to the
    /// floor. Inverted bounds resolve to the ceiling instead of panicking.
    fn finalize(&self, value: f64) -> u8 {
        let floor = f64::from(self.config.floor);
        let ceiling = f64::from(self.config.ceiling);
        if value.is_nan() {
            return self.config.floor.min(self.config.ceiling);
        }
        value.round().max(floor).min(ceiling) as u8
    }
}
