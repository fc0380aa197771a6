//! Prediction orchestrator
//!
//! Validates the inputs, runs the indicator, trend, forecast, confidence and
//! narrative steps over one immutable series, and assembles a [`Prediction`].
//! Holds only configuration, so a single `Predictor` can be shared freely.

use tracing::{debug, info};

use crate::confidence::ConfidenceScorer;
use crate::config::EngineConfig;
use crate::error::{EngineResult, ForecastError};
use crate::forecast::ForecastEngine;
use crate::indicators::{oscillator, trailing, trend_average};
use crate::narrative::{NarrativeComposer, NarrativeInput};
use crate::types::{Horizon, IndicatorSet, Prediction, PriceSeries};

#[derive(Debug, Clone)]
pub struct Predictor {
    config: EngineConfig,
    forecaster: ForecastEngine,
    scorer: ConfidenceScorer,
    composer: NarrativeComposer,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl Predictor {
    /// Validate `config` and wire up the engine components
    pub fn new(config: EngineConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let forecaster = ForecastEngine::new(config.forecast.clone());
        let scorer = ConfidenceScorer::new(config.confidence.clone(), config.forecast.clone());
        let composer = NarrativeComposer::new(config.indicators.clone());
        Self {
            config,
            forecaster,
            scorer,
            composer,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Trend average over the trailing `trend_window` prices and oscillator
    /// over the trailing `oscillator_window + 1` prices
    pub fn indicators(&self, prices: &[f64]) -> IndicatorSet {
        let cfg = &self.config.indicators;
        IndicatorSet {
            trend_average: trend_average(trailing(prices, cfg.trend_window), cfg.trend_window),
            oscillator: oscillator(
                trailing(prices, cfg.oscillator_window + 1),
                cfg.oscillator_window,
            ),
        }
    }

    /// Like [`Predictor::predict`] with a raw step count; `steps <= 0` is
    /// rejected before the series is looked at.
    pub fn predict_steps(
        &self,
        series: &PriceSeries,
        steps: i64,
        target_price: f64,
    ) -> EngineResult<Prediction> {
        let horizon = Horizon::new(steps)?;
        self.predict(series, horizon, target_price)
    }

    pub fn predict(
        &self,
        series: &PriceSeries,
        horizon: Horizon,
        target_price: f64,
    ) -> EngineResult<Prediction> {
        self.validate(series, target_price)?;

        let prices = series.closes();
        let indicators = self.indicators(prices);
        debug!(
            trend_average = indicators.trend_average,
            oscillator = indicators.oscillator,
            "Indicators computed"
        );

        let extrapolation = self
            .forecaster
            .forecast(prices, horizon, target_price, &indicators);

        let confidence = self.scorer.score(
            prices,
            extrapolation.drift,
            indicators.oscillator,
            extrapolation.average_divergence,
        );

        let market_state = self.composer.market_state(indicators.oscillator);
        let narrative = self.composer.compose(&NarrativeInput {
            drift: extrapolation.drift,
            indicators,
            average_divergence: extrapolation.average_divergence,
            divergence_lookback: self.config.forecast.divergence_lookback,
            market_state,
            reversal_detected: extrapolation.reversal_detected(),
            adjustments: &extrapolation.adjustments,
        });

        info!(
            "Predicted {:.2} in {} (target {:.2}, meets={}, confidence={}%)",
            extrapolation.predicted_price,
            horizon,
            target_price,
            extrapolation.meets_target,
            confidence
        );

        Ok(Prediction {
            predicted_price: extrapolation.predicted_price,
            linear_forecast: extrapolation.linear_forecast,
            meets_target: extrapolation.meets_target,
            confidence,
            target_price,
            horizon,
            drift: extrapolation.drift,
            average_divergence: extrapolation.average_divergence,
            reversal_detected: extrapolation.reversal_detected(),
            adjustments: extrapolation.adjustments,
            indicators,
            market_state,
            narrative,
            series: series.clone(),
        })
    }

    fn validate(&self, series: &PriceSeries, target_price: f64) -> EngineResult<()> {
        if !target_price.is_finite() {
            return Err(ForecastError::InvalidTarget(target_price));
        }

        let required = self.config.min_series_len();
        if series.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                actual: series.len(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::types::ForecastResult;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        PriceSeries::from_closes(closes, end, Duration::minutes(1)).unwrap()
    }

    #[test]
    fn test_flat_scenario() {
        let prediction = Predictor::default()
            .predict_steps(&series(&[100.0; 30]), 5, 100.0)
            .unwrap();

        assert_relative_eq!(prediction.indicators.trend_average, 100.0);
        assert_eq!(prediction.indicators.oscillator, 100.0);
        assert_eq!(prediction.drift, 0.0);
        assert_eq!(prediction.linear_forecast, 100.0);
        assert_eq!(prediction.predicted_price, 75.0);
        assert!(!prediction.meets_target);
        assert_eq!(prediction.confidence, 60);
        assert_eq!(
            prediction.result(),
            ForecastResult {
                predicted_price: 75.0,
                meets_target: false,
                confidence: 60,
            }
        );
    }

    #[test]
    fn test_ramp_scenario_adjustment_flips_call() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let target = 129.0 + 10.0;
        let prediction = Predictor::default()
            .predict_steps(&series(&closes), 10, target)
            .unwrap();

        assert_relative_eq!(prediction.drift, 1.0);
        assert_relative_eq!(prediction.linear_forecast, target);
        assert_eq!(prediction.indicators.oscillator, 100.0);
        assert_relative_eq!(prediction.predicted_price, target - 25.0);
        assert!(!prediction.meets_target);
    }

    #[test]
    fn test_invalid_horizon_rejected_before_data_checks() {
        let predictor = Predictor::default();
        let short = series(&[1.0, 2.0]);
        assert_eq!(
            predictor.predict_steps(&short, 0, 1.0).unwrap_err(),
            ForecastError::InvalidHorizon { steps: 0 }
        );
        assert_eq!(
            predictor.predict_steps(&short, -4, 1.0).unwrap_err(),
            ForecastError::InvalidHorizon { steps: -4 }
        );
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let err = Predictor::default()
            .predict_steps(&series(&[10.0; 14]), 3, 10.0)
            .unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientData {
                required: 15,
                actual: 14
            }
        );
    }

    #[test]
    fn test_non_finite_target_rejected() {
        let err = Predictor::default()
            .predict_steps(&series(&[10.0; 20]), 3, f64::INFINITY)
            .unwrap_err();
        assert!(matches!(err, ForecastError::InvalidTarget(_)));
    }

    #[test]
    fn test_indicators_use_trailing_windows() {
        let mut closes = vec![1.0; 20];
        closes.extend((0..15).map(|i| 50.0 - i as f64));
        let indicators = Predictor::default().indicators(&closes);
        assert_eq!(indicators.oscillator, 0.0);
        assert!(indicators.trend_average < 44.0);
    }

    #[test]
    fn test_new_rejects_inverted_confidence_bounds() {
        let mut config = EngineConfig::default();
        config.confidence.floor = 90;
        config.confidence.ceiling = 50;
        assert!(Predictor::new(config).is_err());
    }

    #[test]
    fn test_new_rejects_zero_trend_window() {
        let mut config = EngineConfig::default();
        config.indicators.trend_window = 0;
        assert!(Predictor::new(config).is_err());
    }

    #[test]
    fn test_prediction_keeps_series_for_charting() {
        let s = series(&[100.0; 16]);
        let prediction = Predictor::default().predict_steps(&s, 1, 50.0).unwrap();
        assert_eq!(prediction.series, s);
        assert_eq!(prediction.current_price(), 100.0);
    }
}
