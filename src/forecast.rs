//! Forecast extrapolation with reversal-aware adjustments
//!
//! The linear forecast extends the per-step drift over the horizon. Fixed
//! corrections are then stacked on top when the oscillator sits at an extreme
//! or when the trend average disagrees with the drift direction. Corrections
//! do not scale with the horizon or the drift size.

use tracing::debug;

use crate::config::ForecastConfig;
use crate::trend::{average_divergence, per_step_drift};
use crate::types::{Adjustment, Horizon, IndicatorSet};

/// Forecast before a confidence score is attached
#[derive(Debug, Clone, PartialEq)]
pub struct Extrapolation {
    pub drift: f64,
    pub linear_forecast: f64,
    pub predicted_price: f64,
    pub meets_target: bool,
    pub average_divergence: Option<f64>,
    pub adjustments: Vec<Adjustment>,
}

impl Extrapolation {
    pub fn reversal_detected(&self) -> bool {
        !self.adjustments.is_empty()
    }
}

/// Corrections that apply for this drift / oscillator / divergence combination.
///
/// The oscillator branch and the divergence branch are independent; within
/// each branch at most one correction fires.
pub fn adjustments(
    config: &ForecastConfig,
    drift: f64,
    oscillator: f64,
    divergence: Option<f64>,
) -> Vec<Adjustment> {
    let mut applied = Vec::with_capacity(2);

    if oscillator > config.overbought_trigger {
        applied.push(Adjustment::OverboughtCorrection(-config.overbought_correction));
    } else if oscillator < config.oversold_trigger {
        applied.push(Adjustment::OversoldRebound(config.oversold_rebound));
    }

    if let Some(divergence) = divergence {
        if drift > 0.0 && divergence < 0.0 {
            applied.push(Adjustment::WeakeningUptrend(-config.weakening_trend_correction));
        } else if drift < 0.0 && divergence > 0.0 {
            applied.push(Adjustment::WeakeningDowntrend(config.weakening_trend_correction));
        }
    }

    applied
}

/// True when any forecast correction would fire
pub fn reversal_detected(
    config: &ForecastConfig,
    drift: f64,
    oscillator: f64,
    divergence: Option<f64>,
) -> bool {
    !adjustments(config, drift, oscillator, divergence).is_empty()
}

/// Extrapolates the last price and applies the configured corrections
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Forecast `horizon` steps past the last price and compare with `target_price`.
    ///
    /// `prices` must hold at least two values; the divergence correction is
    /// skipped when it holds fewer than `divergence_lookback`.
    pub fn forecast(
        &self,
        prices: &[f64],
        horizon: Horizon,
        target_price: f64,
        indicators: &IndicatorSet,
    ) -> Extrapolation {
        let drift = per_step_drift(prices);
        let last = prices.last().copied().unwrap_or_default();
        let linear_forecast = last + drift * f64::from(horizon.steps());

        let divergence = average_divergence(
            prices,
            indicators.trend_average,
            self.config.divergence_lookback,
        );
        let applied = adjustments(&self.config, drift, indicators.oscillator, divergence);
        let predicted_price = linear_forecast + applied.iter().map(Adjustment::delta).sum::<f64>();

        debug!(
            drift,
            linear_forecast,
            predicted_price,
            adjustments = applied.len(),
            "Forecast extrapolated"
        );

        Extrapolation {
            drift,
            linear_forecast,
            predicted_price,
            meets_target: predicted_price >= target_price,
            average_divergence: divergence,
            adjustments: applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn engine() -> ForecastEngine {
        ForecastEngine::new(ForecastConfig::default())
    }

    fn horizon(steps: i64) -> Horizon {
        Horizon::new(steps).unwrap()
    }

    #[test]
    fn test_overbought_includes_oscillator_100() {
        let applied = adjustments(&ForecastConfig::default(), 0.0, 100.0, Some(0.0));
        assert_eq!(applied, vec![Adjustment::OverboughtCorrection(-25.0)]);
    }

    #[test]
    fn test_trigger_boundaries_are_strict() {
        let config = ForecastConfig::default();
        assert!(adjustments(&config, 0.0, 80.0, None).is_empty());
        assert!(adjustments(&config, 0.0, 20.0, None).is_empty());
        assert_eq!(
            adjustments(&config, 0.0, 19.9, None),
            vec![Adjustment::OversoldRebound(25.0)]
        );
    }

    #[test]
    fn test_weakening_trend_branches() {
        let config = ForecastConfig::default();
        assert_eq!(
            adjustments(&config, 1.0, 50.0, Some(-3.0)),
            vec![Adjustment::WeakeningUptrend(-20.0)]
        );
        assert_eq!(
            adjustments(&config, -1.0, 50.0, Some(3.0)),
            vec![Adjustment::WeakeningDowntrend(20.0)]
        );
        assert!(adjustments(&config, 1.0, 50.0, Some(3.0)).is_empty());
        assert!(adjustments(&config, 1.0, 50.0, None).is_empty());
    }

    #[test]
    fn test_adjustments_stack() {
        let applied = adjustments(&ForecastConfig::default(), -2.0, 10.0, Some(4.0));
        assert_eq!(
            applied,
            vec![
                Adjustment::OversoldRebound(25.0),
                Adjustment::WeakeningDowntrend(20.0)
            ]
        );
        assert!(reversal_detected(&ForecastConfig::default(), -2.0, 10.0, Some(4.0)));
    }

    #[test]
    fn test_flat_series_overbought_correction() {
        let prices = [100.0; 30];
        let indicators = IndicatorSet {
            trend_average: 100.0,
            oscillator: 100.0,
        };
        let result = engine().forecast(&prices, horizon(5), 100.0, &indicators);
        assert_eq!(result.drift, 0.0);
        assert_eq!(result.linear_forecast, 100.0);
        assert_eq!(result.predicted_price, 75.0);
        assert!(!result.meets_target);
        assert!(result.reversal_detected());
    }

    #[test]
    fn test_neutral_momentum_is_pure_extrapolation() {
        let prices: Vec<f64> = (0..30).map(|i| 200.0 - 2.0 * i as f64).collect();
        let indicators = IndicatorSet {
            trend_average: 130.0,
            oscillator: 50.0,
        };
        // Reference price is 200 - 2*20 = 160; trend average below it agrees with downtrend
        let result = engine().forecast(&prices, horizon(3), 130.0, &indicators);
        assert_relative_eq!(result.drift, -2.0);
        assert_relative_eq!(result.predicted_price, 142.0 - 6.0);
        assert!(result.adjustments.is_empty());
        assert!(result.meets_target);
    }

    #[test]
    fn test_meets_target_is_inclusive() {
        let prices = [10.0, 11.0, 12.0];
        let indicators = IndicatorSet {
            trend_average: 12.0,
            oscillator: 50.0,
        };
        let result = engine().forecast(&prices, horizon(2), 14.0, &indicators);
        assert_eq!(result.predicted_price, 14.0);
        assert!(result.meets_target);
        // Shorter than the lookback: divergence skipped
        assert_eq!(result.average_divergence, None);
    }
}
