//! Explanation text for a prediction
//!
//! Formatting only: nothing here feeds back into the numbers.

use crate::config::IndicatorConfig;
use crate::types::{Adjustment, IndicatorSet, MarketState};

const CLOSING: &str =
    "Momentum and reversal detection informed the adjustment applied to the linear forecast.";

/// Inputs the narrative is rendered from
#[derive(Debug, Clone, Copy)]
pub struct NarrativeInput<'a> {
    pub drift: f64,
    pub indicators: IndicatorSet,
    pub average_divergence: Option<f64>,
    pub divergence_lookback: usize,
    pub market_state: MarketState,
    pub reversal_detected: bool,
    pub adjustments: &'a [Adjustment],
}

#[derive(Debug, Clone)]
pub struct NarrativeComposer {
    config: IndicatorConfig,
}

impl NarrativeComposer {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    /// Oscillator label: above `overbought_label` is Overbought, below
    /// `oversold_label` is Oversold
    pub fn market_state(&self, oscillator: f64) -> MarketState {
        if oscillator > self.config.overbought_label {
            MarketState::Overbought
        } else if oscillator < self.config.oversold_label {
            MarketState::Oversold
        } else {
            MarketState::Neutral
        }
    }

    pub fn compose(&self, input: &NarrativeInput<'_>) -> String {
        let mut lines = Vec::with_capacity(6);

        let direction = if input.drift > 0.0 {
            "upward"
        } else if input.drift < 0.0 {
            "downward"
        } else {
            "flat"
        };
        lines.push(format!(
            "Trend is {} at {:+.4} per step.",
            direction, input.drift
        ));

        let average = match input.average_divergence {
            Some(d) if d > 0.0 => format!(
                "The {}-period trend average ({:.2}) is above the price {} steps ago, so the average is rising.",
                self.config.trend_window, input.indicators.trend_average, input.divergence_lookback
            ),
            Some(d) if d < 0.0 => format!(
                "The {}-period trend average ({:.2}) is below the price {} steps ago, so the average is falling.",
                self.config.trend_window, input.indicators.trend_average, input.divergence_lookback
            ),
            Some(_) => format!(
                "The {}-period trend average ({:.2}) is level with the price {} steps ago.",
                self.config.trend_window, input.indicators.trend_average, input.divergence_lookback
            ),
            None => format!(
                "The {}-period trend average is {:.2}; not enough history to compare it with an older price.",
                self.config.trend_window, input.indicators.trend_average
            ),
        };
        lines.push(average);

        let state = match input.market_state {
            MarketState::Overbought => "downtrend risk",
            MarketState::Oversold => "rebound possible",
            MarketState::Neutral => "no momentum extreme",
        };
        lines.push(format!(
            "Market state: {} (oscillator {:.2}, {}).",
            input.market_state, input.indicators.oscillator, state
        ));

        if input.reversal_detected {
            let applied = input
                .adjustments
                .iter()
                .map(|a| format!("{} {:+.2}", a.describe(), a.delta()))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("Reversal risk detected: {}.", applied));
        } else {
            lines.push("No reversal signal detected.".to_string());
        }

        lines.push(CLOSING.to_string());
        lines.join(" ")
    }
}
