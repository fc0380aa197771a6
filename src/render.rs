//! Presentation of prediction results
//!
//! Stateless: every call takes the full prediction and returns text, so there
//! is no chart or terminal handle to create, reuse or tear down.

use anyhow::{Context, Result};

use crate::error::ForecastError;
use crate::types::Prediction;

const RULE_WIDTH: usize = 60;

/// Plain-text report of one prediction
pub fn render_text(symbol: &str, prediction: &Prediction) -> String {
    let series = prediction.series.points();
    let first = series.first().map(|p| p.datetime);
    let last = series.last().map(|p| p.datetime);

    let mut out = String::new();
    out.push_str(&format!("\n{}\n", "=".repeat(RULE_WIDTH)));
    out.push_str(&format!("PRICE FORECAST - {}\n", symbol));
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
    out.push_str(&format!("Current Price:      {:.2}\n", prediction.current_price()));
    out.push_str(&format!("Horizon:            {}\n", prediction.horizon));
    out.push_str(&format!("Linear Forecast:    {:.2}\n", prediction.linear_forecast));
    out.push_str(&format!("Predicted Price:    {:.2}\n", prediction.predicted_price));
    out.push_str(&format!("Target Price:       {:.2}\n", prediction.target_price));
    out.push_str(&format!(
        "Prediction:         {}\n",
        if prediction.meets_target { "Yes" } else { "No" }
    ));
    out.push_str(&format!("Confidence:         {}%\n", prediction.confidence));
    out.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH)));
    out.push_str(&format!(
        "Trend Average:      {:.2}\n",
        prediction.indicators.trend_average
    ));
    out.push_str(&format!(
        "Oscillator:         {:.2} - {}\n",
        prediction.indicators.oscillator, prediction.market_state
    ));
    out.push_str(&format!("Drift / Step:       {:+.4}\n", prediction.drift));
    for adjustment in &prediction.adjustments {
        out.push_str(&format!(
            "Adjustment:         {} {:+.2}\n",
            adjustment.describe(),
            adjustment.delta()
        ));
    }
    if let (Some(first), Some(last)) = (first, last) {
        out.push_str(&format!(
            "Window:             {} prices, {} .. {}\n",
            series.len(),
            first.format("%Y-%m-%d %H:%M"),
            last.format("%Y-%m-%d %H:%M")
        ));
    }
    out.push_str(&format!("{}\n", "-".repeat(RULE_WIDTH)));
    out.push_str(&prediction.narrative);
    out.push_str(&format!("\n{}\n", "=".repeat(RULE_WIDTH)));
    out
}

/// Pretty JSON including the full series, for charting front-ends
pub fn render_json(prediction: &Prediction) -> Result<String> {
    serde_json::to_string_pretty(prediction).context("Failed to serialize prediction")
}

/// One user-facing line for a failed run.
///
/// Engine errors keep their meaning; anything else (network, rate limits,
/// parse failures upstream) collapses into a single "unavailable" message.
pub fn render_failure(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ForecastError>() {
        Some(ForecastError::InvalidHorizon { .. }) => {
            "Invalid future time: the target must be after now.".to_string()
        }
        Some(ForecastError::InsufficientData { required, actual }) => format!(
            "Not enough price history: need {} prices, got {}.",
            required, actual
        ),
        Some(ForecastError::InvalidTarget(value)) => format!("Invalid target price: {}.", value),
        Some(ForecastError::MalformedSeries { reason, .. }) => {
            format!("Price data is malformed: {}.", reason)
        }
        None => {
            "Prediction unavailable right now. Try again shortly.".to_string()
        }
    }
}
