//! Trend estimation from the window endpoints

/// Secant slope between the first and last price: `(last - first) / (len - 1)`.
///
/// Not a regression fit, so it moves with endpoint noise. Returns 0.0 for
/// fewer than two prices.
pub fn per_step_drift(prices: &[f64]) -> f64 {
    match (prices.first(), prices.last()) {
        (Some(first), Some(last)) if prices.len() >= 2 => {
            (last - first) / (prices.len() - 1) as f64
        }
        _ => 0.0,
    }
}

/// Trend average minus the price `lookback` steps before the end of the series.
///
/// `None` when the series is shorter than `lookback`.
pub fn average_divergence(prices: &[f64], trend_average: f64, lookback: usize) -> Option<f64> {
    if lookback == 0 || prices.len() < lookback {
        return None;
    }
    Some(trend_average - prices[prices.len() - lookback])
}
