//! Technical indicators
//!
//! Trend average (exponential smoothing seeded with the first value) and a
//! simple-average momentum oscillator. Both take the trailing sub-window the
//! caller wants measured, not the whole series.

use itertools::Itertools;

/// Oscillator value returned when the window is too short to measure
pub const NEUTRAL_OSCILLATOR: f64 = 50.0;

/// Exponentially smoothed average of `prices`.
///
/// Smoothing factor is `2 / (window + 1)`. The first price seeds the average
/// and each later price folds in as `value * k + previous * (1 - k)`, so a
/// single price is returned unchanged. Returns 0.0 for an empty slice.
pub fn trend_average(prices: &[f64], window: usize) -> f64 {
    let Some((&seed, rest)) = prices.split_first() else {
        return 0.0;
    };

    let k = 2.0 / (window as f64 + 1.0);
    rest.iter().fold(seed, |prev, &value| value * k + prev * (1.0 - k))
}

/// Momentum oscillator in [0, 100] over the first `window + 1` prices.
///
/// Gains and losses are plain sums of the positive and negative steps divided
/// by `window`. No losses at all yields 100. Fewer than `window + 1` prices
/// yields [`NEUTRAL_OSCILLATOR`].
pub fn oscillator(prices: &[f64], window: usize) -> f64 {
    if window == 0 || prices.len() < window + 1 {
        return NEUTRAL_OSCILLATOR;
    }

    let (gains, losses) = prices[..=window]
        .iter()
        .tuple_windows()
        .map(|(prev, next)| next - prev)
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else {
                (gains, losses - change)
            }
        });

    let avg_gain = gains / window as f64;
    let avg_loss = losses / window as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Last `n` elements of `values` (all of them when shorter)
pub fn trailing(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trend_average_single_value_is_identity() {
        assert_eq!(trend_average(&[42.5], 9), 42.5);
    }

    #[test]
    fn test_trend_average_flat_series() {
        assert_relative_eq!(trend_average(&[100.0; 9], 9), 100.0);
    }

    #[test]
    fn test_trend_average_recursion() {
        // k = 2 / 4 = 0.5
        // 1.0 -> 2*0.5 + 1*0.5 = 1.5 -> 3*0.5 + 1.5*0.5 = 2.25
        assert_relative_eq!(trend_average(&[1.0, 2.0, 3.0], 3), 2.25);
    }

    #[test]
    fn test_trend_average_lags_rising_prices() {
        let prices: Vec<f64> = (121..=129).map(f64::from).collect();
        let avg = trend_average(&prices, 9);
        assert!(avg > 121.0 && avg < 129.0);
    }

    #[test]
    fn test_oscillator_short_window_is_neutral() {
        assert_eq!(oscillator(&[1.0, 2.0, 3.0], 14), NEUTRAL_OSCILLATOR);
    }

    #[test]
    fn test_oscillator_strictly_increasing() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert_eq!(oscillator(&prices, 14), 100.0);
    }

    #[test]
    fn test_oscillator_strictly_decreasing() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        assert_eq!(oscillator(&prices, 14), 0.0);
    }

    #[test]
    fn test_oscillator_flat_has_no_losses() {
        assert_eq!(oscillator(&[50.0; 15], 14), 100.0);
    }

    #[test]
    fn test_oscillator_balanced_moves() {
        // Alternating +1 / -1: equal gains and losses -> 50
        let prices: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        assert_relative_eq!(oscillator(&prices, 14), 50.0);
    }

    #[test]
    fn test_oscillator_ignores_prices_past_window() {
        let mut prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        prices.push(1.0);
        assert_eq!(oscillator(&prices, 14), 100.0);
    }

    #[test]
    fn test_oscillator_known_value() {
        // Gains 3, losses 1 over window 4: rs = 3 -> 75
        let prices = [10.0, 11.0, 12.0, 11.0, 12.0];
        assert_relative_eq!(oscillator(&prices, 4), 75.0);
    }

    #[test]
    fn test_trailing() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(trailing(&values, 2), &[3.0, 4.0]);
        assert_eq!(trailing(&values, 10), &values);
    }
}
