//! Core data types shared by the engine and its collaborators

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, ForecastError};

/// One observed close price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub datetime: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(datetime: DateTime<Utc>, close: f64) -> Self {
        Self { datetime, close }
    }
}

/// Chronological window of close prices, most recent last.
///
/// Only constructible through [`PriceSeries::new`], so every series the engine
/// sees has finite positive closes, strictly increasing timestamps and at
/// least two points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
    #[serde(skip)]
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Validate and capture a series
    pub fn new(points: Vec<PricePoint>) -> EngineResult<Self> {
        for (index, point) in points.iter().enumerate() {
            if !point.close.is_finite() {
                return Err(ForecastError::malformed(
                    index,
                    format!("close price is not a number ({})", point.close),
                ));
            }
            if point.close <= 0.0 {
                return Err(ForecastError::malformed(
                    index,
                    format!("close price must be positive ({})", point.close),
                ));
            }
            if index > 0 && point.datetime <= points[index - 1].datetime {
                return Err(ForecastError::malformed(
                    index,
                    format!(
                        "timestamp {} does not follow {}",
                        point.datetime,
                        points[index - 1].datetime
                    ),
                ));
            }
        }

        if points.len() < 2 {
            return Err(ForecastError::InsufficientData {
                required: 2,
                actual: points.len(),
            });
        }

        let closes = points.iter().map(|p| p.close).collect();
        Ok(Self { points, closes })
    }

    /// Build a series from bare closes spaced one `step` apart, ending at `end`
    pub fn from_closes(closes: &[f64], end: DateTime<Utc>, step: Duration) -> EngineResult<Self> {
        let count = closes.len() as i32;
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint::new(end - step * (count - 1 - i as i32), close))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_close(&self) -> f64 {
        self.closes[self.closes.len() - 1]
    }

    pub fn last_time(&self) -> DateTime<Utc> {
        self.points[self.points.len() - 1].datetime
    }
}

/// Number of future time-steps a forecast targets (always >= 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Horizon(u32);

impl Horizon {
    pub fn new(steps: i64) -> EngineResult<Self> {
        if steps <= 0 || steps > u32::MAX as i64 {
            return Err(ForecastError::InvalidHorizon { steps });
        }
        Ok(Horizon(steps as u32))
    }

    /// Resolve a target instant into whole steps of `step` after `now`.
    ///
    /// A target that is not strictly after `now` is rejected. A target less
    /// than one step away still counts as one step.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>, step: Duration) -> EngineResult<Self> {
        let step_ms = step.num_milliseconds();
        let ahead_ms = (target - now).num_milliseconds();
        if step_ms <= 0 || ahead_ms <= 0 {
            let steps = if step_ms > 0 { ahead_ms / step_ms } else { 0 };
            return Err(ForecastError::InvalidHorizon { steps });
        }
        Self::new((ahead_ms / step_ms).max(1))
    }

    /// Whole steps of `step` in `minutes`, with the same rounding as
    /// [`Horizon::until`]. Counts too large to represent are rejected.
    pub fn after_minutes(minutes: i64, step: Duration) -> EngineResult<Self> {
        let step_ms = step.num_milliseconds();
        let ahead_ms = minutes
            .checked_mul(60_000)
            .ok_or(ForecastError::InvalidHorizon { steps: minutes })?;
        if step_ms <= 0 || ahead_ms <= 0 {
            return Err(ForecastError::InvalidHorizon { steps: minutes });
        }
        Self::new((ahead_ms / step_ms).max(1))
    }

    pub fn steps(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} steps", self.0)
    }
}

/// Indicators derived fresh for every run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub trend_average: f64,
    /// Momentum oscillator in [0, 100]
    pub oscillator: f64,
}

/// Oscillator-derived market state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketState {
    Overbought,
    Oversold,
    Neutral,
}

impl MarketState {
    pub fn label(&self) -> &'static str {
        match self {
            MarketState::Overbought => "Overbought",
            MarketState::Oversold => "Oversold",
            MarketState::Neutral => "Neutral",
        }
    }
}

impl std::fmt::Display for MarketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A fixed-magnitude correction applied on top of the linear forecast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "delta", rename_all = "snake_case")]
pub enum Adjustment {
    OverboughtCorrection(f64),
    OversoldRebound(f64),
    WeakeningUptrend(f64),
    WeakeningDowntrend(f64),
}

impl Adjustment {
    /// Signed amount added to the forecast
    pub fn delta(&self) -> f64 {
        match *self {
            Adjustment::OverboughtCorrection(d)
            | Adjustment::OversoldRebound(d)
            | Adjustment::WeakeningUptrend(d)
            | Adjustment::WeakeningDowntrend(d) => d,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Adjustment::OverboughtCorrection(_) => "overbought correction",
            Adjustment::OversoldRebound(_) => "oversold rebound",
            Adjustment::WeakeningUptrend(_) => "weakening uptrend",
            Adjustment::WeakeningDowntrend(_) => "weakening downtrend",
        }
    }
}

/// Point forecast, target call and confidence for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predicted_price: f64,
    pub meets_target: bool,
    pub confidence: u8,
}

/// Everything one prediction run produces, handed to presentation as-is
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_price: f64,
    /// Forecast before any adjustment
    pub linear_forecast: f64,
    pub meets_target: bool,
    pub confidence: u8,
    pub target_price: f64,
    pub horizon: Horizon,
    pub drift: f64,
    /// `None` when the series is shorter than the divergence lookback
    pub average_divergence: Option<f64>,
    pub reversal_detected: bool,
    pub adjustments: Vec<Adjustment>,
    pub indicators: IndicatorSet,
    pub market_state: MarketState,
    pub narrative: String,
    pub series: PriceSeries,
}

impl Prediction {
    pub fn result(&self) -> ForecastResult {
        ForecastResult {
            predicted_price: self.predicted_price,
            meets_target: self.meets_target,
            confidence: self.confidence,
        }
    }

    pub fn current_price(&self) -> f64 {
        self.series.last_close()
    }
}
