//! Short-Horizon Price Forecasting
//!
//! Takes a short window of recent close prices and produces a point forecast
//! for a future instant, an above/below-target call, a bounded confidence
//! score, a trend average, a momentum oscillator and a plain-text rationale.
//!
//! The engine ([`engine::Predictor`] and the modules it wires together) is
//! pure and synchronous. Fetching prices ([`binance`], [`data`]), rendering
//! ([`render`]) and periodic refresh ([`scheduler`]) live beside it and are
//! never called by it.
//!
//! ## Example
//! ```no_run
//! use price_forecast::{binance::BinanceClient, Horizon, Predictor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BinanceClient::new()?;
//!     let series = client.fetch_series("BTCUSDT", "1m", 30).await?;
//!     let prediction = Predictor::default().predict(&series, Horizon::new(15)?, 65_000.0)?;
//!     println!("{:.2} ({}%)", prediction.predicted_price, prediction.confidence);
//!     Ok(())
//! }
//! ```

pub mod binance;
pub mod confidence;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod indicators;
pub mod narrative;
pub mod render;
pub mod scheduler;
pub mod trend;
pub mod types;

pub use config::{Config, EngineConfig};
pub use engine::Predictor;
pub use error::ForecastError;
pub use types::*;
