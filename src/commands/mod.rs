pub mod predict;
pub mod watch;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use price_forecast::binance::{interval_duration, BinanceClient};
use price_forecast::{data, Config, Horizon, PriceSeries};

/// Where the price window comes from for one run
pub enum PriceInput {
    Binance(BinanceClient),
    Csv(String),
}

impl PriceInput {
    pub fn new(csv: Option<String>) -> Result<Self> {
        match csv {
            Some(path) => Ok(PriceInput::Csv(path)),
            None => Ok(PriceInput::Binance(BinanceClient::new()?)),
        }
    }

    pub async fn load(&self, config: &Config) -> Result<PriceSeries> {
        match self {
            PriceInput::Binance(client) => {
                client
                    .fetch_series(
                        &config.source.symbol,
                        &config.source.interval,
                        config.source.limit,
                    )
                    .await
            }
            PriceInput::Csv(path) => data::load_csv(path),
        }
    }

    /// Load the window and resolve the horizon against it.
    ///
    /// Live data measures the horizon from the wall clock, checked before any
    /// request goes out; a CSV replay measures it from the last row.
    pub async fn load_with_horizon(
        &self,
        config: &Config,
        minutes: Option<i64>,
        at: Option<&str>,
    ) -> Result<(PriceSeries, Horizon)> {
        match self {
            PriceInput::Binance(_) => {
                let horizon = resolve_horizon(config, minutes, at, Utc::now())?;
                let series = self.load(config).await?;
                Ok((series, horizon))
            }
            PriceInput::Csv(_) => {
                let series = self.load(config).await?;
                let horizon = resolve_horizon(config, minutes, at, series.last_time())?;
                Ok((series, horizon))
            }
        }
    }
}

/// Horizon from either a step count or an absolute target time
pub fn resolve_horizon(
    config: &Config,
    minutes: Option<i64>,
    at: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Horizon> {
    let step = interval_duration(&config.source.interval)
        .with_context(|| format!("Unsupported interval: {}", config.source.interval))?;

    match (minutes, at) {
        (_, Some(at)) => {
            let target = data::parse_datetime(at)?;
            Ok(Horizon::until(target, now, step)?)
        }
        (Some(minutes), None) => Ok(Horizon::after_minutes(minutes, step)?),
        (None, None) => anyhow::bail!("Specify either --minutes or --at"),
    }
}
