//! One-shot prediction command

use anyhow::{Context, Result};
use price_forecast::render::{render_json, render_text};
use price_forecast::{Config, Predictor};
use tracing::{debug, info};

use super::PriceInput;

pub fn run(
    config_path: Option<String>,
    target: f64,
    minutes: Option<i64>,
    at: Option<String>,
    csv: Option<String>,
    json: bool,
) -> Result<()> {
    dotenv::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, target, minutes, at, csv, json))
}

async fn run_async(
    config_path: Option<String>,
    target: f64,
    minutes: Option<i64>,
    at: Option<String>,
    csv: Option<String>,
    json: bool,
) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;

    let input = PriceInput::new(csv)?;
    let (series, horizon) = input
        .load_with_horizon(&config, minutes, at.as_deref())
        .await?;
    info!(
        "Using {} prices for {} ({})",
        series.len(),
        config.source.symbol,
        config.source.interval
    );

    let predictor = Predictor::new(config.engine.clone())?;
    debug!("Engine config: {:?}", predictor.config());
    let prediction = predictor.predict(&series, horizon, target)?;

    if json {
        println!("{}", render_json(&prediction)?);
    } else {
        println!("{}", render_text(&config.source.symbol, &prediction));
    }

    Ok(())
}
