//! Periodic prediction command
//!
//! Re-fetches and re-predicts on a fixed cadence until Ctrl+C. Each run is
//! independent; a failed fetch only costs that run.

use anyhow::{Context, Result};
use price_forecast::render::{render_failure, render_text};
use price_forecast::scheduler::{shutdown_on_ctrl_c, Scheduler};
use price_forecast::{Config, Predictor};
use std::time::Duration;
use tracing::{error, info};

use super::PriceInput;

pub fn run(
    config_path: Option<String>,
    target: f64,
    minutes: i64,
    interval: Option<u64>,
) -> Result<()> {
    dotenv::dotenv().ok();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(run_async(config_path, target, minutes, interval))
}

async fn run_async(
    config_path: Option<String>,
    target: f64,
    minutes: i64,
    interval: Option<u64>,
) -> Result<()> {
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(secs) = interval {
        info!("Overriding refresh interval to: {}s", secs);
        config.schedule.refresh_secs = secs.max(1);
    }

    info!(
        "Watching {} every {}s: target {:.2}, {} minutes ahead",
        config.source.symbol, config.schedule.refresh_secs, target, minutes
    );

    let input = PriceInput::new(None)?;
    let predictor = Predictor::new(config.engine.clone())?;
    let scheduler = Scheduler::new(Duration::from_secs(config.schedule.refresh_secs));
    let shutdown = shutdown_on_ctrl_c();

    let config = &config;
    let input = &input;
    let predictor = &predictor;

    let completed = scheduler
        .run(shutdown, move |run| {
            async move {
                let outcome = async {
                    let (series, horizon) = input
                        .load_with_horizon(config, Some(minutes), None)
                        .await?;
                    Ok::<_, anyhow::Error>(predictor.predict(&series, horizon, target)?)
                }
                .await;

                match outcome {
                    Ok(prediction) => {
                        println!("{}", render_text(&config.source.symbol, &prediction));
                        Ok(())
                    }
                    Err(e) => {
                        println!("[run {}] {}", run, render_failure(&e));
                        Err(e)
                    }
                }
            }
        })
        .await;

    info!("Watch session ended after {} runs", completed);
    if completed == 0 {
        error!("No prediction run completed");
    }
    Ok(())
}
