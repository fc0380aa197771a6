//! Binance API client for fetching recent kline (candlestick) data
//!
//! # Example
//! ```no_run
//! use price_forecast::binance::BinanceClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BinanceClient::new()?;
//!     let series = client.fetch_series("BTCUSDT", "1m", 30).await?;
//!     println!("Fetched {} prices", series.len());
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use super::types::{is_valid_interval, BinanceKline};
use crate::types::PriceSeries;

/// Base URL for Binance API
const BINANCE_API_BASE: &str = "https://api.binance.com/api/v3";

/// Maximum klines per request (Binance limit)
const MAX_KLINES_PER_REQUEST: u32 = 1000;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Binance API client
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    /// Create a new Binance client
    pub fn new() -> Result<Self> {
        Self::with_base_url(BINANCE_API_BASE)
    }

    /// Point the client at another API root (mirrors, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(BinanceClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the most recent `limit` klines, oldest first
    ///
    /// # Arguments
    /// * `symbol` - Binance trading pair (e.g., "BTCUSDT")
    /// * `interval` - Timeframe (e.g., "1m", "1h")
    /// * `limit` - Number of klines to fetch (max 1000)
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<BinanceKline>> {
        if !is_valid_interval(interval) {
            anyhow::bail!("Unsupported Binance interval: {}", interval);
        }

        let url = format!("{}/klines", self.base_url);
        let limit = limit.clamp(1, MAX_KLINES_PER_REQUEST);
        let params = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];

        debug!(
            "Fetching klines: symbol={}, interval={}, limit={}",
            symbol, interval, limit
        );

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("Failed to send request to Binance")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Binance API error {}: {}", status, body);
        }

        let raw_data: Vec<Vec<serde_json::Value>> = response
            .json()
            .await
            .context("Failed to parse Binance response")?;

        let klines: Vec<BinanceKline> = raw_data
            .iter()
            .filter_map(|row| BinanceKline::from_raw(row))
            .collect();

        if klines.len() < raw_data.len() {
            warn!(
                "Skipped {} unparseable klines for {}",
                raw_data.len() - klines.len(),
                symbol
            );
        }

        Ok(klines)
    }

    /// Fetch recent klines as a validated close-price series
    pub async fn fetch_series(&self, symbol: &str, interval: &str, limit: u32) -> Result<PriceSeries> {
        let klines = self.get_klines(symbol, interval, limit).await?;
        let points = klines
            .iter()
            .map(|k| k.to_price_point().context("Kline close time out of range"))
            .collect::<Result<Vec<_>>>()?;

        PriceSeries::new(points)
            .with_context(|| format!("Binance returned an unusable series for {}", symbol))
    }
}
