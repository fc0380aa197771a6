//! Binance market-data source
//! No API key needed for public kline endpoints.

mod client;
mod types;

pub use client::BinanceClient;
pub use types::*;
