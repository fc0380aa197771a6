//! Price series loading from CSV files
//!
//! Expects a header row. The timestamp is the first column; the close price is
//! the column headed `close` when present, otherwise the second column. Both
//! a bare `datetime,close` export and a full OHLCV export load unchanged.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::path::Path;
use tracing::info;

use crate::types::{PricePoint, PriceSeries};

/// Parse an RFC 3339 timestamp, falling back to `%Y-%m-%d %H:%M:%S` in UTC
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
        })
        .with_context(|| format!("Failed to parse datetime: {}", value))
}

/// Load a price series from CSV and validate it
pub fn load_csv(path: impl AsRef<Path>) -> Result<PriceSeries> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let close_col = reader
        .headers()
        .context("Failed to read CSV header")?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("close"))
        .unwrap_or(1);

    let mut points = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let dt_str = record.get(0).context("Missing datetime column")?;
        let datetime = parse_datetime(dt_str.trim())?;

        let close: f64 = record
            .get(close_col)
            .context("Missing close column")?
            .trim()
            .parse()
            .with_context(|| format!("Failed to parse close on row {}", row_idx + 1))?;

        points.push(PricePoint::new(datetime, close));
    }

    let series = PriceSeries::new(points)
        .with_context(|| format!("Invalid price series in {}", path.display()))?;

    info!("Loaded {} prices from {}", series.len(), path.display());
    Ok(series)
}
