//! Series Loading and Normalization
//!
//! Turns a raw per-asset CSV into a validated `PriceSeries`: resolve the
//! date and price columns, drop anything unparseable at row level, sort and
//! de-duplicate, then derive returns and rolling volatility.
//!
//! "No data" is a value here, never an error: an unknown asset, a missing
//! file, or a file with nothing parseable all come back as an empty series.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::catalog::{self, AssetSpec};
use crate::metrics::{returns, rolling_volatility, VOLATILITY_WINDOW};
use crate::models::{PricePoint, PriceSeries};

/// Canonical price column.
const DEFAULT_PRICE_COLUMN: &str = "Close";
/// Alternate name seen in merged multi-asset exports.
const MERGED_PRICE_COLUMN: &str = "Close.1";
/// Canonical date column; falls back to the first column.
const DATE_COLUMN: &str = "Date";

/// Date formats accepted before falling back to a datetime prefix.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

pub struct SeriesLoader {
    data_dir: PathBuf,
}

impl SeriesLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load the validated series for a catalog asset.
    pub fn load(&self, asset_id: &str) -> PriceSeries {
        match catalog::find(asset_id) {
            Some(spec) => self.load_spec(spec),
            None => {
                debug!(asset_id, "unknown asset id, returning empty series");
                PriceSeries::empty()
            }
        }
    }

    /// Load the series for an explicit asset spec (also used by tests).
    pub fn load_spec(&self, spec: &AssetSpec) -> PriceSeries {
        let path = self.data_dir.join(spec.file);
        match read_series(&path, spec.price_column) {
            Ok(series) => {
                debug!(
                    asset = spec.id,
                    rows = series.len(),
                    "series loaded"
                );
                series
            }
            Err(err) => {
                warn!(asset = spec.id, error = %err, "series load failed, returning empty series");
                PriceSeries::empty()
            }
        }
    }
}

fn read_series(path: &Path, override_column: Option<&str>) -> anyhow::Result<PriceSeries> {
    if !path.exists() {
        debug!(path = %path.display(), "source file not present");
        return Ok(PriceSeries::empty());
    }

    let file = File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);
    let date_idx = header_map.get(DATE_COLUMN).copied().unwrap_or(0);
    let price_idx = resolve_price_column(&header_map, override_column);

    let mut rows: Vec<(NaiveDate, f64)> = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        match parse_row(&record, date_idx, price_idx) {
            Some(row) => rows.push(row),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!(path = %path.display(), dropped, "dropped unparseable rows");
    }

    // Stable sort, then keep the first of any duplicate-date rows.
    rows.sort_by_key(|(date, _)| *date);
    rows.dedup_by_key(|(date, _)| *date);

    Ok(derive(rows))
}

/// Price column precedence: explicit override (only when present in the
/// header), then `Close`, then the merged-export alternate, then the second
/// column positionally. Several catalog assets depend on this exact order.
fn resolve_price_column(header_map: &HashMap<String, usize>, override_column: Option<&str>) -> usize {
    if let Some(idx) = override_column.and_then(|c| header_map.get(c)) {
        return *idx;
    }
    if let Some(idx) = header_map.get(DEFAULT_PRICE_COLUMN) {
        return *idx;
    }
    if let Some(idx) = header_map.get(MERGED_PRICE_COLUMN) {
        return *idx;
    }
    1
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect()
}

fn parse_row(record: &StringRecord, date_idx: usize, price_idx: usize) -> Option<(NaiveDate, f64)> {
    let date = parse_date(record.get(date_idx)?)?;
    let price: f64 = record.get(price_idx)?.parse().ok()?;
    if !price.is_finite() {
        return None;
    }
    Some((date, price))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }
    // Datetime strings ("2024-03-15 00:00:00", RFC 3339): try the date prefix.
    if raw.len() > 10 {
        if let Ok(date) = NaiveDate::parse_from_str(&raw[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }
    None
}

/// Attach derived columns. The derived values are always finite; any
/// degenerate arithmetic has already been zero-filled by the metrics layer.
fn derive(rows: Vec<(NaiveDate, f64)>) -> PriceSeries {
    let prices: Vec<f64> = rows.iter().map(|(_, p)| *p).collect();
    let rets = returns(&prices);
    let vols = rolling_volatility(&rets, VOLATILITY_WINDOW);

    let points = rows
        .into_iter()
        .zip(rets)
        .zip(vols)
        .map(|(((date, price), ret), vol)| PricePoint {
            date,
            price,
            ret,
            vol,
        })
        .collect();
    PriceSeries::new(points)
}
