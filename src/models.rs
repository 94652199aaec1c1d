use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::risk::RiskTier;

/// One cleaned observation with its derived columns.
///
/// `ret` is the fractional change from the previous observation (0 for the
/// first row) and `vol` is the trailing 30-observation annualized volatility.
/// Both are always finite; degenerate arithmetic is zero-filled upstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
    pub ret: f64,
    pub vol: f64,
}

/// A validated, immutable price series.
///
/// Invariants (enforced by the loader):
/// - strictly ascending by date, no duplicate dates
/// - every price finite, every derived column finite
///
/// A series may legitimately be empty (unknown asset, missing file, nothing
/// parseable) — callers must treat that as "no data", not as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    /// Most recent price, if any data exists.
    pub fn latest_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }

    /// Most recent rolling volatility, if any data exists.
    pub fn latest_volatility(&self) -> Option<f64> {
        self.points.last().map(|p| p.vol)
    }

    /// First and last observation dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }
}

/// Point-in-time risk view of one asset. Recomputed on demand, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskSnapshot {
    pub asset_id: String,
    pub label: String,
    pub price: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
    pub tier: RiskTier,
    /// Number of observations backing this snapshot. Short series (below the
    /// volatility window) legitimately report a zero-filled volatility.
    pub observations: usize,
}

/// Asset label -> latest annualized volatility, for cross-asset benchmarking.
/// BTreeMap keeps chart and table ordering stable.
pub type ComparisonSet = BTreeMap<String, f64>;
