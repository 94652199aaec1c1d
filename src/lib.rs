//! RiskDesk Backend Library
//!
//! Quantitative risk analytics for a fixed catalog of crypto-style assets:
//! CSV series ingestion and normalization, rolling volatility and drawdown
//! metrics, tier classification, Monte Carlo price projection, and audit
//! report composition. Everything runs synchronously on the calling thread;
//! the only shared state is the bounded-TTL series cache.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod history;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod report;
pub mod risk;
pub mod simulation;

use std::sync::Arc;

use tracing::debug;

pub use crate::config::Config;
pub use crate::history::{HistoryFilter, HistoryStore};
pub use crate::models::{ComparisonSet, PriceSeries, RiskSnapshot};
pub use crate::risk::RiskTier;
pub use crate::simulation::{ForecastSummary, MonteCarloSimulator, SimulationEnsemble};

use crate::cache::SeriesCache;
use crate::loader::SeriesLoader;

/// One-stop orchestrator for analytics requests: load (through the cache),
/// derive metrics, classify, simulate, compose. Each request runs to
/// completion on the calling thread.
pub struct Analyzer {
    config: Config,
    loader: SeriesLoader,
    cache: SeriesCache,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        let loader = SeriesLoader::new(&config.data_dir);
        let cache = SeriesCache::new(config.cache_ttl);
        Self {
            config,
            loader,
            cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The validated series for an asset, served from the cache when live.
    /// Always succeeds; "no data" is an empty series.
    pub fn series(&self, asset_id: &str) -> Arc<PriceSeries> {
        if let Some(series) = self.cache.get(asset_id) {
            debug!(asset_id, "series cache hit");
            return series;
        }
        self.cache.insert(asset_id, self.loader.load(asset_id))
    }

    /// Current risk view of one asset, or `None` when no usable data exists.
    /// Callers must treat `None` as a normal outcome, not a failure.
    pub fn snapshot(&self, asset_id: &str) -> Option<RiskSnapshot> {
        let spec = catalog::find(asset_id)?;
        let series = self.series(asset_id);
        let price = series.latest_price()?;
        let volatility = series.latest_volatility()?;
        Some(RiskSnapshot {
            asset_id: asset_id.to_string(),
            label: spec.label.to_string(),
            price,
            volatility,
            max_drawdown: metrics::max_drawdown(&series),
            tier: RiskTier::classify(volatility),
            observations: series.len(),
        })
    }

    /// Latest volatility per catalog asset, skipping assets without data.
    pub fn comparison_set(&self) -> ComparisonSet {
        let mut set = ComparisonSet::new();
        for asset in catalog::ASSETS {
            let series = self.series(asset.id);
            if let Some(vol) = series.latest_volatility() {
                set.insert(asset.label.to_string(), vol);
            }
        }
        set
    }

    /// Project future price paths for an asset from its latest price and
    /// volatility. `None` when the asset has no data.
    pub fn forecast(
        &self,
        asset_id: &str,
        days: usize,
        seed: u64,
    ) -> Option<(SimulationEnsemble, ForecastSummary)> {
        let series = self.series(asset_id);
        let price = series.latest_price()?;
        let volatility = series.latest_volatility()?;
        let simulator = MonteCarloSimulator::new(days, self.config.sim_paths, seed);
        let ensemble = simulator.simulate(price, volatility);
        let summary = ForecastSummary::from_terminal(ensemble.terminal());
        Some((ensemble, summary))
    }

    /// Compose the full audit artifact for an asset. `None` when the asset
    /// has no data; otherwise always a non-empty byte sequence.
    pub fn report(&self, identity: &str, asset_id: &str) -> Option<Vec<u8>> {
        let snapshot = self.snapshot(asset_id)?;
        let comparison = self.comparison_set();
        let series = self.series(asset_id);
        Some(report::compose(
            identity,
            &snapshot.label,
            snapshot.price,
            snapshot.volatility,
            snapshot.tier,
            &series,
            &comparison,
        ))
    }
}
