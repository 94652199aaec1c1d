//! Monte Carlo Price Projection
//!
//! Projects an ensemble of synthetic future price paths from a starting
//! price and an annualized volatility. Each step multiplies the previous
//! price by `1 + N(0, daily_std)` — additive noise on the multiplier, not a
//! log-space geometric walk. That choice is deliberate and load-bearing: it
//! can (rarely) drive a path to zero or below, and downstream consumers are
//! expected to tolerate non-positive synthetic prices.
//!
//! Paths are seeded individually (`seed + path_index`), so output is
//! deterministic for a given seed and independent of evaluation order.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use statrs::distribution::Normal;
use statrs::statistics::Statistics;
use tracing::warn;

use crate::metrics::TRADING_DAYS_PER_YEAR;

pub const DEFAULT_HORIZON_DAYS: usize = 30;
pub const DEFAULT_PATH_COUNT: usize = 1000;
pub const DEFAULT_SEED: u64 = 42;

/// Annualized volatility floor; keeps the walk from degenerating to a flat
/// line when a series reports zero volatility.
pub const MIN_VOLATILITY: f64 = 0.01;

/// Hard cap on `steps * paths` so a misconfigured request stays CPU-bounded.
const MAX_CELLS: usize = 5_000_000;

/// A 2-D grid of simulated prices: rows are time steps, columns are paths.
/// Step 0 is the seed price for every path.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationEnsemble {
    steps: usize,
    paths: usize,
    /// Row-major: `data[step * paths + path]`.
    data: Vec<f64>,
}

impl SimulationEnsemble {
    fn constant(price: f64, steps: usize, paths: usize) -> Self {
        Self {
            steps,
            paths,
            data: vec![price; steps * paths],
        }
    }

    pub fn step_count(&self) -> usize {
        self.steps
    }

    pub fn path_count(&self) -> usize {
        self.paths
    }

    pub fn at(&self, step: usize, path: usize) -> f64 {
        self.data[step * self.paths + path]
    }

    /// All path values at one time step.
    pub fn step_values(&self, step: usize) -> &[f64] {
        &self.data[step * self.paths..(step + 1) * self.paths]
    }

    /// The terminal-price distribution (final step across all paths).
    pub fn terminal(&self) -> &[f64] {
        self.step_values(self.steps - 1)
    }

    /// One full path, step 0 first (chart rendering).
    pub fn path(&self, path: usize) -> Vec<f64> {
        (0..self.steps).map(|s| self.at(s, path)).collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloSimulator {
    pub horizon_days: usize,
    pub path_count: usize,
    pub seed: u64,
}

impl Default for MonteCarloSimulator {
    fn default() -> Self {
        Self {
            horizon_days: DEFAULT_HORIZON_DAYS,
            path_count: DEFAULT_PATH_COUNT,
            seed: DEFAULT_SEED,
        }
    }
}

impl MonteCarloSimulator {
    pub fn new(horizon_days: usize, path_count: usize, seed: u64) -> Self {
        Self {
            horizon_days,
            path_count,
            seed,
        }
    }

    /// Generate the ensemble. Volatility is floored at `MIN_VOLATILITY`
    /// before conversion to a per-step standard deviation (`vol / sqrt(365)`).
    pub fn simulate(&self, start_price: f64, volatility: f64) -> SimulationEnsemble {
        let steps = self.horizon_days.max(1);
        let mut paths = self.path_count.max(1);
        if steps.saturating_mul(paths) > MAX_CELLS {
            paths = (MAX_CELLS / steps).max(1);
            warn!(
                requested = self.path_count,
                clamped = paths,
                "path count clamped to bound simulation cost"
            );
        }

        // NaN input also lands on the floor: NaN.max(x) == x.
        let vol = volatility.max(MIN_VOLATILITY);
        let daily_std = (vol / TRADING_DAYS_PER_YEAR.sqrt()).clamp(1e-9, 1e9);
        let normal = match Normal::new(0.0, daily_std) {
            Ok(n) => n,
            // Unreachable after the clamp; a flat grid is the safe answer.
            Err(_) => return SimulationEnsemble::constant(start_price, steps, paths),
        };

        let seed = self.seed;
        let columns: Vec<Vec<f64>> = (0..paths)
            .into_par_iter()
            .map(|path_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(path_idx as u64));
                let mut path = Vec::with_capacity(steps);
                let mut price = start_price;
                path.push(price);
                for _ in 1..steps {
                    let shock: f64 = rand::distributions::Distribution::sample(&normal, &mut rng);
                    price *= 1.0 + shock;
                    path.push(price);
                }
                path
            })
            .collect();

        let mut data = vec![0.0; steps * paths];
        for (path_idx, column) in columns.iter().enumerate() {
            for (step, &price) in column.iter().enumerate() {
                data[step * paths + path_idx] = price;
            }
        }

        SimulationEnsemble { steps, paths, data }
    }
}

/// Percentile-based scenario summary of a terminal distribution. This is a
/// consumer-side derivation, not part of the simulator contract.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ForecastSummary {
    /// 5th percentile of terminal prices.
    pub worst_case: f64,
    /// Mean terminal price, reported as the central scenario.
    pub median: f64,
    /// 95th percentile of terminal prices.
    pub best_case: f64,
}

impl ForecastSummary {
    pub fn from_terminal(terminal: &[f64]) -> Self {
        if terminal.is_empty() {
            return Self {
                worst_case: 0.0,
                median: 0.0,
                best_case: 0.0,
            };
        }
        let mut sorted = terminal.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            worst_case: percentile(&sorted, 5.0),
            median: terminal.iter().mean(),
            best_case: percentile(&sorted, 95.0),
        }
    }
}

/// Linear-interpolation percentile over an ascending slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensemble_shape_and_seed_row() {
        let sim = MonteCarloSimulator::new(30, 1000, 7);
        let ens = sim.simulate(135.0, 0.5);
        assert_eq!(ens.step_count(), 30);
        assert_eq!(ens.path_count(), 1000);
        for path in 0..ens.path_count() {
            assert_eq!(ens.at(0, path), 135.0);
        }
        assert_eq!(ens.terminal().len(), 1000);
    }

    #[test]
    fn test_zero_volatility_is_floored_not_flat() {
        let sim = MonteCarloSimulator::new(10, 200, 1);
        let ens = sim.simulate(100.0, 0.0);
        let moved = ens
            .step_values(1)
            .iter()
            .any(|&p| (p - 100.0).abs() > f64::EPSILON);
        assert!(moved, "floored volatility must still perturb the walk");
    }

    #[test]
    fn test_deterministic_for_fixed_seed() {
        let sim = MonteCarloSimulator::new(20, 50, 99);
        let a = sim.simulate(42.0, 0.3);
        let b = sim.simulate(42.0, 0.3);
        assert_eq!(a.data, b.data);

        let c = MonteCarloSimulator::new(20, 50, 100).simulate(42.0, 0.3);
        assert_ne!(a.data, c.data);
    }

    #[test]
    fn test_all_values_finite_even_at_high_volatility() {
        let sim = MonteCarloSimulator::new(30, 100, 3);
        let ens = sim.simulate(10.0, 5.0);
        assert!(ens.data.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_degenerate_dimensions_are_clamped() {
        let sim = MonteCarloSimulator::new(0, 0, 1);
        let ens = sim.simulate(50.0, 0.2);
        assert_eq!(ens.step_count(), 1);
        assert_eq!(ens.path_count(), 1);
        assert_eq!(ens.at(0, 0), 50.0);
    }

    #[test]
    fn test_forecast_summary_ordering() {
        let terminal: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let summary = ForecastSummary::from_terminal(&terminal);
        assert!(summary.worst_case < summary.median);
        assert!(summary.median < summary.best_case);
        assert!((summary.median - 50.5).abs() < 1e-9);
    }

    #[test]
    fn test_forecast_summary_empty_terminal() {
        let summary = ForecastSummary::from_terminal(&[]);
        assert_eq!(summary.worst_case, 0.0);
        assert_eq!(summary.median, 0.0);
        assert_eq!(summary.best_case, 0.0);
    }
}
