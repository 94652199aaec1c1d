//! Series Risk Metrics
//!
//! The quantitative core shared by the loader and the report path: periodic
//! returns, trailing annualized volatility, and maximum drawdown. Everything
//! here is pure, total, and zero-fills instead of surfacing NaN — a missing
//! or degenerate value is indistinguishable from 0 by design.

use statrs::statistics::Statistics;

use crate::models::PriceSeries;

/// Daily sampling assumption used to annualize volatility.
pub const TRADING_DAYS_PER_YEAR: f64 = 365.0;

/// Trailing window (in observations) for rolling volatility.
pub const VOLATILITY_WINDOW: usize = 30;

/// Fractional change from each observation to the next.
///
/// The first element is a fill value of 0, never missing. A zero or
/// non-finite previous price zero-fills the affected return.
pub fn returns(prices: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(prices.len());
    for (i, &price) in prices.iter().enumerate() {
        if i == 0 {
            out.push(0.0);
            continue;
        }
        let prev = prices[i - 1];
        let r = (price - prev) / prev;
        out.push(if r.is_finite() { r } else { 0.0 });
    }
    out
}

/// Trailing sample standard deviation of returns, annualized by
/// `sqrt(TRADING_DAYS_PER_YEAR)`.
///
/// `rets[0]` is the synthetic fill for the first observation and is never
/// counted as an observation. Early windows use however many real returns
/// exist; fewer than two observations yields 0 rather than NaN.
pub fn rolling_volatility(rets: &[f64], window: usize) -> Vec<f64> {
    let annualize = TRADING_DAYS_PER_YEAR.sqrt();
    let mut out = Vec::with_capacity(rets.len());
    for i in 0..rets.len() {
        let start = i.saturating_sub(window.saturating_sub(1)).max(1);
        if i < start || i + 1 - start < 2 {
            out.push(0.0);
            continue;
        }
        let sd = rets[start..=i].iter().std_dev();
        out.push(if sd.is_finite() { sd * annualize } else { 0.0 });
    }
    out
}

/// Largest peak-to-trough fractional decline over the series.
///
/// Returns the most negative drop of price below its running maximum
/// (e.g. `[100, 50]` -> -0.5), or exactly 0 for a monotone non-decreasing
/// or empty series.
pub fn max_drawdown(series: &PriceSeries) -> f64 {
    max_drawdown_prices(&series.prices())
}

pub fn max_drawdown_prices(prices: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst: f64 = 0.0;
    for &price in prices {
        if price > peak {
            peak = price;
        }
        if peak > 0.0 {
            let dd = price / peak - 1.0;
            if dd < worst {
                worst = dd;
            }
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_first_element_is_zero() {
        let r = returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r[0], 0.0);
        assert!((r[1] - 0.10).abs() < 1e-12);
        assert!((r[2] - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_returns_zero_fill_on_zero_previous_price() {
        let r = returns(&[0.0, 10.0]);
        assert_eq!(r, vec![0.0, 0.0]);
    }

    #[test]
    fn test_rolling_volatility_short_windows_are_zero() {
        // One observation (index 1) is not enough for a sample std dev.
        let rets = vec![0.0, 0.02];
        assert_eq!(rolling_volatility(&rets, VOLATILITY_WINDOW), vec![0.0, 0.0]);
    }

    #[test]
    fn test_rolling_volatility_nonnegative_and_finite() {
        let prices: Vec<f64> = (0..120).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let vols = rolling_volatility(&returns(&prices), VOLATILITY_WINDOW);
        for v in vols {
            assert!(v.is_finite());
            assert!(v >= 0.0);
        }
    }

    #[test]
    fn test_rolling_volatility_excludes_first_fill_value() {
        // With the synthetic 0 at index 0 excluded, index 2 sees exactly two
        // observations: r1 and r2.
        let prices = vec![100.0, 110.0, 121.0];
        let rets = returns(&prices);
        let vols = rolling_volatility(&rets, VOLATILITY_WINDOW);
        let expected = [rets[1], rets[2]].iter().std_dev() * TRADING_DAYS_PER_YEAR.sqrt();
        assert!((vols[2] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_max_drawdown_monotone_rise_is_zero() {
        assert_eq!(max_drawdown_prices(&[1.0, 2.0, 3.0, 4.0]), 0.0);
    }

    #[test]
    fn test_max_drawdown_half_loss() {
        assert!((max_drawdown_prices(&[100.0, 50.0]) - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_max_drawdown_uses_running_peak() {
        // Peak 120, trough 60 afterwards: -50%, even though the series
        // recovers at the end.
        let dd = max_drawdown_prices(&[100.0, 120.0, 60.0, 130.0]);
        assert!((dd - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_max_drawdown_empty_is_zero() {
        assert_eq!(max_drawdown_prices(&[]), 0.0);
    }
}
