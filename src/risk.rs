//! Risk Tier Classification
//!
//! Maps an annualized volatility reading onto a discrete risk tier using
//! fixed thresholds. Pure and total: every real input (negative, huge, NaN)
//! maps through the same inequalities.

use serde::{Deserialize, Serialize};

/// Volatility above this is CRITICAL.
pub const CRITICAL_THRESHOLD: f64 = 0.70;
/// Volatility above this (and at most `CRITICAL_THRESHOLD`) is MODERATE.
pub const MODERATE_THRESHOLD: f64 = 0.40;

/// Discrete risk assessment for one asset at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Stable,
    Moderate,
    Critical,
}

impl RiskTier {
    /// Classify an annualized volatility reading.
    ///
    /// Boundary behavior is exact: 0.40 is still STABLE, 0.70 is still
    /// MODERATE. NaN fails both `>` comparisons and lands on STABLE.
    pub fn classify(volatility: f64) -> Self {
        if volatility > CRITICAL_THRESHOLD {
            RiskTier::Critical
        } else if volatility > MODERATE_THRESHOLD {
            RiskTier::Moderate
        } else {
            RiskTier::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Stable => "STABLE",
            RiskTier::Moderate => "MODERATE",
            RiskTier::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_exact() {
        assert_eq!(RiskTier::classify(0.40), RiskTier::Stable);
        assert_eq!(RiskTier::classify(0.4000001), RiskTier::Moderate);
        assert_eq!(RiskTier::classify(0.70), RiskTier::Moderate);
        assert_eq!(RiskTier::classify(0.7000001), RiskTier::Critical);
    }

    #[test]
    fn test_tier_is_total_over_all_inputs() {
        assert_eq!(RiskTier::classify(-3.0), RiskTier::Stable);
        assert_eq!(RiskTier::classify(0.0), RiskTier::Stable);
        assert_eq!(RiskTier::classify(f64::INFINITY), RiskTier::Critical);
        assert_eq!(RiskTier::classify(f64::NAN), RiskTier::Stable);
    }

    #[test]
    fn test_tier_monotonic_in_volatility() {
        let severity = |t: RiskTier| match t {
            RiskTier::Stable => 0,
            RiskTier::Moderate => 1,
            RiskTier::Critical => 2,
        };
        let mut last = 0;
        for i in 0..200 {
            let v = i as f64 * 0.01;
            let s = severity(RiskTier::classify(v));
            assert!(s >= last, "severity regressed at vol {}", v);
            last = s;
        }
    }
}
