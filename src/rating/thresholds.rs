//! Population-relative percentile cut points
//!
//! Thresholds are always computed over one population of contract
//! statistics and recomputed whenever the inclusion scenario changes.
//! Nothing here is hard-coded to a rating year.

use super::stats::ContractStatistics;
use serde::{Deserialize, Serialize};

/// 30th/70th percentile cut points of weighted mean and weighted variance
/// over one population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileThresholds {
    pub mean_30: f64,
    pub mean_70: f64,
    pub variance_30: f64,
    pub variance_70: f64,
}

impl PercentileThresholds {
    /// Compute thresholds over one population; `None` when it is empty.
    ///
    /// Means and variances are ranked independently (two separate
    /// orderings over the same contracts, not a joint rank). Cut points
    /// use linear interpolation between adjacent order statistics, which
    /// stays stable on small populations. The same rule applies to every
    /// population.
    pub fn from_population(population: &[ContractStatistics]) -> Option<Self> {
        if population.is_empty() {
            return None;
        }

        let mut means: Vec<f64> = population.iter().map(|s| s.weighted_mean).collect();
        let mut variances: Vec<f64> = population.iter().map(|s| s.weighted_variance).collect();
        means.sort_by(f64::total_cmp);
        variances.sort_by(f64::total_cmp);

        Some(Self {
            mean_30: percentile(&means, 0.30),
            mean_70: percentile(&means, 0.70),
            variance_30: percentile(&variances, 0.30),
            variance_70: percentile(&variances, 0.70),
        })
    }
}

/// Linear-interpolation percentile over an ascending-sorted slice: the
/// fractional rank is p·(n−1); the value interpolates between the two
/// adjacent order statistics.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stats(id: &str, mean: f64, variance: f64) -> ContractStatistics {
        ContractStatistics {
            contract_id: id.to_string(),
            weighted_mean: mean,
            weighted_variance: variance,
            measure_count: 10,
        }
    }

    #[test]
    fn test_empty_population() {
        assert!(PercentileThresholds::from_population(&[]).is_none());
    }

    #[test]
    fn test_single_contract_population_collapses() {
        let t = PercentileThresholds::from_population(&[stats("H1", 3.5, 0.4)]).unwrap();
        assert_eq!(t.mean_30, 3.5);
        assert_eq!(t.mean_70, 3.5);
        assert_eq!(t.variance_30, 0.4);
        assert_eq!(t.variance_70, 0.4);
    }

    #[test]
    fn test_linear_interpolation_between_order_statistics() {
        // Two contracts: rank 0.3 sits 30% of the way between them.
        let population = [stats("H1", 1.0, 0.1), stats("H2", 2.0, 0.2)];
        let t = PercentileThresholds::from_population(&population).unwrap();
        assert_relative_eq!(t.mean_30, 1.3, max_relative = 1e-12);
        assert_relative_eq!(t.mean_70, 1.7, max_relative = 1e-12);

        // Eleven evenly spaced values: the 30th/70th fall exactly on
        // order statistics 3 and 7.
        let population: Vec<ContractStatistics> = (0..=10)
            .map(|i| stats(&format!("H{i}"), i as f64, i as f64 / 10.0))
            .collect();
        let t = PercentileThresholds::from_population(&population).unwrap();
        assert_relative_eq!(t.mean_30, 3.0, max_relative = 1e-12);
        assert_relative_eq!(t.mean_70, 7.0, max_relative = 1e-12);
    }

    #[test]
    fn test_thresholds_are_order_preserving() {
        let population = [
            stats("H1", 4.2, 0.9),
            stats("H2", 2.8, 0.1),
            stats("H3", 3.6, 0.5),
            stats("H4", 3.1, 0.3),
            stats("H5", 4.8, 0.2),
        ];
        let t = PercentileThresholds::from_population(&population).unwrap();
        assert!(t.mean_30 <= t.mean_70);
        assert!(t.variance_30 <= t.variance_70);
    }

    #[test]
    fn test_means_and_variances_rank_independently() {
        // Highest mean paired with lowest variance: a joint rank would
        // tie the orderings together, independent ranks must not.
        let population = [
            stats("H1", 5.0, 0.0),
            stats("H2", 3.0, 0.5),
            stats("H3", 1.0, 1.0),
        ];
        let t = PercentileThresholds::from_population(&population).unwrap();
        assert_relative_eq!(t.mean_30, 1.0 + 0.6 * 2.0, max_relative = 1e-12);
        assert_relative_eq!(t.variance_30, 0.0 + 0.6 * 0.5, max_relative = 1e-12);
    }
}
