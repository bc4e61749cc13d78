//! Reward factor classifier
//!
//! Positions one contract's (mean, variance) against the population cut
//! points and awards the published bonus: high mean with low variance earns
//! the full reward factor, one strong axis with a middling other earns the
//! smaller one, everything else earns nothing. Pure and stateless.

use serde::{Deserialize, Serialize};

use crate::methodology::MethodologyConfig;
use crate::rating::stats::ContractStatistics;
use crate::rating::thresholds::PercentileThresholds;
use crate::rating::clamp_rating;

/// One contract's reward classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardFactorResult {
    /// Bonus earned, in stars. Zero when the contract does not qualify.
    pub r_factor: f64,
    pub weighted_mean: f64,
    pub weighted_variance: f64,
    /// Mean plus reward factor, clamped to the rating scale.
    pub adjusted_rating: f64,
}

/// Classify one contract against the thresholds of its cohort.
///
/// Thresholds must come from the population the contract actually belongs
/// to: held-harmless contracts classify against the without-improvement
/// set, all others against the standard set.
pub fn classify(
    statistics: &ContractStatistics,
    thresholds: &PercentileThresholds,
    config: &MethodologyConfig,
) -> RewardFactorResult {
    let mean = statistics.weighted_mean;
    let variance = statistics.weighted_variance;

    let high_mean = mean >= thresholds.mean_70;
    let middling_mean = mean >= thresholds.mean_30 && mean < thresholds.mean_70;
    let low_variance = variance <= thresholds.variance_30;
    let middling_variance = variance > thresholds.variance_30 && variance <= thresholds.variance_70;

    let r_factor = if high_mean && low_variance {
        config.reward_factor_high
    } else if (high_mean && middling_variance) || (middling_mean && low_variance) {
        config.reward_factor_low
    } else {
        0.0
    };

    RewardFactorResult {
        r_factor,
        weighted_mean: mean,
        weighted_variance: variance,
        adjusted_rating: clamp_rating(mean + r_factor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stats(mean: f64, variance: f64) -> ContractStatistics {
        ContractStatistics {
            contract_id: "H1001".to_string(),
            weighted_mean: mean,
            weighted_variance: variance,
            measure_count: 10,
        }
    }

    fn thresholds() -> PercentileThresholds {
        PercentileThresholds {
            mean_30: 3.2,
            mean_70: 3.9,
            variance_30: 0.25,
            variance_70: 0.60,
        }
    }

    fn config() -> MethodologyConfig {
        MethodologyConfig::default()
    }

    #[test]
    fn test_high_mean_low_variance_earns_the_full_factor() {
        let result = classify(&stats(4.2, 0.20), &thresholds(), &config());
        assert_eq!(result.r_factor, 0.4);
        assert_relative_eq!(result.adjusted_rating, 4.6, max_relative = 1e-12);
    }

    #[test]
    fn test_high_mean_middling_variance_earns_the_small_factor() {
        let result = classify(&stats(4.2, 0.40), &thresholds(), &config());
        assert_eq!(result.r_factor, 0.2);
    }

    #[test]
    fn test_middling_mean_low_variance_earns_the_small_factor() {
        let result = classify(&stats(3.5, 0.10), &thresholds(), &config());
        assert_eq!(result.r_factor, 0.2);
    }

    #[test]
    fn test_low_mean_earns_nothing() {
        let result = classify(&stats(3.0, 0.05), &thresholds(), &config());
        assert_eq!(result.r_factor, 0.0);
        assert_relative_eq!(result.adjusted_rating, 3.0, max_relative = 1e-12);
    }

    #[test]
    fn test_high_variance_earns_nothing_even_with_high_mean() {
        let result = classify(&stats(4.5, 0.80), &thresholds(), &config());
        assert_eq!(result.r_factor, 0.0);
    }

    #[test]
    fn test_cut_point_boundaries() {
        // Exactly at the 70th mean / 30th variance cut points counts as in.
        assert_eq!(classify(&stats(3.9, 0.25), &thresholds(), &config()).r_factor, 0.4);
        // Exactly at the 30th mean cut point enters the middle band.
        assert_eq!(classify(&stats(3.2, 0.25), &thresholds(), &config()).r_factor, 0.2);
        // Exactly at the 70th variance cut point is still middling.
        assert_eq!(classify(&stats(4.0, 0.60), &thresholds(), &config()).r_factor, 0.2);
        // Just past it is not.
        assert_eq!(classify(&stats(4.0, 0.61), &thresholds(), &config()).r_factor, 0.0);
    }

    #[test]
    fn test_adjusted_rating_clamps_to_the_scale() {
        let result = classify(&stats(4.8, 0.10), &thresholds(), &config());
        assert_eq!(result.r_factor, 0.4);
        assert_eq!(result.adjusted_rating, 5.0);
    }

    #[test]
    fn test_reward_is_monotonic_in_mean_at_fixed_low_variance() {
        let means = [2.8, 3.0, 3.2, 3.5, 3.9, 4.2, 4.8];
        let mut last = 0.0;
        for mean in means {
            let r = classify(&stats(mean, 0.10), &thresholds(), &config()).r_factor;
            assert!(
                r >= last,
                "reward factor dropped from {last} to {r} as mean rose to {mean}"
            );
            last = r;
        }
    }
}
