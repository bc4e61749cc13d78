//! Weighted statistics for a single contract under one inclusion scenario

use crate::contract::RatedMeasure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Weighted mean and weighted variance of a contract's star values, with
/// the count of contributing measures. Derived fresh per scenario, never
/// persisted or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractStatistics {
    pub contract_id: String,
    pub weighted_mean: f64,
    pub weighted_variance: f64,
    pub measure_count: usize,
}

/// Contributing (star, weight) pairs after the data rule and the scenario
/// exclusion set. Weighted sums commute, so iteration order never matters.
fn contributing<'a>(
    measures: &'a [RatedMeasure],
    exclusions: &'a BTreeSet<String>,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    measures.iter().filter_map(move |m| {
        if !m.is_contributing() || exclusions.contains(&m.code) {
            return None;
        }
        m.stars.map(|stars| (stars, m.weight))
    })
}

/// Weighted mean over the contributing measures not named in `exclusions`.
///
/// Unlike [`ContractStatistics::from_measures`] this accepts a single
/// contributing measure: a candidate hold-harmless rating stays
/// well-defined even when the exclusion leaves one measure behind.
/// Returns `None` only when nothing contributes.
pub fn weighted_mean(measures: &[RatedMeasure], exclusions: &BTreeSet<String>) -> Option<f64> {
    let mut total_weight = 0.0;
    let mut weighted_sum = 0.0;
    for (stars, weight) in contributing(measures, exclusions) {
        total_weight += weight;
        weighted_sum += stars * weight;
    }
    (total_weight > 0.0).then(|| weighted_sum / total_weight)
}

impl ContractStatistics {
    /// Compute statistics over the contributing measures not named in
    /// `exclusions`.
    ///
    /// Mean = Σ(star·w)/Σw; variance = Σ(w·(star−mean)²)/Σw over the same
    /// set, in two passes (the single-pass sum-of-squares form cancels
    /// catastrophically on near-constant star values). Returns `None` when
    /// one or zero measures contribute: such contracts are statistically
    /// degenerate and never enter a percentile population.
    pub fn from_measures(
        contract_id: &str,
        measures: &[RatedMeasure],
        exclusions: &BTreeSet<String>,
    ) -> Option<Self> {
        let mut total_weight = 0.0;
        let mut weighted_sum = 0.0;
        let mut count = 0usize;
        for (stars, weight) in contributing(measures, exclusions) {
            total_weight += weight;
            weighted_sum += stars * weight;
            count += 1;
        }
        if count <= 1 || total_weight <= 0.0 {
            return None;
        }
        let mean = weighted_sum / total_weight;

        let mut weighted_sq_dev = 0.0;
        for (stars, weight) in contributing(measures, exclusions) {
            let dev = stars - mean;
            weighted_sq_dev += weight * dev * dev;
        }

        Some(Self {
            contract_id: contract_id.to_string(),
            weighted_mean: mean,
            weighted_variance: weighted_sq_dev / total_weight,
            measure_count: count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MeasureCategory;
    use approx::assert_relative_eq;

    fn rated(code: &str, stars: Option<f64>, weight: f64) -> RatedMeasure {
        RatedMeasure {
            code: code.to_string(),
            stars,
            weight,
            category: MeasureCategory::A,
            quality_improvement: false,
        }
    }

    fn no_exclusions() -> BTreeSet<String> {
        BTreeSet::new()
    }

    #[test]
    fn test_weighted_mean_and_variance() {
        // (5 stars, weight 2) + (3 stars, weight 1):
        // mean = (5*2 + 3*1) / 3, variance = (2*(5-m)^2 + 1*(3-m)^2) / 3
        let measures = vec![rated("A01", Some(5.0), 2.0), rated("A02", Some(3.0), 1.0)];
        let stats = ContractStatistics::from_measures("H1001", &measures, &no_exclusions()).unwrap();

        assert_relative_eq!(stats.weighted_mean, 13.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(stats.weighted_variance, 8.0 / 9.0, max_relative = 1e-12);
        assert_eq!(stats.measure_count, 2);
    }

    #[test]
    fn test_mean_bounded_by_star_range() {
        let measures = vec![
            rated("A01", Some(2.0), 1.5),
            rated("A02", Some(4.5), 3.0),
            rated("A03", Some(3.0), 1.0),
        ];
        let stats = ContractStatistics::from_measures("H1001", &measures, &no_exclusions()).unwrap();
        assert!(stats.weighted_mean >= 2.0);
        assert!(stats.weighted_mean <= 4.5);
    }

    #[test]
    fn test_single_contributing_measure_is_insufficient() {
        let measures = vec![rated("A01", Some(4.0), 2.0), rated("A02", None, 2.0)];
        assert!(ContractStatistics::from_measures("H1001", &measures, &no_exclusions()).is_none());
        // The plain mean is still defined for rating purposes.
        assert_eq!(weighted_mean(&measures, &no_exclusions()), Some(4.0));
    }

    #[test]
    fn test_nothing_contributing() {
        let measures = vec![rated("A01", None, 2.0), rated("A02", Some(0.0), 1.0)];
        assert!(weighted_mean(&measures, &no_exclusions()).is_none());
        assert!(ContractStatistics::from_measures("H1001", &measures, &no_exclusions()).is_none());
    }

    #[test]
    fn test_unscored_measures_are_not_zero() {
        let scored = vec![rated("A01", Some(5.0), 2.0), rated("A02", Some(3.0), 1.0)];
        let with_unscored = vec![
            rated("A01", Some(5.0), 2.0),
            rated("A02", Some(3.0), 1.0),
            rated("A03", None, 4.0),
            rated("A04", Some(0.0), 4.0),
        ];
        let a = ContractStatistics::from_measures("H1001", &scored, &no_exclusions()).unwrap();
        let b = ContractStatistics::from_measures("H1001", &with_unscored, &no_exclusions()).unwrap();
        assert_eq!(a.weighted_mean, b.weighted_mean);
        assert_eq!(a.weighted_variance, b.weighted_variance);
        assert_eq!(b.measure_count, 2);
    }

    #[test]
    fn test_exclusion_set_removes_from_both_sides() {
        let measures = vec![
            rated("A01", Some(5.0), 2.0),
            rated("A02", Some(3.0), 1.0),
            rated("A03", Some(1.0), 10.0),
        ];
        let exclusions: BTreeSet<String> = [String::from("A03")].into();
        let stats = ContractStatistics::from_measures("H1001", &measures, &exclusions).unwrap();
        // Identical to the population without A03 at all.
        assert_relative_eq!(stats.weighted_mean, 13.0 / 3.0, max_relative = 1e-12);
        assert_eq!(stats.measure_count, 2);
    }

    #[test]
    fn test_idempotent_bit_identical() {
        let measures = vec![
            rated("A01", Some(4.5), 1.5),
            rated("A02", Some(2.0), 3.0),
            rated("A03", Some(3.5), 2.0),
        ];
        let a = ContractStatistics::from_measures("H1001", &measures, &no_exclusions()).unwrap();
        let b = ContractStatistics::from_measures("H1001", &measures, &no_exclusions()).unwrap();
        assert_eq!(a.weighted_mean.to_bits(), b.weighted_mean.to_bits());
        assert_eq!(a.weighted_variance.to_bits(), b.weighted_variance.to_bits());
    }
}
