//! Star brackets and population aggregates
//!
//! Ratings publish in half-star brackets. All bracket arithmetic here runs
//! in integer half-star units (rating doubled and rounded) so that bracket
//! comparisons are exact; floating-point deltas would drift at the 0.25
//! boundaries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Round to the nearest half star, half away from zero. Idempotent on
/// already-aligned input.
pub fn round_to_half_star(rating: f64) -> f64 {
    (rating * 2.0).round() / 2.0
}

/// A rating expressed in integer half-star units (4.0★ -> 8).
pub fn half_star_units(rating: f64) -> i32 {
    (rating * 2.0).round() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionDirection {
    Gain,
    Unchanged,
    Loss,
}

impl TransitionDirection {
    fn of(delta_units: i32) -> Self {
        match delta_units {
            d if d > 0 => TransitionDirection::Gain,
            0 => TransitionDirection::Unchanged,
            _ => TransitionDirection::Loss,
        }
    }

    // Sort rank: gains first, then unchanged, then losses.
    fn rank(&self) -> u8 {
        match self {
            TransitionDirection::Gain => 0,
            TransitionDirection::Unchanged => 1,
            TransitionDirection::Loss => 2,
        }
    }
}

/// One bracket-to-bracket transition observed in the population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketTransition {
    /// Display key, e.g. `"4.0★ → 3.5★"`.
    pub key: String,
    pub direction: TransitionDirection,
    /// Bracket change in half-star units.
    pub delta_units: i32,
    pub count: usize,
}

/// Fixed-bucket distribution of bracket changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftDistribution {
    /// +1.0 star or more.
    pub gained_full_or_more: usize,
    /// +0.5 star.
    pub gained_half: usize,
    pub unchanged: usize,
    /// -0.5 star.
    pub lost_half: usize,
    /// -1.0 star.
    pub lost_full: usize,
    /// -1.5 stars.
    pub lost_one_and_half: usize,
    /// -2.0 stars or worse.
    pub lost_two_or_more: usize,
}

impl ShiftDistribution {
    fn record(&mut self, delta_units: i32) {
        match delta_units {
            d if d >= 2 => self.gained_full_or_more += 1,
            1 => self.gained_half += 1,
            0 => self.unchanged += 1,
            -1 => self.lost_half += 1,
            -2 => self.lost_full += 1,
            -3 => self.lost_one_and_half += 1,
            _ => self.lost_two_or_more += 1,
        }
    }
}

/// Population-level summary of rating movement between two scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketReport {
    pub contracts: usize,
    /// Movement counts on the raw (unrounded) ratings.
    pub raw_gainers: usize,
    pub raw_losers: usize,
    pub raw_unchanged: usize,
    /// Movement counts after rounding to half-star brackets.
    pub bracket_gainers: usize,
    pub bracket_losers: usize,
    pub bracket_unchanged: usize,
    /// Transition histogram: gains first, then unchanged, then losses,
    /// each group by descending count, ties by key.
    pub transitions: Vec<BracketTransition>,
    pub shift_distribution: ShiftDistribution,
}

impl BracketReport {
    /// Build from `(current, projected)` raw rating pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        let mut raw_gainers = 0;
        let mut raw_losers = 0;
        let mut raw_unchanged = 0;
        let mut bracket_gainers = 0;
        let mut bracket_losers = 0;
        let mut bracket_unchanged = 0;
        let mut shift_distribution = ShiftDistribution::default();
        let mut histogram: BTreeMap<(i32, i32), usize> = BTreeMap::new();

        for &(current, projected) in pairs {
            if projected > current {
                raw_gainers += 1;
            } else if projected < current {
                raw_losers += 1;
            } else {
                raw_unchanged += 1;
            }

            let from_units = half_star_units(current);
            let to_units = half_star_units(projected);
            let delta_units = to_units - from_units;

            match TransitionDirection::of(delta_units) {
                TransitionDirection::Gain => bracket_gainers += 1,
                TransitionDirection::Unchanged => bracket_unchanged += 1,
                TransitionDirection::Loss => bracket_losers += 1,
            }
            shift_distribution.record(delta_units);
            *histogram.entry((from_units, to_units)).or_insert(0) += 1;
        }

        let mut transitions: Vec<BracketTransition> = histogram
            .into_iter()
            .map(|((from_units, to_units), count)| {
                let delta_units = to_units - from_units;
                BracketTransition {
                    key: format!(
                        "{:.1}★ → {:.1}★",
                        from_units as f64 / 2.0,
                        to_units as f64 / 2.0
                    ),
                    direction: TransitionDirection::of(delta_units),
                    delta_units,
                    count,
                }
            })
            .collect();

        transitions.sort_by(|a, b| {
            a.direction
                .rank()
                .cmp(&b.direction.rank())
                .then(b.count.cmp(&a.count))
                .then(a.key.cmp(&b.key))
        });

        Self {
            contracts: pairs.len(),
            raw_gainers,
            raw_losers,
            raw_unchanged,
            bracket_gainers,
            bracket_losers,
            bracket_unchanged,
            transitions,
            shift_distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_half_star() {
        assert_eq!(round_to_half_star(4.24), 4.0);
        assert_eq!(round_to_half_star(4.25), 4.5);
        assert_eq!(round_to_half_star(3.74), 3.5);
        assert_eq!(round_to_half_star(3.75), 4.0);
        assert_eq!(round_to_half_star(1.0), 1.0);
    }

    #[test]
    fn test_round_to_half_star_is_idempotent() {
        for units in 2..=10 {
            let aligned = units as f64 / 2.0;
            assert_eq!(round_to_half_star(aligned), aligned);
        }
    }

    #[test]
    fn test_half_star_units() {
        assert_eq!(half_star_units(4.0), 8);
        assert_eq!(half_star_units(3.5), 7);
        assert_eq!(half_star_units(3.74), 7);
        assert_eq!(half_star_units(3.75), 8);
    }

    #[test]
    fn test_half_star_loss_transition() {
        let report = BracketReport::from_pairs(&[(4.0, 3.5)]);

        assert_eq!(report.transitions.len(), 1);
        let transition = &report.transitions[0];
        assert_eq!(transition.key, "4.0★ → 3.5★");
        assert_eq!(transition.direction, TransitionDirection::Loss);
        assert_eq!(transition.delta_units, -1);
        assert_eq!(transition.count, 1);
        assert_eq!(report.bracket_losers, 1);
        assert_eq!(report.shift_distribution.lost_half, 1);
    }

    #[test]
    fn test_raw_movement_can_vanish_at_bracket_level() {
        let report = BracketReport::from_pairs(&[(3.9, 4.1)]);

        assert_eq!(report.raw_gainers, 1);
        assert_eq!(report.bracket_unchanged, 1);
        assert_eq!(report.bracket_gainers, 0);
        assert_eq!(report.transitions[0].key, "4.0★ → 4.0★");
    }

    #[test]
    fn test_transitions_sort_gains_then_unchanged_then_losses() {
        let report = BracketReport::from_pairs(&[
            (3.0, 3.5),
            (3.0, 3.5),
            (2.5, 3.0),
            (4.0, 4.0),
            (4.0, 3.5),
            (4.5, 3.0),
            (4.5, 3.0),
        ]);

        let keys: Vec<&str> = report.transitions.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "3.0★ → 3.5★",
                "2.5★ → 3.0★",
                "4.0★ → 4.0★",
                "4.5★ → 3.0★",
                "4.0★ → 3.5★",
            ]
        );
    }

    #[test]
    fn test_equal_count_groups_tie_break_by_key() {
        let report = BracketReport::from_pairs(&[(3.0, 3.5), (2.0, 2.5)]);

        let keys: Vec<&str> = report.transitions.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["2.0★ → 2.5★", "3.0★ → 3.5★"]);
    }

    #[test]
    fn test_shift_distribution_buckets() {
        let report = BracketReport::from_pairs(&[
            (3.0, 4.5), // +3 units
            (3.0, 4.0), // +2 units
            (3.5, 4.0), // +1
            (4.0, 4.0), // 0
            (4.0, 3.5), // -1
            (4.0, 3.0), // -2
            (4.0, 2.5), // -3
            (4.5, 2.0), // -5
        ]);

        let distribution = &report.shift_distribution;
        assert_eq!(distribution.gained_full_or_more, 2);
        assert_eq!(distribution.gained_half, 1);
        assert_eq!(distribution.unchanged, 1);
        assert_eq!(distribution.lost_half, 1);
        assert_eq!(distribution.lost_full, 1);
        assert_eq!(distribution.lost_one_and_half, 1);
        assert_eq!(distribution.lost_two_or_more, 1);
    }

    #[test]
    fn test_empty_population() {
        let report = BracketReport::from_pairs(&[]);
        assert_eq!(report.contracts, 0);
        assert!(report.transitions.is_empty());
    }
}
