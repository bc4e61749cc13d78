//! Scenario comparator
//!
//! Two jobs. First, the signed per-field difference between two threshold
//! sets, used to show what the projected scenario does to the cut points.
//! Second, matching a computed threshold set against the externally
//! published reference sets: per candidate, percent differences on all four
//! fields; the match is the candidate with the smallest mean absolute
//! percent difference on the variance fields. Mean fields are reported but
//! never drive selection; variances are far more sensitive to methodology
//! flags than means are.

use serde::{Deserialize, Serialize};

use crate::contract::RatingType;
use crate::methodology::ReferenceThresholds;
use crate::rating::thresholds::PercentileThresholds;

/// Signed field-by-field change from one threshold set to another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdDelta {
    pub mean_30: f64,
    pub mean_70: f64,
    pub variance_30: f64,
    pub variance_70: f64,
}

impl ThresholdDelta {
    /// Differences as `projected - current`.
    pub fn between(current: &PercentileThresholds, projected: &PercentileThresholds) -> Self {
        Self {
            mean_30: projected.mean_30 - current.mean_30,
            mean_70: projected.mean_70 - current.mean_70,
            variance_30: projected.variance_30 - current.variance_30,
            variance_70: projected.variance_70 - current.variance_70,
        }
    }
}

/// Percent differences of the computed set against one reference candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateComparison {
    pub with_improvement: bool,
    pub with_adjustment: bool,
    pub reference: PercentileThresholds,
    pub mean_30_pct: f64,
    pub mean_70_pct: f64,
    pub variance_30_pct: f64,
    pub variance_70_pct: f64,
    /// Mean absolute percent difference over the two variance fields; the
    /// candidate minimizing this is the match.
    pub variance_score: f64,
}

/// Result of matching one computed threshold set against the published
/// reference table for a rating type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialComparison {
    pub rating_type: RatingType,
    pub computed: PercentileThresholds,
    /// Every candidate evaluated, in table order.
    pub candidates: Vec<CandidateComparison>,
    /// Index into `candidates` of the matched reference set.
    pub matched: usize,
}

impl OfficialComparison {
    pub fn matched_candidate(&self) -> &CandidateComparison {
        &self.candidates[self.matched]
    }
}

/// Match `computed` against the published reference sets for `rating_type`.
/// Returns `None` when the table carries no candidate for the rating type.
pub fn compare_official(
    rating_type: RatingType,
    computed: &PercentileThresholds,
    references: &[ReferenceThresholds],
) -> Option<OfficialComparison> {
    let candidates: Vec<CandidateComparison> = references
        .iter()
        .filter(|r| r.rating_type == rating_type)
        .map(|r| {
            let variance_30_pct = percent_difference(computed.variance_30, r.thresholds.variance_30);
            let variance_70_pct = percent_difference(computed.variance_70, r.thresholds.variance_70);
            CandidateComparison {
                with_improvement: r.with_improvement,
                with_adjustment: r.with_adjustment,
                reference: r.thresholds,
                mean_30_pct: percent_difference(computed.mean_30, r.thresholds.mean_30),
                mean_70_pct: percent_difference(computed.mean_70, r.thresholds.mean_70),
                variance_30_pct,
                variance_70_pct,
                variance_score: (variance_30_pct.abs() + variance_70_pct.abs()) / 2.0,
            }
        })
        .collect();

    if candidates.is_empty() {
        return None;
    }

    let matched = candidates
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.variance_score.total_cmp(&b.variance_score))
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    Some(OfficialComparison {
        rating_type,
        computed: *computed,
        candidates,
        matched,
    })
}

fn percent_difference(computed: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        if computed == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (computed - reference) / reference * 100.0
    }
}
