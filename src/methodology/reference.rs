//! Externally published reference threshold sets
//!
//! The methodology publisher releases percentile cut points alongside each
//! rating cycle, one set per rating type and per combination of two
//! methodology flags. The scenario comparator checks computed thresholds
//! against these tables.

use crate::contract::RatingType;
use crate::rating::PercentileThresholds;
use serde::{Deserialize, Serialize};

/// One published reference threshold set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceThresholds {
    pub rating_type: RatingType,
    /// Variant computed with the quality-improvement measures included.
    pub with_improvement: bool,
    /// Variant computed after the categorical adjustment.
    pub with_adjustment: bool,
    pub thresholds: PercentileThresholds,
}

/// Reference threshold sets from the current published cycle.
pub fn published_sets() -> Vec<ReferenceThresholds> {
    // Format: (rating type, with improvement, with adjustment,
    //          mean30, mean70, variance30, variance70)
    let entries: &[(RatingType, bool, bool, f64, f64, f64, f64)] = &[
        (RatingType::Overall, true, true, 3.249, 3.914, 0.246, 0.632),
        (RatingType::Overall, true, false, 3.228, 3.896, 0.251, 0.645),
        (RatingType::Overall, false, true, 3.302, 3.957, 0.219, 0.588),
        (RatingType::Overall, false, false, 3.281, 3.938, 0.224, 0.601),
        (RatingType::CategoryA, true, true, 3.187, 3.862, 0.278, 0.704),
        (RatingType::CategoryA, true, false, 3.164, 3.841, 0.284, 0.719),
        (RatingType::CategoryA, false, true, 3.241, 3.912, 0.247, 0.656),
        (RatingType::CategoryA, false, false, 3.219, 3.890, 0.253, 0.672),
        (RatingType::CategoryB, true, true, 3.358, 4.016, 0.203, 0.517),
        (RatingType::CategoryB, true, false, 3.334, 3.995, 0.208, 0.529),
        (RatingType::CategoryB, false, true, 3.412, 4.068, 0.181, 0.476),
        (RatingType::CategoryB, false, false, 3.389, 4.047, 0.186, 0.488),
    ];

    entries
        .iter()
        .map(
            |&(rating_type, with_improvement, with_adjustment, mean_30, mean_70, variance_30, variance_70)| {
                ReferenceThresholds {
                    rating_type,
                    with_improvement,
                    with_adjustment,
                    thresholds: PercentileThresholds {
                        mean_30,
                        mean_70,
                        variance_30,
                        variance_70,
                    },
                }
            },
        )
        .collect()
}
