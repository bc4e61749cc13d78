//! Scenario value object
//!
//! A scenario is nothing more than the set of measure codes removed from
//! the calculation, plus the rating type it applies to. Representing it as
//! a value (instead of boolean knobs threaded through every call) keeps
//! every downstream function scenario-agnostic: statistics, hold-harmless,
//! and thresholds all take the exclusion set and stay oblivious to why a
//! code is excluded.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::MeasureCatalog;
use crate::contract::RatingType;

/// The two standard scenarios every analysis runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// The measure set as it stands today.
    Current,
    /// The measure set after all announced retirements take effect.
    Projected,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 2] = [ScenarioKind::Current, ScenarioKind::Projected];

    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::Current => "current",
            ScenarioKind::Projected => "projected",
        }
    }
}

/// One concrete scenario: which rating is computed and which codes are out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub rating_type: RatingType,
    /// Ordered for deterministic iteration and reporting.
    pub excluded_codes: BTreeSet<String>,
}

impl Scenario {
    /// The as-is scenario: nothing excluded.
    pub fn current(rating_type: RatingType) -> Self {
        Self {
            kind: ScenarioKind::Current,
            rating_type,
            excluded_codes: BTreeSet::new(),
        }
    }

    /// The after-retirement scenario: every announced retiring code within
    /// the rating type is excluded.
    pub fn projected(rating_type: RatingType, catalog: &MeasureCatalog) -> Self {
        Self {
            kind: ScenarioKind::Projected,
            rating_type,
            excluded_codes: catalog.retiring_codes(rating_type),
        }
    }

    pub fn excludes(&self, code: &str) -> bool {
        self.excluded_codes.contains(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Measure;
    use crate::methodology::MethodologyConfig;

    fn catalog() -> MeasureCatalog {
        let measures = vec![
            Measure {
                code: "A07".to_string(),
                name: "Care Coordination".to_string(),
                domain: "Member Experience".to_string(),
                category: None,
                weight: Some(4.0),
                year: 2026,
            },
            Measure {
                code: "B05".to_string(),
                name: "Price Accuracy".to_string(),
                domain: "Drug Pricing".to_string(),
                category: None,
                weight: Some(1.0),
                year: 2026,
            },
            Measure {
                code: "A01".to_string(),
                name: "Preventive Screening".to_string(),
                domain: "Staying Healthy".to_string(),
                category: None,
                weight: Some(1.0),
                year: 2026,
            },
        ];
        MeasureCatalog::build(2026, &measures, &MethodologyConfig::default())
    }

    #[test]
    fn test_current_excludes_nothing() {
        let scenario = Scenario::current(RatingType::Overall);
        assert_eq!(scenario.kind, ScenarioKind::Current);
        assert!(scenario.excluded_codes.is_empty());
        assert!(!scenario.excludes("A07"));
    }

    #[test]
    fn test_projected_excludes_retiring_codes() {
        let scenario = Scenario::projected(RatingType::Overall, &catalog());
        assert_eq!(scenario.kind, ScenarioKind::Projected);
        assert!(scenario.excludes("A07"));
        assert!(scenario.excludes("B05"));
        assert!(!scenario.excludes("A01"));
    }

    #[test]
    fn test_projected_respects_rating_type() {
        let scenario = Scenario::projected(RatingType::CategoryA, &catalog());
        assert!(scenario.excludes("A07"));
        assert!(!scenario.excludes("B05"));
    }
}
