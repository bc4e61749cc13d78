//! Hold-harmless resolver
//!
//! The quality-improvement measures are protected: when a contract clears
//! the hold-harmless threshold without them but including them would pull
//! it below, the contract is "held harmless" and rated without them. The
//! decision is made once per contract per scenario and every downstream
//! statistic must respect it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::contract::RatedMeasure;
use crate::methodology::MethodologyConfig;
use crate::rating::stats::weighted_mean;

/// Outcome of evaluating the hold-harmless rule for one contract in one
/// scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldHarmlessDecision {
    /// True when the protection fired and the official rating excludes the
    /// quality-improvement measures.
    pub applied: bool,
    /// Candidate rating over all eligible measures.
    pub rating_with_improvement: f64,
    /// Candidate rating excluding the quality-improvement measures. Absent
    /// when nothing else contributes.
    pub rating_without_improvement: Option<f64>,
    /// Quality-improvement codes actually excluded. Empty when not applied.
    pub excluded_codes: Vec<String>,
    /// Whether the official rating clears the separately configured
    /// overall bar.
    pub meets_overall_bar: bool,
}

/// Official rating for one contract in one scenario, plus the decision
/// that produced it. `decision` is `None` when no quality-improvement
/// measure is scored for the contract: the rule is inapplicable, not
/// merely unapplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldHarmlessOutcome {
    /// Weighted official rating; `None` when nothing contributes.
    pub official_rating: Option<f64>,
    pub decision: Option<HoldHarmlessDecision>,
}

impl HoldHarmlessOutcome {
    /// The exclusion set behind the official rating: the scenario's codes,
    /// plus the quality-improvement codes when the protection fired.
    pub fn official_exclusions(&self, scenario_exclusions: &BTreeSet<String>) -> BTreeSet<String> {
        let mut codes = scenario_exclusions.clone();
        if let Some(decision) = &self.decision {
            if decision.applied {
                codes.extend(decision.excluded_codes.iter().cloned());
            }
        }
        codes
    }

    /// Whether the protection fired.
    pub fn held_harmless(&self) -> bool {
        self.decision.as_ref().is_some_and(|d| d.applied)
    }
}

/// Evaluate the hold-harmless rule for one contract's measures (already
/// filtered to the rating type) under the given scenario exclusions.
pub fn resolve(
    measures: &[RatedMeasure],
    scenario_exclusions: &BTreeSet<String>,
    config: &MethodologyConfig,
) -> HoldHarmlessOutcome {
    let mut improvement_codes: Vec<String> = measures
        .iter()
        .filter(|m| {
            m.quality_improvement
                && m.is_contributing()
                && !scenario_exclusions.contains(&m.code)
        })
        .map(|m| m.code.clone())
        .collect();
    improvement_codes.sort();
    improvement_codes.dedup();

    if improvement_codes.is_empty() {
        return HoldHarmlessOutcome {
            official_rating: weighted_mean(measures, scenario_exclusions),
            decision: None,
        };
    }

    let rating_with_improvement = match weighted_mean(measures, scenario_exclusions) {
        Some(rating) => rating,
        // Unreachable while an improvement measure contributes; treated as
        // inapplicable rather than panicking.
        None => {
            return HoldHarmlessOutcome {
                official_rating: None,
                decision: None,
            }
        }
    };

    let mut without_improvement_exclusions = scenario_exclusions.clone();
    without_improvement_exclusions.extend(improvement_codes.iter().cloned());
    let rating_without_improvement = weighted_mean(measures, &without_improvement_exclusions);

    let applied = rating_without_improvement
        .is_some_and(|rating| rating >= config.hold_harmless_threshold)
        && rating_with_improvement < config.hold_harmless_threshold;

    let official_rating = match (applied, rating_without_improvement) {
        (true, Some(rating)) => rating,
        _ => rating_with_improvement,
    };

    HoldHarmlessOutcome {
        official_rating: Some(official_rating),
        decision: Some(HoldHarmlessDecision {
            applied,
            rating_with_improvement,
            rating_without_improvement,
            excluded_codes: if applied { improvement_codes } else { Vec::new() },
            meets_overall_bar: official_rating >= config.overall_bar,
        }),
    }
}
