//! Simulation engine
//!
//! Orchestrates one analysis run: resolve the catalog, evaluate every
//! contract under the current and projected scenarios, cut the population
//! into cohorts, compute thresholds, classify reward factors, and assemble
//! the report. Per-contract work is independent and runs in parallel; the
//! threshold stage only starts once the whole population is collected.
//!
//! Per-contract anomalies (too few measures, no scores at all) never abort
//! the run. Only an input set that cannot produce any population at all is
//! an error.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::MeasureCatalog;
use crate::contract::{Contract, Measure, RatedMeasure, RatingType, ScoredMeasure};
use crate::methodology::MethodologyConfig;
use crate::rating::brackets::{half_star_units, BracketReport};
use crate::rating::clamp_rating;
use crate::rating::compare::{compare_official, OfficialComparison, ThresholdDelta};
use crate::rating::hold_harmless::{self, HoldHarmlessDecision, HoldHarmlessOutcome};
use crate::rating::reward::{classify, RewardFactorResult};
use crate::rating::scenario::Scenario;
use crate::rating::stats::ContractStatistics;
use crate::rating::thresholds::PercentileThresholds;

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("no contracts in the input set for {year}")]
    EmptyPopulation { year: u16 },

    #[error("no measures resolved in the catalog for {year}")]
    EmptyCatalog { year: u16 },

    #[error("analysis aborted before completion")]
    Aborted,
}

/// What to analyze and how.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub year: u16,
    pub rating_type: RatingType,
    /// Apply each contract's Categorical Adjustment on top of the
    /// reward-adjusted rating.
    pub apply_categorical_adjustment: bool,
}

/// Input rows for one analysis year, already materialized in memory.
#[derive(Debug, Clone, Default)]
pub struct AnalysisData {
    pub contracts: Vec<Contract>,
    pub measures: Vec<Measure>,
    pub scores: Vec<ScoredMeasure>,
}

/// One contract's results under a single scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Weighted official rating after the hold-harmless decision.
    pub official_rating: Option<f64>,
    pub held_harmless: bool,
    pub decision: Option<HoldHarmlessDecision>,
    /// Absent when fewer than two measures contribute.
    pub statistics: Option<ContractStatistics>,
    /// Absent when the contract is excluded from its cohort's statistics.
    pub reward: Option<RewardFactorResult>,
    /// Official rating plus reward factor plus optional Categorical
    /// Adjustment, clamped to the rating scale.
    pub final_rating: Option<f64>,
}

/// One contract across both scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractOutcome {
    pub contract_id: String,
    pub parent_organization: Option<String>,
    /// The officially published rating for the analyzed rating type.
    pub published_rating: Option<f64>,
    pub categorical_adjustment: Option<f64>,
    pub current: ScenarioOutcome,
    pub projected: ScenarioOutcome,
    /// Bracket movement between the two final ratings, in half-star units.
    pub bracket_delta_units: Option<i32>,
}

/// Population thresholds for one scenario, one per cohort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortThresholds {
    /// Contracts rated with their quality-improvement measures.
    pub standard: Option<PercentileThresholds>,
    /// Contracts whose hold-harmless protection fired.
    pub held_harmless: Option<PercentileThresholds>,
}

/// Scenario-level summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub excluded_codes: BTreeSet<String>,
    pub thresholds: CohortThresholds,
    pub standard_cohort: usize,
    pub held_harmless_cohort: usize,
    /// Contracts with a computed official rating in this scenario.
    pub rated_contracts: usize,
}

/// Signed threshold movement from the current to the projected scenario,
/// per cohort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortDeltas {
    pub standard: Option<ThresholdDelta>,
    pub held_harmless: Option<ThresholdDelta>,
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub year: u16,
    pub rating_type: RatingType,
    pub generated_at: DateTime<Utc>,
    pub current: ScenarioSummary,
    pub projected: ScenarioSummary,
    pub threshold_deltas: CohortDeltas,
    /// Match against the published reference table, from the current
    /// scenario's standard cohort. Absent when that cohort is too small or
    /// the table has no candidate.
    pub official_comparison: Option<OfficialComparison>,
    /// Bracket movement over contracts that carry a published rating.
    pub brackets: BracketReport,
    /// Contracts in input order.
    pub contracts: Vec<ContractOutcome>,
    /// Score rows whose measure code did not resolve in the catalog.
    pub skipped_scores: usize,
}

struct ScenarioEvaluation {
    outcome: HoldHarmlessOutcome,
    statistics: Option<ContractStatistics>,
}

struct ContractEvaluation {
    current: ScenarioEvaluation,
    projected: ScenarioEvaluation,
}

/// Star-rating simulation over one in-memory population.
pub struct SimulationEngine {
    config: MethodologyConfig,
    options: AnalysisOptions,
}

impl SimulationEngine {
    pub fn new(config: MethodologyConfig, options: AnalysisOptions) -> Self {
        Self { config, options }
    }

    pub fn run(&self, data: &AnalysisData) -> Result<AnalysisReport, RatingError> {
        self.run_with_cancel(data, &AtomicBool::new(false))
    }

    /// Like [`run`](Self::run), but aborts between stages when `cancel` is
    /// set. A stage in flight always completes; nothing is torn down
    /// mid-calculation.
    pub fn run_with_cancel(
        &self,
        data: &AnalysisData,
        cancel: &AtomicBool,
    ) -> Result<AnalysisReport, RatingError> {
        let year = self.options.year;
        let rating_type = self.options.rating_type;

        if data.contracts.is_empty() {
            return Err(RatingError::EmptyPopulation { year });
        }

        let catalog = MeasureCatalog::build(year, &data.measures, &self.config);
        if catalog.is_empty() {
            return Err(RatingError::EmptyCatalog { year });
        }
        debug!("catalog for {year}: {} measures", catalog.len());

        let (measures_by_contract, skipped_scores) = self.group_scores(&catalog, &data.scores);
        if skipped_scores > 0 {
            warn!("{skipped_scores} score rows reference measures outside the {year} catalog");
        }

        let current_scenario = Scenario::current(rating_type);
        let projected_scenario = Scenario::projected(rating_type, &catalog);
        debug!(
            "projected scenario excludes {} measures",
            projected_scenario.excluded_codes.len()
        );

        ensure_not_cancelled(cancel)?;

        // Independent per-contract pass. The collect is the barrier: the
        // threshold stage sees the complete population or none of it.
        let evaluations: Vec<ContractEvaluation> = data
            .contracts
            .par_iter()
            .map(|contract| {
                let measures = measures_by_contract
                    .get(contract.contract_id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                ContractEvaluation {
                    current: self.evaluate(contract, measures, &current_scenario),
                    projected: self.evaluate(contract, measures, &projected_scenario),
                }
            })
            .collect();

        ensure_not_cancelled(cancel)?;

        let current_thresholds =
            cohort_thresholds(evaluations.iter().map(|e| &e.current));
        let projected_thresholds =
            cohort_thresholds(evaluations.iter().map(|e| &e.projected));

        let contracts: Vec<ContractOutcome> = data
            .contracts
            .iter()
            .zip(evaluations)
            .map(|(contract, evaluation)| {
                self.finish_contract(contract, evaluation, &current_thresholds, &projected_thresholds)
            })
            .collect();

        ensure_not_cancelled(cancel)?;

        let threshold_deltas = CohortDeltas {
            standard: delta_between(
                current_thresholds.standard.as_ref(),
                projected_thresholds.standard.as_ref(),
            ),
            held_harmless: delta_between(
                current_thresholds.held_harmless.as_ref(),
                projected_thresholds.held_harmless.as_ref(),
            ),
        };

        let official_comparison = current_thresholds
            .standard
            .as_ref()
            .and_then(|computed| {
                compare_official(rating_type, computed, &self.config.reference_thresholds)
            });

        let bracket_pairs: Vec<(f64, f64)> = contracts
            .iter()
            .filter(|c| c.published_rating.is_some())
            .filter_map(|c| {
                match (c.current.final_rating, c.projected.final_rating) {
                    (Some(current), Some(projected)) => Some((current, projected)),
                    _ => None,
                }
            })
            .collect();
        let brackets = BracketReport::from_pairs(&bracket_pairs);

        Ok(AnalysisReport {
            year,
            rating_type,
            generated_at: Utc::now(),
            current: summarize(&current_scenario, &current_thresholds, contracts.iter().map(|c| &c.current)),
            projected: summarize(&projected_scenario, &projected_thresholds, contracts.iter().map(|c| &c.projected)),
            threshold_deltas,
            official_comparison,
            brackets,
            contracts,
            skipped_scores,
        })
    }

    /// Join score rows with the catalog and group them per contract,
    /// keeping only the analyzed rating type's measures. A contract holds
    /// one row per measure code; a duplicate replaces the earlier row.
    fn group_scores(
        &self,
        catalog: &MeasureCatalog,
        scores: &[ScoredMeasure],
    ) -> (HashMap<String, Vec<RatedMeasure>>, usize) {
        let mut by_contract: HashMap<String, Vec<RatedMeasure>> = HashMap::new();
        let mut skipped = 0usize;
        for score in scores {
            match catalog.rated_measure(score) {
                Some(rated) => {
                    if self.options.rating_type.includes(rated.category) {
                        let measures = by_contract
                            .entry(score.contract_id.clone())
                            .or_default();
                        match measures.iter_mut().find(|m| m.code == rated.code) {
                            Some(existing) => {
                                warn!(
                                    "duplicate score for {} on {}, keeping the later row",
                                    score.contract_id, rated.code
                                );
                                *existing = rated;
                            }
                            None => measures.push(rated),
                        }
                    }
                }
                None => {
                    debug!(
                        "score for {} references unknown measure {}",
                        score.contract_id, score.measure_code
                    );
                    skipped += 1;
                }
            }
        }
        (by_contract, skipped)
    }

    fn evaluate(
        &self,
        contract: &Contract,
        measures: &[RatedMeasure],
        scenario: &Scenario,
    ) -> ScenarioEvaluation {
        let outcome = hold_harmless::resolve(measures, &scenario.excluded_codes, &self.config);
        let exclusions = outcome.official_exclusions(&scenario.excluded_codes);
        let statistics =
            ContractStatistics::from_measures(&contract.contract_id, measures, &exclusions);
        ScenarioEvaluation {
            outcome,
            statistics,
        }
    }

    fn finish_contract(
        &self,
        contract: &Contract,
        evaluation: ContractEvaluation,
        current_thresholds: &CohortThresholds,
        projected_thresholds: &CohortThresholds,
    ) -> ContractOutcome {
        let current = self.finish_scenario(contract, evaluation.current, current_thresholds);
        let projected = self.finish_scenario(contract, evaluation.projected, projected_thresholds);

        let bracket_delta_units = match (current.final_rating, projected.final_rating) {
            (Some(from), Some(to)) => Some(half_star_units(to) - half_star_units(from)),
            _ => None,
        };

        ContractOutcome {
            contract_id: contract.contract_id.clone(),
            parent_organization: contract.parent_organization.clone(),
            published_rating: contract.official_rating(self.options.rating_type),
            categorical_adjustment: contract.categorical_adjustment,
            current,
            projected,
            bracket_delta_units,
        }
    }

    fn finish_scenario(
        &self,
        contract: &Contract,
        evaluation: ScenarioEvaluation,
        thresholds: &CohortThresholds,
    ) -> ScenarioOutcome {
        let held_harmless = evaluation.outcome.held_harmless();
        let cohort = if held_harmless {
            thresholds.held_harmless.as_ref()
        } else {
            thresholds.standard.as_ref()
        };

        let reward = match (&evaluation.statistics, cohort) {
            (Some(statistics), Some(thresholds)) => {
                Some(classify(statistics, thresholds, &self.config))
            }
            _ => None,
        };

        let final_rating = evaluation.outcome.official_rating.map(|official| {
            let r_factor = reward.as_ref().map(|r| r.r_factor).unwrap_or(0.0);
            let adjustment = if self.options.apply_categorical_adjustment {
                contract.categorical_adjustment.unwrap_or(0.0)
            } else {
                0.0
            };
            clamp_rating(official + r_factor + adjustment)
        });

        ScenarioOutcome {
            official_rating: evaluation.outcome.official_rating,
            held_harmless,
            decision: evaluation.outcome.decision,
            statistics: evaluation.statistics,
            reward,
            final_rating,
        }
    }
}

fn ensure_not_cancelled(cancel: &AtomicBool) -> Result<(), RatingError> {
    if cancel.load(Ordering::Relaxed) {
        Err(RatingError::Aborted)
    } else {
        Ok(())
    }
}

/// Split one scenario's population into its two cohorts and compute each
/// cohort's thresholds. Cohorts are distinct statistical populations and
/// are never pooled.
fn cohort_thresholds<'a>(
    evaluations: impl Iterator<Item = &'a ScenarioEvaluation>,
) -> CohortThresholds {
    let mut standard: Vec<ContractStatistics> = Vec::new();
    let mut held_harmless: Vec<ContractStatistics> = Vec::new();
    for evaluation in evaluations {
        if let Some(statistics) = &evaluation.statistics {
            if evaluation.outcome.held_harmless() {
                held_harmless.push(statistics.clone());
            } else {
                standard.push(statistics.clone());
            }
        }
    }
    CohortThresholds {
        standard: PercentileThresholds::from_population(&standard),
        held_harmless: PercentileThresholds::from_population(&held_harmless),
    }
}

fn delta_between(
    current: Option<&PercentileThresholds>,
    projected: Option<&PercentileThresholds>,
) -> Option<ThresholdDelta> {
    match (current, projected) {
        (Some(current), Some(projected)) => Some(ThresholdDelta::between(current, projected)),
        _ => None,
    }
}

fn summarize<'a>(
    scenario: &Scenario,
    thresholds: &CohortThresholds,
    outcomes: impl Iterator<Item = &'a ScenarioOutcome>,
) -> ScenarioSummary {
    let mut standard_cohort = 0;
    let mut held_harmless_cohort = 0;
    let mut rated_contracts = 0;
    for outcome in outcomes {
        if outcome.official_rating.is_some() {
            rated_contracts += 1;
        }
        if outcome.statistics.is_some() {
            if outcome.held_harmless {
                held_harmless_cohort += 1;
            } else {
                standard_cohort += 1;
            }
        }
    }
    ScenarioSummary {
        excluded_codes: scenario.excluded_codes.clone(),
        thresholds: *thresholds,
        standard_cohort,
        held_harmless_cohort,
        rated_contracts,
    }
}
