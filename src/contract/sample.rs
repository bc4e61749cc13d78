//! Deterministic sample universe generator
//!
//! Generates a contract population on the fly from a fixed measure table
//! and a handful of knobs, for demos and what-if runs when no CSV extract
//! is at hand. Everything is derived arithmetically from indices; two runs
//! with the same parameters produce identical universes.

use serde::{Deserialize, Serialize};

use super::data::{Contract, Measure, ScoredMeasure};
use crate::rating::AnalysisData;

/// Parameters for generating the sample universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleParams {
    /// Analysis year stamped on every generated measure.
    #[serde(default = "default_year")]
    pub year: u16,

    /// Number of contracts to generate.
    /// Default: 120
    #[serde(default = "default_contract_count")]
    pub contract_count: usize,

    /// Uniform shift applied to every generated star value (clamped to the
    /// measure scale). Lets a single universe play out optimistic and
    /// pessimistic runs.
    #[serde(default)]
    pub score_shift: f64,

    /// Every n-th score is left unrated to exercise the missing-data
    /// handling. 0 disables the gaps.
    #[serde(default = "default_missing_every")]
    pub missing_every: usize,
}

fn default_year() -> u16 {
    2026
}
fn default_contract_count() -> usize {
    120
}
fn default_missing_every() -> usize {
    7
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            year: 2026,
            contract_count: 120,
            score_shift: 0.0,
            missing_every: 7,
        }
    }
}

/// Pre-built measure table for generating sample universes.
pub struct SampleTemplate {
    measures: Vec<Measure>,
}

impl SampleTemplate {
    /// Build the template from the fixed measure table.
    pub fn new(year: u16) -> Self {
        Self {
            measures: build_measures(year),
        }
    }

    /// Generate a full input set from the parameters.
    pub fn generate(&self, params: &SampleParams) -> AnalysisData {
        let mut contracts = Vec::with_capacity(params.contract_count);
        let mut scores = Vec::with_capacity(params.contract_count * self.measures.len());

        for i in 0..params.contract_count {
            let contract_id = format!("H{}", 1000 + i);

            for (j, measure) in self.measures.iter().enumerate() {
                let unrated =
                    params.missing_every != 0 && (i * 31 + j) % params.missing_every == 0;
                let stars = if unrated {
                    None
                } else {
                    // 1.0 to 5.0 in half-star steps, phase-shifted per
                    // contract and measure so no two columns move together.
                    let raw = 1.0 + ((i * 7 + j * 13) % 9) as f64 * 0.5;
                    Some((raw + params.score_shift).clamp(1.0, 5.0))
                };
                scores.push(ScoredMeasure {
                    contract_id: contract_id.clone(),
                    measure_code: measure.code.clone(),
                    stars,
                    category: measure.category,
                });
            }

            contracts.push(Contract {
                contract_id,
                parent_organization: parent_organization(i),
                overall_rating: published_rating(i, 0),
                category_a_rating: published_rating(i, 1),
                category_b_rating: published_rating(i, 2),
                categorical_adjustment: if i % 9 == 0 {
                    Some(if i % 18 == 0 { 0.1 } else { -0.1 })
                } else {
                    None
                },
            });
        }

        AnalysisData {
            contracts,
            measures: self.measures.clone(),
            scores,
        }
    }
}

/// Generate the default sample universe.
pub fn generate_sample(params: &SampleParams) -> AnalysisData {
    SampleTemplate::new(params.year).generate(params)
}

fn parent_organization(i: usize) -> Option<String> {
    const PARENTS: [&str; 5] = [
        "Aurora Health Group",
        "Beacon Mutual",
        "Cedar Plains Alliance",
        "Dominion Care Partners",
        "Evergreen Benefits",
    ];
    // A few contracts file without a parent organization.
    if i % 11 == 10 {
        None
    } else {
        Some(PARENTS[i % PARENTS.len()].to_string())
    }
}

fn published_rating(i: usize, salt: usize) -> Option<f64> {
    // Contracts too new to have a published rating.
    if (i + salt) % 13 == 12 {
        None
    } else {
        Some(2.5 + ((i * 3 + salt * 5) % 6) as f64 * 0.5)
    }
}

/// The fixed sample measure table.
fn build_measures(year: u16) -> Vec<Measure> {
    // Format: (code, name, domain, weight)
    let rows: &[(&str, &str, &str, f64)] = &[
        ("A01", "Preventive Screening", "Staying Healthy", 1.0),
        ("A02", "Vaccination Rate", "Staying Healthy", 1.0),
        ("A03", "Physical Health Monitoring", "Managing Chronic Conditions", 1.0),
        ("A04", "Chronic Condition Control", "Managing Chronic Conditions", 3.0),
        ("A05", "Medication Review", "Managing Chronic Conditions", 1.0),
        ("A06", "Readmission Rate", "Managing Chronic Conditions", 3.0),
        ("A07", "Care Coordination", "Member Experience", 4.0),
        ("A08", "Getting Needed Care", "Member Experience", 4.0),
        ("A09", "Timely Appointments", "Member Experience", 4.0),
        ("A10", "Member Complaints", "Member Complaints", 2.0),
        ("A11", "Voluntary Disenrollment", "Member Complaints", 2.0),
        ("A12", "Call Center Accessibility", "Customer Service", 2.0),
        ("A13", "Appeals Handling", "Customer Service", 2.0),
        ("A23", "Quality Improvement (Category A)", "Quality Improvement", 5.0),
        ("B01", "Call Center Availability", "Customer Service", 2.0),
        ("B02", "Appeals Upheld", "Customer Service", 2.0),
        ("B03", "Complaint Rate (Drug)", "Member Complaints", 2.0),
        ("B04", "Quality Improvement (Category B)", "Quality Improvement", 5.0),
        ("B05", "Price Accuracy", "Drug Pricing", 1.0),
        ("B06", "Medication Adherence (Diabetes)", "Drug Safety", 3.0),
        ("B07", "Medication Adherence (Hypertension)", "Drug Safety", 3.0),
        ("B08", "Medication Adherence (Cholesterol)", "Drug Safety", 3.0),
        ("B09", "Statin Use", "Drug Safety", 1.0),
        ("B10", "Medication Therapy Management", "Drug Safety", 1.0),
    ];

    rows.iter()
        .map(|&(code, name, domain, weight)| Measure {
            code: code.to_string(),
            name: name.to_string(),
            domain: domain.to_string(),
            category: None,
            weight: Some(weight),
            year,
        })
        .collect()
}
