//! Published measure-retirement schedule
//!
//! Measures announced for retirement, each tagged with the first rating
//! year it no longer appears. The tag is informational: it does not gate
//! exclusion by itself, the caller decides which retirement scenario is
//! active.

use serde::{Deserialize, Serialize};

/// One entry of the published retirement schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetiringMeasure {
    pub code: String,
    pub name: String,
    /// First rating year the measure is absent from the methodology.
    pub target_year: u16,
}

/// The currently published retirement schedule.
pub fn schedule() -> Vec<RetiringMeasure> {
    // Format: (code, name, first year absent)
    let entries: &[(&str, &str, u16)] = &[
        ("A07", "Care Coordination", 2026),
        ("A12", "Call Center Accessibility", 2026),
        ("B05", "Price Accuracy", 2027),
        ("B08", "Medication Adherence (Cholesterol)", 2027),
    ];

    entries
        .iter()
        .map(|&(code, name, target_year)| RetiringMeasure {
            code: code.to_string(),
            name: name.to_string(),
            target_year,
        })
        .collect()
}
