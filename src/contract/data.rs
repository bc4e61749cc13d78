//! Row-level types consumed by the rating engine: contracts, measures,
//! and per-contract measure scores, as materialized by the data-access layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two rated product lines.
///
/// Measure codes use disjoint prefix namespaces: codes beginning with `A`
/// belong to Category A, codes beginning with `B` to Category B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureCategory {
    A,
    B,
}

impl MeasureCategory {
    /// Derive the category from the code prefix convention.
    /// Returns `None` for codes outside both namespaces.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().as_bytes().first() {
            Some(b'A') | Some(b'a') => Some(MeasureCategory::A),
            Some(b'B') | Some(b'b') => Some(MeasureCategory::B),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MeasureCategory::A => "Category A",
            MeasureCategory::B => "Category B",
        }
    }
}

/// Which rating a simulation run targets. `Overall` spans both product
/// lines; the category variants restrict the measure set to one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RatingType {
    Overall,
    CategoryA,
    CategoryB,
}

impl RatingType {
    pub const ALL: [RatingType; 3] = [RatingType::Overall, RatingType::CategoryA, RatingType::CategoryB];

    /// Whether a measure in `category` contributes to this rating.
    pub fn includes(&self, category: MeasureCategory) -> bool {
        match self {
            RatingType::Overall => true,
            RatingType::CategoryA => category == MeasureCategory::A,
            RatingType::CategoryB => category == MeasureCategory::B,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingType::Overall => "Overall",
            RatingType::CategoryA => "Category A",
            RatingType::CategoryB => "Category B",
        }
    }
}

impl fmt::Display for RatingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RatingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overall" => Ok(RatingType::Overall),
            "a" | "category-a" | "category_a" | "category a" => Ok(RatingType::CategoryA),
            "b" | "category-b" | "category_b" | "category b" => Ok(RatingType::CategoryB),
            other => Err(format!("unknown rating type '{other}' (expected overall, category-a, or category-b)")),
        }
    }
}

/// Canonical form for measure codes: trimmed, upper-cased.
/// Applied once at ingestion so the engine can compare codes directly.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// One quality/performance measure definition for a given year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub code: String,
    pub name: String,
    /// Grouping label used by presentation layers (e.g. "Member Experience").
    pub domain: String,
    /// Explicit product line; derived from the code prefix when absent.
    pub category: Option<MeasureCategory>,
    /// Contribution weight. Absent or non-positive means non-contributing.
    pub weight: Option<f64>,
    pub year: u16,
}

impl Measure {
    /// Category of this measure, falling back to the code prefix convention.
    pub fn resolved_category(&self) -> Option<MeasureCategory> {
        self.category.or_else(|| MeasureCategory::from_code(&self.code))
    }
}

/// One contract's star value on one measure for the analysis year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMeasure {
    pub contract_id: String,
    pub measure_code: String,
    /// Star value in [0, 5]. Absent when the measure was not rated for
    /// this contract; absent is not the same as zero, but both are
    /// excluded from weighted computations.
    pub stars: Option<f64>,
    pub category: Option<MeasureCategory>,
}

/// The rated regulated entity for a given year, with its officially
/// published ratings where available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: String,
    pub parent_organization: Option<String>,
    pub overall_rating: Option<f64>,
    pub category_a_rating: Option<f64>,
    pub category_b_rating: Option<f64>,
    /// Externally supplied additive correction applied after the
    /// reward factor.
    pub categorical_adjustment: Option<f64>,
}

impl Contract {
    /// The published official rating for the requested rating type.
    pub fn official_rating(&self, rating_type: RatingType) -> Option<f64> {
        match rating_type {
            RatingType::Overall => self.overall_rating,
            RatingType::CategoryA => self.category_a_rating,
            RatingType::CategoryB => self.category_b_rating,
        }
    }
}

/// A contract's score joined with the measure's catalog attributes.
/// This is the tuple the statistics calculator and the hold-harmless
/// resolver consume.
#[derive(Debug, Clone, PartialEq)]
pub struct RatedMeasure {
    pub code: String,
    pub stars: Option<f64>,
    pub weight: f64,
    pub category: MeasureCategory,
    /// Marks one of the protected quality-improvement measures.
    pub quality_improvement: bool,
}

impl RatedMeasure {
    /// The contribution rule: only a finite star value above zero paired
    /// with a positive weight enters any weighted computation. Everything
    /// else is excluded from numerator and denominator alike.
    pub fn is_contributing(&self) -> bool {
        self.weight.is_finite()
            && self.weight > 0.0
            && self.stars.is_some_and(|s| s.is_finite() && s > 0.0)
    }
}
