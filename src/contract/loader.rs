//! CSV ingestion for contract, measure, and score rows
//!
//! This is the data-access boundary: the engine itself never touches I/O.
//! Rows are normalized here (codes trimmed and upper-cased, blank optional
//! fields mapped to `None`) so the algorithms can compare codes directly.

use super::data::{normalize_code, Contract, Measure, ScoredMeasure};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors surfaced while materializing input rows.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {table} row: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("invalid {table} row {row}: {reason}")]
    Invalid {
        table: &'static str,
        row: usize,
        reason: String,
    },
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load measure definitions from a CSV file with columns
/// `code,name,domain,category,weight,year`.
pub fn load_measures(path: impl AsRef<Path>) -> Result<Vec<Measure>, LoadError> {
    load_measures_from_reader(open(path.as_ref())?)
}

pub fn load_measures_from_reader<R: Read>(reader: R) -> Result<Vec<Measure>, LoadError> {
    const TABLE: &str = "measure";
    let mut rows = Vec::new();
    for (idx, record) in csv::Reader::from_reader(reader).deserialize().enumerate() {
        let mut measure: Measure = record.map_err(|source| LoadError::Csv { table: TABLE, source })?;
        measure.code = normalize_code(&measure.code);
        measure.name = measure.name.trim().to_string();
        measure.domain = measure.domain.trim().to_string();
        if measure.code.is_empty() {
            return Err(invalid(TABLE, idx, "empty measure code"));
        }
        if let Some(w) = measure.weight {
            if !w.is_finite() || w < 0.0 {
                return Err(invalid(TABLE, idx, format!("weight {w} out of range")));
            }
        }
        rows.push(measure);
    }
    Ok(rows)
}

/// Load per-contract measure scores from a CSV file with columns
/// `contract_id,measure_code,stars,category`. A blank `stars` field means
/// the measure was not rated for that contract.
pub fn load_scores(path: impl AsRef<Path>) -> Result<Vec<ScoredMeasure>, LoadError> {
    load_scores_from_reader(open(path.as_ref())?)
}

pub fn load_scores_from_reader<R: Read>(reader: R) -> Result<Vec<ScoredMeasure>, LoadError> {
    const TABLE: &str = "score";
    let mut rows = Vec::new();
    for (idx, record) in csv::Reader::from_reader(reader).deserialize().enumerate() {
        let mut score: ScoredMeasure = record.map_err(|source| LoadError::Csv { table: TABLE, source })?;
        score.contract_id = score.contract_id.trim().to_ascii_uppercase();
        score.measure_code = normalize_code(&score.measure_code);
        if score.contract_id.is_empty() {
            return Err(invalid(TABLE, idx, "empty contract id"));
        }
        if score.measure_code.is_empty() {
            return Err(invalid(TABLE, idx, "empty measure code"));
        }
        if let Some(s) = score.stars {
            if !s.is_finite() || !(0.0..=5.0).contains(&s) {
                return Err(invalid(TABLE, idx, format!("star value {s} outside [0, 5]")));
            }
        }
        rows.push(score);
    }
    Ok(rows)
}

/// Load contract rows from a CSV file with columns
/// `contract_id,parent_organization,overall_rating,category_a_rating,category_b_rating,categorical_adjustment`.
pub fn load_contracts(path: impl AsRef<Path>) -> Result<Vec<Contract>, LoadError> {
    load_contracts_from_reader(open(path.as_ref())?)
}

pub fn load_contracts_from_reader<R: Read>(reader: R) -> Result<Vec<Contract>, LoadError> {
    const TABLE: &str = "contract";
    let mut rows = Vec::new();
    for (idx, record) in csv::Reader::from_reader(reader).deserialize().enumerate() {
        let mut contract: Contract = record.map_err(|source| LoadError::Csv { table: TABLE, source })?;
        contract.contract_id = contract.contract_id.trim().to_ascii_uppercase();
        contract.parent_organization = contract
            .parent_organization
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if contract.contract_id.is_empty() {
            return Err(invalid(TABLE, idx, "empty contract id"));
        }
        for rating in [
            contract.overall_rating,
            contract.category_a_rating,
            contract.category_b_rating,
        ]
        .into_iter()
        .flatten()
        {
            if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
                return Err(invalid(TABLE, idx, format!("published rating {rating} outside [0, 5]")));
            }
        }
        rows.push(contract);
    }
    Ok(rows)
}

fn invalid(table: &'static str, idx: usize, reason: impl Into<String>) -> LoadError {
    LoadError::Invalid {
        table,
        // +2 accounts for the header line and 1-based numbering.
        row: idx + 2,
        reason: reason.into(),
    }
}
