//! Contract-side data model, CSV ingestion, and sample generation

pub mod data;
pub mod loader;
pub mod sample;

pub use data::{
    normalize_code, Contract, Measure, MeasureCategory, RatedMeasure, RatingType, ScoredMeasure,
};
pub use loader::{
    load_contracts, load_contracts_from_reader, load_measures, load_measures_from_reader,
    load_scores, load_scores_from_reader, LoadError,
};
pub use sample::{generate_sample, SampleParams, SampleTemplate};
