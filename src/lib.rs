//! Star-rating and reward-factor simulation engine
//!
//! Reproduces the published multi-measure star-rating methodology for
//! regulated health-plan contracts: weighted per-contract statistics, the
//! hold-harmless rule for quality-improvement measures, population
//! percentile thresholds, reward-factor classification, and half-star
//! bracket reporting, across the current measure set and the projected set
//! after announced measure retirements.
//!
//! The crate is a library boundary: inputs are plain in-memory rows
//! (loaded from CSV extracts or generated as a sample universe) and the
//! output is a serializable report. Nothing here performs I/O during the
//! computation itself.
//!
//! ```
//! use star_ratings::contract::{generate_sample, RatingType, SampleParams};
//! use star_ratings::methodology::MethodologyConfig;
//! use star_ratings::rating::{AnalysisOptions, SimulationEngine};
//!
//! let data = generate_sample(&SampleParams::default());
//! let engine = SimulationEngine::new(
//!     MethodologyConfig::default(),
//!     AnalysisOptions {
//!         year: 2026,
//!         rating_type: RatingType::Overall,
//!         apply_categorical_adjustment: false,
//!     },
//! );
//! let report = engine.run(&data).unwrap();
//! assert!(report.current.rated_contracts > 0);
//! ```

pub mod catalog;
pub mod contract;
pub mod methodology;
pub mod rating;

pub use catalog::{CatalogEntry, MeasureCatalog};
pub use contract::{Contract, Measure, MeasureCategory, RatingType, ScoredMeasure};
pub use methodology::MethodologyConfig;
pub use rating::{
    AnalysisData, AnalysisOptions, AnalysisReport, RatingError, SimulationEngine,
};
