//! Methodology configuration
//!
//! Everything the rating methodology publishes per cycle lives here: the
//! hold-harmless constants, reward-factor magnitudes, quality-improvement
//! measure codes, the retirement schedule, and the reference threshold
//! tables. Defaults mirror the current published cycle; a JSON file can
//! override any subset of fields for what-if runs.

pub mod reference;
pub mod retirement;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::contract::normalize_code;

pub use reference::ReferenceThresholds;
pub use retirement::RetiringMeasure;

/// Errors raised while loading a methodology override file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read methodology config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse methodology config")]
    Parse(#[from] serde_json::Error),
}

/// Published methodology parameters for one rating cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodologyConfig {
    /// Minimum candidate rating at which the hold-harmless override can
    /// drop the quality-improvement measures. Default: 4.0 stars.
    #[serde(default = "default_hold_harmless_threshold")]
    pub hold_harmless_threshold: f64,

    /// Overall-rating bar reported alongside each hold-harmless decision.
    /// Default: 3.75 stars.
    #[serde(default = "default_overall_bar")]
    pub overall_bar: f64,

    /// Reward factor for contracts with high mean and low variance.
    /// Default: 0.4 stars.
    #[serde(default = "default_reward_factor_high")]
    pub reward_factor_high: f64,

    /// Reward factor for contracts strong on one axis and middling on the
    /// other. Default: 0.2 stars.
    #[serde(default = "default_reward_factor_low")]
    pub reward_factor_low: f64,

    /// Measure codes designated as quality-improvement measures.
    #[serde(default = "default_quality_improvement_codes")]
    pub quality_improvement_codes: Vec<String>,

    /// Measures announced for retirement, with their target years.
    #[serde(default = "retirement::schedule")]
    pub retiring_measures: Vec<RetiringMeasure>,

    /// Published reference threshold sets for the comparator.
    #[serde(default = "reference::published_sets")]
    pub reference_thresholds: Vec<ReferenceThresholds>,
}

fn default_hold_harmless_threshold() -> f64 {
    4.0
}

fn default_overall_bar() -> f64 {
    3.75
}

fn default_reward_factor_high() -> f64 {
    0.4
}

fn default_reward_factor_low() -> f64 {
    0.2
}

fn default_quality_improvement_codes() -> Vec<String> {
    vec!["A23".to_string(), "B04".to_string()]
}

impl Default for MethodologyConfig {
    fn default() -> Self {
        Self {
            hold_harmless_threshold: default_hold_harmless_threshold(),
            overall_bar: default_overall_bar(),
            reward_factor_high: default_reward_factor_high(),
            reward_factor_low: default_reward_factor_low(),
            quality_improvement_codes: default_quality_improvement_codes(),
            retiring_measures: retirement::schedule(),
            reference_thresholds: reference::published_sets(),
        }
    }
}

impl MethodologyConfig {
    /// Load overrides from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&text)?;
        config.normalize_codes();
        Ok(config)
    }

    /// Whether a (normalized) measure code is a quality-improvement measure.
    pub fn is_quality_improvement(&self, code: &str) -> bool {
        self.quality_improvement_codes.iter().any(|c| c == code)
    }

    // Measure codes arriving from an override file may be in any case.
    fn normalize_codes(&mut self) {
        for code in &mut self.quality_improvement_codes {
            *code = normalize_code(code);
        }
        for retiring in &mut self.retiring_measures {
            retiring.code = normalize_code(&retiring.code);
        }
    }
}
