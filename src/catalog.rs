//! Year-scoped measure catalog
//!
//! Joins multi-year measure definitions with the methodology config into a
//! single lookup for the analysis year. Each code resolves to one entry:
//! the definition published for the exact year when present, otherwise the
//! most recent prior year (definitions roll forward unchanged between
//! cycles more often than not).

use std::collections::{BTreeSet, HashMap};

use log::warn;

use crate::contract::{Measure, MeasureCategory, RatedMeasure, RatingType, ScoredMeasure};
use crate::methodology::MethodologyConfig;

/// One measure as resolved for the analysis year.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub code: String,
    pub name: String,
    pub domain: String,
    pub category: MeasureCategory,
    pub weight: f64,
    /// Year the measure leaves the program, when a retirement is announced.
    pub retirement_year: Option<u16>,
    /// Marks one of the protected quality-improvement measures.
    pub quality_improvement: bool,
}

/// Measure catalog resolved for one analysis year.
pub struct MeasureCatalog {
    year: u16,
    entries: HashMap<String, CatalogEntry>,
}

impl MeasureCatalog {
    /// Resolve the catalog for `year` from the full multi-year measure list.
    ///
    /// Measures defined only for later years are ignored. Measures whose
    /// category cannot be resolved, and config codes that match nothing in
    /// the resolved catalog, are logged and skipped rather than failing the
    /// build.
    pub fn build(year: u16, measures: &[Measure], config: &MethodologyConfig) -> Self {
        let mut latest: HashMap<&str, &Measure> = HashMap::new();
        for measure in measures {
            if measure.year > year {
                continue;
            }
            match latest.get(measure.code.as_str()) {
                Some(existing) if existing.year >= measure.year => {}
                _ => {
                    latest.insert(&measure.code, measure);
                }
            }
        }

        let mut entries = HashMap::with_capacity(latest.len());
        for (code, measure) in latest {
            let category = match measure.resolved_category() {
                Some(category) => category,
                None => {
                    warn!("measure {code} has no category and no A/B code prefix; dropped from the {year} catalog");
                    continue;
                }
            };

            let retirement_year = config
                .retiring_measures
                .iter()
                .find(|r| r.code == code)
                .map(|r| r.target_year);

            entries.insert(
                code.to_string(),
                CatalogEntry {
                    code: code.to_string(),
                    name: measure.name.clone(),
                    domain: measure.domain.clone(),
                    category,
                    weight: measure.weight.unwrap_or(0.0),
                    retirement_year,
                    quality_improvement: config.is_quality_improvement(code),
                },
            );
        }

        for code in &config.quality_improvement_codes {
            if !entries.contains_key(code) {
                warn!("quality-improvement code {code} is not in the {year} catalog; ignored");
            }
        }
        for retiring in &config.retiring_measures {
            if !entries.contains_key(&retiring.code) {
                warn!(
                    "retiring measure {} is not in the {year} catalog; ignored",
                    retiring.code
                );
            }
        }

        Self { year, entries }
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&CatalogEntry> {
        self.entries.get(code)
    }

    /// Join one score row with its catalog entry. `None` when the code is
    /// unknown for the analysis year.
    pub fn rated_measure(&self, score: &ScoredMeasure) -> Option<RatedMeasure> {
        let entry = self.entries.get(&score.measure_code)?;
        Some(RatedMeasure {
            code: entry.code.clone(),
            stars: score.stars,
            weight: entry.weight,
            category: entry.category,
            quality_improvement: entry.quality_improvement,
        })
    }

    /// Codes with an announced retirement, restricted to the rating type.
    /// These are the exclusions of the projected scenario.
    pub fn retiring_codes(&self, rating_type: RatingType) -> BTreeSet<String> {
        self.entries
            .values()
            .filter(|e| rating_type.includes(e.category) && e.retirement_year.is_some())
            .map(|e| e.code.clone())
            .collect()
    }

    /// Quality-improvement codes visible to the rating type.
    pub fn quality_improvement_codes(&self, rating_type: RatingType) -> BTreeSet<String> {
        self.entries
            .values()
            .filter(|e| e.quality_improvement && rating_type.includes(e.category))
            .map(|e| e.code.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(code: &str, year: u16, weight: f64) -> Measure {
        Measure {
            code: code.to_string(),
            name: format!("Measure {code}"),
            domain: "Test Domain".to_string(),
            category: None,
            weight: Some(weight),
            year,
        }
    }

    #[test]
    fn test_exact_year_wins_over_prior_years() {
        let measures = vec![
            measure("A01", 2024, 1.0),
            measure("A01", 2026, 3.0),
            measure("A01", 2025, 2.0),
        ];
        let catalog = MeasureCatalog::build(2026, &measures, &MethodologyConfig::default());

        assert_eq!(catalog.get("A01").unwrap().weight, 3.0);
    }

    #[test]
    fn test_missing_year_falls_back_to_most_recent_prior() {
        let measures = vec![
            measure("A01", 2023, 1.0),
            measure("A01", 2025, 2.0),
            measure("A01", 2027, 9.0),
        ];
        let catalog = MeasureCatalog::build(2026, &measures, &MethodologyConfig::default());

        // 2027 is in the future for a 2026 run; 2025 is the latest usable.
        assert_eq!(catalog.get("A01").unwrap().weight, 2.0);
    }

    #[test]
    fn test_future_only_code_is_absent() {
        let measures = vec![measure("B09", 2027, 1.0)];
        let catalog = MeasureCatalog::build(2026, &measures, &MethodologyConfig::default());

        assert!(catalog.get("B09").is_none());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_unknown_category_is_dropped() {
        let measures = vec![measure("X99", 2026, 1.0), measure("A01", 2026, 1.0)];
        let catalog = MeasureCatalog::build(2026, &measures, &MethodologyConfig::default());

        assert!(catalog.get("X99").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_rated_measure_join() {
        let measures = vec![measure("A23", 2026, 5.0)];
        let catalog = MeasureCatalog::build(2026, &measures, &MethodologyConfig::default());

        let score = ScoredMeasure {
            contract_id: "H1001".to_string(),
            measure_code: "A23".to_string(),
            stars: Some(4.0),
            category: None,
        };
        let rated = catalog.rated_measure(&score).unwrap();

        assert_eq!(rated.weight, 5.0);
        assert_eq!(rated.category, MeasureCategory::A);
        assert!(rated.quality_improvement);
        assert_eq!(rated.stars, Some(4.0));

        let unknown = ScoredMeasure {
            measure_code: "A99".to_string(),
            ..score
        };
        assert!(catalog.rated_measure(&unknown).is_none());
    }

    #[test]
    fn test_retiring_codes_respect_rating_type() {
        // A07 and B05 are on the default retirement schedule.
        let measures = vec![
            measure("A07", 2026, 4.0),
            measure("B05", 2026, 1.0),
            measure("A01", 2026, 1.0),
        ];
        let catalog = MeasureCatalog::build(2026, &measures, &MethodologyConfig::default());

        let overall = catalog.retiring_codes(RatingType::Overall);
        assert!(overall.contains("A07"));
        assert!(overall.contains("B05"));
        assert!(!overall.contains("A01"));

        let category_b = catalog.retiring_codes(RatingType::CategoryB);
        assert!(!category_b.contains("A07"));
        assert!(category_b.contains("B05"));
    }

    #[test]
    fn test_quality_improvement_codes_respect_rating_type() {
        let measures = vec![measure("A23", 2026, 5.0), measure("B04", 2026, 5.0)];
        let catalog = MeasureCatalog::build(2026, &measures, &MethodologyConfig::default());

        let overall = catalog.quality_improvement_codes(RatingType::Overall);
        assert_eq!(overall.len(), 2);

        let category_a = catalog.quality_improvement_codes(RatingType::CategoryA);
        assert!(category_a.contains("A23"));
        assert!(!category_a.contains("B04"));
    }
}
