//! Compare computed thresholds with the published reference sets
//!
//! Runs the sample universe through the engine once per rating type and
//! prints the computed cut points against every published candidate,
//! marking the one the comparator matched on variance deviation.

use anyhow::Result;

use star_ratings::contract::{generate_sample, RatingType, SampleParams};
use star_ratings::methodology::MethodologyConfig;
use star_ratings::rating::{AnalysisOptions, SimulationEngine};

fn main() -> Result<()> {
    env_logger::init();

    let data = generate_sample(&SampleParams::default());
    println!(
        "Sample universe: {} contracts, {} measures",
        data.contracts.len(),
        data.measures.len()
    );

    for rating_type in RatingType::ALL {
        let engine = SimulationEngine::new(
            MethodologyConfig::default(),
            AnalysisOptions {
                year: 2026,
                rating_type,
                apply_categorical_adjustment: false,
            },
        );
        let report = engine.run(&data)?;

        println!("\n=== {rating_type} ===");
        let comparison = match &report.official_comparison {
            Some(comparison) => comparison,
            None => {
                println!("no published reference available");
                continue;
            }
        };

        let computed = &comparison.computed;
        println!(
            "computed: mean30={:.4} mean70={:.4} var30={:.4} var70={:.4}",
            computed.mean_30, computed.mean_70, computed.variance_30, computed.variance_70
        );
        println!(
            "{:<13} {:<12} {:>9} {:>9} {:>9} {:>9} {:>10}",
            "improvement", "adjustment", "mean30%", "mean70%", "var30%", "var70%", "var score"
        );
        for (idx, candidate) in comparison.candidates.iter().enumerate() {
            let marker = if idx == comparison.matched {
                "  <- match"
            } else {
                ""
            };
            println!(
                "{:<13} {:<12} {:>8.2}% {:>8.2}% {:>8.2}% {:>8.2}% {:>9.2}%{}",
                candidate.with_improvement,
                candidate.with_adjustment,
                candidate.mean_30_pct,
                candidate.mean_70_pct,
                candidate.variance_30_pct,
                candidate.variance_70_pct,
                candidate.variance_score,
                marker
            );
        }
    }

    Ok(())
}
