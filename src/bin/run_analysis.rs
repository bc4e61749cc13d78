//! Run the star-rating simulation over a contract universe
//!
//! Inputs come from CSV extracts (contracts, measures, scores) or, when no
//! files are given, from the deterministic sample universe. Outputs a
//! per-contract CSV and an optional full JSON report.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use star_ratings::contract::{
    generate_sample, load_contracts, load_measures, load_scores, RatingType, SampleParams,
};
use star_ratings::methodology::MethodologyConfig;
use star_ratings::rating::{
    AnalysisData, AnalysisOptions, AnalysisReport, ScenarioSummary, SimulationEngine,
};

#[derive(Parser, Debug)]
#[command(version, about = "Star-rating and reward-factor simulation")]
struct Args {
    /// Analysis year
    #[arg(long, default_value_t = 2026)]
    year: u16,

    /// Rating to analyze: overall, category-a, or category-b
    #[arg(long, default_value = "overall")]
    rating_type: RatingType,

    /// Contracts CSV (requires --measures and --scores)
    #[arg(long)]
    contracts: Option<PathBuf>,

    /// Measures CSV
    #[arg(long)]
    measures: Option<PathBuf>,

    /// Scores CSV
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Methodology overrides as JSON; defaults to the published cycle
    #[arg(long)]
    config: Option<PathBuf>,

    /// Apply each contract's Categorical Adjustment to its final rating
    #[arg(long)]
    apply_categorical_adjustment: bool,

    /// Contracts to generate when running on the sample universe
    #[arg(long, default_value_t = 120)]
    sample_contracts: usize,

    /// Uniform star shift for the sample universe
    #[arg(long, default_value_t = 0.0)]
    score_shift: f64,

    /// Per-contract output CSV
    #[arg(long, default_value = "rating_analysis.csv")]
    output: PathBuf,

    /// Optional full report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let data = load_data(&args)?;
    println!(
        "Loaded {} contracts, {} measures, {} scores in {:?}",
        data.contracts.len(),
        data.measures.len(),
        data.scores.len(),
        start.elapsed()
    );

    let config = match &args.config {
        Some(path) => MethodologyConfig::from_json_file(path)
            .with_context(|| format!("loading methodology config {}", path.display()))?,
        None => MethodologyConfig::default(),
    };

    let options = AnalysisOptions {
        year: args.year,
        rating_type: args.rating_type,
        apply_categorical_adjustment: args.apply_categorical_adjustment,
    };

    println!(
        "Running {} analysis for {}...",
        args.rating_type, args.year
    );
    let run_start = Instant::now();
    let engine = SimulationEngine::new(config, options);
    let report = engine.run(&data)?;
    println!("Analysis complete in {:?}", run_start.elapsed());

    print_summary(&report);

    write_contract_csv(&report, &args.output)?;
    println!("Per-contract output written to {}", args.output.display());

    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("creating report file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)
            .context("serializing the analysis report")?;
        println!("Full report written to {}", path.display());
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}

fn load_data(args: &Args) -> Result<AnalysisData> {
    match (&args.contracts, &args.measures, &args.scores) {
        (Some(contracts), Some(measures), Some(scores)) => {
            println!("Loading extracts from CSV...");
            Ok(AnalysisData {
                contracts: load_contracts(contracts)?,
                measures: load_measures(measures)?,
                scores: load_scores(scores)?,
            })
        }
        (None, None, None) => {
            println!(
                "No extracts given; generating the sample universe ({} contracts)...",
                args.sample_contracts
            );
            Ok(generate_sample(&SampleParams {
                year: args.year,
                contract_count: args.sample_contracts,
                score_shift: args.score_shift,
                ..Default::default()
            }))
        }
        _ => bail!("--contracts, --measures and --scores must be given together"),
    }
}

fn print_summary(report: &AnalysisReport) {
    println!("\nCurrent scenario:");
    print_scenario(&report.current);
    println!("\nProjected scenario:");
    print_scenario(&report.projected);

    if let Some(delta) = &report.threshold_deltas.standard {
        println!("\nStandard-cohort threshold movement (projected - current):");
        println!(
            "  mean30 {:+.4}  mean70 {:+.4}  var30 {:+.4}  var70 {:+.4}",
            delta.mean_30, delta.mean_70, delta.variance_30, delta.variance_70
        );
    }

    if let Some(comparison) = &report.official_comparison {
        let matched = comparison.matched_candidate();
        println!(
            "\nClosest published reference: improvement={}, adjustment={} (variance deviation {:.2}%)",
            matched.with_improvement, matched.with_adjustment, matched.variance_score
        );
    }

    let brackets = &report.brackets;
    println!(
        "\nBracket movement over {} published contracts: {} up, {} down, {} unchanged",
        brackets.contracts, brackets.bracket_gainers, brackets.bracket_losers,
        brackets.bracket_unchanged
    );
    for transition in brackets.transitions.iter().take(8) {
        println!("  {:<16} x{}", transition.key, transition.count);
    }
    if report.skipped_scores > 0 {
        println!("\n{} score rows skipped (unknown measure codes)", report.skipped_scores);
    }
}

fn print_scenario(summary: &ScenarioSummary) {
    println!(
        "  rated contracts: {} (standard cohort {}, held harmless {})",
        summary.rated_contracts, summary.standard_cohort, summary.held_harmless_cohort
    );
    if !summary.excluded_codes.is_empty() {
        let codes: Vec<&str> = summary.excluded_codes.iter().map(String::as_str).collect();
        println!("  excluded measures: {}", codes.join(", "));
    }
    if let Some(thresholds) = &summary.thresholds.standard {
        println!(
            "  standard thresholds:      mean30={:.4} mean70={:.4} var30={:.4} var70={:.4}",
            thresholds.mean_30, thresholds.mean_70, thresholds.variance_30, thresholds.variance_70
        );
    }
    if let Some(thresholds) = &summary.thresholds.held_harmless {
        println!(
            "  held-harmless thresholds: mean30={:.4} mean70={:.4} var30={:.4} var70={:.4}",
            thresholds.mean_30, thresholds.mean_70, thresholds.variance_30, thresholds.variance_70
        );
    }
}

fn write_contract_csv(report: &AnalysisReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating output file {}", path.display()))?;

    writer.write_record([
        "contract_id",
        "parent_organization",
        "published_rating",
        "current_official",
        "current_held_harmless",
        "current_reward_factor",
        "current_final",
        "projected_official",
        "projected_held_harmless",
        "projected_reward_factor",
        "projected_final",
        "bracket_delta_units",
    ])?;

    for contract in &report.contracts {
        writer.write_record([
            contract.contract_id.clone(),
            contract.parent_organization.clone().unwrap_or_default(),
            fmt_opt(contract.published_rating),
            fmt_opt(contract.current.official_rating),
            contract.current.held_harmless.to_string(),
            fmt_opt(contract.current.reward.as_ref().map(|r| r.r_factor)),
            fmt_opt(contract.current.final_rating),
            fmt_opt(contract.projected.official_rating),
            contract.projected.held_harmless.to_string(),
            fmt_opt(contract.projected.reward.as_ref().map(|r| r.r_factor)),
            fmt_opt(contract.projected.final_rating),
            contract
                .bracket_delta_units
                .map(|d| d.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush().context("flushing the output file")?;
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}
