//! Runs one assessment from a JSON input file and prints the report.
//!
//! ```text
//! assess input.json --config repair-quote.toml --format text
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use repair_quote::application::use_cases::{
    AssessmentInput, AssessmentReport, AssessmentWorkflow, MarketAverageStatus,
    RecommendationStatus,
};
use repair_quote::domain::value_objects::Timestamp;
use repair_quote::{Settings, telemetry};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Report output format.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty-printed JSON report.
    Json,
    /// Human-readable summary.
    Text,
}

/// Collects repair quotes for an assessment and recommends a provider.
#[derive(Parser, Debug)]
#[command(name = "assess", author, version, about)]
struct Cli {
    /// Assessment input (JSON)
    input: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    telemetry::init(&settings.logging).context("initializing logging")?;

    let raw = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let input: AssessmentInput =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", cli.input.display()))?;

    let catalog = Arc::new(settings.catalog()?);
    let registry = settings.provider_registry(catalog)?;
    info!(providers = ?registry.providers().collect::<Vec<_>>(), "provider adapters ready");

    let workflow = AssessmentWorkflow::in_memory(registry, &settings.workflow_config());
    let report = workflow.run(&input, Timestamp::now()).await?;

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_summary(&report),
    }
    Ok(())
}

fn print_summary(report: &AssessmentReport) {
    println!("Assessment {}", report.assessment_id);
    for listing in &report.parts {
        println!(
            "\n{} ({}, {})",
            listing.part.part_name(),
            listing.part.category(),
            listing.part.severity()
        );
        for ranked in &listing.quotes {
            println!(
                "  #{} {:<12} {:>10}  score {:.1}",
                ranked.rank,
                ranked.quote.provider_type().to_string(),
                ranked.quote.total_cost().to_string(),
                ranked.score
            );
        }
        match &listing.market_average {
            MarketAverageStatus::Computed(avg) => println!(
                "  market average {} (range {}..{}, spread {:.2}%, {} confidence)",
                avg.average_total,
                avg.min_total,
                avg.max_total,
                avg.variance_percentage,
                avg.confidence
            ),
            MarketAverageStatus::InsufficientData { found, required } => {
                println!("  market average unavailable ({found} of {required} quotes)");
            }
        }
    }

    println!();
    match &report.recommendation {
        RecommendationStatus::Recommended(rec) => {
            println!(
                "Recommended: {} at {} (market {}), saves up to {}",
                rec.recommended_provider,
                rec.recommended_total,
                rec.market_average_total,
                rec.potential_savings
            );
            println!("Why: {}", rec.justification);
        }
        RecommendationStatus::PartialCoverage {
            total_parts,
            coverage,
        } => {
            println!("No provider quoted all {total_parts} parts:");
            for c in coverage {
                println!("  {:<12} {}/{}", c.provider.to_string(), c.covered_parts, c.total_parts);
            }
        }
        RecommendationStatus::AwaitingQuotes { open } => {
            println!("Awaiting quotes on {} request(s):", open.len());
            for request in open {
                let providers: Vec<String> =
                    request.open_providers.iter().map(ToString::to_string).collect();
                println!(
                    "  {} {} waiting on {} until {}",
                    request.request_id,
                    request.state,
                    providers.join(", "),
                    request.expires_at
                );
            }
        }
    }
}
