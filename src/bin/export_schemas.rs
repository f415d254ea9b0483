//! Writes JSON Schemas of the assessment input and report.

use anyhow::{Context, Result};
use clap::Parser;
use repair_quote::application::use_cases::{AssessmentInput, AssessmentReport};
use repair_quote::infrastructure::providers::ProviderRequest;
use repair_quote::domain::entities::QuoteSubmission;
use schemars::schema::RootSchema;
use schemars::schema_for;
use std::path::PathBuf;

/// Exports JSON Schemas for the public data formats.
#[derive(Parser, Debug)]
#[command(name = "export_schemas", author, version, about)]
struct Cli {
    /// Output directory
    #[arg(short, long, default_value = "schemas")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let schemas: [(&str, RootSchema); 4] = [
        ("assessment_input", schema_for!(AssessmentInput)),
        ("assessment_report", schema_for!(AssessmentReport)),
        ("provider_request", schema_for!(ProviderRequest)),
        ("quote_submission", schema_for!(QuoteSubmission)),
    ];
    for (name, schema) in schemas {
        let path = cli.out_dir.join(format!("{name}.schema.json"));
        std::fs::write(&path, serde_json::to_string_pretty(&schema)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("{}", path.display());
    }
    Ok(())
}
