use crate::cli::{CompareArgs, OutputFormat};
use anyhow::Context;
use reportlens::compare::compare_documents;
use reportlens::config::Config;
use reportlens::envelope::AnalysisEnvelope;
use reportlens::output::render_comparison;
use reportlens::parser::{parse_envelope, ReportDocument};
use std::path::Path;
use tracing::{error, info};

pub fn execute(args: CompareArgs) -> anyhow::Result<()> {
    let config = Config::load_or_default(&args.config)?;
    config.validate()?;

    let analysis = load_document(&args.analysis, &config)?;
    let baseline = load_document(&args.baseline, &config)?;
    let comparison = compare_documents(&analysis, &baseline);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
        OutputFormat::Markdown => println!("{}", render_comparison(&comparison)),
    }

    info!(
        "{} new findings, {} resolved",
        comparison.new_findings.len(),
        comparison.resolved_findings.len()
    );

    if args.fail_on_escalation && comparison.escalated {
        error!(
            "Exiting with error: severity escalated from {:?} to {:?}",
            comparison.baseline_severity, comparison.analysis_severity
        );
        std::process::exit(1);
    }

    Ok(())
}

fn load_document(path: &Path, config: &Config) -> anyhow::Result<ReportDocument> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report {}", path.display()))?;
    let envelope = AnalysisEnvelope::from_input(&content, &config.envelope);
    Ok(parse_envelope(&envelope, &config.parser))
}
