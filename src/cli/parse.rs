use crate::cli::{OutputFormat, ParseArgs};
use reportlens::config::Config;
use reportlens::output::{render_document, write_document, write_summary};
use reportlens::runner::{run_batch, BatchReport};
use serde_json::json;
use tracing::{info, warn};

pub async fn execute(args: ParseArgs) -> anyhow::Result<()> {
    // Load and validate config
    info!("Loading config from {:?}", args.config);
    let mut config = Config::load_or_default(&args.config)?;

    // Apply CLI overrides
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(report_dir) = args.report_dir {
        config.report_dir = report_dir;
    }

    config.validate()?;

    let report_dir = config.report_dir.clone();
    let batch = run_batch(&args.inputs, config).await?;

    if args.stdout {
        print_documents(&batch, args.format)?;
    } else {
        info!("Reports will be written to {:?}", report_dir);
        for (name, document) in batch.documents() {
            if let Err(e) = write_document(&report_dir, name, document) {
                warn!("Failed to write report for {}: {}", name, e);
            } else {
                info!("Wrote report: {}/{}.report.md", report_dir.display(), name);
            }
        }
        write_summary(&report_dir, &batch)?;
    }

    info!(
        "Completed in {:.1}s: {} reports, {} failed",
        batch.total_duration.as_secs_f64(),
        batch.results.len(),
        batch.failed()
    );

    Ok(())
}

fn print_documents(batch: &BatchReport, format: OutputFormat) -> anyhow::Result<()> {
    let documents: Vec<_> = batch.documents().collect();

    match format {
        OutputFormat::Json => {
            let json = match documents.as_slice() {
                [(_, document)] => serde_json::to_string_pretty(document)?,
                _ => {
                    let entries: Vec<_> = documents
                        .iter()
                        .map(|(name, document)| json!({ "name": name, "document": document }))
                        .collect();
                    serde_json::to_string_pretty(&entries)?
                }
            };
            println!("{}", json);
        }
        OutputFormat::Markdown => {
            for (name, document) in documents {
                println!("{}", render_document(name, document));
            }
        }
    }

    Ok(())
}
