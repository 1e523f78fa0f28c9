mod orchestrator;

pub use orchestrator::{BatchReport, Orchestrator, ParseResult, ParseStatus};

use crate::config::Config;
use crate::discovery::discover_inputs;
use crate::error::ReportlensError;
use std::path::PathBuf;

/// Discover report files under `inputs` and parse them all
pub async fn run_batch(inputs: &[PathBuf], config: Config) -> Result<BatchReport, ReportlensError> {
    let reports = discover_inputs(inputs, &config)?;
    let batch = Orchestrator::new(config).run(reports).await?;
    Ok(batch)
}
