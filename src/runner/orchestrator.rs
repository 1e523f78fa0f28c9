use crate::config::Config;
use crate::discovery::ReportInput;
use crate::envelope::AnalysisEnvelope;
use crate::error::RunnerError;
use crate::parser::{parse_envelope, ReportDocument};
use futures::stream::{FuturesUnordered, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct BatchReport {
    /// One result per input, in input order
    pub results: Vec<ParseResult>,
    pub total_duration: Duration,
}

impl BatchReport {
    pub fn documents(&self) -> impl Iterator<Item = (&str, &ReportDocument)> {
        self.results
            .iter()
            .filter_map(|r| r.document.as_ref().map(|d| (r.name.as_str(), d)))
    }

    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, ParseStatus::Failed { .. }))
            .count()
    }
}

#[derive(Debug)]
pub struct ParseResult {
    pub name: String,
    pub source: PathBuf,
    pub status: ParseStatus,
    pub document: Option<ReportDocument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseStatus {
    Parsed,
    /// The input held no report text
    Empty,
    Failed { error: String },
}

impl std::fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseStatus::Parsed => write!(f, "parsed"),
            ParseStatus::Empty => write!(f, "empty"),
            ParseStatus::Failed { error } => write!(f, "failed: {}", error),
        }
    }
}

pub struct Orchestrator {
    config: Arc<Config>,
    semaphore: Arc<Semaphore>,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        Self {
            config: Arc::new(config),
            semaphore,
        }
    }

    /// Parse every input with at most `concurrency` files in flight.
    /// A file that cannot be read is reported as failed; the batch goes on.
    pub async fn run(&self, inputs: Vec<ReportInput>) -> Result<BatchReport, RunnerError> {
        let start = Instant::now();

        info!(
            "Parsing {} reports with concurrency {}",
            inputs.len(),
            self.config.concurrency
        );

        let mut futures = FuturesUnordered::new();
        for (idx, input) in inputs.into_iter().enumerate() {
            let permit = self.semaphore.clone().acquire_owned().await?;
            let config = self.config.clone();

            futures.push(tokio::spawn(async move {
                let _permit = permit; // hold until done
                (idx, parse_input(&config, input).await)
            }));
        }

        let mut results = Vec::new();
        while let Some(joined) = futures.next().await {
            let (idx, result) = joined?;
            match &result.status {
                ParseStatus::Failed { error } => warn!("Failed {}: {}", result.name, error),
                status => info!("{}: {}", result.name, status),
            }
            results.push((idx, result));
        }
        results.sort_by_key(|(idx, _)| *idx);

        Ok(BatchReport {
            results: results.into_iter().map(|(_, r)| r).collect(),
            total_duration: start.elapsed(),
        })
    }
}

async fn parse_input(config: &Config, input: ReportInput) -> ParseResult {
    let ReportInput { path, name } = input;

    match read_document(config, &path).await {
        Ok(document) if document.is_empty() => ParseResult {
            name,
            source: path,
            status: ParseStatus::Empty,
            document: Some(document),
        },
        Ok(document) => ParseResult {
            name,
            source: path,
            status: ParseStatus::Parsed,
            document: Some(document),
        },
        Err(e) => ParseResult {
            name,
            source: path,
            status: ParseStatus::Failed {
                error: e.to_string(),
            },
            document: None,
        },
    }
}

async fn read_document(config: &Config, path: &Path) -> Result<ReportDocument, RunnerError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RunnerError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

    let envelope = AnalysisEnvelope::from_input(&content, &config.envelope);
    debug!(
        "{}: provider {:?}, {} envelope records",
        path.display(),
        envelope.provider,
        envelope.instruction_analysis.len()
    );
    Ok(parse_envelope(&envelope, &config.parser))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn input(path: PathBuf, name: &str) -> ReportInput {
        ReportInput {
            path,
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("ob1.json");
        fs::write(
            &json,
            r#"{"provider": "openai", "llm_results": "1. EXECUTIVE SUMMARY\nBad.\n\n2. CYBER SECURITY KEY FINDINGS\n- **Title**: Bomb\n- **Risk Level**: Critical"}"#,
        )
        .unwrap();
        let blank = dir.path().join("blank.txt");
        fs::write(&blank, "   \n").unwrap();

        let mut config = Config::default();
        config.concurrency = 1;
        let inputs = vec![
            input(json, "ob1"),
            input(dir.path().join("gone.txt"), "gone"),
            input(blank, "blank"),
        ];

        let report = Orchestrator::new(config).run(inputs).await.unwrap();

        let names: Vec<_> = report.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["ob1", "gone", "blank"]);
        assert_eq!(report.results[0].status, ParseStatus::Parsed);
        assert!(matches!(report.results[1].status, ParseStatus::Failed { .. }));
        assert_eq!(report.results[2].status, ParseStatus::Empty);
        assert_eq!(report.failed(), 1);

        let (_, doc) = report.documents().next().unwrap();
        assert_eq!(doc.provider.as_deref(), Some("openai"));
        assert_eq!(doc.findings().count(), 1);
    }
}
