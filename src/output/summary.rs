use crate::error::OutputError;
use crate::parser::RiskLevel;
use crate::runner::{BatchReport, ParseStatus};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    pub timestamp: String,
    pub duration_sec: f64,
    pub reports: Vec<ReportSummary>,
    /// Reports per highest severity, plus `none`
    pub totals: BTreeMap<String, usize>,
    pub failed: Vec<String>,
    pub report_dir: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportSummary {
    pub name: String,
    pub source: PathBuf,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub sections: usize,
    pub findings: usize,
    pub highest_severity: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn write_summary(report_dir: &Path, batch: &BatchReport) -> Result<(), OutputError> {
    fs::create_dir_all(report_dir).map_err(OutputError::CreateDir)?;

    let summary = build_summary(batch, report_dir.to_path_buf());

    // Write JSON
    let json_path = report_dir.join("summary.json");
    let json = serde_json::to_string_pretty(&summary)?;
    fs::write(&json_path, json).map_err(OutputError::WriteReport)?;

    // Write Markdown
    let md_path = report_dir.join("summary.md");
    let md = build_summary_markdown(&summary);
    fs::write(&md_path, md).map_err(OutputError::WriteReport)?;

    Ok(())
}

fn build_summary(batch: &BatchReport, report_dir: PathBuf) -> SummaryReport {
    let mut reports = Vec::new();
    let mut failed = Vec::new();
    let mut totals: BTreeMap<String, usize> = BTreeMap::new();

    for result in &batch.results {
        let (status, reason) = match &result.status {
            ParseStatus::Parsed => ("parsed".to_string(), None),
            ParseStatus::Empty => ("empty".to_string(), Some("no report text".to_string())),
            ParseStatus::Failed { error } => {
                failed.push(result.name.clone());
                ("failed".to_string(), Some(error.clone()))
            }
        };

        let document = result.document.as_ref();
        let highest_severity = document.and_then(|d| d.highest_severity);
        if document.is_some() {
            let key = highest_severity
                .map(|l| l.label().to_lowercase())
                .unwrap_or_else(|| "none".to_string());
            *totals.entry(key).or_insert(0) += 1;
        }

        reports.push(ReportSummary {
            name: result.name.clone(),
            source: result.source.clone(),
            status,
            format: document.map(|d| d.convention.to_string()),
            sections: document.map(|d| d.sections.len()).unwrap_or(0),
            findings: document.map(|d| d.findings().count()).unwrap_or(0),
            highest_severity,
            reason,
        });
    }

    SummaryReport {
        timestamp: Utc::now().to_rfc3339(),
        duration_sec: batch.total_duration.as_secs_f64(),
        reports,
        totals,
        failed,
        report_dir,
    }
}

fn build_summary_markdown(summary: &SummaryReport) -> String {
    let mut md = String::new();

    md.push_str("# reportlens Summary\n\n");
    md.push_str(&format!("**Generated:** {}\n", summary.timestamp));
    md.push_str(&format!(
        "**Report Dir:** {}\n",
        summary.report_dir.display()
    ));
    md.push_str(&format!("**Duration:** {:.1}s\n\n", summary.duration_sec));

    // Totals
    md.push_str("## Highest Severity\n\n");
    md.push_str("| Severity | Reports |\n");
    md.push_str("|----------|---------|\n");
    for level in RiskLevel::ALL {
        let key = level.label().to_lowercase();
        md.push_str(&format!(
            "| {} | {} |\n",
            level,
            summary.totals.get(&key).unwrap_or(&0)
        ));
    }
    md.push_str(&format!(
        "| None | {} |\n\n",
        summary.totals.get("none").unwrap_or(&0)
    ));

    // Reports table
    md.push_str("## Reports\n\n");
    md.push_str("| Report | Status | Format | Sections | Findings |\n");
    md.push_str("|--------|--------|--------|----------|----------|\n");

    for report in &summary.reports {
        let status_icon = match report.status.as_str() {
            "parsed" => "✅",
            "empty" => "⏭️",
            "failed" => "❌",
            _ => "❓",
        };

        let status_str = if let Some(reason) = &report.reason {
            format!("{} {} ({})", status_icon, report.status, reason)
        } else {
            format!("{} {}", status_icon, report.status)
        };

        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            report.name,
            status_str,
            report.format.as_deref().unwrap_or("-"),
            report.sections,
            report.findings
        ));
    }

    let critical = *summary.totals.get("critical").unwrap_or(&0);
    if critical > 0 {
        md.push_str("\n## Critical Reports\n\n");
        md.push_str("See individual report files for details.\n");
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::parser::parse_report;
    use crate::runner::ParseResult;
    use std::time::Duration;

    fn batch() -> BatchReport {
        let config = ParserConfig::default();
        BatchReport {
            results: vec![
                ParseResult {
                    name: "ob1".to_string(),
                    source: PathBuf::from("in/ob1.json"),
                    status: ParseStatus::Parsed,
                    document: Some(parse_report(
                        "## Findings\n- **Title**: Bomb\n- **Risk Level**: Critical",
                        &config,
                    )),
                },
                ParseResult {
                    name: "fc2".to_string(),
                    source: PathBuf::from("in/fc2.txt"),
                    status: ParseStatus::Failed {
                        error: "permission denied".to_string(),
                    },
                    document: None,
                },
            ],
            total_duration: Duration::from_millis(250),
        }
    }

    #[test]
    fn test_build_summary_counts() {
        let summary = build_summary(&batch(), PathBuf::from("reports"));
        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.totals.get("critical"), Some(&1));
        assert_eq!(summary.failed, vec!["fc2"]);
        assert_eq!(summary.reports[0].findings, 1);
        assert_eq!(summary.reports[1].reason.as_deref(), Some("permission denied"));
    }

    #[test]
    fn test_summary_markdown() {
        let summary = build_summary(&batch(), PathBuf::from("reports"));
        let md = build_summary_markdown(&summary);
        assert!(md.contains("| Critical | 1 |"));
        assert!(md.contains("| ob1 | ✅ parsed | markdown | 1 | 1 |"));
        assert!(md.contains("| fc2 | ❌ failed (permission denied) | - | 0 | 0 |"));
        assert!(md.contains("## Critical Reports"));
    }

    #[test]
    fn test_write_summary_files() {
        let dir = tempfile::tempdir().unwrap();
        write_summary(dir.path(), &batch()).unwrap();
        assert!(dir.path().join("summary.json").exists());
        assert!(dir.path().join("summary.md").exists());
    }
}
