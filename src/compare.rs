//! Comparing an analysis report against a saved baseline

use crate::parser::{FindingCard, ParsedSection, ReportDocument, RiskLevel};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Comparison {
    pub analysis_severity: Option<RiskLevel>,
    pub baseline_severity: Option<RiskLevel>,

    /// Analysis is rated more severe than the baseline
    pub escalated: bool,

    pub sections_added: Vec<String>,
    pub sections_removed: Vec<String>,

    /// Present in both with a different body
    pub sections_changed: Vec<String>,

    /// Findings whose fingerprint the baseline does not have
    pub new_findings: Vec<FindingCard>,

    /// Baseline findings missing from the analysis
    pub resolved_findings: Vec<FindingCard>,
}

impl Comparison {
    pub fn is_unchanged(&self) -> bool {
        !self.escalated
            && self.sections_added.is_empty()
            && self.sections_removed.is_empty()
            && self.sections_changed.is_empty()
            && self.new_findings.is_empty()
            && self.resolved_findings.is_empty()
    }
}

/// Compare two parsed documents. Section titles match case-insensitively.
pub fn compare_documents(analysis: &ReportDocument, baseline: &ReportDocument) -> Comparison {
    let baseline_titles: HashSet<String> = baseline
        .sections
        .iter()
        .map(|s| s.title.to_uppercase())
        .collect();
    let analysis_titles: HashSet<String> = analysis
        .sections
        .iter()
        .map(|s| s.title.to_uppercase())
        .collect();

    let sections_added = unique_titles(
        analysis
            .sections
            .iter()
            .filter(|s| !baseline_titles.contains(&s.title.to_uppercase())),
    );
    let sections_removed = unique_titles(
        baseline
            .sections
            .iter()
            .filter(|s| !analysis_titles.contains(&s.title.to_uppercase())),
    );
    let sections_changed = unique_titles(analysis.sections.iter().filter(|s| {
        baseline
            .section(&s.title)
            .is_some_and(|other| other.body != s.body)
    }));

    let baseline_prints: HashSet<&str> = baseline.findings().map(|f| f.fingerprint.as_str()).collect();
    let analysis_prints: HashSet<&str> = analysis.findings().map(|f| f.fingerprint.as_str()).collect();

    let new_findings = analysis
        .findings()
        .filter(|f| !baseline_prints.contains(f.fingerprint.as_str()))
        .cloned()
        .collect();
    let resolved_findings = baseline
        .findings()
        .filter(|f| !analysis_prints.contains(f.fingerprint.as_str()))
        .cloned()
        .collect();

    let escalated = match (analysis.highest_severity, baseline.highest_severity) {
        (Some(a), Some(b)) => a > b,
        (Some(_), None) => true,
        _ => false,
    };

    Comparison {
        analysis_severity: analysis.highest_severity,
        baseline_severity: baseline.highest_severity,
        escalated,
        sections_added,
        sections_removed,
        sections_changed,
        new_findings,
        resolved_findings,
    }
}

/// Titles in first-seen order, one per case-insensitive title
fn unique_titles<'a>(sections: impl Iterator<Item = &'a ParsedSection>) -> Vec<String> {
    let mut seen = HashSet::new();
    sections
        .filter(|s| seen.insert(s.title.to_uppercase()))
        .map(|s| s.title.clone())
        .collect()
}
