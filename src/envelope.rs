//! Locating the raw report inside analyzer output
//!
//! The analyzer emits a JSON object whose report string may sit under several
//! keys depending on which code path stored it. Plain-text input is taken as
//! the report itself.

use crate::config::EnvelopeConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

/// Keys probed for the report string, in order. Each path is nested keys.
const REPORT_PATHS: [&[&str]; 4] = [
    &["analysis_json", "llm_results"],
    &["llm_results"],
    &["llm_result"],
    &["analysis_json", "llm_result"],
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    Analysis,
    Baseline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisEnvelope {
    /// The LLM report text, if any was found
    pub raw_report: Option<String>,

    /// LLM backend that produced the report, lower-cased
    pub provider: Option<String>,

    pub kind: ReportKind,

    /// Instruction records the analyzer already structured
    pub instruction_analysis: Vec<Value>,

    /// Vulnerability entries reported outside the LLM text
    pub vulnerabilities: Vec<Value>,
}

impl AnalysisEnvelope {
    /// Build an envelope from file content. JSON objects are searched for the
    /// report; any other content is the report.
    pub fn from_input(input: &str, config: &EnvelopeConfig) -> Self {
        match serde_json::from_str::<Value>(input) {
            Ok(Value::Object(root)) => Self::from_object(&root, config),
            Ok(Value::String(report)) => Self::from_report(report),
            _ => Self::from_report(input.to_string()),
        }
    }

    /// Envelope around a bare report string
    pub fn from_report(report: impl Into<String>) -> Self {
        let report = report.into();
        Self {
            raw_report: (!report.trim().is_empty()).then_some(report),
            ..Self::default()
        }
    }

    pub fn from_object(root: &Map<String, Value>, config: &EnvelopeConfig) -> Self {
        let analysis_json = root.get("analysis_json").and_then(Value::as_object);

        let raw_report = find_report(root, analysis_json, &config.anchor_phrases);
        if raw_report.is_none() {
            debug!("No report string found in analyzer output");
        }

        let provider = ["provider", "llm_provider"]
            .iter()
            .find_map(|k| non_empty_str(root.get(*k)))
            .or_else(|| analysis_json.and_then(|a| non_empty_str(a.get("provider"))))
            .map(|p| p.to_lowercase());

        let kind = match root.get("status").and_then(Value::as_str) {
            Some(status) if status.to_lowercase().contains("baseline") => ReportKind::Baseline,
            _ => ReportKind::Analysis,
        };

        let instruction_analysis = analysis_json
            .and_then(|a| a.get("instruction_analysis"))
            .map(normalize_instruction_analysis)
            .unwrap_or_default();

        let vulnerabilities = analysis_json
            .and_then(|a| {
                a.get("vulnerabilities").or_else(|| {
                    a.get("report")
                        .and_then(|r| r.get("category"))
                        .and_then(|c| c.get("vulnerabilities"))
                })
            })
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            raw_report,
            provider,
            kind,
            instruction_analysis,
            vulnerabilities,
        }
    }

    pub fn report(&self) -> &str {
        self.raw_report.as_deref().unwrap_or("")
    }
}

fn find_report(
    root: &Map<String, Value>,
    analysis_json: Option<&Map<String, Value>>,
    anchors: &[String],
) -> Option<String> {
    for path in REPORT_PATHS {
        if let Some(report) = non_empty_str(lookup(root, path)) {
            return Some(report.to_string());
        }
    }

    // A report stored under an unexpected key still carries its section titles
    let anchored = |map: &Map<String, Value>| {
        map.values()
            .filter_map(Value::as_str)
            .find(|s| anchors.iter().any(|a| s.contains(a.as_str())))
            .map(String::from)
    };
    if let Some(report) = analysis_json.and_then(anchored) {
        return Some(report);
    }
    if let Some(report) = anchored(root) {
        return Some(report);
    }

    // Some records store the whole analyzer output as a string in filePath
    let nested = root.get("filePath").and_then(Value::as_str)?;
    match serde_json::from_str::<Value>(nested) {
        Ok(value) => non_empty_str(value.get("llm_results")).map(String::from),
        Err(_) => None,
    }
}

fn lookup<'a>(root: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    rest.iter().try_fold(root.get(*first)?, |value, key| value.get(*key))
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Instruction analysis may arrive as an array or as a string holding one
fn normalize_instruction_analysis(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
