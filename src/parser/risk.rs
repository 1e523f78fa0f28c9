//! Risk level labels and highest-severity assessment

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Highest first
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    /// Parse a single level, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(RiskLevel::Critical),
            "high" => Some(RiskLevel::High),
            "medium" => Some(RiskLevel::Medium),
            "low" => Some(RiskLevel::Low),
            _ => None,
        }
    }

    /// Parse a single or compound level such as `Medium-High`.
    /// Every part must be a known level.
    pub fn parse_compound(s: &str) -> Option<Vec<Self>> {
        let levels: Option<Vec<_>> = s.split('-').map(Self::parse).collect();
        levels.filter(|l| !l.is_empty())
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Critical",
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Display label for a raw risk cell: known levels are capitalised, compound
/// levels keep their parts, anything else is trimmed.
pub fn risk_label(raw: &str) -> String {
    match RiskLevel::parse_compound(raw) {
        Some(levels) => levels
            .iter()
            .map(RiskLevel::label)
            .collect::<Vec<_>>()
            .join("-"),
        None => raw.trim().to_string(),
    }
}

/// Risk level of an instruction record. The `risk_level` field may itself be
/// an object carrying `risk_level`, `level` or `value`.
pub fn record_risk(record: &Value) -> Option<RiskLevel> {
    let field = record.get("risk_level")?;
    let raw = match field {
        Value::String(s) => s.as_str(),
        Value::Object(_) => ["risk_level", "level", "value"]
            .iter()
            .find_map(|k| field.get(*k).and_then(Value::as_str))?,
        _ => return None,
    };
    RiskLevel::parse_compound(raw).and_then(|levels| levels.into_iter().max())
}

/// Every `risk level: X` style mention in free text
pub fn text_risks(text: &str) -> Vec<RiskLevel> {
    risk_mention_re()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| RiskLevel::parse(m.as_str()))
        .collect()
}

/// Highest severity across the available evidence. The first source with any
/// recognised level decides: instruction records, then vulnerability entries,
/// then mentions in the report text.
pub fn highest_severity(records: &[Value], vulnerabilities: &[Value], text: &str) -> Option<RiskLevel> {
    if let Some(level) = records.iter().filter_map(record_risk).max() {
        return Some(level);
    }

    let vuln_text: Vec<String> = vulnerabilities
        .iter()
        .map(|v| match v {
            Value::String(s) => s.to_lowercase(),
            other => other.to_string().to_lowercase(),
        })
        .collect();
    if let Some(level) = RiskLevel::ALL.into_iter().find(|level| {
        let needle = level.label().to_lowercase();
        vuln_text.iter().any(|v| v.contains(&needle))
    }) {
        return Some(level);
    }

    text_risks(text).into_iter().max()
}

fn risk_mention_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)risk[_ ]?level[":*\- ]+([a-z]+)"#).expect("risk mention pattern")
    })
}
