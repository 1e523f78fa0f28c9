use super::finding::{split_finding_cards, FindingCard};
use super::format::{detect_format_for, Convention};
use super::json::extract_embedded_array_with;
use super::label_value::{extract_label_value_items_with, LabelValueItem};
use super::risk::{highest_severity, RiskLevel};
use super::sections::{split_sections_for, Section, Sections};
use super::table::{extract_table, extract_table_with_header, TableData};
use crate::config::ParserConfig;
use crate::envelope::{AnalysisEnvelope, ReportKind};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Everything the parser recovered from one report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportDocument {
    pub convention: Convention,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub kind: ReportKind,

    /// Sections in display order
    pub sections: Vec<ParsedSection>,

    /// The whole report when no header convention applied
    #[serde(default)]
    pub unstructured: Option<String>,

    /// Per-instruction finding records
    pub instruction_analysis: Vec<Value>,

    #[serde(default)]
    pub highest_severity: Option<RiskLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedSection {
    pub title: String,
    pub body: String,

    /// Bullet groups; absent when the body has no `- **Label**:` bullets
    #[serde(default)]
    pub label_values: Option<Vec<LabelValueItem>>,

    #[serde(default)]
    pub table: Option<TableData>,

    #[serde(default)]
    pub findings: Vec<FindingCard>,
}

impl ReportDocument {
    /// Section by title, ignoring case
    pub fn section(&self, title: &str) -> Option<&ParsedSection> {
        self.sections
            .iter()
            .find(|s| s.title.eq_ignore_ascii_case(title.trim()))
    }

    /// Finding cards across all sections
    pub fn findings(&self) -> impl Iterator<Item = &FindingCard> {
        self.sections.iter().flat_map(|s| s.findings.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
            && self.unstructured.is_none()
            && self.instruction_analysis.is_empty()
    }
}

/// Parse a bare report string
pub fn parse_report<'a>(report: impl Into<Option<&'a str>>, config: &ParserConfig) -> ReportDocument {
    let report = report.into().unwrap_or("");
    let records = extract_embedded_array_with(report, &config.array_key);
    build_document(report, records, &[], config)
}

/// Parse the report inside an analyzer envelope. Instruction records the
/// analyzer already structured take precedence over ones embedded in the text.
pub fn parse_envelope(envelope: &AnalysisEnvelope, config: &ParserConfig) -> ReportDocument {
    let report = envelope.report();
    let records = if envelope.instruction_analysis.is_empty() {
        extract_embedded_array_with(report, &config.array_key)
    } else {
        envelope.instruction_analysis.clone()
    };

    let mut document = build_document(report, records, &envelope.vulnerabilities, config);
    document.provider = envelope.provider.clone();
    document.kind = envelope.kind;
    document
}

fn build_document(
    report: &str,
    instruction_analysis: Vec<Value>,
    vulnerabilities: &[Value],
    config: &ParserConfig,
) -> ReportDocument {
    let convention = detect_format_for(report, config);
    let sections = split_sections_for(report, convention, config);

    let unstructured = match &sections {
        Sections::Unstructured(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    };

    let sections: Vec<ParsedSection> = sections
        .into_sections()
        .into_iter()
        .filter(|s| !is_stripped(&s.title, config))
        .map(|s| parse_section(s, config))
        .collect();

    debug!(
        "Parsed {} report: {} sections, {} instruction records",
        convention,
        sections.len(),
        instruction_analysis.len()
    );

    let highest_severity = highest_severity(&instruction_analysis, vulnerabilities, report);

    ReportDocument {
        convention,
        provider: None,
        kind: ReportKind::Analysis,
        sections,
        unstructured,
        instruction_analysis,
        highest_severity,
    }
}

fn is_stripped(title: &str, config: &ParserConfig) -> bool {
    let title = title.to_uppercase();
    config
        .strip_sections
        .iter()
        .any(|s| !s.trim().is_empty() && title.contains(&s.trim().to_uppercase()))
}

fn parse_section(section: Section, config: &ParserConfig) -> ParsedSection {
    let body = if config.strip_json_blocks {
        clean_body(&section.body)
    } else {
        section.body
    };

    let label_values = extract_label_value_items_with(&body, config.break_rule);
    let table = match config.table_header.as_deref() {
        Some(keyword) => extract_table_with_header(&body, keyword),
        None => extract_table(&body),
    };
    let findings = split_finding_cards(&section.title, &body, &config.finding_marker);

    ParsedSection {
        title: section.title,
        body,
        label_values,
        table,
        findings,
    }
}

/// Drop fenced json blocks and collapse the blank runs they leave behind
fn clean_body(body: &str) -> String {
    static JSON_BLOCK: OnceLock<Regex> = OnceLock::new();
    static BLANK_RUN: OnceLock<Regex> = OnceLock::new();
    let json_block =
        JSON_BLOCK.get_or_init(|| Regex::new(r"```(?i:json)[\s\S]*?```").expect("json block pattern"));
    let blank_run = BLANK_RUN.get_or_init(|| Regex::new(r"\n{3,}").expect("blank run pattern"));

    let without_json = json_block.replace_all(body, "");
    blank_run
        .replace_all(&without_json, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvelopeConfig;
    use serde_json::json;

    const OPENAI_REPORT: &str = r#"Analysis of OB1.awl

1. EXECUTIVE SUMMARY
The program contains a time-triggered logic bomb.

2. CYBER SECURITY KEY FINDINGS
- **Title**: Logic Bomb
- **Risk Level**: Critical
- **Description**: Timer T5 clears all outputs
  after 30 days.

- **Title**: Hardcoded Setpoint
- **Risk Level**: Medium

3. INSTRUCTION-LEVEL ANALYSIS
```json
[{"instruction": "A M20.0", "insight": "Arms the timer", "risk_level": "Critical"}]
```

4. IMPLICATIONS AND RECOMMENDATIONS
| Risk | Impact | Recommendation |
|------|--------|----------------|
| Logic bomb | Plant stop | Remove T5 branch |

5. NEXT STEPS
Review OB1 with the integrator.
```json
[]
```



Re-run the analysis.
"#;

    #[test]
    fn test_full_numbered_report() {
        let doc = parse_report(OPENAI_REPORT, &ParserConfig::default());
        assert_eq!(doc.convention, Convention::Numbered);

        let titles: Vec<_> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "EXECUTIVE SUMMARY",
                "CYBER SECURITY KEY FINDINGS",
                "IMPLICATIONS AND RECOMMENDATIONS",
                "NEXT STEPS",
            ]
        );

        assert_eq!(doc.instruction_analysis.len(), 1);
        assert_eq!(doc.instruction_analysis[0]["instruction"], "A M20.0");
        assert_eq!(doc.highest_severity, Some(RiskLevel::Critical));

        let findings = doc.section("cyber security key findings").unwrap();
        assert_eq!(findings.findings.len(), 2);
        let items = findings.label_values.as_ref().unwrap();
        assert_eq!(items.iter().filter(|i| i.is_break()).count(), 1);

        let table = doc
            .section("IMPLICATIONS AND RECOMMENDATIONS")
            .unwrap()
            .table
            .as_ref()
            .unwrap();
        assert_eq!(table.rows.len(), 1);

        let next = doc.section("NEXT STEPS").unwrap();
        assert_eq!(
            next.body,
            "Review OB1 with the integrator.\n\nRe-run the analysis."
        );
        assert!(next.label_values.is_none());
    }

    #[test]
    fn test_markdown_report() {
        let report = "## Summary\nAll good\n## Findings\n- **Title**: None\n## Findings\nsecond";
        let doc = parse_report(report, &ParserConfig::default());
        assert_eq!(doc.convention, Convention::Markdown);
        assert_eq!(doc.sections.len(), 3);
        assert!(doc.unstructured.is_none());
    }

    #[test]
    fn test_unstructured_report() {
        let doc = parse_report("The model refused to answer.", &ParserConfig::default());
        assert_eq!(doc.convention, Convention::None);
        assert!(doc.sections.is_empty());
        assert_eq!(doc.unstructured.as_deref(), Some("The model refused to answer."));
        assert!(doc.highest_severity.is_none());
    }

    #[test]
    fn test_empty_report() {
        let doc = parse_report(None::<&str>, &ParserConfig::default());
        assert!(doc.is_empty());
        assert_eq!(doc, parse_report("  ", &ParserConfig::default()));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let config = ParserConfig::default();
        let first = serde_json::to_string(&parse_report(OPENAI_REPORT, &config)).unwrap();
        let second = serde_json::to_string(&parse_report(OPENAI_REPORT, &config)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_keep_instruction_section_when_not_stripped() {
        let config = ParserConfig {
            strip_sections: Vec::new(),
            strip_json_blocks: false,
            ..ParserConfig::default()
        };
        let doc = parse_report(OPENAI_REPORT, &config);
        let section = doc.section("INSTRUCTION-LEVEL ANALYSIS").unwrap();
        assert!(section.body.starts_with("```json"));
    }

    #[test]
    fn test_envelope_records_take_precedence() {
        let input = json!({
            "provider": "ollama",
            "status": "baseline",
            "analysis_json": {
                "llm_results": OPENAI_REPORT,
                "instruction_analysis": [{"instruction": "L MW10", "risk_level": "Low"}]
            }
        })
        .to_string();
        let envelope = AnalysisEnvelope::from_input(&input, &EnvelopeConfig::default());
        let doc = parse_envelope(&envelope, &ParserConfig::default());

        assert_eq!(doc.provider.as_deref(), Some("ollama"));
        assert_eq!(doc.kind, ReportKind::Baseline);
        assert_eq!(doc.instruction_analysis[0]["instruction"], "L MW10");
        assert_eq!(doc.highest_severity, Some(RiskLevel::Low));
    }

    #[test]
    fn test_upper_case_json_fence_is_stripped() {
        let report = "1. EXECUTIVE SUMMARY\nok\n```JSON\n[{\"instruction\": \"A M20.0\", \"risk_level\": \"High\"}]\n```\nend";
        let doc = parse_report(report, &ParserConfig::default());

        assert_eq!(doc.instruction_analysis.len(), 1);
        assert_eq!(doc.section("EXECUTIVE SUMMARY").unwrap().body, "ok\n\nend");
    }

    #[test]
    fn test_bold_header_report() {
        let report = "**1. EXECUTIVE SUMMARY**\nAll clear.\n\n**2. CYBER SECURITY KEY FINDINGS**\n- **Title**: Logic Bomb\n- **Risk Level**: Critical\n\n**INSTRUCTION-LEVEL ANALYSIS (REQUIRED)**\nA M20.0 arms T5";

        let plain = parse_report(report, &ParserConfig::default());
        assert_eq!(plain.convention, Convention::None);
        assert!(plain.sections.is_empty());

        let config = ParserConfig {
            bold_headers: true,
            ..ParserConfig::default()
        };
        let doc = parse_report(report, &config);
        assert_eq!(doc.convention, Convention::Markdown);
        let titles: Vec<_> = doc.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["EXECUTIVE SUMMARY", "CYBER SECURITY KEY FINDINGS"]);
        assert_eq!(doc.findings().count(), 1);
        assert_eq!(doc.highest_severity, Some(RiskLevel::Critical));
    }
}
