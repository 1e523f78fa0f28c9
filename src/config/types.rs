use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use crate::parser::BreakRule;

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Where `parse` writes reports
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,

    /// Files parsed in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Globs a file inside an input directory must match
    #[serde(default = "default_include")]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    #[serde(default)]
    pub parser: ParserConfig,

    #[serde(default)]
    pub envelope: EnvelopeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct ParserConfig {
    /// Section a numbered report must contain
    #[serde(default = "default_anchor_section")]
    pub anchor_section: String,

    /// Field name preceding an embedded findings array
    #[serde(default = "default_array_key")]
    pub array_key: String,

    #[serde(default)]
    pub break_rule: BreakRule,

    /// Sections dropped from the document (matched as upper-case substrings)
    #[serde(default = "default_strip_sections")]
    pub strip_sections: Vec<String>,

    /// Remove fenced json blocks from section bodies
    #[serde(default = "default_true")]
    pub strip_json_blocks: bool,

    /// Bullet label that opens a finding card
    #[serde(default = "default_finding_marker")]
    pub finding_marker: String,

    /// Only accept tables with a header cell containing this keyword
    #[serde(default)]
    pub table_header: Option<String>,

    /// Treat whole-line bold text (`**1. EXECUTIVE SUMMARY**`) as headings
    /// when a report has no numbered or markdown structure
    #[serde(default)]
    pub bold_headers: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            anchor_section: default_anchor_section(),
            array_key: default_array_key(),
            break_rule: BreakRule::default(),
            strip_sections: default_strip_sections(),
            strip_json_blocks: true,
            finding_marker: default_finding_marker(),
            table_header: None,
            bold_headers: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
pub struct EnvelopeConfig {
    /// Phrases identifying a report string stored under an unexpected key
    #[serde(default = "default_anchor_phrases")]
    pub anchor_phrases: Vec<String>,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            anchor_phrases: default_anchor_phrases(),
        }
    }
}
