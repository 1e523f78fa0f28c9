use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "reportlens.yaml";

/// Config schema version this build reads
pub const CONFIG_VERSION: u32 = 1;

pub fn default_version() -> u32 {
    CONFIG_VERSION
}

pub fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

pub fn default_concurrency() -> usize {
    4
}

pub fn default_include() -> Vec<String> {
    vec![
        "*.json".to_string(),
        "*.md".to_string(),
        "*.txt".to_string(),
    ]
}

pub fn default_anchor_section() -> String {
    crate::parser::DEFAULT_ANCHOR_SECTION.to_string()
}

pub fn default_array_key() -> String {
    crate::parser::DEFAULT_ARRAY_KEY.to_string()
}

pub fn default_strip_sections() -> Vec<String> {
    vec!["INSTRUCTION-LEVEL ANALYSIS".to_string()]
}

pub fn default_finding_marker() -> String {
    crate::parser::DEFAULT_FINDING_MARKER.to_string()
}

pub fn default_anchor_phrases() -> Vec<String> {
    vec![
        "EXECUTIVE SUMMARY".to_string(),
        "CODE STRUCTURE & QUALITY REVIEW".to_string(),
        "CYBER SECURITY KEY FINDINGS".to_string(),
    ]
}

pub fn default_true() -> bool {
    true
}
