//! LLM report parsing
//!
//! Header detection, section splitting and the per-section extractors are
//! pure functions: identical input always yields identical output and no
//! function here fails. Unrecognised structure degrades to `None`, an empty
//! vector or [`Convention::None`].

mod document;
mod finding;
mod format;
mod json;
mod label_value;
mod relaxed;
mod risk;
mod sections;
mod table;

pub use document::{parse_envelope, parse_report, ParsedSection, ReportDocument};
pub use finding::{split_finding_cards, FindingCard, DEFAULT_FINDING_MARKER};
pub use format::{
    detect_format, detect_format_for, detect_format_with, Convention, DEFAULT_ANCHOR_SECTION,
};
pub use json::{extract_embedded_array, extract_embedded_array_with, DEFAULT_ARRAY_KEY};
pub use label_value::{
    extract_label_value_items, extract_label_value_items_with, BreakRule, LabelValue,
    LabelValueItem,
};
pub use relaxed::parse_relaxed;
pub use risk::{highest_severity, record_risk, risk_label, text_risks, RiskLevel};
pub use sections::{
    split_sections, split_sections_for, Section, SectionMap, Sections, CODE_BLOCK_TITLE,
};
pub use table::{extract_table, extract_table_with_header, TableData};
