//! Splitting a raw report into titled sections

use super::format::{markdown_header_re, markdown_or_bold_header_re, numbered_header_re, Convention};
use crate::config::ParserConfig;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Title given to fenced code found before the first heading
pub const CODE_BLOCK_TITLE: &str = "Code Block";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Title to body mapping that keeps first-seen order while the last body
/// for a repeated title wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SectionMap {
    entries: Vec<Section>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: impl Into<String>, body: impl Into<String>) {
        let title = title.into();
        let body = body.into();
        match self.entries.iter_mut().find(|s| s.title == title) {
            Some(existing) => existing.body = body,
            None => self.entries.push(Section { title, body }),
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.title == title)
            .map(|s| s.body.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_sections(self) -> Vec<Section> {
        self.entries
    }
}

/// Result of splitting a report under one convention
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sections {
    /// Numbered reports, collapsed by title
    Titled(SectionMap),
    /// Markdown reports, strictly in source order
    Ordered(Vec<Section>),
    /// No headers; the whole trimmed report
    Unstructured(String),
}

impl Sections {
    pub fn is_empty(&self) -> bool {
        match self {
            Sections::Titled(map) => map.is_empty(),
            Sections::Ordered(list) => list.is_empty(),
            Sections::Unstructured(text) => text.is_empty(),
        }
    }

    /// Sections in display order. Unstructured text yields nothing.
    pub fn into_sections(self) -> Vec<Section> {
        match self {
            Sections::Titled(map) => map.into_sections(),
            Sections::Ordered(list) => list,
            Sections::Unstructured(_) => Vec::new(),
        }
    }
}

/// Split a report into sections under the given convention
pub fn split_sections(report: &str, convention: Convention) -> Sections {
    match convention {
        Convention::Numbered => {
            let mut map = SectionMap::new();
            for section in split_on_headers(report, numbered_header_re()) {
                map.insert(section.title, section.body);
            }
            Sections::Titled(map)
        }
        Convention::Markdown => Sections::Ordered(split_on_headers(report, markdown_header_re())),
        Convention::None => Sections::Unstructured(report.trim().to_string()),
    }
}

/// Split under a parser config. With `bold_headers` set, markdown reports
/// also split on whole-line bold headings, and fenced code ahead of the first
/// heading is kept as `Code Block` sections.
pub fn split_sections_for(report: &str, convention: Convention, config: &ParserConfig) -> Sections {
    if convention != Convention::Markdown || !config.bold_headers {
        return split_sections(report, convention);
    }

    let header = markdown_or_bold_header_re();
    let preamble_end = header.find(report).map_or(report.len(), |m| m.start());
    let mut sections: Vec<Section> = fenced_code_re()
        .find_iter(&report[..preamble_end])
        .map(|m| Section::new(CODE_BLOCK_TITLE, m.as_str().trim()))
        .collect();
    sections.extend(split_on_headers(report, header));
    Sections::Ordered(sections)
}

fn fenced_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```\w*\n[\s\S]*?```").expect("fenced code pattern"))
}

/// Every match of `header` opens a section whose body runs to the next match.
/// Title is capture group 2, or group 3 for bold headings.
fn split_on_headers(report: &str, header: &Regex) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut open: Option<(String, usize)> = None;

    for caps in header.captures_iter(report) {
        let Some(whole) = caps.get(0) else { continue };
        if let Some((title, start)) = open.take() {
            sections.push(Section::new(title, report[start..whole.start()].trim()));
        }
        let title = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|t| t.as_str().trim())
            .unwrap_or_default();
        open = Some((title.to_string(), whole.end()));
    }

    if let Some((title, start)) = open {
        sections.push(Section::new(title, report[start..].trim()));
    }

    sections
}
