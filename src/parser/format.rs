//! Header convention detection for raw LLM reports

use crate::config::ParserConfig;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

/// Anchor section a numbered report must contain to count as structured
pub const DEFAULT_ANCHOR_SECTION: &str = "EXECUTIVE SUMMARY";

/// Heading style that governs a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Convention {
    /// `1. EXECUTIVE SUMMARY`
    Numbered,
    /// `## Executive Summary`
    Markdown,
    /// No recognised headers
    #[default]
    None,
}

impl std::fmt::Display for Convention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Convention::Numbered => write!(f, "numbered"),
            Convention::Markdown => write!(f, "markdown"),
            Convention::None => write!(f, "none"),
        }
    }
}

/// `1. TITLE` occupying a whole line. Group 2 is the title.
pub(crate) fn numbered_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(\d+)\.[ \t]+([A-Z \-]+)[ \t\r]*$").expect("numbered header pattern")
    })
}

/// `## Title` with 2 to 6 hashes. Group 2 is the title.
pub(crate) fn markdown_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^(#{2,6})[ \t]*([^\n#]+)[ \t]*$").expect("markdown header pattern")
    })
}

/// Whole-line bold heading, optionally numbered: `**1. EXECUTIVE SUMMARY**`
fn bold_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*\*\*[ \t]*(?:\d+\.?[ \t]*)?([A-Za-z0-9][A-Za-z0-9 &()\-]*?)[ \t]*\*\*[ \t\r]*$")
            .expect("bold header pattern")
    })
}

/// Markdown or bold heading. The title is group 2 for markdown, group 3 for bold.
pub(crate) fn markdown_or_bold_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^(?:(#{2,6})[ \t]*([^\n#]+)|[ \t]*\*\*[ \t]*(?:\d+\.?[ \t]*)?([A-Za-z0-9][A-Za-z0-9 &()\-]*?)[ \t]*\*\*)[ \t\r]*$",
        )
        .expect("markdown or bold header pattern")
    })
}

/// Detect the header convention using the default anchor section
pub fn detect_format<'a>(report: impl Into<Option<&'a str>>) -> Convention {
    detect_format_with(report, DEFAULT_ANCHOR_SECTION)
}

/// Detect the header convention. Numbered headers win only when one of them
/// is the anchor section; otherwise any markdown header selects Markdown.
pub fn detect_format_with<'a>(report: impl Into<Option<&'a str>>, anchor: &str) -> Convention {
    let report = match report.into() {
        Some(r) if !r.trim().is_empty() => r,
        _ => return Convention::None,
    };

    let mut numbered = 0usize;
    let mut anchored = false;
    for caps in numbered_header_re().captures_iter(report) {
        numbered += 1;
        if caps
            .get(2)
            .is_some_and(|t| t.as_str().trim().eq_ignore_ascii_case(anchor.trim()))
        {
            anchored = true;
        }
    }

    if anchored {
        return Convention::Numbered;
    }
    if numbered > 0 {
        debug!(
            "Ignoring {} numbered headers without '{}' anchor",
            numbered, anchor
        );
    }

    if markdown_header_re().is_match(report) {
        return Convention::Markdown;
    }

    Convention::None
}

/// Detect the header convention under a parser config. With `bold_headers`
/// set, a report with no numbered or markdown structure but whole-line bold
/// headings is treated as markdown.
pub fn detect_format_for<'a>(report: impl Into<Option<&'a str>>, config: &ParserConfig) -> Convention {
    let report = report.into();
    let convention = detect_format_with(report, &config.anchor_section);

    if convention == Convention::None && config.bold_headers {
        if let Some(text) = report {
            if bold_header_re().is_match(text) {
                return Convention::Markdown;
            }
        }
    }

    convention
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(detect_format(""), Convention::None);
        assert_eq!(detect_format("   "), Convention::None);
        assert_eq!(detect_format(None::<&str>), Convention::None);
        assert_eq!(detect_format("\n\t\n"), Convention::None);
    }

    #[test]
    fn test_numbered_requires_anchor() {
        let report = "1. EXECUTIVE SUMMARY\nAll clear.\n\n2. NEXT STEPS\nNone.";
        assert_eq!(detect_format(report), Convention::Numbered);

        let list = "1. OVERVIEW\nSomething\n2. DETAILS\nMore";
        assert_eq!(detect_format(list), Convention::None);
    }

    #[test]
    fn test_numbered_wins_over_markdown() {
        let report = "1. EXECUTIVE SUMMARY\nAll clear.\n## Something\nbody";
        assert_eq!(detect_format(report), Convention::Numbered);
    }

    #[test]
    fn test_markdown_fallback() {
        let report = "Intro\n## Executive Summary\nAll clear.\n### Findings\n- none";
        assert_eq!(detect_format(report), Convention::Markdown);

        // Numbered headers without the anchor fall through to markdown
        let mixed = "1. OVERVIEW\ntext\n## Findings\n- none";
        assert_eq!(detect_format(mixed), Convention::Markdown);
    }

    #[test]
    fn test_header_must_fill_the_line() {
        let report = "The EXECUTIVE SUMMARY above covers 1. EXECUTIVE SUMMARY items.";
        assert_eq!(detect_format(report), Convention::None);

        let lower = "1. Executive summary\ntext";
        assert_eq!(detect_format(lower), Convention::None);
    }

    #[test]
    fn test_single_hash_is_not_a_section() {
        assert_eq!(detect_format("# Title\ntext"), Convention::None);
        assert_eq!(detect_format("####### Too deep\ntext"), Convention::None);
    }

    #[test]
    fn test_crlf_and_indentation() {
        let report = "  1. EXECUTIVE SUMMARY\r\nAll clear.\r\n";
        assert_eq!(detect_format(report), Convention::Numbered);
    }

    #[test]
    fn test_custom_anchor() {
        let report = "1. OVERVIEW\ntext\n2. FINDINGS\nmore";
        assert_eq!(detect_format_with(report, "overview"), Convention::Numbered);
    }

    #[test]
    fn test_bold_headers_are_opt_in() {
        let report = "**1. EXECUTIVE SUMMARY**\nAll clear.\n\n**2. CYBER SECURITY KEY FINDINGS**\n- **Title**: Logic Bomb";
        assert_eq!(detect_format(report), Convention::None);

        let config = ParserConfig {
            bold_headers: true,
            ..ParserConfig::default()
        };
        assert_eq!(detect_format_for(report, &config), Convention::Markdown);

        // Bold labels inside a line are not headings
        assert_eq!(
            detect_format_for("**Note**: nothing found", &config),
            Convention::None
        );
        assert_eq!(detect_format_for(None::<&str>, &config), Convention::None);
    }
}
