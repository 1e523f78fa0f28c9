use super::risk::RiskLevel;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Bullet label that opens a finding card
pub const DEFAULT_FINDING_MARKER: &str = "Title";

/// One `- **Title**: ...` finding inside a findings section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FindingCard {
    pub title: String,

    #[serde(default)]
    pub risk_level: Option<RiskLevel>,

    /// The card's markdown, trimmed
    pub text: String,

    pub fingerprint: String,
}

impl FindingCard {
    /// Normalize title for stable fingerprinting
    fn normalize_title(title: &str) -> String {
        title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Deterministic fingerprint from section title and normalized finding title.
    /// Risk level is left out so a re-rated finding keeps its identity.
    pub fn compute_fingerprint(section: &str, title: &str) -> String {
        let input = format!(
            "{}|{}",
            section.trim().to_uppercase(),
            Self::normalize_title(title)
        );
        let hash = Sha256::digest(input.as_bytes());
        format!("{:x}", hash)[..12].to_string()
    }
}

/// Split a findings section into cards, one per `- **<marker>**:` bullet.
/// Text before the first marker is dropped.
pub fn split_finding_cards(section_title: &str, body: &str, marker: &str) -> Vec<FindingCard> {
    let prefix = format!("- **{}**:", marker);
    let mut chunks: Vec<Vec<&str>> = Vec::new();

    for line in body.lines() {
        if line.trim_start().starts_with(&prefix) {
            chunks.push(vec![line]);
        } else if let Some(chunk) = chunks.last_mut() {
            chunk.push(line);
        }
    }

    chunks
        .into_iter()
        .map(|lines| {
            let text = lines.join("\n").trim().to_string();
            let title = lines[0]
                .trim_start()
                .trim_start_matches(prefix.as_str())
                .trim()
                .to_string();
            let risk_level = card_risk(&text);
            FindingCard {
                fingerprint: FindingCard::compute_fingerprint(section_title, &title),
                title,
                risk_level,
                text,
            }
        })
        .collect()
}

fn card_risk(text: &str) -> Option<RiskLevel> {
    card_risk_re()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| RiskLevel::parse(m.as_str()))
}

fn card_risk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)- \*\*Risk Level\*\*: *(\w+)").expect("card risk pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINDINGS: &str = "Two issues stand out.\n- **Title**: Logic Bomb\n- **Risk Level**: Critical\n- **Description**: Timer T5 clears outputs\n  after 30 days.\n\n- **Title**: Hardcoded   Setpoint\n- **Risk Level**: medium";

    #[test]
    fn test_split_cards() {
        let cards = split_finding_cards("CYBER SECURITY KEY FINDINGS", FINDINGS, "Title");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].title, "Logic Bomb");
        assert_eq!(cards[0].risk_level, Some(RiskLevel::Critical));
        assert!(cards[0].text.ends_with("after 30 days."));
        assert_eq!(cards[1].title, "Hardcoded   Setpoint");
        assert_eq!(cards[1].risk_level, Some(RiskLevel::Medium));
    }

    #[test]
    fn test_fingerprint_stability() {
        let fp1 = FindingCard::compute_fingerprint("Findings", "Logic Bomb");
        let fp2 = FindingCard::compute_fingerprint("FINDINGS", "  logic   bomb ");
        assert_eq!(fp1, fp2);
        assert_eq!(fp1.len(), 12);
    }

    #[test]
    fn test_fingerprint_different_section() {
        let fp1 = FindingCard::compute_fingerprint("CYBER SECURITY KEY FINDINGS", "Logic Bomb");
        let fp2 = FindingCard::compute_fingerprint("NEXT STEPS", "Logic Bomb");
        assert_ne!(fp1, fp2);
    }

    #[test]
    fn test_no_marker_no_cards() {
        assert!(split_finding_cards("X", "- **Risk Level**: High", "Title").is_empty());
        assert!(split_finding_cards("X", "", "Title").is_empty());
    }
}
