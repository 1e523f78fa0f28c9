//! `- **Label**: value` bullet groups inside a section body

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LabelValue {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LabelValueItem {
    Item(LabelValue),
    /// Visual separator between bullet groups
    Break,
}

impl LabelValueItem {
    pub fn item(label: impl Into<String>, value: impl Into<String>) -> Self {
        LabelValueItem::Item(LabelValue {
            label: label.into(),
            value: value.into(),
        })
    }

    pub fn is_break(&self) -> bool {
        matches!(self, LabelValueItem::Break)
    }
}

/// When a `Break` is emitted between bullets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BreakRule {
    /// Only an explicit blank line (or `---`) separates groups
    #[default]
    BlankLine,
    /// Additionally break before a bullet that directly follows another bullet
    EveryBullet,
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-*] +\*\*(.+?)\*\*: ?(.*)$").expect("bullet pattern"))
}

/// Extract label/value items using the blank-line break rule.
/// Returns `None` when the body holds no bullet at all.
pub fn extract_label_value_items(body: &str) -> Option<Vec<LabelValueItem>> {
    extract_label_value_items_with(body, BreakRule::BlankLine)
}

pub fn extract_label_value_items_with(body: &str, rule: BreakRule) -> Option<Vec<LabelValueItem>> {
    let mut items: Vec<LabelValueItem> = Vec::new();
    // Index of the item continuation lines attach to
    let mut open: Option<usize> = None;
    let mut last_was_bullet = false;

    for line in body.split('\n').flat_map(|l| l.split("---")).map(str::trim) {
        if let Some(caps) = bullet_re().captures(line) {
            if rule == BreakRule::EveryBullet && last_was_bullet {
                items.push(LabelValueItem::Break);
            }
            let label = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let value = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            items.push(LabelValueItem::item(label, value));
            open = Some(items.len() - 1);
            last_was_bullet = true;
        } else if line.is_empty() {
            if items.last().is_some_and(|i| !i.is_break()) {
                items.push(LabelValueItem::Break);
            }
            open = None;
            last_was_bullet = false;
        } else {
            if let Some(idx) = open {
                if let Some(LabelValueItem::Item(current)) = items.get_mut(idx) {
                    if !current.value.is_empty() {
                        current.value.push('\n');
                    }
                    current.value.push_str(line);
                }
            }
            last_was_bullet = false;
        }
    }

    while items.last().is_some_and(LabelValueItem::is_break) {
        items.pop();
    }

    if items.iter().any(|i| !i.is_break()) {
        Some(items)
    } else {
        None
    }
}
