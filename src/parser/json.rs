use super::relaxed::parse_relaxed;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Field name LLM reports use for per-instruction findings
pub const DEFAULT_ARRAY_KEY: &str = "instruction_analysis";

/// Extract an embedded JSON array using the default array key
pub fn extract_embedded_array(text: &str) -> Vec<Value> {
    extract_embedded_array_with(text, DEFAULT_ARRAY_KEY)
}

/// Extract the first embedded JSON array from report prose.
/// Tries fenced ```json blocks, then `key: [...]`, then any `[{...}]` span.
/// Never fails: anything unparseable yields an empty vector.
pub fn extract_embedded_array_with(text: &str, key: &str) -> Vec<Value> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    for candidate in candidates(text, key) {
        if let Some(array) = parse_array(&candidate) {
            return array;
        }
    }

    Vec::new()
}

/// Candidate spans in priority order
fn candidates(text: &str, key: &str) -> Vec<String> {
    let mut found = Vec::new();

    // First try: fenced json code blocks
    for cap in fenced_json_re().captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            found.push(inner.as_str().trim().to_string());
        }
    }

    // Second try: key: [ ... ]
    if !key.is_empty() {
        let pattern = format!(r"{}\s*[:=]\s*\[", regex::escape(key));
        if let Ok(re) = Regex::new(&pattern) {
            for m in re.find_iter(text) {
                // The match ends just past the opening bracket
                if let Some(array) = balanced_array(text, m.end() - 1) {
                    found.push(array.to_string());
                }
            }
        }
    }

    // Third try: any array-of-objects span
    if let Some(m) = object_array_re().find(text) {
        found.push(m.as_str().to_string());
    }

    found
}

fn parse_array(candidate: &str) -> Option<Vec<Value>> {
    let value = match serde_json::from_str::<Value>(candidate) {
        Ok(value) => value,
        Err(e) => {
            debug!("Strict JSON parse failed ({}), trying relaxed reader", e);
            parse_relaxed(candidate)?
        }
    };

    match value {
        Value::Array(items) => Some(items),
        other => {
            debug!("Discarding embedded JSON that is not an array: {}", kind(&other));
            None
        }
    }
}

/// Slice the bracketed array opening at `open`, honouring strings
fn balanced_array(text: &str, open: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => depth += 1,
            ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[open..open + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn fenced_json_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```(?i:json)\s*([\s\S]+?)```").expect("fenced json pattern"))
}

fn object_array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\s*\{[\s\S]+\}\s*\]").expect("object array pattern"))
}
