//! Permissive reader for the JSON-like literals LLMs emit
//!
//! Accepts single-quoted strings, unquoted object keys, trailing commas,
//! `//` and `/* */` comments, raw newlines inside strings and the Python
//! literals `True`, `False` and `None`. The input is rewritten into strict
//! JSON and handed to `serde_json`; nothing is ever evaluated.

use serde_json::Value;
use tracing::debug;

/// Parse relaxed JSON. Returns `None` when the text cannot be normalised or
/// the normalised text is still invalid.
pub fn parse_relaxed(text: &str) -> Option<Value> {
    let strict = normalize(text)?;
    match serde_json::from_str::<Value>(&strict) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Relaxed JSON rejected after normalisation: {}", e);
            None
        }
    }
}

/// Rewrite relaxed JSON into strict JSON text
fn normalize(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                i = copy_string(&chars, i, &mut out)?;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                // Unterminated comment
                if i >= chars.len() {
                    return None;
                }
                i += 2;
            }
            ',' => {
                let next = skip_insignificant(&chars, i + 1);
                if !matches!(chars.get(next), Some(']') | Some('}')) {
                    out.push(',');
                }
                i += 1;
            }
            c if c.is_ascii_digit() || c == '-' => {
                // Numbers go through verbatim; serde_json validates them
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || matches!(chars[i], '.' | '+' | '-'))
                {
                    out.push(chars[i]);
                    i += 1;
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => {
                let start = i;
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '$')
                {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let is_key = chars.get(skip_insignificant(&chars, i)) == Some(&':');
                if is_key {
                    out.push('"');
                    out.push_str(&word);
                    out.push('"');
                } else {
                    out.push_str(literal(&word)?);
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    Some(out)
}

/// Copy a quoted string starting at `start` as a double-quoted JSON string.
/// Returns the index just past the closing quote.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> Option<usize> {
    let quote = chars[start];
    let mut i = start + 1;
    out.push('"');

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\\' => {
                let escaped = *chars.get(i + 1)?;
                match escaped {
                    '\'' => out.push('\''),
                    other => {
                        out.push('\\');
                        out.push(other);
                    }
                }
                i += 2;
            }
            c if c == quote => {
                out.push('"');
                return Some(i + 1);
            }
            '"' => {
                out.push_str("\\\"");
                i += 1;
            }
            '\n' => {
                out.push_str("\\n");
                i += 1;
            }
            '\r' => {
                out.push_str("\\r");
                i += 1;
            }
            '\t' => {
                out.push_str("\\t");
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    // Unterminated string
    None
}

/// Skip whitespace and comments, returning the next significant index
fn skip_insignificant(chars: &[char], mut i: usize) -> usize {
    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if chars.get(i) == Some(&'/') && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if chars.get(i) == Some(&'/') && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            continue;
        }
        return i;
    }
}

fn literal(word: &str) -> Option<&'static str> {
    match word {
        "true" | "True" => Some("true"),
        "false" | "False" => Some("false"),
        "null" | "None" | "undefined" => Some("null"),
        _ => {
            debug!("Bare word '{}' is not a JSON literal", word);
            None
        }
    }
}
