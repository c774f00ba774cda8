use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static FENCE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)```(?:json)?").unwrap());

/// Recovers the first well-formed JSON object from free-form model output.
///
/// Fenced code markers (```` ```json ```` in any case, and bare ```` ``` ````)
/// are stripped first. Top-level brace-balanced spans are then tried in order,
/// with braces inside JSON strings ignored; the first span that parses as an
/// object wins. A span whose braces never close ends the search.
///
/// Never fails: every unrecoverable input yields `None`.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    if text.trim().is_empty() {
        return None;
    }

    let cleaned = FENCE_REGEX.replace_all(text, "");
    let mut offset = 0;

    while let Some(relative_start) = cleaned[offset..].find('{') {
        let start = offset + relative_start;
        let end = balanced_end(&cleaned[start..])? + start;

        if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(&cleaned[start..=end]) {
            return Some(object);
        }
        offset = end + 1;
    }

    None
}

/// Byte index of the brace closing the object that opens at index 0, or
/// `None` when it never closes.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escape_next {
                escape_next = false;
            } else if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}
