//! Recovery of a JSON object embedded in free-form model output.

use serde_json::{Map, Value};

/// Return the first balanced `{...}` substring of `text`
///
/// Braces inside string literals (including escaped quotes) do not count toward
/// the balance. Returns `None` when no opening brace is ever closed.
pub fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse the first balanced object in `text`, if any
pub fn parse_first_object(text: &str) -> Option<Map<String, Value>> {
    let candidate = extract_first_object(text)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
