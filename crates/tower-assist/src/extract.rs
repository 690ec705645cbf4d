//! Pull a JSON object out of model text.
//!
//! Models wrap answers in prose or Markdown fences. The extractor tries the
//! whole text first, then the first balanced `{...}` span.

use serde_json::{Map, Value};

/// Extract the first JSON object from `text`.
///
/// Returns `None` when no span parses as an object.
#[must_use]
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let trimmed = strip_fence(text.trim());

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return Some(map);
    }

    let mut rest = trimmed;
    while let Some(start) = rest.find('{') {
        let candidate = &rest[start..];
        if let Some(Value::Object(map)) = balanced_end(candidate)
            .and_then(|end| serde_json::from_str::<Value>(&candidate[..end]).ok())
        {
            return Some(map);
        }
        rest = &candidate[1..];
    }
    None
}

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````).
fn strip_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let body = body.find('\n').map_or(body, |nl| &body[nl.saturating_add(1)..]);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Byte length of the balanced object starting at `text[0] == '{'`.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {},
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth = depth.saturating_add(1),
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx.saturating_add(1));
                }
            },
            _ => {},
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_object() {
        let map = extract_json_object(r#"{"title": "Fall drop"}"#).unwrap();
        assert_eq!(map["title"], "Fall drop");
    }

    #[test]
    fn test_fenced_object() {
        let text = "```json\n{\"code\": \"FALL10\", \"discount_type\": \"percent\"}\n```";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["code"], "FALL10");
        assert_eq!(map["discount_type"], "percent");
    }

    #[test]
    fn test_object_inside_prose() {
        let text = "Sure! Here is a draft:\n{\"name\": \"Golden {Wing}\", \"nested\": {\"a\": 1}}\nLet me know.";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["name"], "Golden {Wing}");
        assert_eq!(map["nested"]["a"], 1);
    }

    #[test]
    fn test_escaped_quote_in_string() {
        let text = r#"note: {"body": "say \"hi\" }"} trailing"#;
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["body"], "say \"hi\" }");
    }

    #[test]
    fn test_skips_unparseable_brace() {
        let text = "{not json} then {\"ok\": true}";
        let map = extract_json_object(text).unwrap();
        assert_eq!(map["ok"], true);
    }

    #[test]
    fn test_no_object() {
        assert!(extract_json_object("I can't help with that.").is_none());
        assert!(extract_json_object("[1, 2, 3]").is_none());
        assert!(extract_json_object("{\"unterminated\": ").is_none());
    }
}
