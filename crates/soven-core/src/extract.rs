use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

// Compiled once. A pattern that fails to compile disables its strategy
// instead of poisoning the whole cascade.
static OBJECT_WITH_ARRAY: OnceLock<Option<Regex>> = OnceLock::new();
static FENCED_BLOCK: OnceLock<Option<Regex>> = OnceLock::new();

fn object_with_array() -> Option<&'static Regex> {
    OBJECT_WITH_ARRAY
        .get_or_init(|| Regex::new(r"\{[^{}]*\[[^\[\]]*\][^{}]*\}").ok())
        .as_ref()
}

fn fenced_block() -> Option<&'static Regex> {
    FENCED_BLOCK
        .get_or_init(|| Regex::new(r"(?si)```(?:json)?\s*(\{.*?\})\s*```").ok())
        .as_ref()
}

/// Recover a JSON value from free-form model output.
///
/// Four strategies run in a fixed order and the first syntactically valid
/// parse wins: the widest `{`..`}` slice, then each flat brace group that
/// contains a bracketed array in order of appearance, then the body of a
/// fenced code block, then the whole trimmed text. The last strategy means
/// the result is not guaranteed to be an object; callers check the shape.
///
/// `None` is the normal signal that the reply held no parseable JSON, not
/// an error.
pub fn extract_json(raw: &str) -> Option<Value> {
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&raw[start..=end]) {
                return Some(value);
            }
        }
    }

    if let Some(re) = object_with_array() {
        for candidate in re.find_iter(raw) {
            if let Ok(value) = serde_json::from_str(candidate.as_str()) {
                return Some(value);
            }
        }
    }

    if let Some(re) = fenced_block() {
        for caps in re.captures_iter(raw) {
            if let Some(body) = caps.get(1) {
                if let Ok(value) = serde_json::from_str(body.as_str()) {
                    return Some(value);
                }
            }
        }
    }

    serde_json::from_str(raw.trim()).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn widest_slice_wins_over_prose() {
        let raw = "Sure! Here is the schedule:\n{\"deadlines\": [{\"task\": \"File\"}]}\nLet me know.";
        let value = extract_json(raw).unwrap();
        assert!(value.get("deadlines").is_some());
    }

    #[test]
    fn empty_object_is_valid() {
        assert_eq!(extract_json("{}"), Some(json!({})));
    }

    #[test]
    fn reversed_braces_fall_through() {
        // "}{" has no slice with start < end and nothing else to try.
        assert_eq!(extract_json("}{"), None);
    }

    #[test]
    fn unbalanced_braces_yield_none() {
        assert_eq!(extract_json("{ \"deadlines\": [ broken"), None);
    }

    #[test]
    fn array_bearing_group_recovered_from_noise() {
        // The widest slice spans both bad braces and fails to parse, but
        // the inner group with an array is valid on its own.
        let raw = "{ bad {\"items\": [1, 2]} also bad }";
        let value = extract_json(raw).unwrap();
        assert_eq!(value, json!({"items": [1, 2]}));
    }

    #[test]
    fn fenced_block_recovered_when_slices_fail() {
        let raw = "Notes: { unbalanced\n```json\n{\"status\": \"ok\"}\n```";
        let value = extract_json(raw).unwrap();
        assert_eq!(value, json!({"status": "ok"}));
    }

    #[test]
    fn fence_language_tag_is_optional() {
        let raw = "intro { nope\n```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(raw), Some(json!({"a": 1})));
    }

    #[test]
    fn bare_array_parses_via_direct_parse() {
        // No braces anywhere, so only the final whole-text parse applies.
        let value = extract_json("  [1, 2, 3]  ").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
    }

    #[test]
    fn prose_without_json_is_none() {
        assert_eq!(extract_json("I cannot help with that."), None);
    }
}
