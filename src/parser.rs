//! Pulls a contact record out of free-text model output.
//!
//! Models are asked for bare JSON but routinely wrap it in prose or Markdown
//! fences. The parser locates the first `{...}` span, parses it, and keeps
//! only non-empty values for the known [`FieldKey`]s.

use crate::error::{ContextFillError, Result};
use crate::record::{ExtractedRecord, FieldKey};
use log::debug;
use serde_json::{Map, Value};

/// How the object span is located inside the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BraceScan {
    /// From the first `{` to the brace that closes it, counting nested
    /// braces and ignoring braces inside string literals.
    #[default]
    Balanced,
    /// From the first `{` to the last `}` in the text. Matches the legacy
    /// `\{[\s\S]*\}` pattern, including its failure when trailing prose
    /// contains a `}`.
    Greedy,
}

/// Parses model output with the default [`BraceScan::Balanced`] policy.
///
/// Returns an empty record when the text holds no `{` or no `}` after it. A
/// span that is found but is not valid JSON is an error, including an object
/// whose braces never balance.
pub fn parse_response(raw: &str) -> Result<ExtractedRecord> {
    parse_response_with(raw, BraceScan::Balanced)
}

pub fn parse_response_with(raw: &str, scan: BraceScan) -> Result<ExtractedRecord> {
    let span = match scan {
        // An object that never closes falls back to the greedy span so the
        // broken JSON is reported instead of read as "nothing found".
        BraceScan::Balanced => balanced_object_span(raw).or_else(|| greedy_object_span(raw)),
        BraceScan::Greedy => greedy_object_span(raw),
    };

    let Some(span) = span else {
        debug!("No JSON object found in model output ({} chars)", raw.len());
        return Ok(ExtractedRecord::new());
    };

    let object: Map<String, Value> =
        serde_json::from_str(span).map_err(ContextFillError::MalformedResponse)?;

    Ok(record_from_object(object))
}

/// Builds a record from a parsed JSON object, dropping nulls, empty strings
/// and keys outside the schema.
pub fn record_from_object(object: Map<String, Value>) -> ExtractedRecord {
    let mut record = ExtractedRecord::new();

    for (name, value) in object {
        let Some(key) = FieldKey::from_name(&name) else {
            debug!("Ignoring unknown field '{}' in model output", name);
            continue;
        };

        if let Some(text) = coerce_value(value) {
            record.set(key, text);
        }
    }

    record
}

fn coerce_value(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other @ (Value::Array(_) | Value::Object(_)) => Some(other.to_string()),
    }
}

fn balanced_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
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
                    let end = start + offset + ch.len_utf8();
                    return Some(&raw[start..end]);
                }
            }
            _ => {}
        }
    }

    None
}

fn greedy_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let record = parse_response(r#"{"firstName": "Ada", "lastName": "Lovelace"}"#).unwrap();
        assert_eq!(record.get(FieldKey::FirstName), Some("Ada"));
        assert_eq!(record.get(FieldKey::LastName), Some("Lovelace"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_fenced_json_with_prose() {
        let raw = "Here is the data you asked for:\n```json\n{\n  \"email\": \"ada@example.com\",\n  \"phone\": null\n}\n```\nLet me know if you need more.";
        let record = parse_response(raw).unwrap();
        assert_eq!(record.get(FieldKey::Email), Some("ada@example.com"));
        assert_eq!(record.get(FieldKey::Phone), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_null_and_empty_values_are_dropped() {
        let raw = r#"{"firstName": null, "lastName": "", "city": "Paris", "notes": null}"#;
        let record = parse_response(raw).unwrap();
        assert_eq!(record.len(), 1);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({ "city": "Paris" }));
    }

    #[test]
    fn test_scalars_are_coerced_to_strings() {
        let raw = r#"{"zipCode": 90210, "notes": true}"#;
        let record = parse_response(raw).unwrap();
        assert_eq!(record.get(FieldKey::ZipCode), Some("90210"));
        assert_eq!(record.get(FieldKey::Notes), Some("true"));
    }

    #[test]
    fn test_unknown_keys_are_dropped() {
        let raw = r#"{"firstName": "Ada", "favouriteColour": "green"}"#;
        let record = parse_response(raw).unwrap();
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_no_object_yields_empty_record() {
        let record = parse_response("I could not find any contact details.").unwrap();
        assert!(record.is_empty());

        let record = parse_response_with("nothing here", BraceScan::Greedy).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = parse_response(r#"{"firstName": "Ada", }"#).unwrap_err();
        assert!(matches!(err, ContextFillError::MalformedResponse(_)));
    }

    #[test]
    fn test_truncated_object_yields_empty_record() {
        let record = parse_response(r#"{"firstName": "Ada""#).unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_unbalanced_object_is_an_error() {
        let raw = r#"{"firstName": "Ada", "address": {"city": "Oslo"}"#;

        let err = parse_response(raw).unwrap_err();
        assert!(matches!(err, ContextFillError::MalformedResponse(_)));

        let err = parse_response_with(raw, BraceScan::Greedy).unwrap_err();
        assert!(matches!(err, ContextFillError::MalformedResponse(_)));
    }

    #[test]
    fn test_only_first_object_is_used() {
        let raw = r#"{"firstName": "Ada"} and also {"firstName": "Grace"}"#;
        let record = parse_response(raw).unwrap();
        assert_eq!(record.get(FieldKey::FirstName), Some("Ada"));
    }

    #[test]
    fn test_braces_inside_strings() {
        let raw = r#"{"notes": "uses {curly} braces and a \"quoted } brace\"", "city": "Oslo"} trailing"#;
        let record = parse_response(raw).unwrap();
        assert_eq!(
            record.get(FieldKey::Notes),
            Some(r#"uses {curly} braces and a "quoted } brace""#)
        );
        assert_eq!(record.get(FieldKey::City), Some("Oslo"));
    }

    #[test]
    fn test_nested_object_value_is_kept_as_json_text() {
        let raw = r#"{"address": {"street": "1 Main St"}, "city": "Leeds"}"#;
        let record = parse_response(raw).unwrap();
        assert_eq!(record.get(FieldKey::Address), Some(r#"{"street":"1 Main St"}"#));
        assert_eq!(record.get(FieldKey::City), Some("Leeds"));
    }

    #[test]
    fn test_greedy_scan_breaks_on_trailing_brace() {
        let raw = r#"{"firstName": "Ada"} (fields marked {optional} were skipped)"#;

        let record = parse_response(raw).unwrap();
        assert_eq!(record.get(FieldKey::FirstName), Some("Ada"));

        let err = parse_response_with(raw, BraceScan::Greedy).unwrap_err();
        assert!(matches!(err, ContextFillError::MalformedResponse(_)));
    }

    #[test]
    fn test_greedy_and_balanced_agree_on_single_object() {
        let raw = "```json\n{\"company\": \"Acme\", \"jobTitle\": \"Engineer\"}\n```";
        assert_eq!(
            parse_response(raw).unwrap(),
            parse_response_with(raw, BraceScan::Greedy).unwrap()
        );
    }
}
