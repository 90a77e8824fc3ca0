//! Repair for request bodies whose nested values were JSON-encoded twice.
//!
//! Some callers send `{"messages": "[{\"text\":\"hi\"}]"}` where the API expects
//! `{"messages": [{"text": "hi"}]}`. The corrector replaces every string leaf that holds a
//! complete JSON object or array with the parsed value, repeating on the replacement.
//!
//! ```rust
//! use odispatch::DoubleSerializationCorrector;
//! use serde_json::json;
//!
//! let mut body = json!({"messages": "[{\"text\":\"hi\"}]", "count": "3"});
//! assert!(DoubleSerializationCorrector::correct(&mut body));
//! assert_eq!(body, json!({"messages": [{"text": "hi"}], "count": "3"}));
//! ```

use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct DoubleSerializationCorrector;

impl DoubleSerializationCorrector {
    /// Corrects `value` in place and reports whether anything changed.
    pub fn correct(value: &mut Value) -> bool {
        match value {
            Value::String(text) => match parse_candidate(text) {
                Some(mut parsed) => {
                    Self::correct(&mut parsed);
                    *value = parsed;
                    true
                }
                None => false,
            },
            Value::Array(items) => items
                .iter_mut()
                .fold(false, |changed, item| Self::correct(item) || changed),
            Value::Object(entries) => entries
                .values_mut()
                .fold(false, |changed, item| Self::correct(item) || changed),
            Value::Null | Value::Bool(_) | Value::Number(_) => false,
        }
    }

    /// Returns the corrected copy, or `None` when the value needed no correction.
    pub fn corrected(value: &Value) -> Option<Value> {
        let mut copy = value.clone();
        Self::correct(&mut copy).then_some(copy)
    }
}

fn parse_candidate(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    let bracketed = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if !bracketed {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
