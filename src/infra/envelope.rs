//! Response-envelope unwrapping.
//!
//! The quotation service wraps its payload in zero or more generic envelopes
//! ({"success": ..., "data": ...} and friends) depending on endpoint and region.
//! Unwrapping stops at the innermost payload; an envelope that reports
//! failure becomes a classified upstream error.

use serde_json::{Map, Value};

use crate::infra::omi::OmiError;

/// Wrapper keys probed in priority order.
pub const WRAPPER_KEYS: [&str; 5] = ["data", "result", "results", "payload", "response"];

/// Keys checked, in order, for the best human-readable failure message.
const MESSAGE_KEYS: [&str; 3] = ["message", "detail", "error"];

/// Strips envelope layers until the innermost payload remains.
pub fn unwrap_envelope(value: &Value) -> Result<&Value, OmiError> {
    let mut current = value;
    loop {
        let map = match current {
            Value::Object(map) => map,
            Value::Null => return Err(OmiError::Upstream("empty response".to_string())),
            _ => return Ok(current),
        };

        if let Some(message) = failure_message(map) {
            return Err(OmiError::Upstream(message));
        }

        match wrapped_payload(map) {
            Some(inner) => current = inner,
            None => return Ok(current),
        }
    }
}

fn wrapped_payload(map: &Map<String, Value>) -> Option<&Value> {
    WRAPPER_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|inner| inner.is_object() || inner.is_array()))
}

/// A `success: false` flag or a populated error field marks the envelope
/// itself as a failure report.
fn failure_message(map: &Map<String, Value>) -> Option<String> {
    let failed = matches!(map.get("success"), Some(Value::Bool(false)))
        || map.get("error").map(is_populated).unwrap_or(false)
        || map.get("errors").map(is_populated).unwrap_or(false);

    if failed {
        Some(best_message(map))
    } else {
        None
    }
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(_) => true,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn best_message(map: &Map<String, Value>) -> String {
    for key in MESSAGE_KEYS {
        if let Some(Value::String(text)) = map.get(key) {
            if !text.trim().is_empty() {
                return text.trim().to_string();
            }
        }
    }

    if let Some(Value::Array(items)) = map.get("errors") {
        if let Some(Value::String(text)) = items.first() {
            if !text.trim().is_empty() {
                return text.trim().to_string();
            }
        }
    }

    "upstream reported a failure".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_flag_carries_message() {
        let envelope = json!({"success": false, "message": "x"});
        match unwrap_envelope(&envelope) {
            Err(OmiError::Upstream(message)) => assert_eq!(message, "x"),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn populated_errors_field_is_failure() {
        let envelope = json!({"errors": ["quota exceeded"], "data": {}});
        match unwrap_envelope(&envelope) {
            Err(OmiError::Upstream(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn empty_error_field_is_not_failure() {
        let envelope = json!({"error": "", "B1": {"negozi": {}}});
        assert!(unwrap_envelope(&envelope).is_ok());
    }

    #[test]
    fn triple_nesting_unwraps_to_flat_map() {
        let flat = json!({"B1": {"abitazioni_civili": {"prezzo_acquisto_min": 1000}}});
        let envelope = json!({"data": {"data": {"data": flat.clone()}}});
        assert_eq!(unwrap_envelope(&envelope).unwrap(), &flat);
    }

    #[test]
    fn success_true_still_descends() {
        let envelope = json!({"success": true, "result": {"B1": {}}});
        assert_eq!(unwrap_envelope(&envelope).unwrap(), &json!({"B1": {}}));
    }

    #[test]
    fn plain_object_is_its_own_payload() {
        let flat = json!({"B1": {"negozi": {"prezzo_affitto_max": "12,5"}}});
        assert_eq!(unwrap_envelope(&flat).unwrap(), &flat);
    }

    #[test]
    fn null_payload_is_an_error() {
        assert!(matches!(unwrap_envelope(&Value::Null), Err(OmiError::Upstream(_))));
    }

    #[test]
    fn wrapper_keys_checked_in_order() {
        let envelope = json!({"response": {"wrong": 1}, "data": {"right": 1}});
        assert_eq!(unwrap_envelope(&envelope).unwrap(), &json!({"right": 1}));
    }

    #[test]
    fn scalar_wrapper_values_are_not_descended() {
        let envelope = json!({"data": "not a payload", "B1": {}});
        assert_eq!(unwrap_envelope(&envelope).unwrap(), &envelope);
    }
}
