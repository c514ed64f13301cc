//! Tolerant coercion of upstream numeric fields.
//!
//! The quotation service mixes native JSON numbers with strings in either the
//! Italian convention ("2.400,50") or the plain decimal-point one ("2400.50").

use serde_json::Value;

/// Coerces a JSON value of unknown shape into a finite float.
///
/// Absence is always representable: anything unparsable returns `None`,
/// nothing panics and nothing errors.
pub fn coerce_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|parsed| parsed.is_finite()),
        Value::String(raw) => coerce_str(raw),
        _ => None,
    }
}

/// Parses a numeric string in either separator convention.
///
/// A comma marks the Italian format: dots are thousands separators and the
/// comma is the decimal point. Without a comma the string is taken at face
/// value first, and only a failed parse falls back to stripping dots as
/// thousands separators ("1.234.567").
pub fn coerce_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let candidate = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else if let Ok(parsed) = trimmed.parse::<f64>() {
        return Some(parsed).filter(|value| value.is_finite());
    } else {
        trimmed.replace('.', "")
    };

    candidate
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn same_float_for_all_encodings() {
        let expected = Some(2400.5);
        assert_eq!(coerce_str("2.400,50"), expected);
        assert_eq!(coerce_str("2400.50"), expected);
        assert_eq!(coerce_str("2400,5"), expected);
        assert_eq!(coerce_value(&json!(2400.5)), expected);
        assert_eq!(coerce_value(&json!("2.400,50")), expected);
    }

    #[test]
    fn thousands_only_strings() {
        assert_eq!(coerce_str("1.234.567"), Some(1_234_567.0));
        assert_eq!(coerce_str(" 1.250,00 "), Some(1250.0));
    }

    #[test]
    fn absence_is_none() {
        assert_eq!(coerce_str(""), None);
        assert_eq!(coerce_str("   "), None);
        assert_eq!(coerce_str("n/d"), None);
        assert_eq!(coerce_value(&Value::Null), None);
        assert_eq!(coerce_value(&json!(true)), None);
        assert_eq!(coerce_value(&json!({"min": 1})), None);
    }

    #[test]
    fn non_finite_is_none() {
        assert_eq!(coerce_str("inf"), None);
        assert_eq!(coerce_str("NaN"), None);
    }
}
