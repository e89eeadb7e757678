//! First-match-wins field resolution over untrusted JSON
//!
//! Every canonical field is resolved by walking an ordered list of probe paths
//! and returning the first value that coerces to the wanted type. Shape
//! mismatches are never errors; they simply fall through to the next probe.

use serde_json::Value;

use crate::patterns::ProbePath;

/// Follow `path` into `value`; numeric segments index arrays
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// Trimmed, non-empty string form of a scalar
pub fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Finite number from a JSON number or numeric string
pub fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Non-negative integral offset
pub fn as_offset(value: &Value) -> Option<usize> {
    let n = as_number(value)?;
    (n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64).then_some(n as usize)
}

pub fn first_text(value: &Value, paths: &[ProbePath]) -> Option<String> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(as_text))
}

pub fn first_number(value: &Value, paths: &[ProbePath]) -> Option<f64> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(as_number))
}

pub fn first_offset(value: &Value, paths: &[ProbePath]) -> Option<usize> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(as_offset))
}

pub fn first_bool(value: &Value, paths: &[ProbePath]) -> Option<bool> {
    paths
        .iter()
        .find_map(|path| lookup(value, path).and_then(Value::as_bool))
}

/// First non-empty string among direct keys of an object
pub fn first_string_key(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// First boolean among direct keys of an object
pub fn first_bool_key(value: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter()
        .find_map(|key| value.get(*key).and_then(Value::as_bool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_walks_objects_and_arrays() {
        let value = json!({"suggestions": [{"replacement": "person"}]});
        assert_eq!(
            lookup(&value, &["suggestions", "0", "replacement"]),
            Some(&json!("person"))
        );
        assert_eq!(lookup(&value, &["suggestions", "1", "replacement"]), None);
        assert_eq!(lookup(&value, &["suggestions", "x"]), None);
    }

    #[test]
    fn test_first_text_skips_blank_values() {
        let value = json!({"replacement": "  ", "suggested": null, "alt": "folks"});
        let paths: &[ProbePath] = &[&["replacement"], &["suggested"], &["alt"]];
        assert_eq!(first_text(&value, paths), Some("folks".to_string()));
    }

    #[test]
    fn test_numbers_coerce_from_strings() {
        assert_eq!(as_number(&json!("12")), Some(12.0));
        assert_eq!(as_number(&json!(" 7.5 ")), Some(7.5));
        assert_eq!(as_number(&json!("seven")), None);
        assert_eq!(as_number(&json!(null)), None);
    }

    #[test]
    fn test_offsets_must_be_non_negative_integers() {
        assert_eq!(as_offset(&json!(4)), Some(4));
        assert_eq!(as_offset(&json!("4")), Some(4));
        assert_eq!(as_offset(&json!(-1)), None);
        assert_eq!(as_offset(&json!(2.5)), None);
    }

    #[test]
    fn test_first_bool_ignores_non_booleans() {
        let value = json!({"can_copy": "false", "copy_enabled": false});
        let paths: &[ProbePath] = &[&["can_copy"], &["copy_enabled"]];
        assert_eq!(first_bool(&value, paths), Some(false));
    }
}
