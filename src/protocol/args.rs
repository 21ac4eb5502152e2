// src/protocol/args.rs

//! Coercion helpers for step arguments.
//!
//! Arguments come from the planning model and are never trusted: every accessor
//! returns `None` for a missing, null or mistyped value and callers backfill
//! from the trip request.

use chrono::NaiveDate;
use serde_json::{Map, Value};

pub type StepArgs = Map<String, Value>;

pub fn object(value: Value) -> StepArgs {
    match value {
        Value::Object(map) => map,
        _ => StepArgs::new(),
    }
}

/// Non-blank string argument.
pub fn string<'a>(args: &'a StepArgs, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Finite number, given either as a JSON number or a numeric string.
pub fn float(args: &StepArgs, key: &str) -> Option<f64> {
    let value = match args.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Positive integer, given either as a JSON number or a numeric string.
pub fn count(args: &StepArgs, key: &str) -> Option<usize> {
    let value = match args.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 1.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (value > 0).then_some(value as usize)
}

/// ISO `YYYY-MM-DD` date argument.
pub fn date(args: &StepArgs, key: &str) -> Option<NaiveDate> {
    string(args, key).and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

pub fn map<'a>(args: &'a StepArgs, key: &str) -> Option<&'a Map<String, Value>> {
    args.get(key).and_then(Value::as_object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> StepArgs {
        object(value)
    }

    #[test]
    fn test_string_ignores_blank_and_non_strings() {
        let a = args(json!({"city": "  Rome ", "blank": "  ", "num": 3}));
        assert_eq!(string(&a, "city"), Some("Rome"));
        assert_eq!(string(&a, "blank"), None);
        assert_eq!(string(&a, "num"), None);
        assert_eq!(string(&a, "missing"), None);
    }

    #[test]
    fn test_float_accepts_numeric_strings_and_rejects_null() {
        let a = args(json!({"lat": 48.85, "lon": "2.35", "bad": null, "text": "north"}));
        assert_eq!(float(&a, "lat"), Some(48.85));
        assert_eq!(float(&a, "lon"), Some(2.35));
        assert_eq!(float(&a, "bad"), None);
        assert_eq!(float(&a, "text"), None);
    }

    #[test]
    fn test_count_requires_positive() {
        let a = args(json!({"a": 8, "b": "5", "c": 0, "d": -2, "e": 3.0}));
        assert_eq!(count(&a, "a"), Some(8));
        assert_eq!(count(&a, "b"), Some(5));
        assert_eq!(count(&a, "c"), None);
        assert_eq!(count(&a, "d"), None);
        assert_eq!(count(&a, "e"), Some(3));
    }

    #[test]
    fn test_date_requires_iso() {
        let a = args(json!({"start_date": "2024-05-01", "end_date": "May 2nd"}));
        assert_eq!(date(&a, "start_date"), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(date(&a, "end_date"), None);
    }
}
