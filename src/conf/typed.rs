//! Typed accessors.
//!
//! Each accessor resolves a key and converts the value found there to the
//! requested type. A missing key, a value of the wrong kind or a string
//! that does not parse all yield the caller's default. [`Conf::decode`] is
//! the only accessor that reports failure.

use super::Conf;
use crate::error::{ConfError, Result};
use crate::value::{Map, Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::time::Duration;

impl Conf {
    /// Raw value at `key`, or `default`. An explicit `null` counts as missing.
    pub fn value<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        match self.get(key) {
            Some(Value::Null) | None => default,
            Some(value) => value,
        }
    }

    /// Value at `key` as text. Strings, numbers and booleans are accepted.
    pub fn string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => v.to_string(),
            _ => default.to_string(),
        }
    }

    /// Value at `key` as a filesystem path, with the conversions of [`Conf::string`].
    pub fn path_buf(&self, key: &str, default: impl Into<PathBuf>) -> PathBuf {
        match self.get(key) {
            Some(v @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                PathBuf::from(v.to_string())
            }
            _ => default.into(),
        }
    }

    /// Value at `key` as a boolean. Strings such as `"true"`, `"F"` or `"1"`
    /// are parsed.
    pub fn bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => parse_bool(s).unwrap_or(default),
            _ => default,
        }
    }

    /// Value at `key` as an integer.
    ///
    /// Numbers are rounded to the nearest integer, halves away from zero;
    /// non-finite numbers and numbers outside the `i64` range give the
    /// default. Strings are parsed as decimal, or as hex/octal/binary with a
    /// `0x`, `0o` or `0b` prefix. A leading `0` also means octal (`"010"` is
    /// 8), and `_` may separate digits (`"1_000"`).
    pub fn int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(Value::Number(n)) => round_to_int(*n).unwrap_or(default),
            Some(Value::String(s)) => parse_int(s).unwrap_or(default),
            _ => default,
        }
    }

    /// Value at `key` as a float. Strings are parsed.
    pub fn float(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(Value::Number(n)) => *n,
            Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Mapping at `key`.
    pub fn object<'a>(&'a self, key: &str, default: &'a Map) -> &'a Map {
        self.get(key).and_then(Value::as_object).unwrap_or(default)
    }

    /// Array at `key`.
    pub fn list<'a>(&'a self, key: &str, default: &'a [Value]) -> &'a [Value] {
        self.get(key).and_then(Value::as_array).unwrap_or(default)
    }

    /// Array at `key` with every element rendered as text.
    pub fn string_list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().map(Value::to_string).collect(),
            _ => default.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Array at `key` with every element converted to an integer.
    ///
    /// Elements that cannot be converted become zero; booleans become one
    /// or zero.
    pub fn int_list(&self, key: &str, default: &[i64]) -> Vec<i64> {
        match self.get(key) {
            Some(Value::Array(items)) => items.iter().map(element_to_int).collect(),
            _ => default.to_vec(),
        }
    }

    /// Value at `key` as a duration such as `"1h 30m"`, `"1h30m"` or `"250ms"`.
    pub fn duration(&self, key: &str, default: Duration) -> Duration {
        match self.get(key) {
            Some(Value::String(s)) => humantime::parse_duration(s.trim()).unwrap_or(default),
            _ => default,
        }
    }

    /// Value at `key` as a timestamp parsed with a `strftime` style layout.
    ///
    /// Layouts without an offset are interpreted as UTC, and date-only
    /// layouts give midnight.
    pub fn time(&self, key: &str, layout: &str, default: DateTime<Utc>) -> DateTime<Utc> {
        match self.get(key) {
            Some(Value::String(s)) => parse_time(s, layout).unwrap_or(default),
            _ => default,
        }
    }

    /// Decode the value at `key` into `T`.
    ///
    /// The value is re-serialized and deserialized into the target type, so
    /// any `serde` shape works, not only records. A missing key or an
    /// explicit `null` is reported as [`ConfError::SectionNotFound`].
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = match self.get(key) {
            Some(Value::Null) | None => {
                return Err(ConfError::SectionNotFound {
                    key: key.to_string(),
                });
            }
            Some(value) => value,
        };
        let json = serde_json::to_value(value)?;
        Ok(serde_json::from_value(json)?)
    }
}

/// Exclusive upper bound of the `i64` range as an `f64` (2^63).
const I64_END: f64 = 9_223_372_036_854_775_808.0;

/// Round half away from zero, or `None` when the result is not an `i64`.
fn round_to_int(n: f64) -> Option<i64> {
    let rounded = n.round();
    (rounded >= -I64_END && rounded < I64_END).then_some(rounded as i64)
}

fn element_to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => round_to_int(*n).unwrap_or(0),
        Value::String(s) => parse_int(s).unwrap_or(0),
        Value::Bool(b) => i64::from(*b),
        _ => 0,
    }
}

/// Parse a boolean literal.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Parse an integer with an optional sign and radix prefix.
///
/// Follows the usual integer-literal grammar: `0x`, `0o`, `0b` or a bare
/// leading `0` (octal) select the radix, and single underscores may appear
/// between digits or right after a prefix.
pub(crate) fn parse_int(s: &str) -> Option<i64> {
    let (negative, rest) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (radix, digits, prefixed) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..], true),
        Some("0o" | "0O") => (8, &rest[2..], true),
        Some("0b" | "0B") => (2, &rest[2..], true),
        _ if rest.len() > 1 && rest.starts_with('0') => (8, &rest[1..], true),
        _ => (10, rest, false),
    };

    // from_str_radix accepts its own sign, which must not follow ours.
    if digits.starts_with(['+', '-']) {
        return None;
    }
    if digits.contains("__") || digits.ends_with('_') || (!prefixed && digits.starts_with('_')) {
        return None;
    }
    let digits = digits.replace('_', "");

    let magnitude = i128::from(u64::from_str_radix(&digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

fn parse_time(s: &str, layout: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_str(s, layout) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, layout) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(s, layout)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
