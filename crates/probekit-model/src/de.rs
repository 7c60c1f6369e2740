//! Lenient field deserializers.
//!
//! ffprobe prints most numbers as JSON numbers but some (and, depending on
//! version and writer, occasionally all) as strings. These helpers accept
//! either shape and fall back to the field's zero value instead of failing
//! the whole document.

use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize a number that may arrive as a JSON number or a numeric string.
///
/// Anything that does not parse as `T` becomes `T::default()`.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value).unwrap_or_default())
}

/// Like [`number`], but keeps absence and unparsable values as `None`.
pub fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_number(&value))
}

/// Deserialize a scalar as text. Numbers and booleans keep their JSON text.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value))
}

/// Like [`opt_string`], with the empty string for anything non-scalar.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_text(&value).unwrap_or_default())
}

/// Deserialize a nested object, falling back to `T::default()` when the
/// value is null or has the wrong shape.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "ignoring malformed section");
        T::default()
    }))
}

/// Deserialize an array of objects. A non-array becomes the empty list and
/// elements that fail to deserialize are skipped.
pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            tracing::debug!(value = %other, "ignoring non-array section");
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(position = i, error = %e, "skipping malformed entry");
                None
            }
        })
        .collect())
}

/// Text form of a JSON scalar; `None` for null, arrays and objects.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            tracing::debug!(value = %other, "ignoring non-scalar value");
            None
        }
    }
}

fn coerce_number<T: FromStr>(value: &Value) -> Option<T> {
    let text = match value {
        Value::Null => return None,
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            tracing::debug!(value = %other, "ignoring non-numeric value");
            return None;
        }
    };

    match text.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!(value = %text, "ignoring unparsable numeric value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "number")]
        width: u32,
        #[serde(default, deserialize_with = "opt_number")]
        level: Option<i32>,
        #[serde(default, deserialize_with = "opt_string")]
        bit_rate: Option<String>,
        #[serde(default, deserialize_with = "string")]
        name: String,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let s = sample(r#"{"width": 1920, "level": "40", "bit_rate": 128000, "name": "h264"}"#);
        assert_eq!(s.width, 1920);
        assert_eq!(s.level, Some(40));
        assert_eq!(s.bit_rate.as_deref(), Some("128000"));
        assert_eq!(s.name, "h264");
    }

    #[test]
    fn falls_back_on_garbage() {
        let s = sample(r#"{"width": "wide", "level": [1], "bit_rate": {}, "name": null}"#);
        assert_eq!(s.width, 0);
        assert_eq!(s.level, None);
        assert_eq!(s.bit_rate, None);
        assert_eq!(s.name, "");
    }

    #[test]
    fn absent_fields_use_defaults() {
        let s = sample("{}");
        assert_eq!(s.width, 0);
        assert_eq!(s.level, None);
        assert_eq!(s.bit_rate, None);
        assert!(s.name.is_empty());
    }

    #[derive(Debug, Default, Deserialize)]
    struct Inner {
        #[serde(default, deserialize_with = "number")]
        id: u32,
    }

    #[derive(Debug, Deserialize)]
    struct Outer {
        #[serde(default, deserialize_with = "lenient")]
        inner: Inner,
        #[serde(default, deserialize_with = "list")]
        items: Vec<Inner>,
    }

    #[test]
    fn sections_fall_back_to_defaults() {
        let o: Outer = serde_json::from_str(r#"{"inner": "oops", "items": {"id": 1}}"#).unwrap();
        assert_eq!(o.inner.id, 0);
        assert!(o.items.is_empty());

        let o: Outer =
            serde_json::from_str(r#"{"inner": null, "items": [{"id": 1}, 7, {"id": "2"}]}"#)
                .unwrap();
        assert_eq!(o.inner.id, 0);
        let ids: Vec<u32> = o.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn negative_into_unsigned_is_zero() {
        let s = sample(r#"{"width": -1}"#);
        assert_eq!(s.width, 0);
    }
}
