//! Ordered string tag store.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::de::scalar_text;
use crate::{Error, Result};

/// Ordered mapping of tag keys to string values.
///
/// Keys are case-sensitive. Inserting a key that already exists replaces the
/// value in place, so iteration keeps first-seen order while the last write
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList {
    entries: Vec<(String, String)>,
    /// Position of each key in `entries`.
    index: HashMap<String, usize>,
}

impl TagList {
    /// Create an empty tag list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a tag.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Get a tag value as a string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TagNotFound`] if the key is absent.
    pub fn get_string(&self, key: &str) -> Result<&str> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_str())
            .ok_or_else(|| Error::tag_not_found(key))
    }

    /// Get a tag value as a signed integer.
    pub fn get_int(&self, key: &str) -> Result<i64> {
        self.get_parsed(key)
    }

    /// Get a tag value as an unsigned integer.
    pub fn get_uint(&self, key: &str) -> Result<u64> {
        self.get_parsed(key)
    }

    /// Get a tag value as a float.
    pub fn get_float(&self, key: &str) -> Result<f64> {
        self.get_parsed(key)
    }

    /// Get a tag value as a boolean. Accepts `true`/`false` and `1`/`0`.
    pub fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_string(key)?;
        match value.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            other => other
                .parse()
                .map_err(|e| Error::tag_parse(key, value, e)),
        }
    }

    fn get_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse()
            .map_err(|e| Error::tag_parse(key, value, e))
    }

    /// Whether a tag with this key exists.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no tags.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over tag keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Owned copy of a tag value, `None` when absent.
    pub(crate) fn string_or_none(&self, key: &str) -> Option<String> {
        self.get_string(key).ok().map(str::to_string)
    }
}

impl<K, V> FromIterator<(K, V)> for TagList
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tags = TagList::new();
        for (k, v) in iter {
            tags.insert(k, v);
        }
        tags
    }
}

impl Serialize for TagList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TagList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(TagListVisitor)
    }
}

struct TagListVisitor;

impl<'de> Visitor<'de> for TagListVisitor {
    type Value = TagList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of tags")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<TagList, A::Error> {
        let mut tags = TagList::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            match scalar_text(&value) {
                Some(text) => tags.insert(key, text),
                None => tracing::debug!(tag = %key, "skipping tag without a scalar value"),
            }
        }
        Ok(tags)
    }

    // A tag section that is not an object carries nothing usable.
    fn visit_unit<E>(self) -> std::result::Result<TagList, E> {
        Ok(TagList::new())
    }

    fn visit_str<E>(self, _: &str) -> std::result::Result<TagList, E> {
        Ok(TagList::new())
    }

    fn visit_bool<E>(self, _: bool) -> std::result::Result<TagList, E> {
        Ok(TagList::new())
    }

    fn visit_i64<E>(self, _: i64) -> std::result::Result<TagList, E> {
        Ok(TagList::new())
    }

    fn visit_u64<E>(self, _: u64) -> std::result::Result<TagList, E> {
        Ok(TagList::new())
    }

    fn visit_f64<E>(self, _: f64) -> std::result::Result<TagList, E> {
        Ok(TagList::new())
    }

    fn visit_seq<A: serde::de::SeqAccess<'de>>(
        self,
        mut seq: A,
    ) -> std::result::Result<TagList, A::Error> {
        while seq.next_element::<serde::de::IgnoredAny>()?.is_some() {}
        Ok(TagList::new())
    }
}
