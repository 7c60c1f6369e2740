//! Container-level metadata.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::de;
use crate::tags::TagList;
use crate::time;
use crate::{Error, Result};

/// The `format` section of a probe report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Format {
    #[serde(default, deserialize_with = "de::string")]
    pub filename: String,
    #[serde(default, deserialize_with = "de::number")]
    pub nb_streams: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub nb_programs: u32,
    /// Comma-separated demuxer names, e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`.
    #[serde(default, deserialize_with = "de::string")]
    pub format_name: String,
    #[serde(default, deserialize_with = "de::string")]
    pub format_long_name: String,
    /// Seconds, as printed by the tool.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub start_time: Option<String>,
    /// Seconds, as printed by the tool.
    #[serde(default, deserialize_with = "de::opt_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub bit_rate: Option<String>,
    #[serde(default, deserialize_with = "de::number")]
    pub probe_score: i32,
    #[serde(rename = "tags", default)]
    pub tag_list: TagList,
}

/// Well-known container tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormatTags {
    pub major_brand: Option<String>,
    pub minor_version: Option<String>,
    pub compatible_brands: Option<String>,
    pub creation_time: Option<String>,
    pub encoder: Option<String>,
    pub title: Option<String>,
    pub comment: Option<String>,
}

impl From<&TagList> for FormatTags {
    fn from(tags: &TagList) -> Self {
        Self {
            major_brand: tags.string_or_none("major_brand"),
            minor_version: tags.string_or_none("minor_version"),
            compatible_brands: tags.string_or_none("compatible_brands"),
            creation_time: tags.string_or_none("creation_time"),
            encoder: tags.string_or_none("encoder"),
            title: tags.string_or_none("title"),
            comment: tags.string_or_none("comment"),
        }
    }
}

impl Format {
    /// Typed view of the common container tags.
    pub fn tags(&self) -> FormatTags {
        FormatTags::from(&self.tag_list)
    }

    /// Container duration, zero when absent or unparsable.
    ///
    /// Live and streamed inputs routinely have no duration, so this never
    /// fails. Use [`Format::try_duration`] to tell the cases apart.
    pub fn duration(&self) -> Duration {
        lenient(self.try_duration())
    }

    /// Container start time, zero when absent or unparsable.
    pub fn start_time(&self) -> Duration {
        lenient(self.try_start_time())
    }

    pub fn try_duration(&self) -> Result<Duration> {
        duration_field("duration", self.duration.as_deref())
    }

    pub fn try_start_time(&self) -> Result<Duration> {
        duration_field("start_time", self.start_time.as_deref())
    }

    /// File size in bytes.
    pub fn size(&self) -> Result<u64> {
        parse_field("size", self.size.as_deref())
    }

    /// Overall bit rate in bits per second.
    pub fn bit_rate(&self) -> Result<u64> {
        parse_field("bit_rate", self.bit_rate.as_deref())
    }

    /// Individual demuxer names from `format_name`.
    pub fn format_names(&self) -> impl Iterator<Item = &str> {
        self.format_name
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Parse a string-encoded seconds field into a `Duration`.
pub(crate) fn duration_field(field: &'static str, value: Option<&str>) -> Result<Duration> {
    let text = value.ok_or(Error::FieldMissing { field })?;
    let secs = time::parse_seconds(text).map_err(|_| {
        Error::invalid_field(field, text, "not a number of seconds")
    })?;
    time::seconds_to_duration(secs)
        .ok_or_else(|| Error::invalid_field(field, text, "negative duration"))
}

/// Parse a string-encoded numeric field.
pub(crate) fn parse_field<T>(field: &'static str, value: Option<&str>) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let text = value.ok_or(Error::FieldMissing { field })?;
    text.trim()
        .parse()
        .map_err(|e| Error::invalid_field(field, text, e))
}

/// Collapse a strict duration lookup into the zero default.
pub(crate) fn lenient(result: Result<Duration>) -> Duration {
    result.unwrap_or_else(|e| {
        tracing::trace!(error = %e, "using zero duration");
        Duration::ZERO
    })
}
