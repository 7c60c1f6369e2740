//! Chapter markers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::de;
use crate::tags::TagList;
use crate::time::{self, Rational};

/// One entry of the `chapters` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    #[serde(default, deserialize_with = "de::number")]
    pub id: i64,
    #[serde(default, deserialize_with = "time::opt_rational")]
    pub time_base: Option<Rational>,
    /// Start in `time_base` units.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub start_time: Option<String>,
    /// End in `time_base` units.
    #[serde(default, deserialize_with = "de::opt_number")]
    pub end: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub end_time: Option<String>,
    #[serde(rename = "tags", default)]
    pub tag_list: TagList,
}

/// Well-known chapter tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChapterTags {
    pub title: Option<String>,
}

impl From<&TagList> for ChapterTags {
    fn from(tags: &TagList) -> Self {
        Self {
            title: tags.string_or_none("title"),
        }
    }
}

impl Chapter {
    pub fn tags(&self) -> ChapterTags {
        ChapterTags::from(&self.tag_list)
    }

    /// The `title` tag, or `""` when the chapter has none.
    pub fn title(&self) -> &str {
        self.tag_list.get_string("title").unwrap_or_default()
    }

    /// Start in seconds.
    pub fn start_seconds(&self) -> f64 {
        self.seconds(self.start, self.start_time.as_deref())
    }

    /// End in seconds.
    pub fn end_seconds(&self) -> f64 {
        self.seconds(self.end, self.end_time.as_deref())
    }

    /// Length of the chapter, zero when the end precedes the start.
    pub fn duration(&self) -> Duration {
        let secs = time::round_to_tool_precision(self.end_seconds() - self.start_seconds());
        time::seconds_to_duration(secs).unwrap_or_default()
    }

    fn seconds(&self, ts: Option<i64>, printed: Option<&str>) -> f64 {
        let exact = ts.zip(self.time_base).and_then(|(ts, tb)| tb.to_seconds(ts));
        if let Some(secs) = exact {
            return secs;
        }
        match printed.map(time::parse_seconds) {
            Some(Ok(secs)) => secs,
            Some(Err(e)) => {
                tracing::debug!(id = self.id, error = %e, "unusable chapter time");
                0.0
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chapter(value: serde_json::Value) -> Chapter {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_seconds_from_time_base() {
        let c = chapter(json!({
            "id": 1, "time_base": "1/1000", "start": 2000, "start_time": "2.000000",
            "end": 4000, "end_time": "4.000000", "tags": {"title": "Middle"}
        }));
        assert_eq!(c.start_seconds(), 2.0);
        assert_eq!(c.end_seconds(), 4.0);
        assert_eq!(c.duration(), Duration::from_secs(2));
        assert_eq!(c.title(), "Middle");
        assert_eq!(c.tags().title.as_deref(), Some("Middle"));
    }

    #[test]
    fn test_fine_time_base_rounds_to_printed_precision() {
        let c = chapter(json!({"time_base": "1/44100", "start": 100, "end": 441000}));
        assert_eq!(c.start_seconds(), 0.002268);
        assert_eq!(c.end_seconds(), 10.0);
    }

    #[test]
    fn test_falls_back_to_printed_times() {
        let c = chapter(json!({
            "time_base": "1/0", "start": 5, "start_time": "1.500000", "end_time": "3.250000"
        }));
        assert_eq!(c.start_seconds(), 1.5);
        assert_eq!(c.end_seconds(), 3.25);

        let c = chapter(json!({"start": 5, "start_time": "N/A"}));
        assert_eq!(c.start_seconds(), 0.0);
        assert_eq!(c.end_seconds(), 0.0);
    }

    #[test]
    fn test_missing_timestamps_use_printed_times() {
        let c = chapter(json!({
            "id": 2, "time_base": "1/1000", "start_time": "2.000000", "end_time": "4.500000"
        }));
        assert_eq!(c.start, None);
        assert_eq!(c.start_seconds(), 2.0);
        assert_eq!(c.end_seconds(), 4.5);
        assert_eq!(c.duration(), Duration::from_millis(2500));

        let c = chapter(json!({"time_base": "1/1000", "start": 1000, "end_time": "3.000000"}));
        assert_eq!(c.start_seconds(), 1.0);
        assert_eq!(c.end_seconds(), 3.0);
    }

    #[test]
    fn test_missing_title_is_empty() {
        let c = chapter(json!({"id": 0, "tags": {"language": "eng"}}));
        assert_eq!(c.title(), "");
        assert_eq!(chapter(json!({})).title(), "");
    }

    #[test]
    fn test_inverted_chapter_has_zero_duration() {
        let c = chapter(json!({"time_base": "1/1", "start": 10, "end": 5}));
        assert_eq!(c.duration(), Duration::ZERO);
    }
}
