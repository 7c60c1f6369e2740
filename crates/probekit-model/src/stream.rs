//! Elementary stream metadata.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::de;
use crate::format::{duration_field, lenient, parse_field};
use crate::side_data::{normalize_degrees, SideDataList};
use crate::tags::TagList;
use crate::time::{self, Rational};
use crate::{Error, Result};

/// Media type stored on a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecType {
    Video,
    Audio,
    Subtitle,
    /// Opaque data streams (timed metadata, chapter text tracks). Streams with
    /// an unrecognised or missing `codec_type` are classified here too.
    #[default]
    Data,
    Attachment,
}

impl CodecType {
    /// Parse ffprobe's `codec_type` text. Unknown values become [`CodecType::Data`].
    pub fn from_tool_name(name: &str) -> Self {
        match name {
            "video" => CodecType::Video,
            "audio" => CodecType::Audio,
            "subtitle" => CodecType::Subtitle,
            "attachment" => CodecType::Attachment,
            "data" => CodecType::Data,
            other => {
                tracing::debug!(codec_type = other, "classifying unknown codec type as data");
                CodecType::Data
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodecType::Video => "video",
            CodecType::Audio => "audio",
            CodecType::Subtitle => "subtitle",
            CodecType::Data => "data",
            CodecType::Attachment => "attachment",
        }
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CodecType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = de::string(deserializer)?;
        Ok(CodecType::from_tool_name(&name))
    }
}

/// Stream filter. `Any` matches every stream and is never stored on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamType {
    Video,
    Audio,
    Subtitle,
    Data,
    Attachment,
    Any,
}

impl StreamType {
    /// Every concrete (non-wildcard) filter.
    pub const CONCRETE: [StreamType; 5] = [
        StreamType::Video,
        StreamType::Audio,
        StreamType::Subtitle,
        StreamType::Data,
        StreamType::Attachment,
    ];

    pub fn matches(&self, codec_type: CodecType) -> bool {
        match self {
            StreamType::Any => true,
            StreamType::Video => codec_type == CodecType::Video,
            StreamType::Audio => codec_type == CodecType::Audio,
            StreamType::Subtitle => codec_type == CodecType::Subtitle,
            StreamType::Data => codec_type == CodecType::Data,
            StreamType::Attachment => codec_type == CodecType::Attachment,
        }
    }
}

impl From<CodecType> for StreamType {
    fn from(codec_type: CodecType) -> Self {
        match codec_type {
            CodecType::Video => StreamType::Video,
            CodecType::Audio => StreamType::Audio,
            CodecType::Subtitle => StreamType::Subtitle,
            CodecType::Data => StreamType::Data,
            CodecType::Attachment => StreamType::Attachment,
        }
    }
}

impl FromStr for StreamType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "video" | "v" => Ok(StreamType::Video),
            "audio" | "a" => Ok(StreamType::Audio),
            "subtitle" | "s" => Ok(StreamType::Subtitle),
            "data" | "d" => Ok(StreamType::Data),
            "attachment" | "t" => Ok(StreamType::Attachment),
            "any" | "all" => Ok(StreamType::Any),
            _ => Err(Error::invalid_field(
                "stream_type",
                s,
                "expected video, audio, subtitle, data, attachment or any",
            )),
        }
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamType::Video => "video",
            StreamType::Audio => "audio",
            StreamType::Subtitle => "subtitle",
            StreamType::Data => "data",
            StreamType::Attachment => "attachment",
            StreamType::Any => "any",
        };
        f.write_str(name)
    }
}

/// Stream disposition flags (`0`/`1` integers in the report).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Disposition {
    #[serde(deserialize_with = "de::number")]
    pub default: u8,
    #[serde(deserialize_with = "de::number")]
    pub dub: u8,
    #[serde(deserialize_with = "de::number")]
    pub original: u8,
    #[serde(deserialize_with = "de::number")]
    pub comment: u8,
    #[serde(deserialize_with = "de::number")]
    pub lyrics: u8,
    #[serde(deserialize_with = "de::number")]
    pub karaoke: u8,
    #[serde(deserialize_with = "de::number")]
    pub forced: u8,
    #[serde(deserialize_with = "de::number")]
    pub hearing_impaired: u8,
    #[serde(deserialize_with = "de::number")]
    pub visual_impaired: u8,
    #[serde(deserialize_with = "de::number")]
    pub clean_effects: u8,
    #[serde(deserialize_with = "de::number")]
    pub attached_pic: u8,
    #[serde(deserialize_with = "de::number")]
    pub timed_thumbnails: u8,
}

impl Disposition {
    pub fn is_default(&self) -> bool {
        self.default == 1
    }

    pub fn is_forced(&self) -> bool {
        self.forced == 1
    }

    pub fn is_hearing_impaired(&self) -> bool {
        self.hearing_impaired == 1
    }

    /// Cover art and similar still images muxed as a video stream.
    pub fn is_attached_pic(&self) -> bool {
        self.attached_pic == 1
    }
}

/// Well-known stream tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamTags {
    /// Legacy clockwise rotation tag, 0 when absent or malformed.
    pub rotate: i32,
    pub language: Option<String>,
    pub title: Option<String>,
    pub handler_name: Option<String>,
    pub creation_time: Option<String>,
    pub encoder: Option<String>,
    pub vendor_id: Option<String>,
}

impl From<&TagList> for StreamTags {
    fn from(tags: &TagList) -> Self {
        let rotate = match tags.get_int("rotate") {
            Ok(degrees) => i32::try_from(degrees).unwrap_or_default(),
            Err(e) => {
                if !e.is_not_found() {
                    tracing::debug!(error = %e, "ignoring rotate tag");
                }
                0
            }
        };

        Self {
            rotate,
            language: tags.string_or_none("language"),
            title: tags.string_or_none("title"),
            handler_name: tags.string_or_none("handler_name"),
            creation_time: tags.string_or_none("creation_time"),
            encoder: tags.string_or_none("encoder"),
            vendor_id: tags.string_or_none("vendor_id"),
        }
    }
}

/// One entry of the `streams` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    #[serde(default, deserialize_with = "de::number")]
    pub index: u32,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de::string")]
    pub codec_name: String,
    #[serde(default, deserialize_with = "de::string")]
    pub codec_long_name: String,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub profile: Option<String>,
    #[serde(default)]
    pub codec_type: CodecType,
    #[serde(default, deserialize_with = "de::string")]
    pub codec_tag_string: String,
    #[serde(default, deserialize_with = "de::string")]
    pub codec_tag: String,

    // Video
    #[serde(default, deserialize_with = "de::number")]
    pub width: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub height: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub coded_width: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub coded_height: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub has_b_frames: u32,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub sample_aspect_ratio: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub display_aspect_ratio: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub pix_fmt: Option<String>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub level: Option<i32>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub color_range: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub color_space: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub color_transfer: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub color_primaries: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub chroma_location: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub field_order: Option<String>,

    // Audio
    #[serde(default, deserialize_with = "de::opt_string")]
    pub sample_fmt: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub sample_rate: Option<String>,
    #[serde(default, deserialize_with = "de::number")]
    pub channels: u32,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub channel_layout: Option<String>,
    #[serde(default, deserialize_with = "de::number")]
    pub bits_per_sample: u32,

    // Timing
    #[serde(default, deserialize_with = "de::opt_string")]
    pub r_frame_rate: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub avg_frame_rate: Option<String>,
    #[serde(default, deserialize_with = "time::opt_rational")]
    pub time_base: Option<Rational>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub start_pts: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "de::opt_number")]
    pub duration_ts: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub bit_rate: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub bits_per_raw_sample: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub nb_frames: Option<String>,

    #[serde(default, deserialize_with = "de::lenient")]
    pub disposition: Disposition,
    #[serde(rename = "tags", default)]
    pub tag_list: TagList,
    #[serde(default)]
    pub side_data_list: SideDataList,
}

impl Stream {
    /// Typed view of the common stream tags.
    pub fn tags(&self) -> StreamTags {
        StreamTags::from(&self.tag_list)
    }

    /// Real base frame rate (`r_frame_rate`), `None` when absent or `0/0`.
    pub fn frame_rate(&self) -> Option<f64> {
        parse_rate(self.r_frame_rate.as_deref()?)
    }

    /// Average frame rate (`avg_frame_rate`), `None` when absent or `0/0`.
    pub fn avg_frame_rate(&self) -> Option<f64> {
        parse_rate(self.avg_frame_rate.as_deref()?)
    }

    /// Stream duration, zero when absent or unparsable.
    pub fn duration(&self) -> Duration {
        lenient(duration_field("duration", self.duration.as_deref()))
    }

    /// Stream start time, zero when absent, negative or unparsable.
    pub fn start_time(&self) -> Duration {
        lenient(duration_field("start_time", self.start_time.as_deref()))
    }

    pub fn time_base(&self) -> Option<Rational> {
        self.time_base
    }

    pub fn bit_rate(&self) -> Result<u64> {
        parse_field("bit_rate", self.bit_rate.as_deref())
    }

    pub fn nb_frames(&self) -> Result<u64> {
        parse_field("nb_frames", self.nb_frames.as_deref())
    }

    pub fn sample_rate(&self) -> Result<u32> {
        parse_field("sample_rate", self.sample_rate.as_deref())
    }

    /// Counter-clockwise display rotation in degrees, in `[-180, 180)`.
    ///
    /// Taken from the display matrix side data when it decodes, otherwise
    /// from the legacy clockwise `rotate` tag, otherwise 0.
    pub fn rotation(&self) -> i32 {
        match self.side_data_list.display_matrix() {
            Ok(dm) => dm.rotation,
            Err(e) => {
                if !e.is_not_found() {
                    tracing::debug!(index = self.index, error = %e, "ignoring display matrix");
                }
                normalize_degrees(-f64::from(self.tags().rotate))
            }
        }
    }

    pub fn is_video(&self) -> bool {
        self.codec_type == CodecType::Video
    }

    pub fn is_audio(&self) -> bool {
        self.codec_type == CodecType::Audio
    }
}

fn parse_rate(text: &str) -> Option<f64> {
    let rate: Rational = text.parse().ok()?;
    rate.as_f64().filter(|r| *r > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn stream(value: serde_json::Value) -> Stream {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_codec_type_parsing() {
        assert_eq!(stream(json!({"codec_type": "video"})).codec_type, CodecType::Video);
        assert_eq!(stream(json!({"codec_type": "attachment"})).codec_type, CodecType::Attachment);
        assert_eq!(stream(json!({"codec_type": "unknown"})).codec_type, CodecType::Data);
        assert_eq!(stream(json!({})).codec_type, CodecType::Data);
        assert_eq!(stream(json!({"codec_type": 3})).codec_type, CodecType::Data);
    }

    #[test]
    fn test_stream_type_matching() {
        assert!(StreamType::Any.matches(CodecType::Attachment));
        assert!(StreamType::Video.matches(CodecType::Video));
        assert!(!StreamType::Video.matches(CodecType::Audio));
        for codec_type in [
            CodecType::Video,
            CodecType::Audio,
            CodecType::Subtitle,
            CodecType::Data,
            CodecType::Attachment,
        ] {
            let matching = StreamType::CONCRETE
                .iter()
                .filter(|t| t.matches(codec_type))
                .count();
            assert_eq!(matching, 1, "{codec_type} must match exactly one filter");
            assert!(StreamType::from(codec_type).matches(codec_type));
        }
    }

    #[test]
    fn test_stream_type_from_str() {
        assert_eq!("video".parse::<StreamType>().unwrap(), StreamType::Video);
        assert_eq!("Any".parse::<StreamType>().unwrap(), StreamType::Any);
        assert_eq!("s".parse::<StreamType>().unwrap(), StreamType::Subtitle);
        assert!("pictures".parse::<StreamType>().is_err());
        assert_eq!(StreamType::Attachment.to_string(), "attachment");
        assert_eq!(StreamType::Any.to_string(), "any");
    }

    #[test]
    fn test_frame_rates() {
        let s = stream(json!({"r_frame_rate": "30000/1001", "avg_frame_rate": "0/0"}));
        assert!((s.frame_rate().unwrap() - 29.97).abs() < 0.01);
        assert_eq!(s.avg_frame_rate(), None);
        assert_eq!(stream(json!({})).frame_rate(), None);
    }

    #[test]
    fn test_lenient_timing() {
        let s = stream(json!({
            "duration": "5.280000", "start_time": "-0.021333", "time_base": "1/15360"
        }));
        assert_eq!(s.duration(), Duration::from_millis(5280));
        assert_eq!(s.start_time(), Duration::ZERO);
        assert_eq!(s.time_base, Some(Rational::new(1, 15360)));

        let s = stream(json!({"time_base": "garbage"}));
        assert_eq!(s.time_base, None);
        assert_eq!(s.duration(), Duration::ZERO);
    }

    #[test]
    fn test_strict_numeric_fields() {
        let s = stream(json!({"bit_rate": "128000", "nb_frames": "159", "sample_rate": "44100"}));
        assert_eq!(s.bit_rate().unwrap(), 128000);
        assert_eq!(s.nb_frames().unwrap(), 159);
        assert_eq!(s.sample_rate().unwrap(), 44100);

        let s = stream(json!({"sample_rate": "44.1k"}));
        assert_matches!(s.sample_rate(), Err(Error::InvalidField { field: "sample_rate", .. }));
        assert_matches!(s.bit_rate(), Err(Error::FieldMissing { .. }));
    }

    #[test]
    fn test_stream_tags() {
        let s = stream(json!({
            "tags": {"language": "und", "handler_name": "VideoHandler", "rotate": "90"}
        }));
        let tags = s.tags();
        assert_eq!(tags.language.as_deref(), Some("und"));
        assert_eq!(s.tag_list.get_string("language").unwrap(), "und");
        assert_eq!(tags.handler_name.as_deref(), Some("VideoHandler"));
        assert_eq!(tags.rotate, 90);

        let s = stream(json!({"tags": {"rotate": "sideways"}}));
        assert_eq!(s.tags().rotate, 0);
        assert_eq!(stream(json!({})).tags().rotate, 0);
    }

    #[test]
    fn test_rotation_sources() {
        let s = stream(json!({
            "side_data_list": [{"side_data_type": "Display Matrix", "rotation": -90}],
            "tags": {"rotate": "180"}
        }));
        assert_eq!(s.rotation(), -90);

        let s = stream(json!({"tags": {"rotate": "90"}}));
        assert_eq!(s.rotation(), -90);

        let s = stream(json!({
            "side_data_list": [{"side_data_type": "Display Matrix", "displaymatrix": "1 2"}]
        }));
        assert_eq!(s.rotation(), 0);
    }

    #[test]
    fn test_disposition() {
        let s = stream(json!({"disposition": {"default": 1, "forced": "1", "attached_pic": 0}}));
        assert!(s.disposition.is_default());
        assert!(s.disposition.is_forced());
        assert!(!s.disposition.is_attached_pic());

        let s = stream(json!({"disposition": "n/a"}));
        assert_eq!(s.disposition, Disposition::default());
    }
}
