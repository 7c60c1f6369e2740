//! The aggregate probe report.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chapter::Chapter;
use crate::de;
use crate::format::Format;
use crate::stream::{CodecType, Stream, StreamType};
use crate::{Error, Result};

/// Parsed output of one probe run: the container, its streams and chapters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeData {
    #[serde(default, deserialize_with = "de::lenient")]
    pub format: Format,
    #[serde(default, deserialize_with = "de::list")]
    pub streams: Vec<Stream>,
    #[serde(default, deserialize_with = "de::list")]
    pub chapters: Vec<Chapter>,
}

/// Number of streams per codec type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamCounts {
    pub video: usize,
    pub audio: usize,
    pub subtitle: usize,
    pub data: usize,
    pub attachment: usize,
}

impl StreamCounts {
    pub fn total(&self) -> usize {
        self.video + self.audio + self.subtitle + self.data + self.attachment
    }

    pub fn get(&self, stream_type: StreamType) -> usize {
        match stream_type {
            StreamType::Video => self.video,
            StreamType::Audio => self.audio,
            StreamType::Subtitle => self.subtitle,
            StreamType::Data => self.data,
            StreamType::Attachment => self.attachment,
            StreamType::Any => self.total(),
        }
    }
}

impl ProbeData {
    /// Build from an already-parsed JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDocument`] when the top level is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidDocument(format!(
                "expected a JSON object, found {}",
                json_kind(&value)
            )));
        }
        let data: ProbeData = serde_json::from_value(value)?;
        tracing::debug!(
            streams = data.streams.len(),
            chapters = data.chapters.len(),
            format = %data.format.format_name,
            "parsed probe document"
        );
        Ok(data)
    }

    /// Build from raw JSON bytes, as printed by the probing tool.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(value)
    }

    /// Streams matching `stream_type`, in report order.
    pub fn stream_type(&self, stream_type: StreamType) -> Vec<&Stream> {
        self.streams
            .iter()
            .filter(|s| stream_type.matches(s.codec_type))
            .collect()
    }

    pub fn first_stream(&self, stream_type: StreamType) -> Option<&Stream> {
        self.streams
            .iter()
            .find(|s| stream_type.matches(s.codec_type))
    }

    pub fn first_video_stream(&self) -> Option<&Stream> {
        self.first_stream(StreamType::Video)
    }

    pub fn first_audio_stream(&self) -> Option<&Stream> {
        self.first_stream(StreamType::Audio)
    }

    pub fn first_subtitle_stream(&self) -> Option<&Stream> {
        self.first_stream(StreamType::Subtitle)
    }

    pub fn first_data_stream(&self) -> Option<&Stream> {
        self.first_stream(StreamType::Data)
    }

    pub fn first_attachment_stream(&self) -> Option<&Stream> {
        self.first_stream(StreamType::Attachment)
    }

    pub fn stream_counts(&self) -> StreamCounts {
        let mut counts = StreamCounts::default();
        for stream in &self.streams {
            match stream.codec_type {
                CodecType::Video => counts.video += 1,
                CodecType::Audio => counts.audio += 1,
                CodecType::Subtitle => counts.subtitle += 1,
                CodecType::Data => counts.data += 1,
                CodecType::Attachment => counts.attachment += 1,
            }
        }
        counts
    }
}

impl FromStr for ProbeData {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_slice(s.as_bytes())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_name": "h264", "codec_type": "video", "width": 1920, "height": 1080},
            {"index": 1, "codec_name": "aac", "codec_type": "audio", "channels": 2},
            {"index": 2, "codec_name": "aac", "codec_type": "audio", "channels": 6},
            {"index": 3, "codec_name": "subrip", "codec_type": "subtitle"},
            {"index": 4, "codec_name": "ttf", "codec_type": "attachment"}
        ],
        "format": {"format_name": "matroska,webm", "duration": "60.000000"}
    }"#;

    #[test]
    fn test_parse_and_filter() {
        let data: ProbeData = SAMPLE.parse().unwrap();
        assert_eq!(data.streams.len(), 5);
        assert!(data.chapters.is_empty());

        let audio = data.stream_type(StreamType::Audio);
        let indexes: Vec<u32> = audio.iter().map(|s| s.index).collect();
        assert_eq!(indexes, vec![1, 2]);
        assert!(data.stream_type(StreamType::Data).is_empty());
        assert_eq!(data.stream_type(StreamType::Any).len(), 5);
    }

    #[test]
    fn test_first_streams() {
        let data: ProbeData = SAMPLE.parse().unwrap();
        assert_eq!(data.first_video_stream().unwrap().codec_name, "h264");
        assert_eq!(data.first_audio_stream().unwrap().channels, 2);
        assert_eq!(data.first_subtitle_stream().unwrap().index, 3);
        assert_eq!(data.first_attachment_stream().unwrap().codec_name, "ttf");
        assert!(data.first_data_stream().is_none());
        assert_eq!(data.first_stream(StreamType::Any).unwrap().index, 0);
    }

    #[test]
    fn test_stream_counts() {
        let data: ProbeData = SAMPLE.parse().unwrap();
        let counts = data.stream_counts();
        assert_eq!(counts.audio, 2);
        assert_eq!(counts.total(), data.streams.len());
        for t in StreamType::CONCRETE {
            assert_eq!(counts.get(t), data.stream_type(t).len());
        }
    }

    #[test]
    fn test_missing_sections_default() {
        let data = ProbeData::from_value(json!({})).unwrap();
        assert_eq!(data, ProbeData::default());

        let data =
            ProbeData::from_value(json!({"format": [], "streams": "none", "chapters": null}))
                .unwrap();
        assert_eq!(data.format, Format::default());
        assert!(data.streams.is_empty());
    }

    #[test]
    fn test_rejects_non_object_documents() {
        assert_matches!(ProbeData::from_value(json!([1, 2])), Err(Error::InvalidDocument(_)));
        assert_matches!(
            "42".parse::<ProbeData>(),
            Err(Error::InvalidDocument(msg)) if msg.contains("a number")
        );
        assert_matches!(ProbeData::from_slice(b"{not json"), Err(Error::Json(_)));
    }

    #[test]
    fn test_queries_are_idempotent() {
        let data: ProbeData = SAMPLE.parse().unwrap();
        assert_eq!(data.stream_type(StreamType::Video), data.stream_type(StreamType::Video));
        assert_eq!(data.format.duration(), data.format.duration());
        assert_eq!(data.stream_counts(), data.stream_counts());
    }

    #[test]
    fn test_serialize_round_trip_keeps_queries() {
        let data: ProbeData = SAMPLE.parse().unwrap();
        let json = serde_json::to_value(&data).unwrap();
        let again = ProbeData::from_value(json).unwrap();
        assert_eq!(again.stream_counts(), data.stream_counts());
        assert_eq!(again.format.duration(), data.format.duration());
    }
}
