//! # probekit-model
//!
//! Typed model for the JSON report printed by
//! `ffprobe -print_format json -show_format -show_streams -show_chapters`.
//!
//! The crate provides:
//! - An ordered, string-valued [`TagList`] with typed getters
//! - [`Format`], [`Stream`] and [`Chapter`] entities with derived values
//!   (durations, frame rates, chapter times in seconds)
//! - A side-data decoder covering display matrices, HDR mastering metadata,
//!   Dolby Vision configuration records and friends
//! - [`ProbeData`], the aggregate report with stream-type queries
//!
//! Construction is lenient: missing sections, absent fields and numbers
//! printed with the wrong JSON type all fall back to zero values. Lookups
//! that can meaningfully fail (tags, side data, strict numeric accessors)
//! return [`Error`].
//!
//! ## Example
//!
//! ```
//! use probekit_model::{ProbeData, StreamType};
//!
//! let data: ProbeData = r#"{
//!     "format": {"duration": "5.312000", "tags": {"major_brand": "isom"}},
//!     "streams": [{"index": 0, "codec_type": "video", "codec_name": "h264"}]
//! }"#.parse()?;
//!
//! assert_eq!(data.format.tag_list.get_string("major_brand")?, "isom");
//! assert_eq!(data.format.duration().as_millis(), 5312);
//! assert_eq!(data.stream_type(StreamType::Video).len(), 1);
//! # Ok::<(), probekit_model::Error>(())
//! ```

pub mod chapter;
pub mod de;
mod error;
pub mod format;
pub mod probe_data;
pub mod side_data;
pub mod stream;
pub mod tags;
pub mod time;

// Re-exports
pub use chapter::{Chapter, ChapterTags};
pub use error::{Error, Result};
pub use format::{Format, FormatTags};
pub use probe_data::{ProbeData, StreamCounts};
pub use side_data::{DisplayMatrix, SideData, SideDataList};
pub use stream::{CodecType, Disposition, Stream, StreamTags, StreamType};
pub use tags::TagList;
pub use time::Rational;
