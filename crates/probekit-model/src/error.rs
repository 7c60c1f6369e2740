//! Error types for probekit-model.
//!
//! Lookups split into two families: "not found" (the key, field or
//! side-data kind is absent) and "malformed" (present, but the stored value
//! cannot be converted or decoded).

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by tag lookups, side-data decoding and document parsing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested tag key is not present.
    #[error("tag not found: {key}")]
    TagNotFound { key: String },

    /// The tag is present but its value does not convert to the requested type.
    #[error("tag {key} has invalid value {value:?}: {reason}")]
    TagParse {
        key: String,
        value: String,
        reason: String,
    },

    /// No side-data entry of the requested kind is attached to the stream.
    #[error("side data not found: {kind}")]
    SideDataNotFound { kind: String },

    /// A side-data entry of the requested kind exists but cannot be decoded.
    #[error("failed to decode {kind} side data: {reason}")]
    SideDataDecode { kind: String, reason: String },

    /// A string-encoded numeric field is absent.
    #[error("field not present: {field}")]
    FieldMissing { field: &'static str },

    /// A string-encoded numeric field holds a value that cannot be parsed.
    #[error("field {field} has invalid value {value:?}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// The document is not shaped like a probe report at all.
    #[error("invalid probe document: {0}")]
    InvalidDocument(String),

    /// The input bytes are not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a tag not found error.
    pub fn tag_not_found(key: impl Into<String>) -> Self {
        Self::TagNotFound { key: key.into() }
    }

    /// Create a tag parse error.
    pub fn tag_parse(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::TagParse {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a side data not found error.
    pub fn side_data_not_found(kind: impl Into<String>) -> Self {
        Self::SideDataNotFound { kind: kind.into() }
    }

    /// Create a side data decode error.
    pub fn side_data_decode(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SideDataDecode {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid field error.
    pub fn invalid_field(
        field: &'static str,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error reports an absent key, field or side-data kind.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TagNotFound { .. } | Self::SideDataNotFound { .. } | Self::FieldMissing { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::tag_not_found("major_brand");
        assert_eq!(err.to_string(), "tag not found: major_brand");

        let err = Error::tag_parse("rotate", "ninety", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "tag rotate has invalid value \"ninety\": invalid digit found in string"
        );

        let err = Error::side_data_decode("Display Matrix", "expected 9 coefficients, got 6");
        assert_eq!(
            err.to_string(),
            "failed to decode Display Matrix side data: expected 9 coefficients, got 6"
        );

        let err = Error::FieldMissing { field: "duration" };
        assert_eq!(err.to_string(), "field not present: duration");
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::tag_not_found("title").is_not_found());
        assert!(Error::side_data_not_found("Stereo 3D").is_not_found());
        assert!(Error::FieldMissing { field: "size" }.is_not_found());
        assert!(!Error::tag_parse("a", "b", "c").is_not_found());
        assert!(!Error::side_data_decode("a", "b").is_not_found());
        assert!(!Error::InvalidDocument("x".into()).is_not_found());
    }
}
