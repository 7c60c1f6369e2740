//! Conversions between ffprobe's time encodings and seconds.
//!
//! ffprobe reports timestamps either as integers in a stream or chapter time
//! base (`"1/1000"`) or as seconds printed with six decimals (`"5.312000"`).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Number of decimals ffprobe uses when printing seconds.
pub const TOOL_PRECISION: i32 = 6;

/// A numerator/denominator pair, as used for time bases and frame rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i64,
    pub den: i64,
}

impl Rational {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Value as a float, `None` when the denominator is zero.
    pub fn as_f64(&self) -> Option<f64> {
        if self.den == 0 {
            None
        } else {
            Some(self.num as f64 / self.den as f64)
        }
    }

    /// Convert a timestamp in this time base to seconds.
    ///
    /// The result is rounded to the six decimals ffprobe prints, so
    /// `2000` in `1/1000` is exactly `2.0`.
    pub fn to_seconds(&self, ts: i64) -> Option<f64> {
        if self.den == 0 {
            return None;
        }
        let secs = ts as f64 * self.num as f64 / self.den as f64;
        Some(round_to_tool_precision(secs))
    }

    /// Convert seconds to the nearest timestamp in this time base.
    pub fn to_timestamp(&self, secs: f64) -> Option<i64> {
        if self.num == 0 || !secs.is_finite() {
            return None;
        }
        Some((secs * self.den as f64 / self.num as f64).round() as i64)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl FromStr for Rational {
    type Err = Error;

    /// Parse `"num/den"`; a bare integer is read as `n/1`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = |reason: &str| Error::invalid_field("rational", s, reason);

        match s.split_once(['/', ':']) {
            Some((num, den)) => {
                let num = num.trim().parse().map_err(|_| invalid("bad numerator"))?;
                let den = den.trim().parse().map_err(|_| invalid("bad denominator"))?;
                Ok(Self { num, den })
            }
            None => {
                let num = s.parse().map_err(|_| invalid("not a fraction"))?;
                Ok(Self { num, den: 1 })
            }
        }
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Deserialize an optional rational, treating malformed text as absent.
pub(crate) fn opt_rational<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Rational>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = crate::de::opt_string(deserializer)?;
    Ok(text.and_then(|s| match s.parse() {
        Ok(r) => Some(r),
        Err(_) => {
            tracing::debug!(value = %s, "ignoring malformed time base");
            None
        }
    }))
}

/// Round to the fixed precision of ffprobe's `%f` output.
pub fn round_to_tool_precision(secs: f64) -> f64 {
    let scale = 10f64.powi(TOOL_PRECISION);
    (secs * scale).round() / scale
}

/// Parse a seconds string such as `"5.312000"`.
pub fn parse_seconds(s: &str) -> Result<f64> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| Error::invalid_field("seconds", s, e))?;
    if !secs.is_finite() {
        return Err(Error::invalid_field("seconds", s, "not a finite number"));
    }
    Ok(secs)
}

/// Format seconds the way ffprobe prints them.
pub fn format_seconds(secs: f64) -> String {
    format!("{:.*}", TOOL_PRECISION as usize, secs)
}

/// Convert seconds to a `Duration`, `None` for negative or non-finite input.
///
/// Rounds to the nearest nanosecond, so `5.312` is exactly 5312 ms.
pub fn seconds_to_duration(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_nanos((secs * 1e9).round() as u64))
}
