//! Stream side data.
//!
//! ffprobe attaches side data to a stream as a list of records, each
//! identified by its `side_data_type`. Known kinds are parsed into their own
//! variant; anything else is kept as [`SideData::Unknown`] with its raw
//! fields. Building the list never fails: malformed payloads are kept as
//! they are and surface as [`Error::SideDataDecode`] from the accessors.

use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::de;
use crate::time::Rational;
use crate::{Error, Result};

pub const DISPLAY_MATRIX: &str = "Display Matrix";
pub const STEREO_3D: &str = "Stereo 3D";
pub const SPHERICAL_MAPPING: &str = "Spherical Mapping";
pub const MASTERING_DISPLAY_METADATA: &str = "Mastering display metadata";
pub const CONTENT_LIGHT_LEVEL: &str = "Content light level metadata";
pub const DOVI_CONFIGURATION: &str = "DOVI configuration record";

/// Scale of the 16.16 fixed-point matrix coefficients.
const FIXED_POINT_ONE: f64 = 65536.0;

/// One side-data record attached to a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SideData {
    DisplayMatrix(RawDisplayMatrix),
    Stereo3d(Stereo3d),
    Spherical(SphericalMapping),
    MasteringDisplay(RawMasteringDisplay),
    ContentLightLevel(ContentLightLevel),
    DoviConfig(DoviConfig),
    Unknown(UnknownSideData),
}

impl SideData {
    /// The `side_data_type` this entry was read from.
    pub fn kind(&self) -> &str {
        match self {
            SideData::DisplayMatrix(_) => DISPLAY_MATRIX,
            SideData::Stereo3d(_) => STEREO_3D,
            SideData::Spherical(_) => SPHERICAL_MAPPING,
            SideData::MasteringDisplay(_) => MASTERING_DISPLAY_METADATA,
            SideData::ContentLightLevel(_) => CONTENT_LIGHT_LEVEL,
            SideData::DoviConfig(_) => DOVI_CONFIGURATION,
            SideData::Unknown(u) => &u.side_data_type,
        }
    }

    fn from_value(value: Value) -> Self {
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                tracing::debug!(value = %other, "side data entry is not an object");
                return SideData::Unknown(UnknownSideData::default());
            }
        };

        let kind = fields
            .get("side_data_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let parsed = match kind.as_str() {
            DISPLAY_MATRIX => parse_fields(&kind, &fields).map(SideData::DisplayMatrix),
            STEREO_3D => parse_fields(&kind, &fields).map(SideData::Stereo3d),
            SPHERICAL_MAPPING => parse_fields(&kind, &fields).map(SideData::Spherical),
            MASTERING_DISPLAY_METADATA => {
                parse_fields(&kind, &fields).map(SideData::MasteringDisplay)
            }
            CONTENT_LIGHT_LEVEL => parse_fields(&kind, &fields).map(SideData::ContentLightLevel),
            DOVI_CONFIGURATION => parse_fields(&kind, &fields).map(SideData::DoviConfig),
            _ => None,
        };

        parsed.unwrap_or_else(|| {
            let mut fields = fields;
            fields.remove("side_data_type");
            SideData::Unknown(UnknownSideData {
                side_data_type: kind,
                fields,
            })
        })
    }
}

fn parse_fields<T: DeserializeOwned>(kind: &str, fields: &Map<String, Value>) -> Option<T> {
    match serde_json::from_value(Value::Object(fields.clone())) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(kind, error = %e, "keeping side data as unknown");
            None
        }
    }
}

impl Serialize for SideData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let payload = match self {
            SideData::DisplayMatrix(v) => serde_json::to_value(v),
            SideData::Stereo3d(v) => serde_json::to_value(v),
            SideData::Spherical(v) => serde_json::to_value(v),
            SideData::MasteringDisplay(v) => serde_json::to_value(v),
            SideData::ContentLightLevel(v) => serde_json::to_value(v),
            SideData::DoviConfig(v) => serde_json::to_value(v),
            SideData::Unknown(v) => Ok(Value::Object(v.fields.clone())),
        }
        .map_err(S::Error::custom)?;

        let mut fields = Map::new();
        fields.insert("side_data_type".to_string(), Value::from(self.kind()));
        if let Value::Object(payload) = payload {
            fields.extend(payload);
        }
        fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SideData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(SideData::from_value(Value::deserialize(deserializer)?))
    }
}

/// Side data of a kind this crate does not model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnknownSideData {
    pub side_data_type: String,
    /// Every field of the record except `side_data_type`.
    pub fields: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Display matrix
// ---------------------------------------------------------------------------

/// Display matrix payload as printed by ffprobe.
///
/// `displaymatrix` is normally a hexdump of the nine 32-bit coefficients,
/// three per row; a plain JSON array of nine integers is accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDisplayMatrix {
    #[serde(
        default,
        rename = "displaymatrix",
        skip_serializing_if = "Option::is_none"
    )]
    pub matrix: Option<Value>,
    #[serde(
        default,
        deserialize_with = "de::opt_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub rotation: Option<f64>,
}

/// Decoded display matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayMatrix {
    /// Row-major coefficients, `None` when only a rotation was reported.
    pub matrix: Option<[i32; 9]>,
    /// Counter-clockwise rotation in whole degrees, in `[-180, 180)`.
    pub rotation: i32,
}

impl RawDisplayMatrix {
    /// Decode the coefficients and derive the rotation.
    ///
    /// The rotation is computed from the matrix when one is present and
    /// otherwise taken from the reported `rotation` field.
    pub fn decode(&self) -> Result<DisplayMatrix> {
        let decode_err = |reason: String| Error::side_data_decode(DISPLAY_MATRIX, reason);

        match &self.matrix {
            Some(raw) => {
                let matrix = parse_matrix(raw).map_err(decode_err)?;
                let degrees = rotation_from_matrix(&matrix)
                    .ok_or_else(|| decode_err("degenerate matrix".to_string()))?;
                Ok(DisplayMatrix {
                    matrix: Some(matrix),
                    rotation: normalize_degrees(degrees),
                })
            }
            None => match self.rotation {
                Some(degrees) if degrees.is_finite() => Ok(DisplayMatrix {
                    matrix: None,
                    rotation: normalize_degrees(degrees),
                }),
                _ => Err(decode_err("neither matrix nor rotation present".to_string())),
            },
        }
    }
}

fn parse_matrix(raw: &Value) -> std::result::Result<[i32; 9], String> {
    let coefficients: Vec<i32> = match raw {
        Value::String(text) => {
            let mut values = Vec::with_capacity(9);
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                // Rows are prefixed with a hex offset ("00000001:").
                let row = line.split_once(':').map_or(line, |(_, rest)| rest);
                for token in row.split_whitespace() {
                    let v = token
                        .parse()
                        .map_err(|_| format!("invalid coefficient {token:?}"))?;
                    values.push(v);
                }
            }
            values
        }
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_i64()
                    .and_then(|n| i32::try_from(n).ok())
                    .ok_or_else(|| format!("invalid coefficient {v}"))
            })
            .collect::<std::result::Result<_, _>>()?,
        other => return Err(format!("unexpected matrix value {other}")),
    };

    let count = coefficients.len();
    coefficients
        .try_into()
        .map_err(|_| format!("expected 9 coefficients, got {count}"))
}

/// Rotation angle of a 16.16 fixed-point display matrix, in degrees.
///
/// Matches the tool's convention: a 180 degree turn reports `-180`.
fn rotation_from_matrix(m: &[i32; 9]) -> Option<f64> {
    let fp = |v: i32| f64::from(v) / FIXED_POINT_ONE;
    let scale_x = fp(m[0]).hypot(fp(m[3]));
    let scale_y = fp(m[1]).hypot(fp(m[4]));
    if scale_x == 0.0 || scale_y == 0.0 {
        return None;
    }
    let rotation = (fp(m[1]) / scale_y).atan2(fp(m[0]) / scale_x).to_degrees();
    Some(-rotation)
}

/// Round to whole degrees and wrap into `[-180, 180)`.
pub(crate) fn normalize_degrees(degrees: f64) -> i32 {
    let mut d = degrees.round() as i64 % 360;
    if d >= 180 {
        d -= 360;
    } else if d < -180 {
        d += 360;
    }
    d as i32
}

// ---------------------------------------------------------------------------
// Other known kinds
// ---------------------------------------------------------------------------

/// Stereoscopic 3D packing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stereo3d {
    #[serde(default, rename = "type", deserialize_with = "de::string")]
    pub packing: String,
    #[serde(default, deserialize_with = "de::number")]
    pub inverted: i64,
}

impl Stereo3d {
    pub fn is_inverted(&self) -> bool {
        self.inverted != 0
    }
}

/// 360° video projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SphericalMapping {
    #[serde(default, deserialize_with = "de::string")]
    pub projection: String,
    #[serde(default, deserialize_with = "de::number")]
    pub yaw: i32,
    #[serde(default, deserialize_with = "de::number")]
    pub pitch: i32,
    #[serde(default, deserialize_with = "de::number")]
    pub roll: i32,
}

/// HDR mastering display metadata as printed by ffprobe (`"num/den"` strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMasteringDisplay {
    #[serde(default, deserialize_with = "de::opt_string")]
    pub red_x: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub red_y: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub green_x: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub green_y: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub blue_x: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub blue_y: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub white_point_x: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub white_point_y: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub min_luminance: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    pub max_luminance: Option<String>,
}

/// CIE 1931 xy chromaticity coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Chromaticity {
    pub x: f64,
    pub y: f64,
}

/// Display primaries and white point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Primaries {
    pub red: Chromaticity,
    pub green: Chromaticity,
    pub blue: Chromaticity,
    pub white_point: Chromaticity,
}

/// Decoded mastering display metadata.
///
/// ffprobe omits the primaries or the luminance group when the stream does
/// not signal it, so each group is optional.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MasteringDisplay {
    pub primaries: Option<Primaries>,
    /// `(min, max)` in cd/m².
    pub luminance: Option<(f64, f64)>,
}

impl RawMasteringDisplay {
    pub fn decode(&self) -> Result<MasteringDisplay> {
        let primaries = match decode_group(&[
            ("red_x", &self.red_x),
            ("red_y", &self.red_y),
            ("green_x", &self.green_x),
            ("green_y", &self.green_y),
            ("blue_x", &self.blue_x),
            ("blue_y", &self.blue_y),
            ("white_point_x", &self.white_point_x),
            ("white_point_y", &self.white_point_y),
        ])? {
            Some(v) => Some(Primaries {
                red: Chromaticity { x: v[0], y: v[1] },
                green: Chromaticity { x: v[2], y: v[3] },
                blue: Chromaticity { x: v[4], y: v[5] },
                white_point: Chromaticity { x: v[6], y: v[7] },
            }),
            None => None,
        };

        let luminance = decode_group(&[
            ("min_luminance", &self.min_luminance),
            ("max_luminance", &self.max_luminance),
        ])?
        .map(|v| (v[0], v[1]));

        Ok(MasteringDisplay {
            primaries,
            luminance,
        })
    }
}

/// Decode a group of rationals that must be either all present or all absent.
fn decode_group(fields: &[(&str, &Option<String>)]) -> Result<Option<Vec<f64>>> {
    let present = fields.iter().filter(|(_, v)| v.is_some()).count();
    if present == 0 {
        return Ok(None);
    }
    if present != fields.len() {
        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();
        return Err(Error::side_data_decode(
            MASTERING_DISPLAY_METADATA,
            format!("incomplete group, missing {}", missing.join(", ")),
        ));
    }

    fields
        .iter()
        .map(|(name, value)| {
            let text = value.as_deref().unwrap_or_default();
            text.parse::<Rational>()
                .ok()
                .and_then(|r| r.as_f64())
                .ok_or_else(|| {
                    Error::side_data_decode(
                        MASTERING_DISPLAY_METADATA,
                        format!("invalid {name} value {text:?}"),
                    )
                })
        })
        .collect::<Result<Vec<f64>>>()
        .map(Some)
}

/// HDR content light level (MaxCLL / MaxFALL).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentLightLevel {
    #[serde(default, deserialize_with = "de::number")]
    pub max_content: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub max_average: u32,
}

/// Dolby Vision decoder configuration record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoviConfig {
    #[serde(default, deserialize_with = "de::number")]
    pub dv_version_major: u8,
    #[serde(default, deserialize_with = "de::number")]
    pub dv_version_minor: u8,
    #[serde(default, deserialize_with = "de::number")]
    pub dv_profile: u8,
    #[serde(default, deserialize_with = "de::number")]
    pub dv_level: u8,
    #[serde(default, deserialize_with = "de::number")]
    pub rpu_present_flag: u8,
    #[serde(default, deserialize_with = "de::number")]
    pub el_present_flag: u8,
    #[serde(default, deserialize_with = "de::number")]
    pub bl_present_flag: u8,
    #[serde(default, deserialize_with = "de::number")]
    pub dv_bl_signal_compatibility_id: u8,
}

impl DoviConfig {
    pub fn rpu_present(&self) -> bool {
        self.rpu_present_flag == 1
    }

    pub fn el_present(&self) -> bool {
        self.el_present_flag == 1
    }

    pub fn bl_present(&self) -> bool {
        self.bl_present_flag == 1
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// Ordered side-data records of one stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SideDataList(Vec<SideData>);

impl SideDataList {
    pub fn new(entries: Vec<SideData>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SideData> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First entry with the given `side_data_type`, known or not.
    pub fn find(&self, kind: &str) -> Option<&SideData> {
        self.0.iter().find(|sd| sd.kind() == kind)
    }

    /// Decode the first display matrix entry.
    ///
    /// # Errors
    ///
    /// [`Error::SideDataNotFound`] if the stream has none,
    /// [`Error::SideDataDecode`] if its payload is malformed.
    pub fn display_matrix(&self) -> Result<DisplayMatrix> {
        self.first_of(DISPLAY_MATRIX, |sd| match sd {
            SideData::DisplayMatrix(raw) => Some(raw),
            _ => None,
        })?
        .decode()
    }

    pub fn stereo_3d(&self) -> Result<&Stereo3d> {
        self.first_of(STEREO_3D, |sd| match sd {
            SideData::Stereo3d(v) => Some(v),
            _ => None,
        })
    }

    pub fn spherical(&self) -> Result<&SphericalMapping> {
        self.first_of(SPHERICAL_MAPPING, |sd| match sd {
            SideData::Spherical(v) => Some(v),
            _ => None,
        })
    }

    /// Decode the first mastering display metadata entry.
    pub fn mastering_display(&self) -> Result<MasteringDisplay> {
        self.first_of(MASTERING_DISPLAY_METADATA, |sd| match sd {
            SideData::MasteringDisplay(raw) => Some(raw),
            _ => None,
        })?
        .decode()
    }

    pub fn content_light_level(&self) -> Result<&ContentLightLevel> {
        self.first_of(CONTENT_LIGHT_LEVEL, |sd| match sd {
            SideData::ContentLightLevel(v) => Some(v),
            _ => None,
        })
    }

    pub fn dovi_config(&self) -> Result<&DoviConfig> {
        self.first_of(DOVI_CONFIGURATION, |sd| match sd {
            SideData::DoviConfig(v) => Some(v),
            _ => None,
        })
    }

    fn first_of<'a, T>(
        &'a self,
        kind: &str,
        pick: impl Fn(&'a SideData) -> Option<&'a T>,
    ) -> Result<&'a T> {
        self.0
            .iter()
            .find_map(pick)
            .ok_or_else(|| Error::side_data_not_found(kind))
    }
}

impl<'a> IntoIterator for &'a SideDataList {
    type Item = &'a SideData;
    type IntoIter = std::slice::Iter<'a, SideData>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'de> Deserialize<'de> for SideDataList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(Self(items.into_iter().map(SideData::from_value).collect())),
            Value::Null => Ok(Self::default()),
            other => {
                tracing::debug!(value = %other, "side_data_list is not an array");
                Ok(Self::default())
            }
        }
    }
}
