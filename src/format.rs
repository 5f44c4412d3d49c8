// src/format.rs
//
// Pixel format catalog: channel counts and byte sizes for every supported
// (format, datatype) pair, plus the closed enums that describe frames.
// Pure lookups, no state.

use crate::error::PipelineError;
use std::fmt;
use std::str::FromStr;

/// Packed pixel layouts the pipeline can emit.
///
/// The internal representation is always `Argb` (alpha first); every other
/// layout is produced by the final pixel-format stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Rgb,
    Bgr,
    Argb,
    Rgba,
    Bgra,
    Abgr,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 6] = [
        PixelFormat::Rgb,
        PixelFormat::Bgr,
        PixelFormat::Argb,
        PixelFormat::Rgba,
        PixelFormat::Bgra,
        PixelFormat::Abgr,
    ];

    pub fn channel_count(self) -> usize {
        match self {
            PixelFormat::Rgb | PixelFormat::Bgr => 3,
            PixelFormat::Argb | PixelFormat::Rgba | PixelFormat::Bgra | PixelFormat::Abgr => 4,
        }
    }

    /// Host-side ordinal (declaration order of the binding enum).
    pub fn from_ordinal(ordinal: i32) -> Result<Self, PipelineError> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| PipelineError::unsupported_format(format!("pixel format #{ordinal}")))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PixelFormat::Rgb => "rgb",
            PixelFormat::Bgr => "bgr",
            PixelFormat::Argb => "argb",
            PixelFormat::Rgba => "rgba",
            PixelFormat::Bgra => "bgra",
            PixelFormat::Abgr => "abgr",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" => Ok(PixelFormat::Rgb),
            "bgr" => Ok(PixelFormat::Bgr),
            "argb" => Ok(PixelFormat::Argb),
            "rgba" => Ok(PixelFormat::Rgba),
            "bgra" => Ok(PixelFormat::Bgra),
            "abgr" => Ok(PixelFormat::Abgr),
            other => Err(PipelineError::unsupported_format(other.to_string())),
        }
    }
}

/// Numeric type of each channel sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DataType {
    Uint8,
    Float32,
}

impl DataType {
    pub fn bytes_per_channel(self) -> usize {
        match self {
            DataType::Uint8 => std::mem::size_of::<u8>(),
            DataType::Float32 => std::mem::size_of::<f32>(),
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Result<Self, PipelineError> {
        match ordinal {
            0 => Ok(DataType::Uint8),
            1 => Ok(DataType::Float32),
            other => Err(PipelineError::unsupported_format(format!("data type #{other}"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Uint8 => "uint8",
            DataType::Float32 => "float32",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uint8" => Ok(DataType::Uint8),
            "float32" => Ok(DataType::Float32),
            other => Err(PipelineError::unsupported_format(other.to_string())),
        }
    }
}

/// `channel_count(format) * bytes_per_channel(data_type)`
pub fn bytes_per_pixel(format: PixelFormat, data_type: DataType) -> usize {
    format.channel_count() * data_type.bytes_per_channel()
}

/// Clockwise rotation applied by the rotate stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rotation {
    Rotation0,
    Rotation90,
    Rotation180,
    Rotation270,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Result<Self, PipelineError> {
        match degrees {
            0 => Ok(Rotation::Rotation0),
            90 => Ok(Rotation::Rotation90),
            180 => Ok(Rotation::Rotation180),
            270 => Ok(Rotation::Rotation270),
            other => Err(PipelineError::invalid_rotation_angle(other)),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Rotation0 => 0,
            Rotation::Rotation90 => 90,
            Rotation::Rotation180 => 180,
            Rotation::Rotation270 => 270,
        }
    }

    /// Quarter turns swap width and height.
    pub fn output_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Rotation::Rotation90 | Rotation::Rotation270 => (height, width),
            Rotation::Rotation0 | Rotation::Rotation180 => (width, height),
        }
    }
}

impl FromStr for Rotation {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_suffix("deg").unwrap_or(trimmed);
        let degrees = digits.parse::<i32>().map_err(|_| {
            PipelineError::invalid_argument(
                "rotation",
                s.to_string(),
                "expected 0deg, 90deg, 180deg or 270deg",
            )
        })?;
        Self::from_degrees(degrees)
    }
}

/// Layout of the incoming camera frame. Only ingest ever sees this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Three planes: full-resolution Y, half-resolution U and V.
    Yuv420_888,
    /// One packed R,G,B,A plane.
    Rgba8888,
}

impl SourceFormat {
    pub fn from_android_code(code: i32) -> Result<Self, PipelineError> {
        match code {
            35 => Ok(SourceFormat::Yuv420_888),
            1 => Ok(SourceFormat::Rgba8888),
            other => Err(PipelineError::unsupported_format(format!("source image format {other}"))),
        }
    }

    pub fn plane_count(self) -> usize {
        match self {
            SourceFormat::Yuv420_888 => 3,
            SourceFormat::Rgba8888 => 1,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Yuv420_888 => f.write_str("YUV_420_888"),
            SourceFormat::Rgba8888 => f.write_str("RGBA_8888"),
        }
    }
}
