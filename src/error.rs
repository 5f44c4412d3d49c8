// src/error.rs
//
// Unified error handling for frame-resize
// Uses thiserror for simple, type-safe error handling
//
// Error Taxonomy:
// - UserError: Invalid request or malformed source frame
// - ConversionError: A transform routine reported a failure
// - ResourceLimit: Memory/dimension limits
// - InternalBug: Library bugs (should not happen)

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Error taxonomy exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Invalid request or malformed source frame
    UserError,
    /// A transform routine reported a failure
    ConversionError,
    /// Memory/dimension limits
    ResourceLimit,
    /// Library bugs (should not happen)
    InternalBug,
}

impl ErrorCategory {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::UserError => "FRAME_RESIZE_USER_ERROR",
            ErrorCategory::ConversionError => "FRAME_RESIZE_CONVERSION_ERROR",
            ErrorCategory::ResourceLimit => "FRAME_RESIZE_RESOURCE_LIMIT",
            ErrorCategory::InternalBug => "FRAME_RESIZE_INTERNAL_BUG",
        }
    }
}

/// Pipeline stage that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Ingest,
    Crop,
    Scale,
    Rotate,
    Mirror,
    ConvertFormat,
    ConvertType,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Crop => "crop",
            Stage::Scale => "scale",
            Stage::Rotate => "rotate",
            Stage::Mirror => "mirror",
            Stage::ConvertFormat => "convert-format",
            Stage::ConvertType => "convert-type",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// frame-resize error types
///
/// Every variant aborts the current `process` call. Stage failures carry
/// the status text reported by the underlying routine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    // Enumeration / combination errors
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    #[error("Unsupported conversion: {from} -> {to}")]
    UnsupportedConversion {
        from: Cow<'static, str>,
        to: Cow<'static, str>,
    },

    // Source frame errors
    #[error("U and V planes do not have the same pixel stride ({u_pixel_stride} != {v_pixel_stride}); source is not 4:2:0")]
    InconsistentChromaStride {
        u_pixel_stride: usize,
        v_pixel_stride: usize,
    },

    #[error("Invalid source frame: {reason}")]
    InvalidSourceFrame { reason: Cow<'static, str> },

    // Request errors
    #[error("Crop bounds ({x}+{width}, {y}+{height}) exceed frame dimensions ({frame_width}x{frame_height})")]
    InvalidCropBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Invalid crop dimensions: width={width}, height={height}")]
    InvalidCropDimensions { width: u32, height: u32 },

    #[error("Invalid scale dimensions: width={width}, height={height}")]
    InvalidScaleDimensions { width: u32, height: u32 },

    #[error("Unsupported rotation angle: {degrees}. Only 0, 90, 180 and 270 are supported")]
    InvalidRotationAngle { degrees: i32 },

    #[error("Invalid value for {name}: {value}. {reason}")]
    InvalidArgument {
        name: Cow<'static, str>,
        value: Cow<'static, str>,
        reason: Cow<'static, str>,
    },

    // Size Limit Errors
    #[error("Frame dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("Frame pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    // Stage routine failures
    #[error("Conversion failed in {stage}: {reason}")]
    ConversionFailed {
        stage: Stage,
        reason: Cow<'static, str>,
    },

    #[error("Failed to crop ARGB buffer: {reason}")]
    CropFailed { reason: Cow<'static, str> },

    #[error("Failed to scale ARGB buffer: {reason}")]
    ScaleFailed { reason: Cow<'static, str> },

    #[error("Failed to rotate ARGB buffer: {reason}")]
    RotateFailed { reason: Cow<'static, str> },

    #[error("Failed to mirror ARGB buffer: {reason}")]
    MirrorFailed { reason: Cow<'static, str> },

    #[error("Failed to convert ARGB buffer to target pixel format: {reason}")]
    ConvertFormatFailed { reason: Cow<'static, str> },

    #[error("Failed to convert buffer to target data type: {reason}")]
    ConvertTypeFailed { reason: Cow<'static, str> },

    // Resource errors
    #[error("Out of memory allocating {bytes} bytes for {role} buffer")]
    OutOfMemory { role: &'static str, bytes: usize },
}

// Constructor Helpers
impl PipelineError {
    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn unsupported_conversion(
        from: impl Into<Cow<'static, str>>,
        to: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::UnsupportedConversion {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn inconsistent_chroma_stride(u_pixel_stride: usize, v_pixel_stride: usize) -> Self {
        Self::InconsistentChromaStride {
            u_pixel_stride,
            v_pixel_stride,
        }
    }

    pub fn invalid_source_frame(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidSourceFrame {
            reason: reason.into(),
        }
    }

    pub fn invalid_crop_bounds(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        Self::InvalidCropBounds {
            x,
            y,
            width,
            height,
            frame_width,
            frame_height,
        }
    }

    pub fn invalid_crop_dimensions(width: u32, height: u32) -> Self {
        Self::InvalidCropDimensions { width, height }
    }

    pub fn invalid_scale_dimensions(width: u32, height: u32) -> Self {
        Self::InvalidScaleDimensions { width, height }
    }

    pub fn invalid_rotation_angle(degrees: i32) -> Self {
        Self::InvalidRotationAngle { degrees }
    }

    pub fn invalid_argument(
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
        reason: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn out_of_memory(role: &'static str, bytes: usize) -> Self {
        Self::OutOfMemory { role, bytes }
    }

    /// Routine failure for `stage`, mapped onto that stage's variant.
    pub fn stage_failed(stage: Stage, reason: impl Into<Cow<'static, str>>) -> Self {
        let reason = reason.into();
        match stage {
            Stage::Ingest => Self::ConversionFailed { stage, reason },
            Stage::Crop => Self::CropFailed { reason },
            Stage::Scale => Self::ScaleFailed { reason },
            Stage::Rotate => Self::RotateFailed { reason },
            Stage::Mirror => Self::MirrorFailed { reason },
            Stage::ConvertFormat => Self::ConvertFormatFailed { reason },
            Stage::ConvertType => Self::ConvertTypeFailed { reason },
        }
    }

    /// The stage whose routine failed, for stage failures.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::ConversionFailed { stage, .. } => Some(*stage),
            Self::CropFailed { .. } => Some(Stage::Crop),
            Self::ScaleFailed { .. } => Some(Stage::Scale),
            Self::RotateFailed { .. } => Some(Stage::Rotate),
            Self::MirrorFailed { .. } => Some(Stage::Mirror),
            Self::ConvertFormatFailed { .. } => Some(Stage::ConvertFormat),
            Self::ConvertTypeFailed { .. } => Some(Stage::ConvertType),
            _ => None,
        }
    }

    /// Check if this error is recoverable (caller can fix it)
    ///
    /// Consistent with category(): user and resource errors are
    /// recoverable by changing the request or freeing memory; routine
    /// failures are deterministic and would reproduce on retry.
    pub fn is_recoverable(&self) -> bool {
        match self.category() {
            ErrorCategory::UserError | ErrorCategory::ResourceLimit => true,
            ErrorCategory::ConversionError | ErrorCategory::InternalBug => false,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedFormat { .. }
            | Self::UnsupportedConversion { .. }
            | Self::InconsistentChromaStride { .. }
            | Self::InvalidSourceFrame { .. }
            | Self::InvalidCropBounds { .. }
            | Self::InvalidCropDimensions { .. }
            | Self::InvalidScaleDimensions { .. }
            | Self::InvalidRotationAngle { .. }
            | Self::InvalidArgument { .. } => ErrorCategory::UserError,

            Self::ConversionFailed { .. }
            | Self::CropFailed { .. }
            | Self::ScaleFailed { .. }
            | Self::RotateFailed { .. }
            | Self::MirrorFailed { .. }
            | Self::ConvertFormatFailed { .. } => ErrorCategory::ConversionError,

            // Only UINT8 -> FLOAT32 exists; any other failure means the
            // type stage was handed a buffer it never produced.
            Self::ConvertTypeFailed { .. } => ErrorCategory::InternalBug,

            Self::DimensionExceedsLimit { .. }
            | Self::PixelCountExceedsLimit { .. }
            | Self::OutOfMemory { .. } => ErrorCategory::ResourceLimit,
        }
    }
}
