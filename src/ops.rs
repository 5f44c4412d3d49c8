// src/ops.rs
//
// Per-call request parameters.
// These are cheap to create and copy - the expensive work happens in process().

use crate::format::{DataType, PixelFormat, Rotation};

/// Crop region in source-space pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole frame; the crop stage takes its no-op path.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Centre crop of `width`x`height` out of a `src_width`x`src_height` frame.
    /// Requested sizes larger than the frame are clamped to it.
    pub fn centered(src_width: u32, src_height: u32, width: u32, height: u32) -> Self {
        let width = width.min(src_width);
        let height = height.min(src_height);
        Self::new(
            (src_width - width) / 2,
            (src_height - height) / 2,
            width,
            height,
        )
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == width && self.height == height
    }
}

/// Target size of the scale stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScaleSize {
    pub width: u32,
    pub height: u32,
}

impl ScaleSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// All parameters of one `process` call. None of them has a default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResizeRequest {
    pub crop: CropRect,
    pub scale: ScaleSize,
    pub rotation: Rotation,
    pub mirror: bool,
    pub pixel_format: PixelFormat,
    pub data_type: DataType,
}

impl ResizeRequest {
    /// Request under which every stage after ingest is a no-op.
    pub fn identity(width: u32, height: u32) -> Self {
        Self {
            crop: CropRect::full(width, height),
            scale: ScaleSize::new(width, height),
            rotation: Rotation::Rotation0,
            mirror: false,
            pixel_format: PixelFormat::Argb,
            data_type: DataType::Uint8,
        }
    }

    /// Final buffer dimensions after scale and rotation.
    pub fn output_dimensions(&self) -> (u32, u32) {
        self.rotation
            .output_dimensions(self.scale.width, self.scale.height)
    }
}
