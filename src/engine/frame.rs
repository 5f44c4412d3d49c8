// src/engine/frame.rs
//
// In-flight frame descriptors.
//
// A FrameBuffer does not own pixels: it names the cache slot holding them.
// Stages hand the slot name forward, so a no-op stage returns its input
// descriptor untouched and the next stage reads the same slot.

use crate::engine::cache::{BufferCache, BufferRole};
use crate::engine::common::frame_byte_len;
use crate::format::{bytes_per_pixel, DataType, PixelFormat};
use bitflags::bitflags;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub data_type: DataType,
    pub slot: BufferRole,
}

impl FrameBuffer {
    pub fn new(
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        data_type: DataType,
        slot: BufferRole,
    ) -> Self {
        Self {
            width,
            height,
            pixel_format,
            data_type,
            slot,
        }
    }

    /// Canonical ARGB-8 frame in `slot`.
    pub fn argb8(width: u32, height: u32, slot: BufferRole) -> Self {
        Self::new(width, height, PixelFormat::Argb, DataType::Uint8, slot)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bytes_per_pixel(&self) -> usize {
        bytes_per_pixel(self.pixel_format, self.data_type)
    }

    /// Packed rows: no padding beyond `width * bytes_per_pixel`.
    pub fn bytes_per_row(&self) -> usize {
        self.width as usize * self.bytes_per_pixel()
    }

    /// `width * height * bytes_per_pixel`; saturates on overflow so that a
    /// nonsensical descriptor never matches a real slot.
    pub fn byte_len(&self) -> usize {
        frame_byte_len(self.width, self.height, self.bytes_per_pixel()).unwrap_or(usize::MAX)
    }

    /// The slot contents, if the slot holds exactly `byte_len()` bytes.
    pub fn data<'c>(&self, cache: &'c BufferCache) -> Option<&'c [u8]> {
        cache
            .bytes(self.slot)
            .filter(|bytes| bytes.len() == self.byte_len())
    }
}

bitflags! {
    /// Stages that did real work (did not take the no-op path) in a call.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ExecutedStages: u8 {
        const INGEST = 1 << 0;
        const CROP = 1 << 1;
        const SCALE = 1 << 2;
        const ROTATE = 1 << 3;
        const MIRROR = 1 << 4;
        const CONVERT_FORMAT = 1 << 5;
        const CONVERT_TYPE = 1 << 6;
    }
}

/// Result of a `process` call.
///
/// Borrows the pipeline's cache, so it cannot outlive the next call on the
/// same instance. Copy the bytes out (`to_vec`) to keep them.
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    frame: FrameBuffer,
    bytes: &'a [u8],
    stages: ExecutedStages,
}

impl<'a> FrameView<'a> {
    pub(crate) fn new(frame: FrameBuffer, bytes: &'a [u8], stages: ExecutedStages) -> Self {
        Self {
            frame,
            bytes,
            stages,
        }
    }

    pub fn frame(&self) -> FrameBuffer {
        self.frame
    }

    pub fn width(&self) -> u32 {
        self.frame.width
    }

    pub fn height(&self) -> u32 {
        self.frame.height
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.frame.pixel_format
    }

    pub fn data_type(&self) -> DataType {
        self.frame.data_type
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn stages(&self) -> ExecutedStages {
        self.stages
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Bytes of the pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<&'a [u8]> {
        if x >= self.frame.width || y >= self.frame.height {
            return None;
        }
        let bpp = self.frame.bytes_per_pixel();
        let start = y as usize * self.frame.bytes_per_row() + x as usize * bpp;
        self.bytes.get(start..start + bpp)
    }

    /// Samples decoded as native-endian `f32`; `None` unless FLOAT32.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        if self.frame.data_type != DataType::Float32 {
            return None;
        }
        Some(
            self.bytes
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }
}
