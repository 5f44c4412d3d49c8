// src/engine/source.rs
//
// Camera frame boundary: what ingest needs to read from the capture side.
// The pipeline only ever borrows these planes for the duration of a call.

use crate::format::SourceFormat;

/// One readable plane of a camera frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    /// Bytes from the start of one row to the start of the next.
    pub row_stride: usize,
    /// Bytes between consecutive samples within a row.
    pub pixel_stride: usize,
}

impl<'a> Plane<'a> {
    pub fn new(data: &'a [u8], row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data,
            row_stride,
            pixel_stride,
        }
    }

    /// Minimum bytes needed for `rows` rows of `samples` samples of
    /// `sample_bytes` each. The final row need not carry stride padding.
    pub fn required_len(&self, samples: usize, rows: usize, sample_bytes: usize) -> Option<usize> {
        if samples == 0 || rows == 0 {
            return Some(0);
        }
        let last_row = (samples - 1)
            .checked_mul(self.pixel_stride)?
            .checked_add(sample_bytes)?;
        (rows - 1).checked_mul(self.row_stride)?.checked_add(last_row)
    }
}

/// Capture-side frame object.
///
/// Implement this for whatever the camera stack hands out; the YUV layout
/// expects planes 0, 1, 2 = Y, U, V and the RGBA layout a single plane.
pub trait CameraFrame {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn source_format(&self) -> SourceFormat;
    fn plane(&self, index: usize) -> Option<Plane<'_>>;
}

/// Borrowed frame for callers that already hold raw planes.
#[derive(Clone, Debug)]
pub struct SourceFrame<'a> {
    width: u32,
    height: u32,
    format: SourceFormat,
    planes: Vec<Plane<'a>>,
}

impl<'a> SourceFrame<'a> {
    pub fn new(width: u32, height: u32, format: SourceFormat, planes: Vec<Plane<'a>>) -> Self {
        Self {
            width,
            height,
            format,
            planes,
        }
    }

    pub fn yuv_420_888(width: u32, height: u32, y: Plane<'a>, u: Plane<'a>, v: Plane<'a>) -> Self {
        Self::new(width, height, SourceFormat::Yuv420_888, vec![y, u, v])
    }

    pub fn rgba_8888(width: u32, height: u32, plane: Plane<'a>) -> Self {
        Self::new(width, height, SourceFormat::Rgba8888, vec![plane])
    }
}

impl CameraFrame for SourceFrame<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn source_format(&self) -> SourceFormat {
        self.format
    }

    fn plane(&self, index: usize) -> Option<Plane<'_>> {
        self.planes.get(index).copied()
    }
}
