// src/engine.rs
//
// The core of frame-resize. A per-frame pipeline that:
// 1. Converts the camera frame to packed ARGB-8
// 2. Runs crop, scale, rotate, mirror, format and datatype stages in order
// 3. Writes every stage into a buffer it keeps for the next frame
//
// This file is a facade over the modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed frame dimension (width or height), for sources and for
/// every stage output size a request can ask for.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 1.6GB as RGBA float32.
pub const MAX_PIXELS: u64 = 100_000_000;

// =============================================================================
// MODULE DECOMPOSITION
// =============================================================================

mod api;
mod cache;
mod common;
mod config;
mod frame;
mod ingest;
mod pipeline;
mod source;

pub use api::{ResizePipeline, SharedPipeline};
pub use cache::{BufferCache, BufferRole};
pub use common::PipelineResult;
pub use config::{ConversionProfile, PipelineConfig};
pub use frame::{ExecutedStages, FrameBuffer, FrameView};
pub use ingest::ingest;
pub use pipeline::{
    convert_data_type, convert_format, crop, mirror, rotate, scale, validate_crop,
};
pub use source::{CameraFrame, Plane, SourceFrame};
