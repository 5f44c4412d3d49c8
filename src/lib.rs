// lib.rs
//
// frame-resize: per-frame camera image preprocessing for inference pipelines
//
// Design goals:
// - One fixed stage order, each stage skippable at zero cost
// - No per-frame allocation once the stream geometry is stable
// - Output bytes borrowed straight from the last stage's buffer
// - Typed, categorized errors instead of sentinel values

// Memory allocator optimization - jemalloc for steady per-frame allocation
// Note: jemalloc is not supported on Windows/MSVC, so we exclude it on that platform
#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
#[global_allocator]
static ALLOC: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

pub mod engine;
pub mod error;
pub mod format;
pub mod ops;

pub use engine::{
    BufferCache, BufferRole, CameraFrame, ConversionProfile, ExecutedStages, FrameBuffer,
    FrameView, PipelineConfig, PipelineResult, Plane, ResizePipeline, SharedPipeline, SourceFrame,
    MAX_DIMENSION, MAX_PIXELS,
};
pub use error::{ErrorCategory, PipelineError, Stage};
pub use format::{bytes_per_pixel, DataType, PixelFormat, Rotation, SourceFormat};
pub use ops::{CropRect, ResizeRequest, ScaleSize};
