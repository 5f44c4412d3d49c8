// src/engine/api.rs
//
// ResizePipeline: the per-instance orchestrator.
// Owns the stage buffers and runs every call through the fixed stage order
// ingest -> crop -> scale -> rotate -> mirror -> format -> datatype.

use crate::engine::cache::BufferCache;
use crate::engine::common::PipelineResult;
use crate::engine::config::PipelineConfig;
use crate::engine::frame::{ExecutedStages, FrameBuffer, FrameView};
use crate::engine::ingest::ingest;
use crate::engine::pipeline::{
    convert_data_type, convert_format, crop, mirror, rotate, scale, validate_crop,
};
use crate::engine::source::CameraFrame;
use crate::error::{PipelineError, Stage};
use crate::ops::ResizeRequest;
use fast_image_resize as fir;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Reusable frame pipeline.
///
/// Keep one per camera stream: buffers are sized on the first frame and
/// reused for every following frame with the same geometry.
///
/// ```no_run
/// use frame_resize::{CropRect, ResizePipeline, ResizeRequest, ScaleSize, SourceFrame, Plane};
/// use frame_resize::{DataType, PixelFormat, Rotation};
///
/// let rgba = vec![0u8; 640 * 480 * 4];
/// let frame = SourceFrame::rgba_8888(640, 480, Plane::new(&rgba, 640 * 4, 4));
/// let request = ResizeRequest {
///     crop: CropRect::centered(640, 480, 480, 480),
///     scale: ScaleSize::new(224, 224),
///     rotation: Rotation::Rotation90,
///     mirror: false,
///     pixel_format: PixelFormat::Rgb,
///     data_type: DataType::Float32,
/// };
///
/// let mut pipeline = ResizePipeline::new();
/// let view = pipeline.process(&frame, &request)?;
/// assert_eq!(view.bytes().len(), 224 * 224 * 3 * 4);
/// # Ok::<(), frame_resize::PipelineError>(())
/// ```
pub struct ResizePipeline {
    cache: BufferCache,
    resizer: fir::Resizer,
    config: PipelineConfig,
}

impl Default for ResizePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ResizePipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self {
            cache: BufferCache::new(),
            resizer: fir::Resizer::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &BufferCache {
        &self.cache
    }

    /// Drop every cached buffer; the next call allocates afresh.
    pub fn release_buffers(&mut self) {
        self.cache.clear();
    }

    /// Check `request` against a `width`x`height` source without touching
    /// any buffer.
    pub fn validate(&self, width: u32, height: u32, request: &ResizeRequest) -> PipelineResult<()> {
        self.config.enforce_dimensions(width, height)?;
        validate_crop(&request.crop, width, height)?;

        let scale = request.scale;
        if scale.width == 0 || scale.height == 0 {
            return Err(PipelineError::invalid_scale_dimensions(scale.width, scale.height));
        }
        self.config.enforce_dimensions(scale.width, scale.height)
    }

    /// Run `frame` through every stage.
    ///
    /// The returned view borrows this pipeline's final buffer; the borrow
    /// ends before the next call can start.
    pub fn process<F>(&mut self, frame: &F, request: &ResizeRequest) -> PipelineResult<FrameView<'_>>
    where
        F: CameraFrame + ?Sized,
    {
        self.validate(frame.width(), frame.height(), request)?;
        debug!(
            width = frame.width(),
            height = frame.height(),
            source = %frame.source_format(),
            scale_width = request.scale.width,
            scale_height = request.scale.height,
            rotation = request.rotation.degrees(),
            mirror = request.mirror,
            format = %request.pixel_format,
            data_type = %request.data_type,
            "processing frame"
        );

        let cache = &mut self.cache;
        let mut stages = ExecutedStages::INGEST;
        let mut track = |flag: ExecutedStages, before: FrameBuffer, after: FrameBuffer| {
            if before.slot != after.slot {
                stages |= flag;
            }
            after
        };

        let ingested = ingest(cache, frame, &self.config)?;
        let cropped = track(ExecutedStages::CROP, ingested, crop(cache, ingested, request.crop)?);
        let scaled = track(
            ExecutedStages::SCALE,
            cropped,
            scale(cache, &mut self.resizer, cropped, request.scale)?,
        );
        let rotated = track(ExecutedStages::ROTATE, scaled, rotate(cache, scaled, request.rotation)?);
        let mirrored = track(ExecutedStages::MIRROR, rotated, mirror(cache, rotated, request.mirror)?);
        let formatted = track(
            ExecutedStages::CONVERT_FORMAT,
            mirrored,
            convert_format(cache, mirrored, request.pixel_format, &self.config)?,
        );
        let output = track(
            ExecutedStages::CONVERT_TYPE,
            formatted,
            convert_data_type(cache, formatted, request.data_type, &self.config)?,
        );

        debug!(stages = ?stages, width = output.width, height = output.height, "frame processed");
        let bytes = output.data(&self.cache).ok_or_else(|| {
            PipelineError::stage_failed(
                Stage::ConvertType,
                format!("final {} slot does not match its descriptor", output.slot),
            )
        })?;
        Ok(FrameView::new(output, bytes, stages))
    }
}

/// A [`ResizePipeline`] behind a mutex, for frame callbacks that run on
/// several threads. Calls are serialized; the view only lives inside the
/// closure passed to [`SharedPipeline::process_with`].
#[derive(Clone)]
pub struct SharedPipeline {
    inner: Arc<Mutex<ResizePipeline>>,
}

impl SharedPipeline {
    pub fn new(pipeline: ResizePipeline) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pipeline)),
        }
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        Self::new(ResizePipeline::with_config(config))
    }

    pub fn process_with<F, R>(
        &self,
        frame: &F,
        request: &ResizeRequest,
        consume: impl FnOnce(FrameView<'_>) -> R,
    ) -> PipelineResult<R>
    where
        F: CameraFrame + ?Sized,
    {
        let mut pipeline = self.inner.lock();
        let view = pipeline.process(frame, request)?;
        Ok(consume(view))
    }

    /// Process and copy the result out.
    pub fn process_to_vec<F>(&self, frame: &F, request: &ResizeRequest) -> PipelineResult<Vec<u8>>
    where
        F: CameraFrame + ?Sized,
    {
        self.process_with(frame, request, |view| view.to_vec())
    }

    pub fn release_buffers(&self) {
        self.inner.lock().release_buffers();
    }
}

impl Default for SharedPipeline {
    fn default() -> Self {
        Self::new(ResizePipeline::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cache::BufferRole;
    use crate::engine::source::{Plane, SourceFrame};
    use crate::format::{DataType, PixelFormat, Rotation};
    use crate::ops::{CropRect, ScaleSize};

    fn rgba_frame(data: &[u8], width: u32, height: u32) -> SourceFrame<'_> {
        SourceFrame::rgba_8888(width, height, Plane::new(data, width as usize * 4, 4))
    }

    #[test]
    fn identity_runs_ingest_only() {
        let data = vec![7u8; 4 * 4 * 4];
        let mut pipeline = ResizePipeline::new();
        let view = pipeline
            .process(&rgba_frame(&data, 4, 4), &ResizeRequest::identity(4, 4))
            .unwrap();
        assert_eq!(view.stages(), ExecutedStages::INGEST);
        assert_eq!(view.frame().slot, BufferRole::Ingest);
    }

    #[test]
    fn every_stage_reports_work() {
        let data = vec![7u8; 8 * 6 * 4];
        let request = ResizeRequest {
            crop: CropRect::new(1, 1, 6, 4),
            scale: ScaleSize::new(3, 2),
            rotation: Rotation::Rotation270,
            mirror: true,
            pixel_format: PixelFormat::Bgr,
            data_type: DataType::Float32,
        };
        let mut pipeline = ResizePipeline::new();
        let view = pipeline.process(&rgba_frame(&data, 8, 6), &request).unwrap();
        assert_eq!(view.stages(), ExecutedStages::all());
        assert_eq!((view.width(), view.height()), (2, 3));
        assert_eq!(view.bytes().len(), 2 * 3 * 3 * 4);
    }

    #[test]
    fn invalid_request_allocates_nothing() {
        let data = vec![0u8; 4 * 4 * 4];
        let mut request = ResizeRequest::identity(4, 4);
        request.crop = CropRect::new(2, 2, 4, 4);
        let mut pipeline = ResizePipeline::new();
        let err = pipeline.process(&rgba_frame(&data, 4, 4), &request).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidCropBounds { .. }));
        assert!(pipeline.cache().is_empty());
    }

    #[test]
    fn scale_limit_is_enforced() {
        let data = vec![0u8; 4 * 4 * 4];
        let mut request = ResizeRequest::identity(4, 4);
        request.scale = ScaleSize::new(64, 64);
        let mut pipeline = ResizePipeline::with_config(PipelineConfig::default().with_max_dimension(32));
        assert!(matches!(
            pipeline.process(&rgba_frame(&data, 4, 4), &request),
            Err(PipelineError::DimensionExceedsLimit { dimension: 64, max: 32 })
        ));
    }

    #[test]
    fn shared_pipeline_serializes_calls() {
        let data = vec![9u8; 4 * 4 * 4];
        let shared = SharedPipeline::default();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                let data = data.clone();
                std::thread::spawn(move || {
                    shared
                        .process_to_vec(&rgba_frame(&data, 4, 4), &ResizeRequest::identity(4, 4))
                        .unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec![9u8; 64]);
        }
    }
}
