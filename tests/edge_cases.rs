// tests/edge_cases.rs
//
// Edge case tests for frame-resize
// Tests boundary values, invalid inputs, and error handling

use frame_resize::engine::{convert_data_type, ingest, BufferCache, BufferRole, FrameBuffer};
use frame_resize::{
    CameraFrame, CropRect, DataType, ErrorCategory, PipelineConfig, PipelineError, PixelFormat,
    Plane, ResizePipeline, ResizeRequest, Rotation, ScaleSize, SourceFormat, SourceFrame, Stage,
    MAX_DIMENSION,
};

fn rgba_frame(data: &[u8], width: u32, height: u32) -> SourceFrame<'_> {
    SourceFrame::rgba_8888(width, height, Plane::new(data, width as usize * 4, 4))
}

/// Frame that claims a size without carrying pixels; limits must trip
/// before any plane is read.
struct HugeFrame {
    width: u32,
    height: u32,
}

impl CameraFrame for HugeFrame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn source_format(&self) -> SourceFormat {
        SourceFormat::Rgba8888
    }

    fn plane(&self, _index: usize) -> Option<Plane<'_>> {
        panic!("plane must not be read for an oversized frame");
    }
}

// =============================================================================
// PARAMETER DECODING
// =============================================================================

#[test]
fn test_rotation_rejects_non_right_angles() {
    for degrees in [45, -90, 360, 1] {
        assert_eq!(
            Rotation::from_degrees(degrees),
            Err(PipelineError::InvalidRotationAngle { degrees })
        );
    }
    assert_eq!("270deg".parse::<Rotation>().unwrap(), Rotation::Rotation270);
    assert!(matches!(
        "sideways".parse::<Rotation>(),
        Err(PipelineError::InvalidArgument { .. })
    ));
}

#[test]
fn test_out_of_range_ordinals_are_unsupported() {
    assert!(matches!(
        PixelFormat::from_ordinal(6),
        Err(PipelineError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        PixelFormat::from_ordinal(-1),
        Err(PipelineError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        DataType::from_ordinal(2),
        Err(PipelineError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        SourceFormat::from_android_code(17),
        Err(PipelineError::UnsupportedFormat { .. })
    ));
}

// =============================================================================
// REQUEST VALIDATION
// =============================================================================

#[test]
fn test_zero_crop_is_rejected() {
    let data = vec![0u8; 4 * 4 * 4];
    let mut request = ResizeRequest::identity(4, 4);
    request.crop = CropRect::new(0, 0, 0, 4);
    let err = ResizePipeline::new()
        .process(&rgba_frame(&data, 4, 4), &request)
        .unwrap_err();
    assert_eq!(err, PipelineError::InvalidCropDimensions { width: 0, height: 4 });
    assert_eq!(err.category(), ErrorCategory::UserError);
    assert!(err.is_recoverable());
}

#[test]
fn test_crop_exceeding_frame_is_rejected() {
    let data = vec![0u8; 4 * 4 * 4];
    let mut request = ResizeRequest::identity(4, 4);
    request.crop = CropRect::new(1, 0, 4, 4);
    assert!(matches!(
        ResizePipeline::new().process(&rgba_frame(&data, 4, 4), &request),
        Err(PipelineError::InvalidCropBounds {
            x: 1,
            frame_width: 4,
            ..
        })
    ));
}

#[test]
fn test_zero_scale_is_rejected() {
    let data = vec![0u8; 4 * 4 * 4];
    let mut request = ResizeRequest::identity(4, 4);
    request.scale = ScaleSize::new(4, 0);
    assert!(matches!(
        ResizePipeline::new().process(&rgba_frame(&data, 4, 4), &request),
        Err(PipelineError::InvalidScaleDimensions { .. })
    ));
}

#[test]
fn test_oversized_source_is_rejected_before_ingest() {
    let frame = HugeFrame {
        width: MAX_DIMENSION + 1,
        height: 2,
    };
    let err = ResizePipeline::new()
        .process(&frame, &ResizeRequest::identity(2, 2))
        .unwrap_err();
    assert!(matches!(err, PipelineError::DimensionExceedsLimit { .. }));
    assert_eq!(err.category(), ErrorCategory::ResourceLimit);

    let frame = HugeFrame {
        width: 20_000,
        height: 20_000,
    };
    assert!(matches!(
        ResizePipeline::new().process(&frame, &ResizeRequest::identity(2, 2)),
        Err(PipelineError::PixelCountExceedsLimit { .. })
    ));
}

#[test]
fn test_single_pixel_frame() {
    let data = [1u8, 2, 3, 4];
    let mut request = ResizeRequest::identity(1, 1);
    request.rotation = Rotation::Rotation90;
    request.mirror = true;
    request.pixel_format = PixelFormat::Bgr;
    let mut pipeline = ResizePipeline::new();
    let view = pipeline.process(&rgba_frame(&data, 1, 1), &request).unwrap();
    assert_eq!(view.bytes(), &[3, 2, 1]);
}

#[test]
fn test_odd_dimensions_yuv() {
    let (w, h) = (5u32, 3u32);
    let y = vec![128u8; 15];
    let u = vec![128u8; 3 * 2];
    let v = vec![128u8; 3 * 2];
    let frame = SourceFrame::yuv_420_888(
        w,
        h,
        Plane::new(&y, 5, 1),
        Plane::new(&u, 3, 1),
        Plane::new(&v, 3, 1),
    );
    let mut request = ResizeRequest::identity(w, h);
    request.scale = ScaleSize::new(3, 7);
    let view = ResizePipeline::new().process(&frame, &request).map(|v| v.to_vec()).unwrap();
    assert_eq!(view.len(), 3 * 7 * 4);
}

// =============================================================================
// SOURCE FRAME ERRORS
// =============================================================================

#[test]
fn test_mismatched_chroma_pixel_strides() {
    let y = vec![0u8; 16];
    let uv = vec![128u8; 16];
    let frame = SourceFrame::yuv_420_888(
        4,
        4,
        Plane::new(&y, 4, 1),
        Plane::new(&uv, 4, 2),
        Plane::new(&uv, 2, 1),
    );
    let err = ResizePipeline::new()
        .process(&frame, &ResizeRequest::identity(4, 4))
        .unwrap_err();
    assert_eq!(
        err,
        PipelineError::InconsistentChromaStride {
            u_pixel_stride: 2,
            v_pixel_stride: 1,
        }
    );
}

#[test]
fn test_truncated_luma_plane() {
    let y = vec![0u8; 15];
    let uv = vec![128u8; 4];
    let frame = SourceFrame::yuv_420_888(
        4,
        4,
        Plane::new(&y, 4, 1),
        Plane::new(&uv, 2, 1),
        Plane::new(&uv, 2, 1),
    );
    assert!(matches!(
        ResizePipeline::new().process(&frame, &ResizeRequest::identity(4, 4)),
        Err(PipelineError::InvalidSourceFrame { .. })
    ));
}

#[test]
fn test_zero_sized_source_fails_request_validation() {
    // The crop cannot fit a zero-width frame, so validation rejects it
    // before ingest runs.
    let frame = rgba_frame(&[], 0, 4);
    let mut pipeline = ResizePipeline::new();
    assert!(matches!(
        pipeline.process(&frame, &ResizeRequest::identity(1, 1)),
        Err(PipelineError::InvalidCropBounds { frame_width: 0, .. })
    ));
    assert!(pipeline.cache().is_empty());
}

#[test]
fn test_zero_sized_source_fails_ingest() {
    let data = vec![0u8; 16];
    for (width, height) in [(0, 4), (4, 0)] {
        let frame = rgba_frame(&data, width, height);
        let mut cache = BufferCache::new();
        let err = ingest(&mut cache, &frame, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSourceFrame { .. }), "{width}x{height}: {err:?}");
        assert!(cache.is_empty());
    }
}

// =============================================================================
// CONVERSION ERRORS
// =============================================================================

#[test]
fn test_constrained_profile_rejects_bgr() {
    let data = vec![0u8; 4 * 4 * 4];
    let mut request = ResizeRequest::identity(4, 4);
    request.pixel_format = PixelFormat::Bgr;

    let mut constrained = ResizePipeline::with_config(PipelineConfig::constrained());
    let err = constrained.process(&rgba_frame(&data, 4, 4), &request).unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedConversion { .. }));

    let mut portable = ResizePipeline::new();
    assert!(portable.process(&rgba_frame(&data, 4, 4), &request).is_ok());
}

#[test]
fn test_float_to_uint8_is_unsupported() {
    let mut cache = BufferCache::new();
    let input = FrameBuffer::new(2, 2, PixelFormat::Rgb, DataType::Float32, BufferRole::DataType);
    cache.get_or_allocate(BufferRole::DataType, input.byte_len()).unwrap();
    let err = convert_data_type(&mut cache, input, DataType::Uint8, &PipelineConfig::default())
        .unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedConversion { .. }));
}

#[test]
fn test_stage_failures_are_not_recoverable() {
    let err = PipelineError::stage_failed(Stage::Scale, "routine returned -1");
    assert!(matches!(err, PipelineError::ScaleFailed { .. }));
    assert_eq!(err.stage(), Some(Stage::Scale));
    assert_eq!(err.category(), ErrorCategory::ConversionError);
    assert!(!err.is_recoverable());
}

#[test]
fn test_pipeline_recovers_after_error() {
    let data = vec![5u8; 4 * 4 * 4];
    let frame = rgba_frame(&data, 4, 4);
    let mut pipeline = ResizePipeline::with_config(PipelineConfig::constrained());

    let mut bad = ResizeRequest::identity(4, 4);
    bad.pixel_format = PixelFormat::Bgr;
    assert!(pipeline.process(&frame, &bad).is_err());

    let mut good = ResizeRequest::identity(4, 4);
    good.pixel_format = PixelFormat::Rgb;
    let view = pipeline.process(&frame, &good).unwrap();
    assert_eq!(view.bytes(), vec![5u8; 4 * 4 * 3].as_slice());
}
