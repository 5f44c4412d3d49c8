#![no_main]

use arbitrary::Arbitrary;
use frame_resize::{
    CropRect, DataType, PipelineConfig, PixelFormat, Plane, ResizePipeline, ResizeRequest,
    Rotation, ScaleSize, SourceFrame,
};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct PlaneSeed {
    row_stride: u8,
    pixel_stride: u8,
    offset: u8,
}

#[derive(Arbitrary, Debug)]
struct FrameSeed {
    yuv: bool,
    width: u8,
    height: u8,
    planes: [PlaneSeed; 3],
    crop: (u8, u8, u8, u8),
    scale: (u8, u8),
    rotation: u8,
    mirror: bool,
    pixel_format: u8,
    data_type: u8,
    constrained: bool,
    data: Vec<u8>,
}

fn plane<'a>(data: &'a [u8], seed: &PlaneSeed) -> Plane<'a> {
    let start = (seed.offset as usize).min(data.len());
    Plane::new(&data[start..], seed.row_stride as usize, seed.pixel_stride as usize)
}

fuzz_target!(|seed: FrameSeed| {
    let (width, height) = (seed.width as u32 % 64, seed.height as u32 % 64);
    let frame = if seed.yuv {
        SourceFrame::yuv_420_888(
            width,
            height,
            plane(&seed.data, &seed.planes[0]),
            plane(&seed.data, &seed.planes[1]),
            plane(&seed.data, &seed.planes[2]),
        )
    } else {
        SourceFrame::rgba_8888(width, height, plane(&seed.data, &seed.planes[0]))
    };

    let request = ResizeRequest {
        crop: CropRect::new(
            seed.crop.0 as u32 % 64,
            seed.crop.1 as u32 % 64,
            seed.crop.2 as u32 % 65,
            seed.crop.3 as u32 % 65,
        ),
        scale: ScaleSize::new(seed.scale.0 as u32 % 96, seed.scale.1 as u32 % 96),
        rotation: Rotation::from_degrees(seed.rotation as i32 % 4 * 90).unwrap_or(Rotation::Rotation0),
        mirror: seed.mirror,
        pixel_format: PixelFormat::ALL[seed.pixel_format as usize % PixelFormat::ALL.len()],
        data_type: if seed.data_type % 2 == 0 {
            DataType::Uint8
        } else {
            DataType::Float32
        },
    };

    let config = if seed.constrained {
        PipelineConfig::constrained()
    } else {
        PipelineConfig::portable()
    };
    let mut pipeline = ResizePipeline::with_config(config);

    // Errors are fine; panics and mis-sized outputs are not.
    if let Ok(view) = pipeline.process(&frame, &request) {
        let (w, h) = request.output_dimensions();
        assert_eq!((view.width(), view.height()), (w, h));
        assert_eq!(view.bytes().len(), view.frame().byte_len());
    }
});
