use frame_resize::{
    CropRect, DataType, ExecutedStages, PixelFormat, Plane, ResizePipeline, ResizeRequest,
    Rotation, ScaleSize, SourceFrame,
};
use proptest::prelude::*;

fn rgba_source(width: u32, height: u32, seed: u8) -> Vec<u8> {
    (0..width * height * 4)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .collect()
}

fn valid_crop_strategy() -> impl Strategy<Value = (u32, u32, CropRect)> {
    (1u32..=48, 1u32..=48)
        .prop_flat_map(|(img_w, img_h)| (Just(img_w), Just(img_h), 1u32..=img_w, 1u32..=img_h))
        .prop_flat_map(|(img_w, img_h, crop_w, crop_h)| {
            (
                Just(img_w),
                Just(img_h),
                Just(crop_w),
                Just(crop_h),
                0u32..=img_w - crop_w,
                0u32..=img_h - crop_h,
            )
        })
        .prop_map(|(img_w, img_h, crop_w, crop_h, x, y)| {
            (img_w, img_h, CropRect::new(x, y, crop_w, crop_h))
        })
}

fn rotation_strategy() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        Just(Rotation::Rotation0),
        Just(Rotation::Rotation90),
        Just(Rotation::Rotation180),
        Just(Rotation::Rotation270),
    ]
}

fn format_strategy() -> impl Strategy<Value = PixelFormat> {
    proptest::sample::select(PixelFormat::ALL.to_vec())
}

fn data_type_strategy() -> impl Strategy<Value = DataType> {
    prop_oneof![Just(DataType::Uint8), Just(DataType::Float32)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_shape_matches_request(
        (img_w, img_h, crop) in valid_crop_strategy(),
        scale_w in 1u32..=40,
        scale_h in 1u32..=40,
        rotation in rotation_strategy(),
        mirror in any::<bool>(),
        pixel_format in format_strategy(),
        data_type in data_type_strategy(),
        seed in any::<u8>(),
    ) {
        let data = rgba_source(img_w, img_h, seed);
        let frame = SourceFrame::rgba_8888(img_w, img_h, Plane::new(&data, img_w as usize * 4, 4));
        let request = ResizeRequest {
            crop,
            scale: ScaleSize::new(scale_w, scale_h),
            rotation,
            mirror,
            pixel_format,
            data_type,
        };

        let mut pipeline = ResizePipeline::new();
        let view = pipeline.process(&frame, &request).unwrap();

        let (out_w, out_h) = match rotation {
            Rotation::Rotation90 | Rotation::Rotation270 => (scale_h, scale_w),
            Rotation::Rotation0 | Rotation::Rotation180 => (scale_w, scale_h),
        };
        prop_assert_eq!((view.width(), view.height()), (out_w, out_h));
        let bytes_per_sample = match data_type {
            DataType::Uint8 => 1,
            DataType::Float32 => 4,
        };
        prop_assert_eq!(
            view.bytes().len(),
            (out_w * out_h) as usize * pixel_format.channel_count() * bytes_per_sample
        );

        let stages = view.stages();
        prop_assert_eq!(stages.contains(ExecutedStages::CROP), !crop.is_full(img_w, img_h));
        prop_assert_eq!(
            stages.contains(ExecutedStages::SCALE),
            (scale_w, scale_h) != (crop.width, crop.height)
        );
        prop_assert_eq!(stages.contains(ExecutedStages::ROTATE), rotation != Rotation::Rotation0);
        prop_assert_eq!(stages.contains(ExecutedStages::MIRROR), mirror);
        prop_assert_eq!(
            stages.contains(ExecutedStages::CONVERT_FORMAT),
            pixel_format != PixelFormat::Argb
        );
        prop_assert_eq!(
            stages.contains(ExecutedStages::CONVERT_TYPE),
            data_type == DataType::Float32
        );
    }

    #[test]
    fn repeated_calls_are_deterministic(
        (img_w, img_h, crop) in valid_crop_strategy(),
        rotation in rotation_strategy(),
        mirror in any::<bool>(),
        seed in any::<u8>(),
    ) {
        let data = rgba_source(img_w, img_h, seed);
        let frame = SourceFrame::rgba_8888(img_w, img_h, Plane::new(&data, img_w as usize * 4, 4));
        let request = ResizeRequest {
            crop,
            scale: ScaleSize::new(crop.width, crop.height),
            rotation,
            mirror,
            pixel_format: PixelFormat::Rgba,
            data_type: DataType::Uint8,
        };

        let mut pipeline = ResizePipeline::new();
        let first = pipeline.process(&frame, &request).unwrap().to_vec();
        let allocations = pipeline.cache().allocation_count();
        let second = pipeline.process(&frame, &request).unwrap().to_vec();
        prop_assert_eq!(first, second);
        prop_assert_eq!(pipeline.cache().allocation_count(), allocations);
    }

    #[test]
    fn geometry_only_permutes_pixels(
        (img_w, img_h, crop) in valid_crop_strategy(),
        rotation in rotation_strategy(),
        mirror in any::<bool>(),
        seed in any::<u8>(),
    ) {
        let data = rgba_source(img_w, img_h, seed);
        let frame = SourceFrame::rgba_8888(img_w, img_h, Plane::new(&data, img_w as usize * 4, 4));
        let request = ResizeRequest {
            crop,
            scale: ScaleSize::new(crop.width, crop.height),
            rotation,
            mirror,
            pixel_format: PixelFormat::Rgba,
            data_type: DataType::Uint8,
        };

        let mut expected: Vec<[u8; 4]> = Vec::new();
        for y in crop.y..crop.y + crop.height {
            for x in crop.x..crop.x + crop.width {
                let at = ((y * img_w + x) * 4) as usize;
                expected.push([data[at], data[at + 1], data[at + 2], data[at + 3]]);
            }
        }
        expected.sort_unstable();

        let mut pipeline = ResizePipeline::new();
        let view = pipeline.process(&frame, &request).unwrap();
        let mut got: Vec<[u8; 4]> = view
            .bytes()
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect();
        got.sort_unstable();
        prop_assert_eq!(got, expected);
    }
}
