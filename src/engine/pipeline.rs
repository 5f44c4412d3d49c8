// src/engine/pipeline.rs
//
// Transform stages: crop, scale, rotate, mirror, pixel-format convert,
// datatype convert.
//
// Every stage has the same shape: return the input descriptor untouched when
// the requested change is the identity, otherwise size the stage's cache
// slot, run the routine into it and describe the slot.

use crate::engine::cache::{BufferCache, BufferRole};
use crate::engine::common::{for_each_row, PipelineResult};
use crate::engine::config::{ConversionProfile, PipelineConfig};
use crate::engine::frame::FrameBuffer;
use crate::error::{PipelineError, Stage};
use crate::format::{DataType, PixelFormat, Rotation};
use crate::ops::{CropRect, ScaleSize};
use fast_image_resize::{self as fir, PixelType, ResizeOptions};
use image::{imageops, ImageBuffer, Pixel, Rgb, Rgba};
use tracing::{debug, trace};

fn rect_string(x: u32, y: u32, width: u32, height: u32) -> String {
    format!("{x}, {y} @ {width}x{height}")
}

/// Run `kernel` from `input`'s slot into `output`'s slot.
///
/// The output slot is moved out of the cache while the kernel runs and is
/// put back whether or not the kernel succeeds.
fn run_stage<K>(
    cache: &mut BufferCache,
    input: &FrameBuffer,
    output: FrameBuffer,
    stage: Stage,
    kernel: K,
) -> PipelineResult<FrameBuffer>
where
    K: FnOnce(&[u8], &mut [u8]) -> Result<(), String>,
{
    let mut dst = cache.checkout(output.slot, output.byte_len())?;
    let result = match input.data(cache) {
        Some(src) => kernel(src, &mut dst).map_err(|reason| PipelineError::stage_failed(stage, reason)),
        None => Err(PipelineError::stage_failed(
            stage,
            format!(
                "{} slot does not hold a {}x{} {} {} frame",
                input.slot, input.width, input.height, input.pixel_format, input.data_type
            ),
        )),
    };
    cache.restore(output.slot, dst);
    result.map(|()| output)
}

// =============================================================================
// CROP
// =============================================================================

/// Reject empty or out-of-bounds crop rectangles for a `width`x`height` frame.
pub fn validate_crop(rect: &CropRect, width: u32, height: u32) -> PipelineResult<()> {
    if rect.width == 0 || rect.height == 0 {
        return Err(PipelineError::invalid_crop_dimensions(rect.width, rect.height));
    }
    if rect.x as u64 + rect.width as u64 > width as u64
        || rect.y as u64 + rect.height as u64 > height as u64
    {
        return Err(PipelineError::invalid_crop_bounds(
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            width,
            height,
        ));
    }
    Ok(())
}

pub fn crop(
    cache: &mut BufferCache,
    input: FrameBuffer,
    rect: CropRect,
) -> PipelineResult<FrameBuffer> {
    if rect.is_full(input.width, input.height) {
        trace!("crop: already in correct size");
        return Ok(input);
    }
    if rect.width == 0 || rect.height == 0 {
        return Err(PipelineError::invalid_crop_dimensions(rect.width, rect.height));
    }
    // Rows are contiguous, so a horizontal overrun would read into the next row.
    if rect.x as u64 + rect.width as u64 > input.width as u64
        || rect.y as u64 + rect.height as u64 > input.height as u64
    {
        return Err(PipelineError::stage_failed(
            Stage::Crop,
            format!(
                "crop region [{}] exceeds source [{}]",
                rect_string(rect.x, rect.y, rect.width, rect.height),
                rect_string(0, 0, input.width, input.height)
            ),
        ));
    }
    debug!(
        from = %rect_string(0, 0, input.width, input.height),
        to = %rect_string(rect.x, rect.y, rect.width, rect.height),
        "cropping buffer"
    );

    let output = FrameBuffer {
        width: rect.width,
        height: rect.height,
        slot: BufferRole::Crop,
        ..input
    };
    let bpp = input.bytes_per_pixel();
    let src_row_bytes = input.bytes_per_row();
    let dst_row_bytes = output.bytes_per_row();
    run_stage(cache, &input, output, Stage::Crop, |src, dst| {
        let x_offset = rect.x as usize * bpp;
        for (row, line) in dst.chunks_exact_mut(dst_row_bytes).enumerate() {
            let start = (rect.y as usize + row) * src_row_bytes + x_offset;
            let source = src
                .get(start..start + dst_row_bytes)
                .ok_or_else(|| {
                    format!(
                        "crop region [{}] exceeds source [{}]",
                        rect_string(rect.x, rect.y, rect.width, rect.height),
                        rect_string(0, 0, input.width, input.height)
                    )
                })?;
            line.copy_from_slice(source);
        }
        Ok(())
    })
}

// =============================================================================
// SCALE
// =============================================================================

fn scale_options() -> ResizeOptions {
    // Alpha sits in the first byte, fir's alpha handling assumes the last.
    ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::Bilinear))
        .use_alpha(false)
}

fn fir_pixel_type(frame: &FrameBuffer) -> Option<PixelType> {
    match (frame.data_type, frame.pixel_format.channel_count()) {
        (DataType::Uint8, 4) => Some(PixelType::U8x4),
        (DataType::Uint8, 3) => Some(PixelType::U8x3),
        _ => None,
    }
}

pub fn scale(
    cache: &mut BufferCache,
    resizer: &mut fir::Resizer,
    input: FrameBuffer,
    size: ScaleSize,
) -> PipelineResult<FrameBuffer> {
    if (size.width, size.height) == input.dimensions() {
        trace!("scale: already in correct size");
        return Ok(input);
    }
    if size.width == 0 || size.height == 0 {
        return Err(PipelineError::invalid_scale_dimensions(size.width, size.height));
    }
    let pixel_type = fir_pixel_type(&input).ok_or_else(|| {
        PipelineError::unsupported_conversion(
            format!("scale of {} {}", input.pixel_format, input.data_type),
            "bilinear u8",
        )
    })?;
    debug!(
        from = %rect_string(0, 0, input.width, input.height),
        to = %rect_string(0, 0, size.width, size.height),
        "scaling buffer"
    );

    let output = FrameBuffer {
        width: size.width,
        height: size.height,
        slot: BufferRole::Scale,
        ..input
    };
    let options = scale_options();
    run_stage(cache, &input, output, Stage::Scale, |src, dst| {
        let src_image = fir::images::ImageRef::new(input.width, input.height, src, pixel_type)
            .map_err(|e| format!("fir source image error: {e:?}"))?;
        let mut dst_image = fir::images::Image::from_slice_u8(size.width, size.height, dst, pixel_type)
            .map_err(|e| format!("fir destination image error: {e:?}"))?;
        resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| format!("fir resize error: {e:?}"))
    })
}

// =============================================================================
// ROTATE / MIRROR
// =============================================================================

fn wrap_images<'s, 'd, P>(
    src: &'s [u8],
    dst: &'d mut [u8],
    src_dims: (u32, u32),
    dst_dims: (u32, u32),
) -> Result<(ImageBuffer<P, &'s [u8]>, ImageBuffer<P, &'d mut [u8]>), String>
where
    P: Pixel<Subpixel = u8>,
{
    let src_image = ImageBuffer::from_raw(src_dims.0, src_dims.1, src)
        .ok_or("source buffer is smaller than its frame")?;
    let dst_image = ImageBuffer::from_raw(dst_dims.0, dst_dims.1, dst)
        .ok_or("destination buffer is smaller than its frame")?;
    Ok((src_image, dst_image))
}

fn rotate_into<P>(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    rotation: Rotation,
) -> Result<(), String>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let rotated = rotation.output_dimensions(width, height);
    let (src_image, mut dst_image) = wrap_images::<P>(src, dst, (width, height), rotated)?;
    match rotation {
        Rotation::Rotation0 => {
            dst_image.copy_from_slice(&src_image);
            Ok(())
        }
        Rotation::Rotation90 => imageops::rotate90_in(&src_image, &mut dst_image),
        Rotation::Rotation180 => imageops::rotate180_in(&src_image, &mut dst_image),
        Rotation::Rotation270 => imageops::rotate270_in(&src_image, &mut dst_image),
    }
    .map_err(|e| e.to_string())
}

fn mirror_into<P>(src: &[u8], dst: &mut [u8], width: u32, height: u32) -> Result<(), String>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let dims = (width, height);
    let (src_image, mut dst_image) = wrap_images::<P>(src, dst, dims, dims)?;
    imageops::flip_horizontal_in(&src_image, &mut dst_image).map_err(|e| e.to_string())
}

fn geometry_layout(input: &FrameBuffer, stage: Stage) -> PipelineResult<usize> {
    match (input.data_type, input.pixel_format.channel_count()) {
        (DataType::Uint8, channels) => Ok(channels),
        (DataType::Float32, _) => Err(PipelineError::unsupported_conversion(
            format!("{stage} of {} {}", input.pixel_format, input.data_type),
            "u8 geometry",
        )),
    }
}

pub fn rotate(
    cache: &mut BufferCache,
    input: FrameBuffer,
    rotation: Rotation,
) -> PipelineResult<FrameBuffer> {
    if rotation == Rotation::Rotation0 {
        trace!("rotate: no rotation requested");
        return Ok(input);
    }
    let channels = geometry_layout(&input, Stage::Rotate)?;
    debug!(degrees = rotation.degrees(), width = input.width, height = input.height, "rotating buffer");

    // Row stride follows from the swapped width.
    let (width, height) = rotation.output_dimensions(input.width, input.height);
    let output = FrameBuffer {
        width,
        height,
        slot: BufferRole::Rotate,
        ..input
    };
    run_stage(cache, &input, output, Stage::Rotate, |src, dst| match channels {
        4 => rotate_into::<Rgba<u8>>(src, dst, input.width, input.height, rotation),
        _ => rotate_into::<Rgb<u8>>(src, dst, input.width, input.height, rotation),
    })
}

pub fn mirror(cache: &mut BufferCache, input: FrameBuffer, mirror: bool) -> PipelineResult<FrameBuffer> {
    if !mirror {
        trace!("mirror: not requested");
        return Ok(input);
    }
    let channels = geometry_layout(&input, Stage::Mirror)?;
    debug!(width = input.width, height = input.height, "mirroring buffer");

    let output = FrameBuffer {
        slot: BufferRole::Mirror,
        ..input
    };
    run_stage(cache, &input, output, Stage::Mirror, |src, dst| match channels {
        4 => mirror_into::<Rgba<u8>>(src, dst, input.width, input.height),
        _ => mirror_into::<Rgb<u8>>(src, dst, input.width, input.height),
    })
}

// =============================================================================
// PIXEL FORMAT
// =============================================================================

/// Byte indices into an A,R,G,B pixel, in target order.
fn argb_channel_order(target: PixelFormat) -> &'static [usize] {
    match target {
        PixelFormat::Rgb => &[1, 2, 3],
        PixelFormat::Bgr => &[3, 2, 1],
        PixelFormat::Argb => &[0, 1, 2, 3],
        PixelFormat::Rgba => &[1, 2, 3, 0],
        PixelFormat::Bgra => &[3, 2, 1, 0],
        PixelFormat::Abgr => &[0, 3, 2, 1],
    }
}

pub fn convert_format(
    cache: &mut BufferCache,
    input: FrameBuffer,
    target: PixelFormat,
    config: &PipelineConfig,
) -> PipelineResult<FrameBuffer> {
    if input.pixel_format == target {
        trace!(format = %target, "convert-format: already in target format");
        return Ok(input);
    }
    if input.pixel_format != PixelFormat::Argb || input.data_type != DataType::Uint8 {
        return Err(PipelineError::unsupported_conversion(
            format!("{} {}", input.pixel_format, input.data_type),
            target.as_str(),
        ));
    }
    if target == PixelFormat::Bgr && config.profile == ConversionProfile::Constrained {
        return Err(PipelineError::unsupported_conversion(
            "argb",
            "bgr (not available on the constrained profile)",
        ));
    }
    debug!(format = %target, width = input.width, height = input.height, "converting ARGB buffer");

    let output = FrameBuffer {
        pixel_format: target,
        slot: BufferRole::Format,
        ..input
    };
    let order = argb_channel_order(target);
    let channels = target.channel_count();
    let parallel = config.parallel_for(input.width, input.height);
    let (src_row_bytes, dst_row_bytes) = (input.bytes_per_row(), output.bytes_per_row());
    run_stage(cache, &input, output, Stage::ConvertFormat, |src, dst| {
        for_each_row(src, src_row_bytes, dst, dst_row_bytes, parallel, |s, d| {
            for (out, px) in d.chunks_exact_mut(channels).zip(s.chunks_exact(4)) {
                for (o, &i) in out.iter_mut().zip(order) {
                    *o = px[i];
                }
            }
        });
        Ok(())
    })
}

// =============================================================================
// DATA TYPE
// =============================================================================

pub fn convert_data_type(
    cache: &mut BufferCache,
    input: FrameBuffer,
    target: DataType,
    config: &PipelineConfig,
) -> PipelineResult<FrameBuffer> {
    match (input.data_type, target) {
        (DataType::Uint8, DataType::Uint8) | (DataType::Float32, DataType::Float32) => {
            trace!(data_type = %target, "convert-type: already in target data type");
            return Ok(input);
        }
        (DataType::Float32, DataType::Uint8) => {
            // No scale-back is defined; refuse rather than guess one.
            return Err(PipelineError::unsupported_conversion("float32", "uint8"));
        }
        (DataType::Uint8, DataType::Float32) => {}
    }
    debug!(format = %input.pixel_format, width = input.width, height = input.height, "converting buffer to float32");

    let output = FrameBuffer {
        data_type: target,
        slot: BufferRole::DataType,
        ..input
    };
    let parallel = config.parallel_for(input.width, input.height);
    let (src_row_bytes, dst_row_bytes) = (input.bytes_per_row(), output.bytes_per_row());
    run_stage(cache, &input, output, Stage::ConvertType, |src, dst| {
        for_each_row(src, src_row_bytes, dst, dst_row_bytes, parallel, |s, d| {
            for (out, &sample) in d.chunks_exact_mut(4).zip(s) {
                out.copy_from_slice(&(f32::from(sample) / 255.0).to_ne_bytes());
            }
        });
        Ok(())
    })
}
