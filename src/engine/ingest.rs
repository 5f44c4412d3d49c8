// src/engine/ingest.rs
//
// Source ingest: camera planes -> canonical packed ARGB-8 in the
// "post-ingest" slot. The only stage that reads multi-plane data.

use crate::engine::cache::{BufferCache, BufferRole};
use crate::engine::common::{for_each_row, frame_byte_len, PipelineResult};
use crate::engine::config::PipelineConfig;
use crate::engine::frame::FrameBuffer;
use crate::engine::source::{CameraFrame, Plane};
use crate::error::{PipelineError, Stage};
use crate::format::SourceFormat;
use rayon::prelude::*;
use tracing::debug;
use yuvutils_rs::{YuvPlanarImage, YuvRange, YuvStandardMatrix};

const ARGB_BYTES: usize = 4;

/// Convert `frame` to ARGB-8 at its native resolution.
pub fn ingest<F>(
    cache: &mut BufferCache,
    frame: &F,
    config: &PipelineConfig,
) -> PipelineResult<FrameBuffer>
where
    F: CameraFrame + ?Sized,
{
    let (width, height) = (frame.width(), frame.height());
    if width == 0 || height == 0 {
        return Err(PipelineError::invalid_source_frame(format!(
            "frame dimensions must be positive, got {width}x{height}"
        )));
    }
    debug!(
        width,
        height,
        format = %frame.source_format(),
        "converting source frame to ARGB-8"
    );
    match frame.source_format() {
        SourceFormat::Yuv420_888 => ingest_yuv420(cache, frame, config),
        SourceFormat::Rgba8888 => ingest_rgba8888(cache, frame, config),
    }
}

fn require_plane<'a, F>(
    frame: &'a F,
    index: usize,
    name: &'static str,
) -> PipelineResult<Plane<'a>>
where
    F: CameraFrame + ?Sized,
{
    frame.plane(index).ok_or_else(|| {
        PipelineError::invalid_source_frame(format!(
            "{} frame is missing its {name} plane",
            frame.source_format()
        ))
    })
}

fn check_plane(
    plane: &Plane<'_>,
    name: &'static str,
    samples: usize,
    rows: usize,
    sample_bytes: usize,
) -> PipelineResult<()> {
    if plane.pixel_stride == 0 {
        return Err(PipelineError::invalid_source_frame(format!(
            "{name} plane has a pixel stride of 0"
        )));
    }
    let required = plane
        .required_len(samples, rows, sample_bytes)
        .ok_or_else(|| PipelineError::invalid_source_frame(format!("{name} plane size overflows")))?;
    if plane.data.len() < required {
        return Err(PipelineError::invalid_source_frame(format!(
            "{name} plane holds {} bytes, strides require {required}",
            plane.data.len()
        )));
    }
    Ok(())
}

fn argb_len(width: u32, height: u32) -> PipelineResult<usize> {
    frame_byte_len(width, height, ARGB_BYTES).ok_or_else(|| {
        PipelineError::invalid_source_frame(format!("{width}x{height} ARGB buffer size overflows"))
    })
}

// =============================================================================
// YUV_420_888
// =============================================================================

fn ingest_yuv420<F>(
    cache: &mut BufferCache,
    frame: &F,
    config: &PipelineConfig,
) -> PipelineResult<FrameBuffer>
where
    F: CameraFrame + ?Sized,
{
    let y = require_plane(frame, 0, "Y")?;
    let u = require_plane(frame, 1, "U")?;
    let v = require_plane(frame, 2, "V")?;

    if u.pixel_stride != v.pixel_stride {
        return Err(PipelineError::inconsistent_chroma_stride(
            u.pixel_stride,
            v.pixel_stride,
        ));
    }

    let (width, height) = (frame.width(), frame.height());
    let (w, h) = (width as usize, height as usize);
    let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
    check_plane(&y, "Y", w, h, 1)?;
    check_plane(&u, "U", cw, ch, 1)?;
    check_plane(&v, "V", cw, ch, 1)?;

    let dst_len = argb_len(width, height)?;
    let mut dst = cache.checkout(BufferRole::Ingest, dst_len)?;

    let converted = if let Some(planar) = direct_planar(&y, &u, &v, width, height) {
        yuv420_to_argb(&planar, &mut dst, width)
    } else {
        // Interleaved chroma or unpadded final rows: repack into a tight
        // I420 scratch slot first.
        let scratch_len = w * h + 2 * cw * ch;
        match cache.checkout(BufferRole::IngestPlanar, scratch_len) {
            Ok(mut scratch) => {
                let (luma, chroma) = scratch.split_at_mut(w * h);
                let (u_tight, v_tight) = chroma.split_at_mut(cw * ch);
                gather_plane(&y, w, h, luma);
                gather_plane(&u, cw, ch, u_tight);
                gather_plane(&v, cw, ch, v_tight);
                let (luma, chroma) = scratch.split_at(w * h);
                let (u_tight, v_tight) = chroma.split_at(cw * ch);
                let planar = YuvPlanarImage {
                    y_plane: luma,
                    y_stride: width,
                    u_plane: u_tight,
                    u_stride: cw as u32,
                    v_plane: v_tight,
                    v_stride: cw as u32,
                    width,
                    height,
                };
                let result = yuv420_to_argb(&planar, &mut dst, width);
                cache.restore(BufferRole::IngestPlanar, scratch);
                result
            }
            Err(err) => Err(err),
        }
    };

    if converted.is_ok() {
        rgba_to_argb_in_place(&mut dst, config.parallel_for(width, height));
    }
    cache.restore(BufferRole::Ingest, dst);
    converted?;

    Ok(FrameBuffer::argb8(width, height, BufferRole::Ingest))
}

/// Planes usable as-is: unit pixel strides and fully padded rows.
fn direct_planar<'a>(
    y: &Plane<'a>,
    u: &Plane<'a>,
    v: &Plane<'a>,
    width: u32,
    height: u32,
) -> Option<YuvPlanarImage<'a, u8>> {
    let (w, h) = (width as usize, height as usize);
    let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
    let fits = |plane: &Plane<'a>, samples: usize, rows: usize| {
        plane.pixel_stride == 1
            && plane.row_stride >= samples
            && u32::try_from(plane.row_stride).is_ok()
            && plane
                .row_stride
                .checked_mul(rows)
                .is_some_and(|len| plane.data.len() >= len)
    };
    if !(fits(y, w, h) && fits(u, cw, ch) && fits(v, cw, ch)) {
        return None;
    }
    Some(YuvPlanarImage {
        y_plane: &y.data[..y.row_stride * h],
        y_stride: y.row_stride as u32,
        u_plane: &u.data[..u.row_stride * ch],
        u_stride: u.row_stride as u32,
        v_plane: &v.data[..v.row_stride * ch],
        v_stride: v.row_stride as u32,
        width,
        height,
    })
}

fn gather_plane(plane: &Plane<'_>, samples: usize, rows: usize, dst: &mut [u8]) {
    for (row, out) in dst.chunks_exact_mut(samples).take(rows).enumerate() {
        let start = row * plane.row_stride;
        if plane.pixel_stride == 1 {
            out.copy_from_slice(&plane.data[start..start + samples]);
        } else {
            for (i, sample) in out.iter_mut().enumerate() {
                *sample = plane.data[start + i * plane.pixel_stride];
            }
        }
    }
}

fn yuv420_to_argb(
    planar: &YuvPlanarImage<'_, u8>,
    dst: &mut [u8],
    width: u32,
) -> PipelineResult<()> {
    // BT.601 limited range, as produced by camera HALs.
    yuvutils_rs::yuv420_to_rgba(
        planar,
        dst,
        width * ARGB_BYTES as u32,
        YuvRange::Limited,
        YuvStandardMatrix::Bt601,
    )
    .map_err(|e| PipelineError::stage_failed(Stage::Ingest, format!("yuv420 -> rgba: {e:?}")))
}

/// R,G,B,A -> A,R,G,B for every pixel.
fn rgba_to_argb_in_place(buffer: &mut [u8], parallel: bool) {
    if parallel {
        buffer
            .par_chunks_exact_mut(ARGB_BYTES)
            .for_each(|px| px.rotate_right(1));
    } else {
        buffer
            .chunks_exact_mut(ARGB_BYTES)
            .for_each(|px| px.rotate_right(1));
    }
}

// =============================================================================
// RGBA_8888
// =============================================================================

fn ingest_rgba8888<F>(
    cache: &mut BufferCache,
    frame: &F,
    config: &PipelineConfig,
) -> PipelineResult<FrameBuffer>
where
    F: CameraFrame + ?Sized,
{
    let plane = require_plane(frame, 0, "RGBA")?;
    let (width, height) = (frame.width(), frame.height());
    let row_bytes = width as usize * ARGB_BYTES;

    if plane.pixel_stride != ARGB_BYTES {
        return Err(PipelineError::invalid_source_frame(format!(
            "RGBA plane pixel stride must be {ARGB_BYTES}, got {}",
            plane.pixel_stride
        )));
    }
    if plane.row_stride < row_bytes {
        return Err(PipelineError::invalid_source_frame(format!(
            "RGBA row stride {} is shorter than a {width}-pixel row",
            plane.row_stride
        )));
    }
    check_plane(&plane, "RGBA", width as usize, height as usize, ARGB_BYTES)?;

    let dst_len = argb_len(width, height)?;
    let mut dst = cache.checkout(BufferRole::Ingest, dst_len)?;
    for_each_row(
        plane.data,
        plane.row_stride,
        &mut dst,
        row_bytes,
        config.parallel_for(width, height),
        |src_row, dst_row| {
            for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                d.copy_from_slice(&[s[3], s[0], s[1], s[2]]);
            }
        },
    );
    cache.restore(BufferRole::Ingest, dst);

    Ok(FrameBuffer::argb8(width, height, BufferRole::Ingest))
}
