// src/engine/common.rs
//
// Common utilities shared across engine modules.

use crate::error::PipelineError;
use rayon::prelude::*;

// Type alias for Result - always use PipelineError to preserve error taxonomy
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// Run `kernel` over matching source/destination rows.
///
/// Rows are processed on the rayon pool when `parallel` is set, otherwise
/// sequentially on the caller's thread. Both buffers must hold the same
/// number of rows.
pub(crate) fn for_each_row<F>(
    src: &[u8],
    src_row_bytes: usize,
    dst: &mut [u8],
    dst_row_bytes: usize,
    parallel: bool,
    kernel: F,
) where
    F: Fn(&[u8], &mut [u8]) + Sync + Send,
{
    if parallel {
        dst.par_chunks_exact_mut(dst_row_bytes)
            .zip(src.par_chunks(src_row_bytes))
            .for_each(|(dst_row, src_row)| kernel(src_row, dst_row));
    } else {
        dst.chunks_exact_mut(dst_row_bytes)
            .zip(src.chunks(src_row_bytes))
            .for_each(|(dst_row, src_row)| kernel(src_row, dst_row));
    }
}

/// Checked `width * height * bytes_per_pixel`.
pub(crate) fn frame_byte_len(width: u32, height: u32, bytes_per_pixel: usize) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(bytes_per_pixel)
}
