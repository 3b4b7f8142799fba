use thiserror::Error;
use tracing::debug;

use crate::framebuffer::FrameBuffer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConcatError {
    #[error("nothing to concatenate")]
    Empty,
    #[error("buffer {index} has height {found}, expected {expected}")]
    HeightMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Places buffers side by side, left to right in slice order.
///
/// All inputs must share one height; the output width is the sum of theirs.
pub fn hconcat(buffers: &[FrameBuffer]) -> Result<FrameBuffer, ConcatError> {
    let first = buffers.first().ok_or(ConcatError::Empty)?;
    let height = first.height();

    for (index, fb) in buffers.iter().enumerate().skip(1) {
        if fb.height() != height {
            return Err(ConcatError::HeightMismatch {
                index,
                expected: height,
                found: fb.height(),
            });
        }
    }

    let width: usize = buffers.iter().map(|fb| fb.width()).sum();
    debug!(count = buffers.len(), width, height, "Concatenating horizontally");

    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for fb in buffers {
            if let Some(row) = fb.row(y) {
                pixels.extend_from_slice(row);
            }
        }
    }

    Ok(FrameBuffer::from_parts(width, height, pixels))
}
