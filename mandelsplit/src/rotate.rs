use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::framebuffer::FrameBuffer;

/// Mirror axis, named after which order gets reversed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flip {
    /// Row order reversed (upside down).
    Vertical,
    /// Column order reversed (mirror).
    Horizontal,
    /// Both reversed, i.e. a 180 degree rotation.
    Both,
}

impl Flip {
    /// OpenCV-style flip code: `0` vertical, positive horizontal, negative both.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Vertical,
            c if c > 0 => Self::Horizontal,
            _ => Self::Both,
        }
    }
}

pub fn rotate_180(fb: &FrameBuffer) -> FrameBuffer {
    debug!(w = fb.width(), h = fb.height(), "Rotating buffer 180 degrees");

    // row-major storage reversed is both axes reversed
    let mut pixels = fb.buffer().to_vec();
    pixels.reverse();

    FrameBuffer::from_parts(fb.width(), fb.height(), pixels)
}

pub fn flip(fb: &FrameBuffer, mode: Flip) -> FrameBuffer {
    match mode {
        Flip::Both => rotate_180(fb),
        Flip::Vertical => {
            let mut pixels = Vec::with_capacity(fb.buffer().len());
            for row in fb.rows().rev() {
                pixels.extend_from_slice(row);
            }

            FrameBuffer::from_parts(fb.width(), fb.height(), pixels)
        }
        Flip::Horizontal => {
            let mut pixels = Vec::with_capacity(fb.buffer().len());
            for row in fb.rows() {
                pixels.extend(row.iter().rev());
            }

            FrameBuffer::from_parts(fb.width(), fb.height(), pixels)
        }
    }
}
