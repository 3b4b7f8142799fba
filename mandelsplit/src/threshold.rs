use tracing::debug;

use crate::framebuffer::{FrameBuffer, Pixel};

pub const DEFAULT_THRESHOLD: u8 = 128;

/// BT.601 luma, rounded.
pub fn luma(p: &Pixel) -> u8 {
    let sum = 299 * p.r as u32 + 587 * p.g as u32 + 114 * p.b as u32;
    ((sum + 500) / 1000) as u8
}

/// Binary map: white where luma is strictly above `threshold`, black elsewhere.
pub fn binarize(fb: &FrameBuffer, threshold: u8) -> FrameBuffer {
    let pixels: Vec<Pixel> = fb
        .buffer()
        .iter()
        .map(|p| {
            if luma(p) > threshold {
                Pixel::white()
            } else {
                Pixel::black()
            }
        })
        .collect();

    debug!(
        threshold,
        white = pixels.iter().filter(|p| p.is_white()).count(),
        "Binarized buffer"
    );

    FrameBuffer::from_parts(fb.width(), fb.height(), pixels)
}
