//! Top-edge tracing of a binary map.
//!
//! The top edge of a column is its first white pixel counted from the top.
//! Markers are drawn as hollow white squares centered on those pixels.

use tracing::debug;

use crate::framebuffer::{FrameBuffer, Pixel};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Marker {
    pub x: usize,
    pub y: usize,
}

/// One marker per column that has a white pixel, left to right.
pub fn top_edge(fb: &FrameBuffer) -> Vec<Marker> {
    let markers: Vec<Marker> = (0..fb.width())
        .filter_map(|x| {
            (0..fb.height())
                .find(|&y| fb.pixel(x, y).map_or(false, Pixel::is_white))
                .map(|y| Marker { x, y })
        })
        .collect();

    debug!(columns = fb.width(), found = markers.len(), "Traced top edge");

    markers
}

/// Outlines a `(2 * half_size + 1)` square around every marker, clipped to the buffer.
pub fn draw_markers(fb: &mut FrameBuffer, markers: &[Marker], half_size: u32) {
    let half = half_size as i64;
    let (w, h) = (fb.width() as i64, fb.height() as i64);

    for m in markers {
        let (cx, cy) = (m.x as i64, m.y as i64);
        let (x0, x1) = (cx - half, cx + half);
        let (y0, y1) = (cy - half, cy + half);

        // only the visible part of each edge is walked
        for x in x0.max(0)..=x1.min(w - 1) {
            put(fb, x, y0);
            put(fb, x, y1);
        }

        for y in y0.max(0)..=y1.min(h - 1) {
            put(fb, x0, y);
            put(fb, x1, y);
        }
    }
}

fn put(fb: &mut FrameBuffer, x: i64, y: i64) {
    if x < 0 || y < 0 {
        return;
    }

    if let Some(p) = fb.pixel_mut(x as usize, y as usize) {
        *p = Pixel::white();
    }
}
