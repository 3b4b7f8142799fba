use std::fmt::{Display, Formatter};

use thiserror::Error;
use tracing::debug;

use crate::framebuffer::FrameBuffer;

/// Half-open rectangle `x_min..x_max` by `y_min..y_max`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub x_min: usize,
    pub y_min: usize,
    pub x_max: usize,
    pub y_max: usize,
}

impl Region {
    pub fn whole(fb: &FrameBuffer) -> Self {
        Self {
            x_min: 0,
            y_min: 0,
            x_max: fb.width(),
            y_max: fb.height(),
        }
    }

    /// Full-width band of rows `y_min..y_max`.
    pub fn rows(y_min: usize, y_max: usize, width: usize) -> Self {
        Self {
            x_min: 0,
            y_min,
            x_max: width,
            y_max,
        }
    }

    pub fn width(&self) -> usize {
        self.x_max.saturating_sub(self.x_min)
    }

    pub fn height(&self) -> usize {
        self.y_max.saturating_sub(self.y_min)
    }

    pub fn check(&self, fb: &FrameBuffer) -> Result<(), RegionError> {
        if self.x_min > self.x_max || self.y_min > self.y_max {
            return Err(RegionError::Inverted(*self));
        }

        if self.x_max > fb.width() || self.y_max > fb.height() {
            return Err(RegionError::OutOfBounds {
                region: *self,
                width: fb.width(),
                height: fb.height(),
            });
        }

        Ok(())
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}..{}, {}..{}]",
            self.x_min, self.x_max, self.y_min, self.y_max
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("region {0} has its bounds inverted")]
    Inverted(Region),
    #[error("region {region} lies outside a {width}x{height} buffer")]
    OutOfBounds {
        region: Region,
        width: usize,
        height: usize,
    },
}

impl FrameBuffer {
    /// Copies `region` out into a new buffer.
    pub fn crop(&self, region: Region) -> Result<FrameBuffer, RegionError> {
        region.check(self)?;

        let (w, h) = (region.width(), region.height());

        if region.x_min == 0 && region.x_max == self.width() {
            let start = region.y_min * self.width();
            let pixels = self.buffer()[start..start + w * h].to_vec();

            return Ok(FrameBuffer::from_parts(w, h, pixels));
        }

        let mut pixels = Vec::with_capacity(w * h);
        for row in self.rows().skip(region.y_min).take(h) {
            pixels.extend_from_slice(&row[region.x_min..region.x_max]);
        }

        Ok(FrameBuffer::from_parts(w, h, pixels))
    }
}

/// Row index the image is split at: `height / 2` rounded half to even.
pub fn midline(height: usize) -> usize {
    (height as f64 / 2.0).round_ties_even() as usize
}

/// Splits into `(upper, lower)`: rows `0..row` and `row..height`, all columns.
pub fn split_rows(fb: &FrameBuffer, row: usize) -> Result<(FrameBuffer, FrameBuffer), RegionError> {
    let (w, h) = (fb.width(), fb.height());

    let upper = fb.crop(Region::rows(0, row, w))?;
    let lower = fb.crop(Region::rows(row, h, w))?;

    debug!(
        row,
        upper = upper.height(),
        lower = lower.height(),
        "Split buffer"
    );

    Ok((upper, lower))
}

pub fn split_at_midline(fb: &FrameBuffer) -> Result<(FrameBuffer, FrameBuffer), RegionError> {
    split_rows(fb, midline(fb.height()))
}
