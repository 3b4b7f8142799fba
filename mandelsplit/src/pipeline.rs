use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::concat::{hconcat, ConcatError};
use crate::framebuffer::FrameBuffer;
use crate::profile::{draw_markers, top_edge, Marker};
use crate::region::{split_at_midline, Region, RegionError};
use crate::rotate::{flip, Flip};
use crate::threshold::binarize;

/// Which half ends up on the left.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfOrder {
    #[default]
    LowerFirst,
    UpperFirst,
}

/// What to do when an odd height leaves the halves one row apart.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OddHeight {
    /// Let the concatenation fail.
    #[default]
    Reject,
    /// Trim the taller half to the shorter one.
    DropRow,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitPipeline {
    /// Binarize with this luma threshold before splitting.
    pub threshold: Option<u8>,
    pub upper: Option<Flip>,
    pub lower: Option<Flip>,
    pub order: HalfOrder,
    pub odd_height: OddHeight,
    /// Half size of the top-edge markers, none draws no markers.
    pub markers: Option<u32>,
}

impl Default for SplitPipeline {
    fn default() -> Self {
        Self {
            threshold: None,
            upper: Some(Flip::Both),
            lower: None,
            order: HalfOrder::LowerFirst,
            odd_height: OddHeight::Reject,
            markers: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("could not split image: {0}")]
    Region(#[from] RegionError),
    #[error("could not join halves: {0}")]
    Concat(#[from] ConcatError),
}

/// Composed image together with the top edge traced on it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Composition {
    pub image: FrameBuffer,
    /// Traced before any markers are drawn.
    pub edge: Vec<Marker>,
}

impl SplitPipeline {
    pub fn run(&self, source: &FrameBuffer) -> Result<FrameBuffer, PipelineError> {
        self.compose(source).map(|c| c.image)
    }

    pub fn compose(&self, source: &FrameBuffer) -> Result<Composition, PipelineError> {
        let start = Instant::now();

        let binary;
        let source = match self.threshold {
            Some(t) => {
                binary = binarize(source, t);
                &binary
            }
            None => source,
        };

        let (upper, lower) = split_at_midline(source)?;
        let (upper, lower) = self.equalize(upper, lower)?;

        let upper = apply(upper, self.upper);
        let lower = apply(lower, self.lower);

        let halves = match self.order {
            HalfOrder::LowerFirst => [lower, upper],
            HalfOrder::UpperFirst => [upper, lower],
        };

        let mut out = hconcat(&halves)?;
        let edge = top_edge(&out);

        if let Some(half_size) = self.markers {
            draw_markers(&mut out, &edge, half_size);
        }

        info!(
            width = out.width(),
            height = out.height(),
            "Composition took {:.02} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(Composition { image: out, edge })
    }

    fn equalize(
        &self,
        upper: FrameBuffer,
        lower: FrameBuffer,
    ) -> Result<(FrameBuffer, FrameBuffer), PipelineError> {
        if self.odd_height == OddHeight::Reject || upper.height() == lower.height() {
            return Ok((upper, lower));
        }

        let height = upper.height().min(lower.height());
        debug!(height, "Dropping a row to even out halves");

        let upper = upper.crop(Region::rows(0, height, upper.width()))?;
        let lower = lower.crop(Region::rows(0, height, lower.width()))?;

        Ok((upper, lower))
    }
}

fn apply(fb: FrameBuffer, mode: Option<Flip>) -> FrameBuffer {
    match mode {
        Some(mode) => flip(&fb, mode),
        None => fb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Pixel;
    use crate::rotate::rotate_180;

    /// Each pixel encodes its own coordinates.
    fn coords(width: usize, height: usize) -> FrameBuffer {
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| Pixel::new(x as u8, y as u8, 7)))
            .collect();
        FrameBuffer::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn hundred_by_eighty() {
        let src = coords(80, 100);
        let out = SplitPipeline::default().run(&src).unwrap();

        assert_eq!(out.shape(), (50, 160, 3));

        let lower = src.crop(Region::rows(50, 100, 80)).unwrap();
        let upper = rotate_180(&src.crop(Region::rows(0, 50, 80)).unwrap());
        assert_eq!(out.crop(Region::rows(0, 50, 80)).unwrap(), lower);
        assert_eq!(
            out.crop(Region {
                x_min: 80,
                y_min: 0,
                x_max: 160,
                y_max: 50
            })
            .unwrap(),
            upper
        );

        // right half starts with the last pixel of the upper half
        assert_eq!(out.pixel(80, 0), Some(&Pixel::new(79, 49, 7)));
        assert_eq!(out.pixel(0, 0), Some(&Pixel::new(0, 50, 7)));
    }

    #[test]
    fn even_height_doubles_width() {
        for (w, h) in [(1, 2), (3, 4), (17, 10)] {
            let out = SplitPipeline::default().run(&coords(w, h)).unwrap();
            assert_eq!((out.width(), out.height()), (2 * w, h / 2));
        }
    }

    #[test]
    fn odd_height_is_rejected_by_default() {
        let err = SplitPipeline::default().run(&coords(4, 5)).unwrap_err();
        assert_eq!(
            err,
            PipelineError::Concat(ConcatError::HeightMismatch {
                index: 1,
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn odd_height_drop_row() {
        let pipeline = SplitPipeline {
            odd_height: OddHeight::DropRow,
            ..Default::default()
        };

        // midline(5) = 2: upper 2 rows, lower 3 rows
        let out = pipeline.run(&coords(4, 5)).unwrap();
        assert_eq!(out.shape(), (2, 8, 3));
        assert_eq!(out.pixel(0, 1), Some(&Pixel::new(0, 3, 7)));

        // midline(7) = 4: upper 4 rows, lower 3 rows
        let out = pipeline.run(&coords(4, 7)).unwrap();
        assert_eq!(out.shape(), (3, 8, 3));
    }

    #[test]
    fn single_row_drop_row_is_empty() {
        let pipeline = SplitPipeline {
            odd_height: OddHeight::DropRow,
            ..Default::default()
        };

        let out = pipeline.run(&coords(4, 1)).unwrap();
        assert_eq!(out.shape(), (0, 8, 3));
    }

    #[test]
    fn upper_first_with_lower_flip() {
        let pipeline = SplitPipeline {
            upper: None,
            lower: Some(Flip::Both),
            order: HalfOrder::UpperFirst,
            ..Default::default()
        };

        let out = pipeline.run(&coords(2, 4)).unwrap();
        assert_eq!(out.shape(), (2, 4, 3));
        assert_eq!(out.pixel(0, 0), Some(&Pixel::new(0, 0, 7)));
        assert_eq!(out.pixel(2, 0), Some(&Pixel::new(1, 3, 7)));
    }

    #[test]
    fn threshold_and_markers() {
        // white block in the lower-left corner of a 6x4 image
        let mut src = FrameBuffer::new(6, 4);
        for x in 0..2 {
            *src.pixel_mut(x, 3).unwrap() = Pixel::gray(200);
        }

        let pipeline = SplitPipeline {
            threshold: Some(128),
            markers: Some(0),
            ..Default::default()
        };
        let out = pipeline.run(&src).unwrap();

        assert_eq!(out.shape(), (2, 12, 3));
        assert!(out.buffer().iter().all(|p| *p == Pixel::black() || p.is_white()));
        assert!(out.pixel(0, 1).unwrap().is_white());
        assert!(out.pixel(1, 1).unwrap().is_white());
        assert!(!out.pixel(0, 0).unwrap().is_white());
    }

    #[test]
    fn edge_is_traced_before_markers() {
        let mut src = FrameBuffer::new(6, 4);
        for x in 0..2 {
            *src.pixel_mut(x, 3).unwrap() = Pixel::white();
        }

        let pipeline = SplitPipeline {
            markers: Some(3),
            ..Default::default()
        };
        let composition = pipeline.compose(&src).unwrap();

        // lower half rows 2..4, the white row lands on row 1 of the left half
        assert_eq!(
            composition.edge,
            vec![Marker { x: 0, y: 1 }, Marker { x: 1, y: 1 }]
        );
        assert_eq!(composition.image, pipeline.run(&src).unwrap());
    }
}
