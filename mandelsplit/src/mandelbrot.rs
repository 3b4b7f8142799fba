use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::framebuffer::{FrameBuffer, Pixel};

/// Output width is truncated to a multiple of this.
pub const BLOCK_WIDTH: usize = 4;

/// Largest canvas `render` will allocate, in pixels.
pub const MAX_PIXELS: usize = 1 << 28;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MandelbrotParams {
    pub re_min: f64,
    pub re_max: f64,
    pub im_min: f64,
    pub im_max: f64,
    /// Output height, the width follows from the aspect of the ranges.
    pub rows: usize,
    pub max_iter: u32,
    /// Escape bound on `|z|²`.
    pub radius: f64,
}

impl Default for MandelbrotParams {
    fn default() -> Self {
        Self {
            re_min: -2.4,
            re_max: 1.5,
            im_min: -1.3,
            im_max: 1.3,
            rows: 1000,
            max_iter: 50,
            radius: 5.0,
        }
    }
}

impl MandelbrotParams {
    /// Distance between neighbouring pixels in the complex plane.
    pub fn pitch(&self) -> f64 {
        (self.im_max - self.im_min) / self.rows as f64
    }

    pub fn columns(&self) -> usize {
        // saturating cast, `validate` rejects spans that do not fit
        let raw = self.column_span() as usize;
        raw - raw % BLOCK_WIDTH
    }

    fn column_span(&self) -> f64 {
        // the epsilon keeps 3.9 / 0.0026 from landing on 1499.999...
        ((self.re_max - self.re_min) / self.pitch() + 1e-9).floor()
    }

    pub fn validate(&self) -> Result<(), MandelbrotError> {
        let invalid = |msg: &str| -> Result<(), MandelbrotError> {
            Err(MandelbrotError::InvalidParams(msg.into()))
        };

        let bounds = [self.re_min, self.re_max, self.im_min, self.im_max, self.radius];
        if bounds.iter().any(|v| !v.is_finite()) {
            return invalid("ranges and radius must be finite");
        }
        if self.rows == 0 {
            return invalid("rows must be positive");
        }
        if self.max_iter < 2 {
            return invalid("max_iter must be at least 2");
        }
        if !(self.re_max > self.re_min) || !(self.im_max > self.im_min) {
            return invalid("ranges must be non-empty");
        }
        if !(self.radius > 0.0) {
            return invalid("radius must be positive");
        }
        if !(self.column_span() <= MAX_PIXELS as f64) {
            return invalid("real range too wide for the canvas limit");
        }
        if self.columns() == 0 {
            return invalid("real range too narrow for a single pixel block");
        }
        match self.columns().checked_mul(self.rows) {
            Some(pixels) if pixels <= MAX_PIXELS => {}
            _ => return invalid("canvas exceeds the pixel limit"),
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum MandelbrotError {
    #[error("invalid mandelbrot parameters: {0}")]
    InvalidParams(String),
    #[error("failed to build rendering threadpool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub struct MandelbrotRenderer {
    pub params: MandelbrotParams,
    /// 0 picks the thread count automatically, 1 renders on the calling thread.
    pub threads: usize,
}

impl Default for MandelbrotRenderer {
    fn default() -> Self {
        Self {
            params: MandelbrotParams::default(),
            threads: 0,
        }
    }
}

impl MandelbrotRenderer {
    pub fn render(&self) -> Result<FrameBuffer, MandelbrotError> {
        self.params.validate()?;

        let (width, height) = (self.params.columns(), self.params.rows);
        let mut fb = FrameBuffer::new(width, height);

        info!(width, height, "Generating mandelbrot, this can take a while...");
        let start = Instant::now();

        if self.threads == 1 {
            for (y, slice) in fb.buffer_mut().chunks_mut(width).enumerate() {
                self.scanline(y, slice);
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.threads)
                .build()?;

            pool.install(|| {
                fb.buffer_mut()
                    .par_chunks_mut(width)
                    .enumerate()
                    .for_each(|(y, slice)| self.scanline(y, slice))
            });
        }

        info!(
            "Mandelbrot took {:.02} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(fb)
    }

    /// First iteration at which `|z|²` exceeds the radius, `max_iter` if it never does.
    pub fn escape_iteration(&self, c_re: f64, c_im: f64) -> u32 {
        let (mut z_re, mut z_im) = (0.0_f64, 0.0_f64);

        for iter in 0..self.params.max_iter {
            let new_re = z_re * z_re - z_im * z_im + c_re;
            let new_im = 2.0 * z_re * z_im + c_im;
            z_re = new_re;
            z_im = new_im;

            if z_re * z_re + z_im * z_im > self.params.radius {
                return iter;
            }
        }

        self.params.max_iter
    }

    fn scanline(&self, y: usize, slice: &mut [Pixel]) {
        let dia = self.params.pitch();
        let c_im = self.params.im_min + y as f64 * dia;

        for (x, pixel) in slice.iter_mut().enumerate() {
            let c_re = self.params.re_min + x as f64 * dia;
            let iter = self.escape_iteration(c_re, c_im);

            *pixel = Pixel::gray(intensity(iter, self.params.max_iter));
        }
    }
}

/// Log-scales an escape count onto `0..=255`; `0` maps to black, `max` to white.
pub fn intensity(iter: u32, max: u32) -> u8 {
    // ln(0) is -inf, which the saturating cast turns into 0
    ((iter as f64).ln() / (max as f64).ln() * 255.0) as u8
}
