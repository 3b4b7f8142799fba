use std::fmt::{Display, Formatter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::framebuffer::FrameBuffer;
use crate::loader::{load_image, LoadError};
use crate::mandelbrot::{MandelbrotError, MandelbrotParams, MandelbrotRenderer};

pub const DEFAULT_INPUT: &str = "mandel-small.jpg";

/// Where the image to split comes from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    File(PathBuf),
    Mandelbrot { mandelbrot: MandelbrotParams },
}

impl Default for Source {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_INPUT))
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Mandelbrot { mandelbrot } => write!(f, "mandelbrot ({} rows)", mandelbrot.rows),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Mandelbrot(#[from] MandelbrotError),
}

impl Source {
    /// `threads` only matters for rendered sources.
    pub fn acquire(&self, threads: usize) -> Result<FrameBuffer, SourceError> {
        match self {
            Source::File(path) => Ok(load_image(path)?),
            Source::Mandelbrot { mandelbrot } => {
                let renderer = MandelbrotRenderer {
                    params: mandelbrot.clone(),
                    threads,
                };

                Ok(renderer.render()?)
            }
        }
    }
}
