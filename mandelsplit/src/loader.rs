use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageError};
use thiserror::Error;
use tracing::{debug, info};

use crate::framebuffer::{BufferError, FrameBuffer};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not decode image: {0}")]
    Decode(#[source] ImageError),
    #[error("image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Reads and decodes the image at `path` into an RGB buffer.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<FrameBuffer, LoadError> {
    let path = path.as_ref();

    match path.try_exists() {
        Ok(true) => {}
        Ok(false) => return Err(LoadError::NotFound(path.to_owned())),
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_owned(),
                source,
            })
        }
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })?;

    let fb = decode_image(&bytes)?;
    info!(
        path = %path.display(),
        width = fb.width(),
        height = fb.height(),
        "Loaded image"
    );

    Ok(fb)
}

/// Decodes an in-memory image, format detected from its contents.
pub fn decode_image(bytes: &[u8]) -> Result<FrameBuffer, LoadError> {
    let img = image::load_from_memory(bytes).map_err(LoadError::Decode)?;
    from_dynamic(&img)
}

pub fn from_dynamic(img: &DynamicImage) -> Result<FrameBuffer, LoadError> {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(LoadError::Empty { width, height });
    }

    debug!(width, height, color = ?img.color(), "Converting to RGB8");
    let rgb = img.to_rgb8();

    Ok(FrameBuffer::from_rgb_bytes(
        width as usize,
        height as usize,
        rgb.as_raw(),
    )?)
}
