use std::ffi::c_void;
use thiserror::Error;

/// 2D texture holding 8-bit pixel data.
pub struct Texture2D {
    id: u32,
    width: u32,
    height: u32,
}

impl Texture2D {
    pub fn new(
        width: u32,
        height: u32,
        data: &[u8],
        format: TextureFormats,
        filter: TextureFilter,
    ) -> Result<Self, TextureError> {
        check_len(width, height, data, &format)?;

        let max = max_size();
        if width > max || height > max {
            return Err(TextureError::TooLarge { width, height, max });
        }

        let mut id = 0;

        unsafe {
            gl::GenTextures(1, (&mut id) as *mut u32);
            gl::BindTexture(gl::TEXTURE_2D, id);

            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter.gl_enum() as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter.gl_enum() as i32);
        }

        let texture = Self { id, width, height };
        texture.upload(data, &format);

        Ok(texture)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bind(&self, unit: u8) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit as u32);
            gl::BindTexture(gl::TEXTURE_2D, self.id)
        }
    }

    fn upload(&self, data: &[u8], format: &TextureFormats) {
        unsafe {
            gl::BindTexture(gl::TEXTURE_2D, self.id);

            // rows of RGB8 data are not 4-byte aligned
            gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);

            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                format.internal_format() as i32,
                self.width as i32,
                self.height as i32,
                0,
                format.pixel_format(),
                gl::UNSIGNED_BYTE,
                data.as_ptr() as *const c_void,
            );
        }
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, (&self.id) as *const u32);
        }
    }
}

fn check_len(width: u32, height: u32, data: &[u8], format: &TextureFormats) -> Result<(), TextureError> {
    let expected = width as usize * height as usize * format.channels() as usize;

    if expected != data.len() {
        return Err(TextureError::InvalidSrcLength {
            expected,
            found: data.len(),
        });
    }

    Ok(())
}

fn max_size() -> u32 {
    let mut max = 0;

    unsafe {
        gl::GetIntegerv(gl::MAX_TEXTURE_SIZE, (&mut max) as *mut i32);
    }

    max.max(0) as u32
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("Invalid source data length {found}, expected {expected}")]
    InvalidSrcLength { expected: usize, found: usize },
    #[error("Texture of {width}x{height} exceeds the GL limit of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },
}

pub enum TextureFormats {
    RgbU8,
}

impl TextureFormats {
    pub fn channels(&self) -> u8 {
        match self {
            TextureFormats::RgbU8 => 3,
        }
    }

    fn internal_format(&self) -> u32 {
        match self {
            TextureFormats::RgbU8 => gl::RGB8,
        }
    }

    fn pixel_format(&self) -> u32 {
        match self {
            TextureFormats::RgbU8 => gl::RGB,
        }
    }
}

pub enum TextureFilter {
    Nearest,
    Linear,
}

impl TextureFilter {
    fn gl_enum(&self) -> u32 {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_length_is_checked() {
        assert!(check_len(4, 2, &[0; 24], &TextureFormats::RgbU8).is_ok());
        assert_eq!(
            check_len(4, 2, &[0; 23], &TextureFormats::RgbU8),
            Err(TextureError::InvalidSrcLength {
                expected: 24,
                found: 23
            })
        );
    }
}
