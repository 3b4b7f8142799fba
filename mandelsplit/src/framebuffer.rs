use thiserror::Error;

/// Row-major 8-bit RGB image, `height × width × 3`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    buffer: Vec<Pixel>,
}

// `as_bytes` relies on this
const _: () = assert!(std::mem::size_of::<Pixel>() == 3);

impl FrameBuffer {
    pub const CHANNELS: usize = 3;

    pub fn new(width: usize, height: usize) -> Self {
        Self::from_pixel(width, height, Pixel::black())
    }

    pub fn from_pixel(width: usize, height: usize, pixel: Pixel) -> Self {
        Self {
            width,
            height,
            buffer: vec![pixel; width * height],
        }
    }

    pub fn from_pixels(width: usize, height: usize, buffer: Vec<Pixel>) -> Result<Self, BufferError> {
        if buffer.len() != width * height {
            return Err(BufferError::InvalidLength {
                width,
                height,
                expected: width * height,
                found: buffer.len(),
            });
        }

        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    /// Builds a buffer from tightly packed `r, g, b` triples.
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, BufferError> {
        let expected = width * height * Self::CHANNELS;
        if bytes.len() != expected {
            return Err(BufferError::InvalidLength {
                width,
                height,
                expected,
                found: bytes.len(),
            });
        }

        let buffer = bytes
            .chunks_exact(Self::CHANNELS)
            .map(|c| Pixel::new(c[0], c[1], c[2]))
            .collect();

        Ok(Self {
            width,
            height,
            buffer,
        })
    }

    /// Caller guarantees `buffer.len() == width * height`.
    pub(crate) fn from_parts(width: usize, height: usize, buffer: Vec<Pixel>) -> Self {
        debug_assert_eq!(buffer.len(), width * height);

        Self {
            width,
            height,
            buffer,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, Self::CHANNELS)
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn buffer(&self) -> &[Pixel] {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut Vec<Pixel> {
        &mut self.buffer
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.buffer
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<&Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.buffer.get(x + y * self.width)
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }

        self.buffer.get_mut(x + y * self.width)
    }

    pub fn row(&self, y: usize) -> Option<&[Pixel]> {
        if y >= self.height {
            return None;
        }

        let start = y * self.width;
        Some(&self.buffer[start..start + self.width])
    }

    pub fn rows(&self) -> std::slice::Chunks<'_, Pixel> {
        // a zero-width buffer has no pixels, so the chunk size only has to be non-zero
        self.buffer.chunks(self.width.max(1))
    }

    pub fn as_bytes(&self) -> &[u8] {
        let size = self.buffer.len() * Self::CHANNELS;

        // Pixel is repr(C) with three u8 fields, no padding
        unsafe { std::slice::from_raw_parts(self.buffer.as_ptr() as *const u8, size) }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BufferError {
    #[error("pixel data of length {found} does not fit a {width}x{height} buffer (expected {expected})")]
    InvalidLength {
        width: usize,
        height: usize,
        expected: usize,
        found: usize,
    },
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::gray(0)
    }

    pub const fn white() -> Self {
        Self::gray(255)
    }

    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    pub fn is_white(&self) -> bool {
        *self == Self::white()
    }
}

impl From<[u8; 3]> for Pixel {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Pixel> for [u8; 3] {
    fn from(p: Pixel) -> Self {
        [p.r, p.g, p.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb_bytes_round_trips_through_as_bytes() {
        let bytes: Vec<u8> = (0..2 * 3 * 3).collect();
        let fb = FrameBuffer::from_rgb_bytes(2, 3, &bytes).unwrap();

        assert_eq!(fb.shape(), (3, 2, 3));
        assert_eq!(fb.pixel(1, 0), Some(&Pixel::new(3, 4, 5)));
        assert_eq!(fb.pixel(0, 2), Some(&Pixel::new(12, 13, 14)));
        assert_eq!(fb.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn rejects_wrong_length() {
        let err = FrameBuffer::from_rgb_bytes(2, 2, &[0; 11]).unwrap_err();
        assert_eq!(
            err,
            BufferError::InvalidLength {
                width: 2,
                height: 2,
                expected: 12,
                found: 11
            }
        );

        assert!(FrameBuffer::from_pixels(3, 1, vec![Pixel::black(); 2]).is_err());
    }

    #[test]
    fn pixel_access_is_bounds_checked() {
        let mut fb = FrameBuffer::new(4, 2);

        assert!(fb.pixel(4, 0).is_none());
        assert!(fb.pixel(0, 2).is_none());

        *fb.pixel_mut(3, 1).unwrap() = Pixel::white();
        assert!(fb.pixel(3, 1).unwrap().is_white());
        assert_eq!(fb.row(1).unwrap()[3], Pixel::white());
        assert!(fb.row(2).is_none());
    }

    #[test]
    fn rows_of_empty_buffer() {
        let fb = FrameBuffer::new(0, 5);
        assert_eq!(fb.rows().count(), 0);

        let fb = FrameBuffer::new(3, 0);
        assert!(fb.is_empty());
        assert_eq!(fb.rows().count(), 0);
    }
}
