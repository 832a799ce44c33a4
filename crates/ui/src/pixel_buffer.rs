use std::fmt::{self, Display, Formatter};

use crate::color::RgbaColor;
use crate::error::{HueRingError, Result};

/// The two 32-bit pixel layouts understood by the rasterizers.
///
/// Names list the bytes from the lowest address to the highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Bgra8888,
    Rgba8888,
}

impl PixelFormat {
    pub const BYTES_PER_PIXEL: usize = 4;

    #[inline]
    pub fn pack(self, color: RgbaColor) -> [u8; 4] {
        match self {
            PixelFormat::Bgra8888 => color.to_bgra8888(),
            PixelFormat::Rgba8888 => color.to_rgba8888(),
        }
    }

    #[inline]
    pub fn unpack(self, bytes: [u8; 4]) -> RgbaColor {
        match self {
            PixelFormat::Bgra8888 => RgbaColor::from_bgra8888(bytes),
            PixelFormat::Rgba8888 => RgbaColor::from_rgba8888(bytes),
        }
    }
}

impl Display for PixelFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Bgra8888 => write!(f, "Bgra8888"),
            PixelFormat::Rgba8888 => write!(f, "Rgba8888"),
        }
    }
}

/// A row-major, tightly packed 32-bit pixel buffer.
///
/// Every access is bounds-checked; there is no stride padding.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocates a buffer cleared to transparent black.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(HueRingError::InvalidBufferSize { width, height });
        }

        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(PixelFormat::BYTES_PER_PIXEL))
            .ok_or(HueRingError::InvalidBufferSize { width, height })?;

        Ok(Self {
            width,
            height,
            format,
            data: vec![0; len],
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Raw bytes, `width * height * 4` long.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Fills every pixel with `color`.
    pub fn clear(&mut self, color: RgbaColor) {
        let bytes = self.format.pack(color);
        for pixel in self.data.chunks_exact_mut(PixelFormat::BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&bytes);
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * PixelFormat::BYTES_PER_PIXEL)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<RgbaColor> {
        let offset = self.offset(x, y)?;
        let mut bytes = [0; 4];
        bytes.copy_from_slice(&self.data[offset..offset + PixelFormat::BYTES_PER_PIXEL]);
        Some(self.format.unpack(bytes))
    }

    /// Writes `color` in this buffer's byte order. Returns `false` when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: RgbaColor) -> bool {
        let Some(offset) = self.offset(x, y) else {
            return false;
        };
        let bytes = self.format.pack(color);
        self.data[offset..offset + PixelFormat::BYTES_PER_PIXEL].copy_from_slice(&bytes);
        true
    }

    /// Mutable access to one row of pixels as 4-byte chunks.
    pub(crate) fn row_mut(&mut self, y: u32) -> Option<std::slice::ChunksExactMut<'_, u8>> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize * PixelFormat::BYTES_PER_PIXEL;
        let start = y as usize * stride;
        Some(self.data[start..start + stride].chunks_exact_mut(PixelFormat::BYTES_PER_PIXEL))
    }

    pub(crate) fn ensure_format(
        &self,
        entry_point: &'static str,
        expected: PixelFormat,
    ) -> Result<()> {
        if self.format == expected {
            Ok(())
        } else {
            Err(HueRingError::UnsupportedPixelFormat {
                entry_point,
                expected,
                actual: self.format,
            })
        }
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            PixelBuffer::new(0, 4, PixelFormat::Rgba8888),
            Err(HueRingError::InvalidBufferSize {
                width: 0,
                height: 4
            })
        );
        assert!(PixelBuffer::new(4, 0, PixelFormat::Bgra8888).is_err());
    }

    #[test]
    fn test_pixel_access_respects_format() {
        let color = RgbaColor::new(10, 20, 30, 40);

        let mut bgra = PixelBuffer::new(2, 2, PixelFormat::Bgra8888).unwrap();
        assert!(bgra.set_pixel(1, 0, color));
        assert_eq!(&bgra.data()[4..8], &[30, 20, 10, 40]);
        assert_eq!(bgra.pixel(1, 0), Some(color));

        let mut rgba = PixelBuffer::new(2, 2, PixelFormat::Rgba8888).unwrap();
        assert!(rgba.set_pixel(0, 1, color));
        assert_eq!(&rgba.data()[8..12], &[10, 20, 30, 40]);
        assert_eq!(rgba.pixel(0, 1), Some(color));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut buffer = PixelBuffer::new(3, 2, PixelFormat::Rgba8888).unwrap();
        assert!(!buffer.set_pixel(3, 0, RgbaColor::WHITE));
        assert!(!buffer.set_pixel(0, 2, RgbaColor::WHITE));
        assert_eq!(buffer.pixel(3, 1), None);
        assert!(buffer.row_mut(2).is_none());
        assert!(buffer.data().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_clear() {
        let mut buffer = PixelBuffer::new(3, 2, PixelFormat::Bgra8888).unwrap();
        buffer.clear(RgbaColor::opaque(1, 2, 3));
        assert_eq!(buffer.data().len(), 3 * 2 * 4);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(buffer.pixel(x, y), Some(RgbaColor::opaque(1, 2, 3)));
            }
        }
    }

    #[test]
    fn test_ensure_format() {
        let buffer = PixelBuffer::new(1, 1, PixelFormat::Rgba8888).unwrap();
        assert!(buffer.ensure_format("test", PixelFormat::Rgba8888).is_ok());
        assert_eq!(
            buffer.ensure_format("test", PixelFormat::Bgra8888),
            Err(HueRingError::UnsupportedPixelFormat {
                entry_point: "test",
                expected: PixelFormat::Bgra8888,
                actual: PixelFormat::Rgba8888,
            })
        );
    }
}
