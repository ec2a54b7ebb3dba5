use std::sync::Arc;

use crate::foundation::error::{JayverseError, JayverseResult};

/// Decoded bitmap: straight-alpha RGBA8, row-major, tightly packed.
///
/// The pixel bytes are shared and never mutated; transforms copy into a [`PixelBuffer`] and build
/// a new image from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    rgba8: Arc<Vec<u8>>,
}

impl RasterImage {
    /// Wrap RGBA8 bytes, checking that the length matches `width * height * 4`.
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> JayverseResult<Self> {
        if width == 0 || height == 0 {
            return Err(JayverseError::validation("raster image must be non-empty"));
        }
        let expected = byte_len(width, height)?;
        if rgba8.len() != expected {
            return Err(JayverseError::validation(format!(
                "raster byte len mismatch: got {}, expected {expected} for {width}x{height}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Solid-color image, mostly useful for fixtures and placeholders.
    pub fn filled(width: u32, height: u32, px: [u8; 4]) -> JayverseResult<Self> {
        let n = byte_len(width, height)? / 4;
        Self::from_rgba8(width, height, px.repeat(n))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba8
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let p = &self.rgba8[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Owned working copy of the pixels.
    pub fn to_pixel_buffer(&self) -> PixelBuffer {
        PixelBuffer {
            width: self.width,
            height: self.height,
            data: self.rgba8.as_ref().clone(),
        }
    }

    /// Convert into an `image` crate buffer (copies).
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8.as_ref().clone())
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }
}

impl From<PixelBuffer> for RasterImage {
    fn from(buf: PixelBuffer) -> Self {
        Self {
            width: buf.width,
            height: buf.height,
            rgba8: Arc::new(buf.data),
        }
    }
}

/// Mutable RGBA8 working buffer with bounds-checked pixel access.
///
/// Coordinates are signed so callers can read shifted positions without pre-clamping; anything
/// outside the buffer reads as `None` and writes are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA8 bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        (self.width as usize) * 4
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Pixel at `(x, y)`.
    pub fn get(&self, x: i64, y: i64) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        let p = &self.data[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Write a pixel; returns `false` when `(x, y)` is outside the buffer.
    pub fn set(&mut self, x: i64, y: i64, px: [u8; 4]) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.data[i..i + 4].copy_from_slice(&px);
                true
            }
            None => false,
        }
    }

    /// Pixel at flat index `i` (row-major), `None` when out of range.
    pub fn get_linear(&self, i: i64) -> Option<[u8; 4]> {
        if i < 0 || i as usize >= self.pixel_count() {
            return None;
        }
        let o = (i as usize) * 4;
        let p = &self.data[o..o + 4];
        Some([p[0], p[1], p[2], p[3]])
    }
}

fn byte_len(width: u32, height: u32) -> JayverseResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| JayverseError::validation("raster size overflow"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/raster.rs"]
mod tests;
