use std::ops::{Deref, DerefMut};

use image::imageops::FilterType;

use crate::assets::raster::RasterImage;
use crate::foundation::core::Rect;
use crate::foundation::error::{JayverseError, JayverseResult};
use crate::foundation::math::{premultiply_px, unpremultiply_px};
use crate::render::blend::{BlendMode, composite_in_place};

// Stretched draws larger than this resample only the visible window.
const MAX_RESAMPLE_PIXELS: u64 = 1 << 24;

/// Off-screen drawing target.
///
/// Pixels are premultiplied RGBA8. `global_alpha` and `blend_mode` apply to every
/// [`Surface::draw_image`] / [`Surface::draw_layer`] call; change them only through
/// [`Surface::compositing`], which puts the defaults back when the scope ends.
///
/// Pixels placed with [`Surface::put_image`] and never drawn over come back from
/// [`Surface::snapshot`] byte-for-byte, including translucent ones.
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
    // Straight-alpha bytes last put at each pixel, and whether a draw has touched it since.
    base: Vec<u8>,
    drawn: Vec<bool>,
    global_alpha: f32,
    blend_mode: BlendMode,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("global_alpha", &self.global_alpha)
            .field("blend_mode", &self.blend_mode)
            .finish()
    }
}

impl Surface {
    /// Transparent surface of `width x height`.
    pub fn new(width: u32, height: u32) -> JayverseResult<Self> {
        if width == 0 || height == 0 {
            return Err(JayverseError::validation("surface must be non-empty"));
        }
        let pixels = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| JayverseError::validation("surface size overflow"))?;
        let len = pixels
            .checked_mul(4)
            .ok_or_else(|| JayverseError::validation("surface size overflow"))?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; len],
            base: vec![0u8; len],
            drawn: vec![false; pixels],
            global_alpha: 1.0,
            blend_mode: BlendMode::Normal,
        })
    }

    /// Surface sized to `image` with its pixels copied in.
    pub fn from_image(image: &RasterImage) -> JayverseResult<Self> {
        let mut s = Self::new(image.width(), image.height())?;
        s.put_image(image, 0, 0);
        Ok(s)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current global alpha.
    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    /// Current blend mode.
    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
        self.base.fill(0);
        self.drawn.fill(false);
    }

    /// Replace pixels with `image` at `(x, y)`, ignoring compositing state.
    pub fn put_image(&mut self, image: &RasterImage, x: i64, y: i64) {
        let Some(clip) = self.clip(x, y, image.width(), image.height()) else {
            return;
        };
        let src = image.as_bytes();
        let src_stride = (image.width() as usize) * 4;
        for row in clip.y0..clip.y1 {
            let sy = (row - y) as usize;
            for col in clip.x0..clip.x1 {
                let sx = (col - x) as usize;
                let si = sy * src_stride + sx * 4;
                let straight = [src[si], src[si + 1], src[si + 2], src[si + 3]];
                let di = self.offset(col, row);
                self.data[di..di + 4].copy_from_slice(&premultiply_px(straight));
                self.base[di..di + 4].copy_from_slice(&straight);
                self.drawn[di / 4] = false;
            }
        }
    }

    /// Draw `image` stretched into `dest`, using the current alpha and blend mode.
    ///
    /// Destination edges are rounded to whole pixels; the part outside the surface is dropped.
    pub fn draw_image(&mut self, image: &RasterImage, dest: Rect) -> JayverseResult<()> {
        let x0 = dest.x0.round() as i64;
        let y0 = dest.y0.round() as i64;
        let x1 = dest.x1.round() as i64;
        let y1 = dest.y1.round() as i64;
        if x1 <= x0 || y1 <= y0 {
            return Ok(());
        }
        let w = u32::try_from(x1 - x0)
            .map_err(|_| JayverseError::render("draw_image destination too wide"))?;
        let h = u32::try_from(y1 - y0)
            .map_err(|_| JayverseError::render("draw_image destination too tall"))?;
        let Some(clip) = self.clip(x0, y0, w, h) else {
            return Ok(());
        };

        // Resample in premultiplied space so transparent edges don't bleed color.
        let mut premul = image.to_rgba_image();
        for px in premul.pixels_mut() {
            px.0 = premultiply_px(px.0);
        }

        let off_x = (clip.x0 - x0) as u32;
        let off_y = (clip.y0 - y0) as u32;
        let vis_w = (clip.x1 - clip.x0) as u32;
        let vis_h = (clip.y1 - clip.y0) as u32;
        let fully_visible = (vis_w, vis_h) == (w, h);

        let visible = if fully_visible || u64::from(w) * u64::from(h) <= MAX_RESAMPLE_PIXELS {
            let scaled = if (w, h) == (image.width(), image.height()) {
                premul
            } else {
                image::imageops::resize(&premul, w, h, FilterType::Triangle)
            };
            if fully_visible {
                scaled
            } else {
                image::imageops::crop_imm(&scaled, off_x, off_y, vis_w, vis_h).to_image()
            }
        } else {
            let sx = f64::from(image.width()) / f64::from(w);
            let sy = f64::from(image.height()) / f64::from(h);
            image::RgbaImage::from_fn(vis_w, vis_h, |cx, cy| {
                let u = (f64::from(off_x + cx) + 0.5) * sx - 0.5;
                let v = (f64::from(off_y + cy) + 0.5) * sy - 0.5;
                image::Rgba(sample_bilinear(&premul, u, v))
            })
        };

        let src = visible.as_raw();
        let row_len = (vis_w as usize) * 4;
        for (i, row) in (clip.y0..clip.y1).enumerate() {
            let row_src = &src[i * row_len..(i + 1) * row_len];
            let start = self.offset(clip.x0, row);
            let end = start + row_len;
            composite_in_place(
                &mut self.data[start..end],
                row_src,
                self.global_alpha,
                self.blend_mode,
            )?;
            self.mark_drawn(start / 4, row_src);
        }
        Ok(())
    }

    /// Composite a full-surface premultiplied layer using the current state.
    pub fn draw_layer(&mut self, premul_rgba8: &[u8]) -> JayverseResult<()> {
        composite_in_place(
            &mut self.data,
            premul_rgba8,
            self.global_alpha,
            self.blend_mode,
        )?;
        self.mark_drawn(0, premul_rgba8);
        Ok(())
    }

    /// Set alpha and blend mode for the lifetime of the returned scope.
    pub fn compositing(&mut self, alpha: f32, mode: BlendMode) -> CompositingScope<'_> {
        self.global_alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.blend_mode = mode;
        CompositingScope { surface: self }
    }

    /// Straight-alpha copy of the current pixels.
    pub fn snapshot(&self) -> JayverseResult<RasterImage> {
        let mut out = self.base.clone();
        for ((px, premul), &drawn) in out
            .chunks_exact_mut(4)
            .zip(self.data.chunks_exact(4))
            .zip(&self.drawn)
        {
            if drawn {
                px.copy_from_slice(&unpremultiply_px([premul[0], premul[1], premul[2], premul[3]]));
            }
        }
        RasterImage::from_rgba8(self.width, self.height, out)
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel_premul(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(i64::from(x), i64::from(y));
        let p = &self.data[i..i + 4];
        Some([p[0], p[1], p[2], p[3]])
    }

    // A fully transparent source pixel leaves the destination as it was.
    fn mark_drawn(&mut self, first_px: usize, src: &[u8]) {
        if self.global_alpha <= 0.0 {
            return;
        }
        for (flag, px) in self.drawn[first_px..].iter_mut().zip(src.chunks_exact(4)) {
            if px[3] > 0 {
                *flag = true;
            }
        }
    }

    fn offset(&self, x: i64, y: i64) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }

    fn clip(&self, x: i64, y: i64, w: u32, h: u32) -> Option<ClipRect> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + i64::from(w)).min(i64::from(self.width));
        let y1 = (y + i64::from(h)).min(i64::from(self.height));
        (x1 > x0 && y1 > y0).then_some(ClipRect { x0, y0, x1, y1 })
    }
}

// Clamp-to-edge bilinear sample at pixel-center coordinates.
fn sample_bilinear(img: &image::RgbaImage, u: f64, v: f64) -> [u8; 4] {
    let max_x = f64::from(img.width() - 1);
    let max_y = f64::from(img.height() - 1);
    let u = u.clamp(0.0, max_x);
    let v = v.clamp(0.0, max_y);
    let (x0, y0) = (u.floor() as u32, v.floor() as u32);
    let (x1, y1) = ((x0 + 1).min(img.width() - 1), (y0 + 1).min(img.height() - 1));
    let (tx, ty) = (u - f64::from(x0), v - f64::from(y0));

    let p00 = img.get_pixel(x0, y0).0;
    let p10 = img.get_pixel(x1, y0).0;
    let p01 = img.get_pixel(x0, y1).0;
    let p11 = img.get_pixel(x1, y1).0;
    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = f64::from(p00[c]) * (1.0 - tx) + f64::from(p10[c]) * tx;
        let bottom = f64::from(p01[c]) * (1.0 - tx) + f64::from(p11[c]) * tx;
        out[c] = (top * (1.0 - ty) + bottom * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

#[derive(Clone, Copy)]
struct ClipRect {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

/// Scoped compositing state; restores `global_alpha = 1` and `Normal` blending on drop.
pub struct CompositingScope<'a> {
    surface: &'a mut Surface,
}

impl Deref for CompositingScope<'_> {
    type Target = Surface;

    fn deref(&self) -> &Surface {
        self.surface
    }
}

impl DerefMut for CompositingScope<'_> {
    fn deref_mut(&mut self) -> &mut Surface {
        self.surface
    }
}

impl Drop for CompositingScope<'_> {
    fn drop(&mut self) {
        self.surface.global_alpha = 1.0;
        self.surface.blend_mode = BlendMode::Normal;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
