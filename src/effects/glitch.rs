use rayon::prelude::*;

use crate::assets::raster::{PixelBuffer, RasterImage};
use crate::foundation::math::SeededRng;

/// Glitch filter settings.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GlitchParams {
    /// Block displacement strength, `0..=0.1`.
    pub pixel_glitch_intensity: f64,
    /// Red/blue channel offset in pixels, `0..=20`.
    pub rgb_shift_pixels: f64,
    /// Darkening applied to even rows, `0..=1`.
    pub scanline_intensity: f64,
    /// Seed for the block displacement; equal seeds give equal output.
    pub seed: u64,
}

impl Default for GlitchParams {
    fn default() -> Self {
        Self {
            pixel_glitch_intensity: 0.05,
            rgb_shift_pixels: 5.0,
            scanline_intensity: 0.0,
            seed: 0,
        }
    }
}

impl GlitchParams {
    /// Settings that leave the image unchanged.
    pub fn none() -> Self {
        Self {
            pixel_glitch_intensity: 0.0,
            rgb_shift_pixels: 0.0,
            scanline_intensity: 0.0,
            seed: 0,
        }
    }

    fn clamped(&self) -> Self {
        fn c(v: f64, max: f64) -> f64 {
            if v.is_finite() { v.clamp(0.0, max) } else { 0.0 }
        }
        Self {
            pixel_glitch_intensity: c(self.pixel_glitch_intensity, 0.1),
            rgb_shift_pixels: c(self.rgb_shift_pixels, 20.0),
            scanline_intensity: c(self.scanline_intensity, 1.0),
            seed: self.seed,
        }
    }
}

/// Run scanlines, RGB shift and block glitch over a copy of `src`.
#[tracing::instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn apply_glitch(src: &RasterImage, params: &GlitchParams) -> RasterImage {
    let p = params.clamped();
    let mut buf = src.to_pixel_buffer();

    if p.scanline_intensity > 0.0 {
        scanlines(&mut buf, p.scanline_intensity);
    }

    let shift = p.rgb_shift_pixels.round() as i64;
    if shift > 0 {
        rgb_shift(&mut buf, shift);
    }

    if p.pixel_glitch_intensity > 0.0 {
        block_glitch(&mut buf, p.pixel_glitch_intensity, p.seed);
    }

    RasterImage::from(buf)
}

fn scanlines(buf: &mut PixelBuffer, intensity: f64) {
    let keep = 1.0 - intensity;
    let stride = buf.stride();
    buf.as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .filter(|(y, _)| y % 2 == 0)
        .for_each(|(_, row)| {
            for px in row.chunks_exact_mut(4) {
                for c in &mut px[..3] {
                    *c = (f64::from(*c) * keep).round_ties_even() as u8;
                }
            }
        });
    tracing::debug!(intensity, "scanlines applied");
}

// Red comes from `i + k`, blue from `i - k` on the flat pixel sequence, so shifts wrap across
// row ends. Out-of-range reads keep the pixel's own channel.
fn rgb_shift(buf: &mut PixelBuffer, k: i64) {
    let snapshot = buf.clone();
    buf.as_bytes_mut()
        .par_chunks_mut(4)
        .enumerate()
        .for_each(|(i, px)| {
            let i = i as i64;
            if let Some(r) = snapshot.get_linear(i + k) {
                px[0] = r[0];
            }
            if let Some(b) = snapshot.get_linear(i - k) {
                px[2] = b[2];
            }
        });
    tracing::debug!(shift = k, "rgb shift applied");
}

fn block_glitch(buf: &mut PixelBuffer, intensity: f64, seed: u64) {
    let pixel_size = ((intensity * 200.0).round() as i64).max(1);
    let max_offset = (intensity * 50.0).round() as i64;
    let width = i64::from(buf.width());
    let height = i64::from(buf.height());

    let snapshot = buf.clone();
    let mut rng = SeededRng::new(seed);
    let mut displaced = 0usize;

    let mut y = 0i64;
    while y < height {
        if rng.next_f64() < intensity * 5.0 {
            let dx = (rng.next_f64() * (max_offset * 2) as f64).floor() as i64 - max_offset;
            let target_y = y + (rng.next_f64() * intensity * 10.0).floor() as i64;
            for row in y..(y + pixel_size).min(height) {
                let dst_row = target_y + (row - y);
                if dst_row >= height {
                    break;
                }
                for x in 0..width {
                    if let Some(px) = snapshot.get(x, row) {
                        buf.set(x + dx, dst_row, px);
                    }
                }
            }
            displaced += 1;
        }
        y += pixel_size;
    }
    tracing::debug!(pixel_size, max_offset, displaced, "block glitch applied");
}

#[cfg(test)]
#[path = "../../tests/unit/effects/glitch.rs"]
mod tests;
