use std::sync::Arc;

use anyhow::Context;

use crate::assets::raster::RasterImage;
use crate::foundation::error::{JayverseError, JayverseResult};

/// Image MIME types accepted from the file picker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageMime {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `image/webp`
    Webp,
    /// `image/gif`
    Gif,
    /// `image/bmp`
    Bmp,
    /// `image/svg+xml` (logos only)
    Svg,
}

impl ImageMime {
    /// Map a MIME string to an accepted type.
    pub fn from_mime(mime: &str) -> JayverseResult<Self> {
        let m = mime.trim().to_ascii_lowercase();
        let base = m.split(';').next().unwrap_or("").trim();
        match base {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::Webp),
            "image/gif" => Ok(Self::Gif),
            "image/bmp" => Ok(Self::Bmp),
            "image/svg+xml" => Ok(Self::Svg),
            _ => Err(JayverseError::validation(format!(
                "unsupported image type '{mime}'"
            ))),
        }
    }

    /// Guess the type from leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if looks_like_svg(bytes) {
            return Some(Self::Svg);
        }
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::WebP => Some(Self::Webp),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            _ => None,
        }
    }
}

/// Parsed SVG document, rasterized on demand at the size it is drawn.
#[derive(Clone, Debug)]
pub struct PreparedSvg {
    pub(crate) tree: Arc<usvg::Tree>,
}

impl PreparedSvg {
    /// Intrinsic size in CSS pixels.
    pub fn size(&self) -> (f32, f32) {
        let s = self.tree.size();
        (s.width(), s.height())
    }
}

/// A decoded input asset: either pixels or a vector document.
#[derive(Clone, Debug)]
pub enum DecodedAsset {
    /// Raster image (PNG, JPEG, ...).
    Raster(RasterImage),
    /// Vector image, rasterized when drawn.
    Svg(PreparedSvg),
}

impl DecodedAsset {
    /// Produce pixels of the given size (raster sources are returned as-is).
    pub fn rasterize(&self, width: u32, height: u32) -> JayverseResult<RasterImage> {
        match self {
            Self::Raster(img) => Ok(img.clone()),
            Self::Svg(svg) => rasterize_svg(svg, width, height),
        }
    }

    /// Raster image at intrinsic size.
    pub fn into_raster(self) -> JayverseResult<RasterImage> {
        match self {
            Self::Raster(img) => Ok(img),
            Self::Svg(svg) => {
                let (w, h) = svg.size();
                rasterize_svg(&svg, (w.ceil() as u32).max(1), (h.ceil() as u32).max(1))
            }
        }
    }
}

/// Decode encoded raster bytes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> JayverseResult<RasterImage> {
    let dyn_img = image::load_from_memory(bytes)
        .context("decode image from memory")
        .map_err(|e| JayverseError::decode(format!("{e:#}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RasterImage::from_rgba8(width, height, rgba.into_raw())
}

/// Parse SVG bytes into a prepared `usvg` tree.
pub fn parse_svg(bytes: &[u8]) -> JayverseResult<PreparedSvg> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts)
        .context("parse svg tree")
        .map_err(|e| JayverseError::decode(format!("{e:#}")))?;
    Ok(PreparedSvg {
        tree: Arc::new(tree),
    })
}

/// Decode an uploaded asset, using `mime` when known and sniffing otherwise.
pub fn decode_asset(bytes: &[u8], mime: Option<&str>) -> JayverseResult<DecodedAsset> {
    let kind = match mime {
        Some(m) => ImageMime::from_mime(m)?,
        None => ImageMime::sniff(bytes)
            .ok_or_else(|| JayverseError::decode("unrecognized image data"))?,
    };
    match kind {
        ImageMime::Svg => parse_svg(bytes).map(DecodedAsset::Svg),
        _ => decode_image(bytes).map(DecodedAsset::Raster),
    }
}

/// Rasterize an SVG stretched to exactly `width x height`.
pub fn rasterize_svg(svg: &PreparedSvg, width: u32, height: u32) -> JayverseResult<RasterImage> {
    // Avoid pathological allocations from hostile documents or absurd draw sizes.
    const MAX_DIM: u32 = 16_384;
    if width == 0 || height == 0 || width > MAX_DIM || height > MAX_DIM {
        return Err(JayverseError::render(format!(
            "svg raster size out of range: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| JayverseError::render("failed to allocate svg pixmap"))?;

    let size = svg.tree.size();
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);
    resvg::render(&svg.tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are premultiplied.
    let mut data = pixmap.take();
    for px in data.chunks_exact_mut(4) {
        let out = crate::foundation::math::unpremultiply_px([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&out);
    }
    RasterImage::from_rgba8(width, height, data)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let t = text.trim_start_matches('\u{feff}').trim_start();
    t.starts_with("<svg") || (t.starts_with("<?xml") && t.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
