use std::io::Cursor;

use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::assets::raster::RasterImage;
use crate::foundation::error::{JayverseError, JayverseResult};

/// Which tool produced an image. Drives file names and gallery metadata.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Glitch My Profile.
    Glitch,
    /// Meme Maker.
    Meme,
    /// Mockup Genie.
    Mockup,
    /// Script-to-Scene.
    Scene,
}

impl Tool {
    /// Slug used in download file names.
    pub fn download_slug(self) -> &'static str {
        match self {
            Self::Glitch => "glitch-pfp",
            Self::Meme => "meme",
            Self::Mockup => "mockup",
            Self::Scene => "scene",
        }
    }

    /// Prefix of gallery object names.
    pub fn gallery_prefix(self) -> &'static str {
        match self {
            Self::Glitch => "glitch",
            Self::Meme => "meme",
            Self::Mockup => "mockup",
            Self::Scene => "scene",
        }
    }

    /// Display name stored as `tool_source` in gallery records.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Glitch => "Glitch My Profile",
            Self::Meme => "Meme Maker",
            Self::Mockup => "Mockup Genie",
            Self::Scene => "Script-to-Scene",
        }
    }
}

/// A finished composite, ready to export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeResult {
    /// Tool that produced it.
    pub tool: Tool,
    /// Output pixels.
    pub image: RasterImage,
}

impl CompositeResult {
    /// Wrap a pipeline output.
    pub fn new(tool: Tool, image: RasterImage) -> Self {
        Self { tool, image }
    }

    /// Lossless PNG encoding.
    pub fn to_png(&self) -> JayverseResult<Vec<u8>> {
        encode_png(&self.image)
    }

    /// `data:image/png;base64,...`
    pub fn to_data_url(&self) -> JayverseResult<String> {
        Ok(data_url("image/png", &self.to_png()?))
    }

    /// Suggested download name at `unix_millis`.
    pub fn download_filename(&self, unix_millis: u128) -> String {
        download_filename(self.tool, unix_millis)
    }
}

/// Encode straight-alpha RGBA8 as PNG.
pub fn encode_png(image: &RasterImage) -> JayverseResult<Vec<u8>> {
    let mut out = Vec::new();
    image
        .to_rgba_image()
        .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .context("encode png")
        .map_err(|e| JayverseError::export(format!("{e:#}")))?;
    Ok(out)
}

/// Base64 data URL for `bytes`.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Split a base64 data URL into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> JayverseResult<(String, Vec<u8>)> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| JayverseError::validation("not a data URL"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| JayverseError::validation("data URL has no payload"))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| JayverseError::validation("only base64 data URLs are supported"))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| JayverseError::decode(format!("invalid base64 payload: {e}")))?;
    Ok((mime.to_string(), bytes))
}

/// `jayverse-<tool>-<unix_millis>.png`
pub fn download_filename(tool: Tool, unix_millis: u128) -> String {
    format!("jayverse-{}-{unix_millis}.png", tool.download_slug())
}

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/export.rs"]
mod tests;
