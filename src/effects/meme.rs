use std::path::PathBuf;

use crate::assets::raster::RasterImage;
use crate::assets::store::LoadedFont;
use crate::foundation::core::Rgba8;
use crate::foundation::error::JayverseResult;
use crate::render::surface::Surface;
use crate::render::text::{BlockAnchor, OutlinedTextStyle, TextPainter};

/// Caption settings for a meme.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MemeParams {
    /// Caption drawn at the top, growing downward.
    pub top_text: String,
    /// Caption drawn at the bottom, growing upward.
    pub bottom_text: String,
    /// Font size in pixels.
    pub font_size: f32,
    /// Fill color as CSS hex.
    pub font_color: String,
    /// Outline color as CSS hex.
    pub stroke_color: String,
}

impl Default for MemeParams {
    fn default() -> Self {
        Self {
            top_text: String::new(),
            bottom_text: String::new(),
            font_size: 48.0,
            font_color: "#FFFFFF".to_string(),
            stroke_color: "#000000".to_string(),
        }
    }
}

/// Where the caption font comes from.
#[derive(Clone, Debug)]
pub enum FontChoice {
    /// A font file on disk.
    File(PathBuf),
    /// First installed family from the list, else generic sans-serif.
    System(Vec<String>),
    /// Already loaded bytes.
    Loaded(LoadedFont),
}

impl Default for FontChoice {
    fn default() -> Self {
        Self::System(vec![
            "Impact".to_string(),
            "Anton".to_string(),
            "Arial Black".to_string(),
        ])
    }
}

impl FontChoice {
    fn load(&self) -> JayverseResult<LoadedFont> {
        match self {
            Self::File(path) => LoadedFont::from_path(path),
            Self::System(families) => LoadedFont::from_system(families),
            Self::Loaded(font) => Ok(font.clone()),
        }
    }
}

/// Greedy word wrap.
///
/// A word joins the current line while `measure("<line> <word> ")` stays within `max_width`;
/// the trailing space is part of the measurement, so lines break about one space earlier than
/// a tight fit. A word that does not fit starts the next line, even when it is wider than
/// `max_width` by itself. Returned lines carry no trailing space. Blank text yields no lines.
pub fn wrap_text<F>(text: &str, max_width: f32, mut measure: F) -> JayverseResult<Vec<String>>
where
    F: FnMut(&str) -> JayverseResult<f32>,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&format!("{candidate} "))? > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

/// Draws outlined captions over meme templates.
///
/// The font is loaded on first use, so captions-free renders never touch the font system.
pub struct MemeCompositor {
    font: FontChoice,
    painter: Option<TextPainter>,
}

impl std::fmt::Debug for MemeCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemeCompositor")
            .field("font", &self.font)
            .field("font_loaded", &self.painter.is_some())
            .finish()
    }
}

impl Default for MemeCompositor {
    fn default() -> Self {
        Self::new(FontChoice::default())
    }
}

impl MemeCompositor {
    /// Compositor using `font` for captions.
    pub fn new(font: FontChoice) -> Self {
        Self {
            font,
            painter: None,
        }
    }

    fn painter(&mut self) -> JayverseResult<&mut TextPainter> {
        let painter = match self.painter.take() {
            Some(p) => p,
            None => {
                let font = self.font.load()?;
                tracing::debug!(family = ?font.family(), "meme font loaded");
                TextPainter::new(font)
            }
        };
        Ok(self.painter.insert(painter))
    }

    /// Draw `params` captions over `template`.
    #[tracing::instrument(skip(self, template), fields(width = template.width(), height = template.height()))]
    pub fn render(&mut self, template: &RasterImage, params: &MemeParams) -> JayverseResult<RasterImage> {
        let top = params.top_text.trim().to_uppercase();
        let bottom = params.bottom_text.trim().to_uppercase();
        if top.is_empty() && bottom.is_empty() {
            return Ok(template.clone());
        }

        let fill = Rgba8::from_hex(&params.font_color)?;
        let stroke = Rgba8::from_hex(&params.stroke_color)?;
        let size = params.font_size;
        let style = OutlinedTextStyle {
            size_px: size,
            line_height: f64::from(size) * 1.1,
            fill,
            stroke,
            stroke_width: (f64::from(size) / 16.0).max(2.0),
        };

        let w = f64::from(template.width());
        let h = f64::from(template.height());
        let max_width = (0.9 * w) as f32;
        let padding = 0.05 * h;

        let mut surface = Surface::from_image(template)?;
        let painter = self.painter()?;

        let top_lines = wrap_text(&top, max_width, |s| painter.measure(s, size))?;
        let bottom_lines = wrap_text(&bottom, max_width, |s| painter.measure(s, size))?;
        tracing::debug!(
            top_lines = top_lines.len(),
            bottom_lines = bottom_lines.len(),
            "captions wrapped"
        );

        painter.draw_block(&mut surface, &top_lines, BlockAnchor::Top(padding), &style)?;
        painter.draw_block(
            &mut surface,
            &bottom_lines,
            BlockAnchor::Bottom(h - padding),
            &style,
        )?;
        surface.snapshot()
    }
}

/// One-shot meme render with a fresh compositor.
pub fn render_meme(
    template: &RasterImage,
    params: &MemeParams,
    font: FontChoice,
) -> JayverseResult<RasterImage> {
    MemeCompositor::new(font).render(template, params)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/meme.rs"]
mod tests;
