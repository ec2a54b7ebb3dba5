use crate::assets::store::{LoadedFont, TextBrushRgba8, TextLayoutEngine};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{JayverseError, JayverseResult};
use crate::render::surface::Surface;

/// Stroke and fill settings for outlined caption text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct OutlinedTextStyle {
    pub(crate) size_px: f32,
    pub(crate) line_height: f64,
    pub(crate) fill: Rgba8,
    pub(crate) stroke: Rgba8,
    pub(crate) stroke_width: f64,
}

/// Where a block of lines is pinned vertically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BlockAnchor {
    /// First line's top edge at this y; later lines go down.
    Top(f64),
    /// Last line's bottom edge at this y; earlier lines go up.
    Bottom(f64),
}

/// Shapes text with parley and rasterizes the glyphs with vello_cpu.
pub(crate) struct TextPainter {
    font: LoadedFont,
    font_data: vello_cpu::peniko::FontData,
    engine: TextLayoutEngine,
}

impl TextPainter {
    pub(crate) fn new(font: LoadedFont) -> Self {
        let font_data = font.font_data();
        Self {
            font,
            font_data,
            engine: TextLayoutEngine::new(),
        }
    }

    pub(crate) fn measure(&mut self, text: &str, size_px: f32) -> JayverseResult<f32> {
        self.engine.measure(&self.font, text, size_px)
    }

    /// Draw `lines` horizontally centered on the surface, stroke underneath fill.
    pub(crate) fn draw_block(
        &mut self,
        surface: &mut Surface,
        lines: &[String],
        anchor: BlockAnchor,
        style: &OutlinedTextStyle,
    ) -> JayverseResult<()> {
        if lines.is_empty() {
            return Ok(());
        }
        let w = u16::try_from(surface.width())
            .map_err(|_| JayverseError::render("text canvas width exceeds u16"))?;
        let h = u16::try_from(surface.height())
            .map_err(|_| JayverseError::render("text canvas height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let canvas_w = f64::from(surface.width());
        let n = lines.len();

        for (i, line) in lines.iter().enumerate() {
            let layout =
                self.engine
                    .layout_line(&self.font, line, style.size_px, TextBrushRgba8::default())?;
            let x = canvas_w / 2.0 - f64::from(layout.width()) / 2.0;
            let top = match anchor {
                BlockAnchor::Top(y) => y + (i as f64) * style.line_height,
                BlockAnchor::Bottom(y) => {
                    let bottom = y - ((n - 1 - i) as f64) * style.line_height;
                    bottom - f64::from(layout.height())
                }
            };
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, top)));

            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let font_size = run.run().font_size();
                    let glyphs: Vec<(u32, f32, f32)> =
                        run.positioned_glyphs().map(|g| (g.id, g.x, g.y)).collect();
                    let as_cpu = |&(id, x, y): &(u32, f32, f32)| vello_cpu::Glyph { id, x, y };

                    if style.stroke_width > 0.0 && style.stroke.a > 0 {
                        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(style.stroke_width));
                        ctx.set_paint(to_color(style.stroke));
                        ctx.glyph_run(&self.font_data)
                            .font_size(font_size)
                            .stroke_glyphs(glyphs.iter().map(as_cpu));
                    }
                    ctx.set_paint(to_color(style.fill));
                    ctx.glyph_run(&self.font_data)
                        .font_size(font_size)
                        .fill_glyphs(glyphs.iter().map(as_cpu));
                }
            }
        }

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);
        surface.draw_layer(pixmap.data_as_u8_slice())
    }
}

fn to_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
