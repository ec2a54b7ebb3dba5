use crate::assets::decode::{DecodedAsset, decode_asset, decode_image};
use crate::assets::raster::RasterImage;
use crate::foundation::core::{PlacementRect, Rect};
use crate::foundation::error::{JayverseError, JayverseResult};
use crate::render::blend::BlendMode;
use crate::render::surface::Surface;

/// Logo placement settings for a mockup.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MockupParams {
    /// Logo size relative to the placement rect, in percent. Values above 100 are capped at the
    /// rect size.
    pub scale_percent: f64,
    /// Logo opacity, `(0, 1]`.
    pub opacity: f32,
    /// How the logo combines with the product photo.
    pub blend_mode: BlendMode,
}

impl Default for MockupParams {
    fn default() -> Self {
        Self {
            scale_percent: 100.0,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
        }
    }
}

/// Where the logo is drawn: scaled, capped to the placement size and centered on it.
pub fn logo_draw_rect(placement: PlacementRect, scale_percent: f64) -> Rect {
    let scale = if scale_percent.is_finite() {
        scale_percent.max(0.0) / 100.0
    } else {
        1.0
    };
    let w = (placement.width * scale).min(placement.width);
    let h = (placement.height * scale).min(placement.height);
    let c = placement.center();
    Rect::new(c.x - w / 2.0, c.y - h / 2.0, c.x + w / 2.0, c.y + h / 2.0)
}

/// Draw `logo` onto `template` inside `placement`.
///
/// Without a logo the template is returned as-is.
#[tracing::instrument(skip(template, logo), fields(width = template.width(), height = template.height(), has_logo = logo.is_some()))]
pub fn render_mockup(
    template: &RasterImage,
    placement: PlacementRect,
    logo: Option<&DecodedAsset>,
    params: &MockupParams,
) -> JayverseResult<RasterImage> {
    let Some(logo) = logo else {
        return Ok(template.clone());
    };

    let dest = logo_draw_rect(placement, params.scale_percent);
    let draw_w = dest.width().round() as u32;
    let draw_h = dest.height().round() as u32;
    if draw_w == 0 || draw_h == 0 {
        tracing::debug!("logo scaled to nothing");
        return Ok(template.clone());
    }
    // The surface stretches the pixels into `dest`; an SVG never needs more than can show.
    let logo_px = logo.rasterize(draw_w.min(template.width()), draw_h.min(template.height()))?;

    let mut surface = Surface::from_image(template)?;
    {
        let mut scope = surface.compositing(params.opacity, params.blend_mode);
        scope.draw_image(&logo_px, dest)?;
    }
    surface.snapshot()
}

/// Decode the mockup inputs, naming which one failed.
pub fn decode_mockup_inputs(
    template: &[u8],
    logo: Option<(&[u8], Option<&str>)>,
) -> JayverseResult<(RasterImage, Option<DecodedAsset>)> {
    let template = decode_image(template).map_err(|e| name_asset(e, "mockup template"))?;
    let logo = match logo {
        Some((bytes, mime)) => {
            Some(decode_asset(bytes, mime).map_err(|e| name_asset(e, "uploaded logo"))?)
        }
        None => None,
    };
    Ok((template, logo))
}

fn name_asset(err: JayverseError, what: &str) -> JayverseError {
    match err {
        JayverseError::Decode(msg) => JayverseError::decode(format!("{what}: {msg}")),
        JayverseError::Validation(msg) => JayverseError::validation(format!("{what}: {msg}")),
        other => other,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/mockup.rs"]
mod tests;
