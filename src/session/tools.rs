use std::time::Duration;

use crate::assets::decode::DecodedAsset;
use crate::assets::raster::RasterImage;
use crate::effects::glitch::{GlitchParams, apply_glitch};
use crate::effects::meme::{FontChoice, MemeCompositor, MemeParams};
use crate::effects::mockup::{MockupParams, render_mockup};
use crate::encode::export::{CompositeResult, Tool};
use crate::foundation::core::PlacementRect;
use crate::foundation::error::JayverseResult;
use crate::session::debounce::DebouncedRunner;

/// Glitch runner over a fixed source image.
pub fn glitch_runner(
    source: RasterImage,
    quiet: Duration,
) -> JayverseResult<DebouncedRunner<GlitchParams, CompositeResult>> {
    DebouncedRunner::new("glitch", quiet, move |p: &GlitchParams| {
        Ok(CompositeResult::new(Tool::Glitch, apply_glitch(&source, p)))
    })
}

/// Meme runner over a fixed template. The font is loaded by the first run that has text.
pub fn meme_runner(
    template: RasterImage,
    font: FontChoice,
    quiet: Duration,
) -> JayverseResult<DebouncedRunner<MemeParams, CompositeResult>> {
    let mut compositor = MemeCompositor::new(font);
    DebouncedRunner::new("meme", quiet, move |p: &MemeParams| {
        let image = compositor.render(&template, p)?;
        Ok(CompositeResult::new(Tool::Meme, image))
    })
}

/// Mockup runner over a fixed template, placement and logo.
pub fn mockup_runner(
    template: RasterImage,
    placement: PlacementRect,
    logo: Option<DecodedAsset>,
    quiet: Duration,
) -> JayverseResult<DebouncedRunner<MockupParams, CompositeResult>> {
    DebouncedRunner::new("mockup", quiet, move |p: &MockupParams| {
        let image = render_mockup(&template, placement, logo.as_ref(), p)?;
        Ok(CompositeResult::new(Tool::Mockup, image))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/session/tools.rs"]
mod tests;
