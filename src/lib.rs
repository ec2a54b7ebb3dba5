//! Jayverse is the image compositing core behind Jayverse Tools.
//!
//! Three pipelines turn a source raster plus parameters into a new raster:
//!
//! - [`apply_glitch`] adds scanlines, an RGB channel shift and block displacement
//! - [`MemeCompositor`] draws outlined, word-wrapped captions over a template
//! - [`render_mockup`] places a logo on a product photo with opacity and a blend mode
//!
//! [`DebouncedRunner`] re-renders after parameters stop changing and never lets a stale result
//! replace a newer one. Finished images are exported as PNG or data URLs ([`CompositeResult`]) and
//! can be saved through a [`GallerySink`]. [`AiProxy`] talks to the hosted text and image models.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Decoding, pixel buffers, asset resolution, fonts and templates.
pub mod assets;
/// JSON configuration with environment overrides.
pub mod config;
/// Glitch, meme and mockup pipelines.
pub mod effects;
/// PNG export and gallery persistence.
pub mod encode;
/// Hosted AI endpoints.
pub mod proxy;
/// Blend kernels, drawing surface and caption text.
pub mod render;
/// Debounced execution of the pipelines.
pub mod session;

pub use crate::foundation::core::{Affine, PlacementRect, Point, Rect, Rgba8};
pub use crate::foundation::error::{JayverseError, JayverseResult};

pub use crate::assets::decode::{DecodedAsset, ImageMime, decode_asset, decode_image};
pub use crate::assets::raster::{PixelBuffer, RasterImage};
pub use crate::assets::store::{AssetRoot, LoadedFont};
pub use crate::assets::templates::{MemeTemplate, MockupTemplate, TemplateCatalog};
pub use crate::config::JayverseConfig;
pub use crate::effects::glitch::{GlitchParams, apply_glitch};
pub use crate::effects::meme::{FontChoice, MemeCompositor, MemeParams, render_meme, wrap_text};
pub use crate::effects::mockup::{MockupParams, logo_draw_rect, render_mockup};
pub use crate::encode::export::{CompositeResult, Tool};
pub use crate::encode::gallery::{
    GalleryRecord, GallerySink, InMemoryGallery, LocalGallery, save_to_gallery,
};
pub use crate::proxy::ai::AiProxy;
pub use crate::render::blend::BlendMode;
pub use crate::render::surface::Surface;
pub use crate::session::debounce::{DebouncedRunner, Generation, RunnerStats};
