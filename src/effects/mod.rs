//! The three compositing pipelines. Each takes a source raster plus parameters and returns a
//! new raster of the same size; inputs are never modified.

/// Scanlines, RGB channel shift and block displacement.
pub mod glitch;
/// Outlined, word-wrapped captions over a template.
pub mod meme;
/// Logo placement on product photos.
pub mod mockup;
