//! Input assets: decoding, pixel buffers, bundled files, fonts and templates.

/// Image decoding and SVG rasterization.
pub mod decode;
/// Decoded bitmaps and mutable working buffers.
pub mod raster;
/// Asset root resolution and font loading.
pub mod store;
/// Built-in and JSON-loaded template catalogs.
pub mod templates;
