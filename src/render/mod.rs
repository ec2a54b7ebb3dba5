//! CPU drawing: blend kernels, the off-screen surface and caption text.

/// Canvas blend modes and premultiplied compositing kernels.
pub mod blend;
/// Off-screen drawing target with scoped compositing state.
pub mod surface;
pub(crate) mod text;
