use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::foundation::error::{JayverseError, JayverseResult};

/// Directory that bundled template assets are resolved against.
#[derive(Clone, Debug)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    /// Create an asset root at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative asset path (see [`normalize_rel_path`]).
    pub fn resolve(&self, rel: &str) -> JayverseResult<PathBuf> {
        let norm = normalize_rel_path(rel)?;
        Ok(self.root.join(Path::new(&norm)))
    }

    /// Read a relative asset's bytes.
    pub fn read_bytes(&self, rel: &str) -> JayverseResult<Vec<u8>> {
        let p = self.resolve(rel)?;
        std::fs::read(&p).map_err(|e| {
            JayverseError::decode(format!("failed to read asset '{}': {e}", p.display()))
        })
    }
}

/// Normalize and validate root-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments and a single leading `/`
/// (template paths are written web-style, e.g. `/memes/drake-meme.jpg`), and rejects parent
/// traversals (`..`).
pub fn normalize_rel_path(source: &str) -> JayverseResult<String> {
    let replaced = source.replace('\\', "/");
    let s = replaced.strip_prefix('/').unwrap_or(replaced.as_str());
    if s.starts_with('/') || s.contains(':') {
        return Err(JayverseError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(JayverseError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(JayverseError::validation(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(JayverseError::validation(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Font bytes plus the face to use inside them.
#[derive(Clone)]
pub struct LoadedFont {
    pub(crate) bytes: Arc<Vec<u8>>,
    pub(crate) index: u32,
    pub(crate) family: Option<String>,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("bytes_len", &self.bytes.len())
            .field("index", &self.index)
            .field("family", &self.family)
            .finish()
    }
}

impl LoadedFont {
    /// Wrap raw font file bytes (face 0).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(bytes),
            index: 0,
            family: None,
        }
    }

    /// Load a font file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> JayverseResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            JayverseError::render(format!("failed to read font '{}': {e}", path.display()))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    /// Pick the first installed system family from `preferred`, falling back to generic
    /// sans-serif.
    pub fn from_system(preferred: &[String]) -> JayverseResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
        for name in preferred {
            families.push(usvg::fontdb::Family::Name(name.as_str()));
        }
        families.push(usvg::fontdb::Family::SansSerif);

        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::BOLD,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))
            .ok_or_else(|| JayverseError::render("no usable font found on this system"))?;

        let family = db
            .face(id)
            .and_then(|f| f.families.first().map(|(name, _)| name.clone()));
        let (bytes, index) = db
            .with_face_data(id, |data, index| (data.to_vec(), index))
            .ok_or_else(|| JayverseError::render("failed to read system font data"))?;

        tracing::debug!(family = ?family, "loaded system font");
        Ok(Self {
            bytes: Arc::new(bytes),
            index,
            family,
        })
    }

    /// Family name, when known.
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(self.bytes.as_ref().clone()),
            self.index,
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Stateful helper for building Parley text layouts from loaded fonts.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    // Keyed by the font byte buffer address; a font is registered once per engine.
    families: HashMap<usize, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    fn family_for(&mut self, font: &LoadedFont) -> JayverseResult<String> {
        let key = Arc::as_ptr(&font.bytes) as usize;
        if let Some(name) = self.families.get(&key) {
            return Ok(name.clone());
        }

        let families = self.font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font.bytes.as_ref().clone()),
            None,
        );
        let name = match &font.family {
            Some(name) => name.clone(),
            None => {
                let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
                    JayverseError::render("no font families registered from font bytes")
                })?;
                self.font_ctx
                    .collection
                    .family_name(family_id)
                    .ok_or_else(|| JayverseError::render("registered font family has no name"))?
                    .to_string()
            }
        };
        self.families.insert(key, name.clone());
        Ok(name)
    }

    /// Shape and lay out a single unwrapped line.
    pub(crate) fn layout_line(
        &mut self,
        font: &LoadedFont,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> JayverseResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(JayverseError::validation(
                "font size must be finite and > 0",
            ));
        }
        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout.align(
            None,
            parley::Alignment::Start,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }

    /// Advance width of `text` on one line.
    pub(crate) fn measure(
        &mut self,
        font: &LoadedFont,
        text: &str,
        size_px: f32,
    ) -> JayverseResult<f32> {
        let layout = self.layout_line(font, text, size_px, TextBrushRgba8::default())?;
        Ok(layout.width())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
