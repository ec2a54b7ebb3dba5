use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::PlacementRect;
use crate::foundation::error::{JayverseError, JayverseResult};

/// A meme background with suggested captions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MemeTemplate {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Image path relative to the asset root.
    pub image_src: String,
    /// Caption prefilled into the top text box.
    #[serde(default)]
    pub default_top_text: Option<String>,
    /// Caption prefilled into the bottom text box.
    #[serde(default)]
    pub default_bottom_text: Option<String>,
}

/// A product photo with the rectangle a logo is placed into.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MockupTemplate {
    /// Stable identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Image path relative to the asset root.
    pub image_src: String,
    /// Where the logo goes, in template pixels.
    pub placement: PlacementRect,
}

/// Meme and mockup templates available to the tools.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TemplateCatalog {
    /// Meme templates in display order.
    #[serde(default)]
    pub memes: Vec<MemeTemplate>,
    /// Mockup templates in display order.
    #[serde(default)]
    pub mockups: Vec<MockupTemplate>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    /// Templates shipped with the application.
    pub fn builtin() -> Self {
        fn meme(id: &str, name: &str, src: &str, top: Option<&str>, bottom: Option<&str>) -> MemeTemplate {
            MemeTemplate {
                id: id.to_string(),
                name: name.to_string(),
                image_src: src.to_string(),
                default_top_text: top.map(str::to_string),
                default_bottom_text: bottom.map(str::to_string),
            }
        }
        fn mockup(id: &str, name: &str, src: &str, rect: [f64; 4]) -> MockupTemplate {
            MockupTemplate {
                id: id.to_string(),
                name: name.to_string(),
                image_src: src.to_string(),
                placement: PlacementRect {
                    x: rect[0],
                    y: rect[1],
                    width: rect[2],
                    height: rect[3],
                },
            }
        }

        Self {
            memes: vec![
                meme(
                    "distracted_boyfriend",
                    "Distracted Boyfriend",
                    "/memes/distracted-boyfriend.jpg",
                    Some("My project idea"),
                    Some("My focus"),
                ),
                meme(
                    "drake_hotline_bling",
                    "Drake Hotline Bling",
                    "/memes/drake-meme.jpg",
                    Some("Complex Solution"),
                    Some("Simple Solution"),
                ),
                meme(
                    "expanding_brain",
                    "Expanding Brain",
                    "/memes/expanding-brain.jpg",
                    Some("Basic idea"),
                    None,
                ),
                meme(
                    "woman_yelling_cat",
                    "Woman Yelling At Cat",
                    "/memes/woman-yelling-at-cat.jpg",
                    Some("Me trying to work"),
                    Some("My notifications"),
                ),
            ],
            mockups: vec![
                mockup(
                    "tshirt_front",
                    "T-Shirt (Front)",
                    "/mockups/tshirt-mockup.png",
                    [1498.0, 1057.0, 1553.0, 1337.0],
                ),
                mockup(
                    "phone_screen",
                    "Phone Screen",
                    "/mockups/phone-mockup.png",
                    [665.0, 441.0, 628.0, 628.0],
                ),
                mockup(
                    "poster_vertical",
                    "Poster (Vertical)",
                    "/mockups/poster-mockup.png",
                    [160.0, 165.0, 131.0, 154.0],
                ),
                mockup(
                    "mug_side",
                    "Coffee Mug",
                    "/mockups/mug-mockup.png",
                    [1065.0, 1079.0, 816.0, 908.0],
                ),
            ],
        }
    }

    /// Parse a catalog from JSON and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> JayverseResult<Self> {
        let catalog: Self = serde_json::from_reader(r)
            .map_err(|e| JayverseError::serde(format!("parse template catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a catalog from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> JayverseResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            JayverseError::validation(format!(
                "open template catalog '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check ids are unique and placement rects are usable.
    pub fn validate(&self) -> JayverseResult<()> {
        let mut seen = std::collections::HashSet::new();
        for id in self.memes.iter().map(|m| &m.id) {
            if !seen.insert(("meme", id.as_str())) {
                return Err(JayverseError::validation(format!(
                    "duplicate meme template id '{id}'"
                )));
            }
        }
        for m in &self.mockups {
            if !seen.insert(("mockup", m.id.as_str())) {
                return Err(JayverseError::validation(format!(
                    "duplicate mockup template id '{}'",
                    m.id
                )));
            }
            let p = m.placement;
            PlacementRect::new(p.x, p.y, p.width, p.height).map_err(|e| {
                JayverseError::validation(format!("mockup template '{}': {e}", m.id))
            })?;
        }
        Ok(())
    }

    /// Find a meme template by id.
    pub fn meme(&self, id: &str) -> JayverseResult<&MemeTemplate> {
        self.memes
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| JayverseError::validation(format!("unknown meme template '{id}'")))
    }

    /// Find a mockup template by id.
    pub fn mockup(&self, id: &str) -> JayverseResult<&MockupTemplate> {
        self.mockups
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| JayverseError::validation(format!("unknown mockup template '{id}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/templates.rs"]
mod tests;
