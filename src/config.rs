use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::assets::store::AssetRoot;
use crate::assets::templates::TemplateCatalog;
use crate::effects::meme::FontChoice;
use crate::encode::gallery::{DEFAULT_BUCKET, LocalGallery};
use crate::foundation::error::{JayverseError, JayverseResult};

/// Application configuration, usually loaded from a JSON file.
///
/// Every field has a default so a partial (or empty) file is valid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct JayverseConfig {
    /// Directory template paths resolve against.
    pub assets_root: PathBuf,
    /// Optional JSON template catalog replacing the built-in one.
    pub templates: Option<PathBuf>,
    /// Caption font selection.
    pub fonts: FontConfig,
    /// Quiet periods per tool.
    pub debounce: DebounceConfig,
    /// Hosted inference settings.
    pub ai: AiConfig,
    /// Local gallery location.
    pub gallery: GalleryConfig,
}

impl Default for JayverseConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("public"),
            templates: None,
            fonts: FontConfig::default(),
            debounce: DebounceConfig::default(),
            ai: AiConfig::default(),
            gallery: GalleryConfig::default(),
        }
    }
}

/// Caption font selection.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font file to use instead of a system font.
    pub path: Option<PathBuf>,
    /// System families to try, in order, before generic sans-serif.
    pub families: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            families: vec![
                "Impact".to_string(),
                "Anton".to_string(),
                "Arial Black".to_string(),
            ],
        }
    }
}

impl FontConfig {
    /// Font source for the meme compositor.
    pub fn font_choice(&self) -> FontChoice {
        match &self.path {
            Some(p) => FontChoice::File(p.clone()),
            None => FontChoice::System(self.families.clone()),
        }
    }
}

/// Quiet period each tool waits for before re-rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Glitch filter quiet period.
    pub glitch_ms: u64,
    /// Meme compositor quiet period.
    pub meme_ms: u64,
    /// Mockup compositor quiet period.
    pub mockup_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            glitch_ms: 300,
            meme_ms: 200,
            mockup_ms: 300,
        }
    }
}

impl DebounceConfig {
    /// Glitch quiet period.
    pub fn glitch(&self) -> Duration {
        Duration::from_millis(self.glitch_ms)
    }

    /// Meme quiet period.
    pub fn meme(&self) -> Duration {
        Duration::from_millis(self.meme_ms)
    }

    /// Mockup quiet period.
    pub fn mockup(&self) -> Duration {
        Duration::from_millis(self.mockup_ms)
    }
}

/// Hosted inference endpoints and credentials.
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Return canned responses without network access.
    pub mock: bool,
    /// Bearer token. Never written back out.
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Chat completions endpoint used for captions and hashtags.
    pub chat_endpoint: String,
    /// Text model id.
    pub text_model: String,
    /// Image generation endpoint used for scenes.
    pub image_endpoint: String,
    /// Image model id.
    pub image_model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiConfig")
            .field("mock", &self.mock)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("chat_endpoint", &self.chat_endpoint)
            .field("text_model", &self.text_model)
            .field("image_endpoint", &self.image_endpoint)
            .field("image_model", &self.image_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            mock: false,
            api_token: None,
            chat_endpoint: "https://router.huggingface.co/v1/chat/completions".to_string(),
            text_model: "mistralai/Mistral-7B-Instruct-v0.2:featherless-ai".to_string(),
            image_endpoint: "https://router.huggingface.co/together/v1/images/generations"
                .to_string(),
            image_model: "black-forest-labs/FLUX.1-dev".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Local gallery location.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory holding the bucket and the metadata table.
    pub root: PathBuf,
    /// Bucket (sub-directory) name.
    pub bucket: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("gallery"),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

impl GalleryConfig {
    /// Filesystem gallery at the configured location.
    pub fn local(&self) -> LocalGallery {
        LocalGallery::new(&self.root, &self.bucket)
    }
}

impl JayverseConfig {
    /// Parse configuration JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> JayverseResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| JayverseError::serde(format!("parse config JSON: {e}")))
    }

    /// Load configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> JayverseResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            JayverseError::validation(format!("open config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Apply `JAYVERSE_ASSETS_ROOT`, `MOCK_AI_RESPONSES` and `HF_API_TOKEN` from the process
    /// environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply the environment overrides using `lookup` instead of the process environment.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(root) = lookup("JAYVERSE_ASSETS_ROOT").filter(|v| !v.is_empty()) {
            self.assets_root = PathBuf::from(root);
        }
        if let Some(mock) = lookup("MOCK_AI_RESPONSES") {
            self.ai.mock = mock == "true";
        }
        if let Some(token) = lookup("HF_API_TOKEN").filter(|v| !v.trim().is_empty()) {
            self.ai.api_token = Some(token);
        }
        self
    }

    /// Asset root for template images.
    pub fn asset_root(&self) -> AssetRoot {
        AssetRoot::new(&self.assets_root)
    }

    /// Template catalog: the configured file, else the built-in one.
    pub fn catalog(&self) -> JayverseResult<TemplateCatalog> {
        match &self.templates {
            Some(path) => TemplateCatalog::from_path(path),
            None => Ok(TemplateCatalog::builtin()),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
