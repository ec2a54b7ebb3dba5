use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::encode::export::Tool;
use crate::foundation::error::{JayverseError, JayverseResult};

/// Default storage bucket for saved creations.
pub const DEFAULT_BUCKET: &str = "jayverse-gallery";

/// Metadata row describing one saved creation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GalleryRecord {
    /// Owner.
    pub user_id: String,
    /// Human-readable title.
    pub title: String,
    /// Public URL of the uploaded image.
    pub image_url: String,
    /// Display name of the producing tool.
    pub tool_source: String,
}

/// Storage plus metadata table a creation is saved into.
///
/// `upload` must not overwrite existing objects.
pub trait GallerySink: Send {
    /// Store `bytes` at `path` and return its public URL.
    fn upload(&mut self, path: &str, bytes: &[u8], content_type: &str) -> JayverseResult<String>;
    /// Append a metadata row.
    fn insert(&mut self, record: &GalleryRecord) -> JayverseResult<()>;
}

/// `<user_id>/<prefix>_<user_id>_<millis>.png`
pub fn gallery_object_path(user_id: &str, prefix: &str, unix_millis: u128) -> JayverseResult<String> {
    if user_id.is_empty() || user_id.contains(['/', '\\']) || user_id.contains("..") {
        return Err(JayverseError::validation(format!(
            "invalid gallery user id '{user_id}'"
        )));
    }
    Ok(format!("{user_id}/{prefix}_{user_id}_{unix_millis}.png"))
}

/// Upload `png` then record it. The caller's image is untouched whatever happens.
#[tracing::instrument(skip(sink, png), fields(bytes = png.len()))]
pub fn save_to_gallery(
    sink: &mut dyn GallerySink,
    user_id: &str,
    tool: Tool,
    title: &str,
    png: &[u8],
    unix_millis: u128,
) -> JayverseResult<GalleryRecord> {
    let path = gallery_object_path(user_id, tool.gallery_prefix(), unix_millis)?;
    let image_url = sink.upload(&path, png, "image/png")?;
    if image_url.is_empty() {
        return Err(JayverseError::gallery(
            "could not get public URL for uploaded image",
        ));
    }
    let record = GalleryRecord {
        user_id: user_id.to_string(),
        title: title.to_string(),
        image_url,
        tool_source: tool.display_name().to_string(),
    };
    sink.insert(&record)?;
    tracing::info!(path = %path, tool = tool.display_name(), "saved to gallery");
    Ok(record)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}

/// `Glitched PFP: <file name>`
pub fn glitch_title(file_name: &str) -> String {
    format!("Glitched PFP: {file_name}")
}

/// `Meme: <top text, 30 chars> - <template name>`
pub fn meme_title(top_text: &str, template_name: &str) -> String {
    format!("Meme: {} - {template_name}", truncate_chars(top_text, 30))
}

/// `Mockup: <template name>`
pub fn mockup_title(template_name: &str) -> String {
    format!("Mockup: {template_name}")
}

/// `Scene: <description, 50 chars>`
pub fn scene_title(script_description: &str) -> String {
    format!("Scene: {}", truncate_chars(script_description, 50))
}

/// Gallery kept in memory. Useful for tests.
#[derive(Debug)]
pub struct InMemoryGallery {
    base_url: String,
    objects: BTreeMap<String, Vec<u8>>,
    records: Vec<GalleryRecord>,
}

impl Default for InMemoryGallery {
    fn default() -> Self {
        Self::new("memory://jayverse-gallery")
    }
}

impl InMemoryGallery {
    /// Empty gallery whose public URLs start with `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: BTreeMap::new(),
            records: Vec::new(),
        }
    }

    /// Stored objects by path.
    pub fn objects(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.objects
    }

    /// Inserted rows in order.
    pub fn records(&self) -> &[GalleryRecord] {
        &self.records
    }
}

impl GallerySink for InMemoryGallery {
    fn upload(&mut self, path: &str, bytes: &[u8], _content_type: &str) -> JayverseResult<String> {
        if self.objects.contains_key(path) {
            return Err(JayverseError::gallery(format!("object '{path}' already exists")));
        }
        self.objects.insert(path.to_string(), bytes.to_vec());
        Ok(format!("{}/{path}", self.base_url))
    }

    fn insert(&mut self, record: &GalleryRecord) -> JayverseResult<()> {
        self.records.push(record.clone());
        Ok(())
    }
}

/// Gallery on the local filesystem: objects under `<root>/<bucket>/`, rows appended to
/// `<root>/user_gallery.jsonl`.
#[derive(Clone, Debug)]
pub struct LocalGallery {
    root: PathBuf,
    bucket: String,
}

impl LocalGallery {
    /// Gallery rooted at `root`.
    pub fn new(root: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            bucket: bucket.into(),
        }
    }

    fn table_path(&self) -> PathBuf {
        self.root.join("user_gallery.jsonl")
    }

    /// Read back every row.
    pub fn records(&self) -> JayverseResult<Vec<GalleryRecord>> {
        let path = self.table_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let f = std::fs::File::open(&path)
            .with_context(|| format!("open gallery table '{}'", path.display()))?;
        let mut out = Vec::new();
        for line in BufReader::new(f).lines() {
            let line = line.context("read gallery table")?;
            if line.trim().is_empty() {
                continue;
            }
            out.push(
                serde_json::from_str(&line)
                    .map_err(|e| JayverseError::serde(format!("gallery row: {e}")))?,
            );
        }
        Ok(out)
    }

    fn object_path(&self, rel: &str) -> JayverseResult<PathBuf> {
        let norm = crate::assets::store::normalize_rel_path(rel)?;
        Ok(self.root.join(&self.bucket).join(Path::new(&norm)))
    }
}

impl GallerySink for LocalGallery {
    fn upload(&mut self, path: &str, bytes: &[u8], _content_type: &str) -> JayverseResult<String> {
        let dest = self.object_path(path)?;
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| JayverseError::gallery(format!("create '{}': {e}", parent.display())))?;
        }
        let mut f = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .map_err(|e| JayverseError::gallery(format!("upload '{}': {e}", dest.display())))?;
        f.write_all(bytes)
            .map_err(|e| JayverseError::gallery(format!("upload '{}': {e}", dest.display())))?;

        let abs = std::path::absolute(&dest).unwrap_or(dest);
        Ok(format!("file://{}", abs.display()))
    }

    fn insert(&mut self, record: &GalleryRecord) -> JayverseResult<()> {
        std::fs::create_dir_all(&self.root)
            .map_err(|e| JayverseError::gallery(format!("create gallery root: {e}")))?;
        let line = serde_json::to_string(record)
            .map_err(|e| JayverseError::serde(format!("gallery row: {e}")))?;
        let path = self.table_path();
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| JayverseError::gallery(format!("open '{}': {e}", path.display())))?;
        writeln!(f, "{line}")
            .map_err(|e| JayverseError::gallery(format!("insert into '{}': {e}", path.display())))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/gallery.rs"]
mod tests;
