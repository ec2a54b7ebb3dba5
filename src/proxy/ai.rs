use std::sync::LazyLock;
use std::time::Duration;

use crate::config::AiConfig;
use crate::foundation::error::{JayverseError, JayverseResult};
use crate::foundation::math::Fnv1a64;

/// Tone requested for generated captions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionStyle {
    /// Witty and relatable.
    Funny,
    /// Thoughtful or reflective.
    Deep,
    /// Bold and edgy.
    Savage,
    /// Imaginative and artistic.
    Creative,
    /// Anything else: engaging, general audience.
    #[default]
    #[serde(other)]
    General,
}

/// Caption generation input.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionRequest {
    /// Text description of the image.
    pub image_description_text: String,
    /// Requested tone.
    #[serde(default)]
    pub style: CaptionStyle,
}

/// Generated captions.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaptionsResponse {
    /// Up to five captions, numbering stripped.
    pub captions: Vec<String>,
}

/// Hashtag generation input.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HashtagRequest {
    /// Topic to tag.
    pub topic: String,
}

/// Generated hashtags.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HashtagsResponse {
    /// Lowercased, unique, in first-seen order.
    pub hashtags: Vec<String>,
}

/// Scene generation input.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRequest {
    /// Script text to illustrate.
    pub script_description: String,
}

/// Generated scene.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneResponse {
    /// JPEG data URL (or a placeholder URL in mock mode).
    pub image_url: String,
}

/// Placeholder returned for scenes in mock mode.
pub const MOCK_SCENE_URL: &str =
    "https://via.placeholder.com/600x400/0000FF/FFFFFF?text=Mock+Scene+from+HF";

static NUMBERED_LINE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"^\d+\.\s*").expect("static regex"));
static TAG_SEPARATORS: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"[\s,]+").expect("static regex"));

/// Prompt asking for five numbered captions in `style`.
pub fn caption_prompt(description: &str, style: CaptionStyle) -> String {
    let mut prompt = format!(
        "Generate 5 unique and engaging social media captions based on the following image description: \"{description}\".\nFocus on visual detail, mood, and potential viral appeal.\n"
    );
    prompt.push_str(match style {
        CaptionStyle::Funny => " Make them funny, witty, and relatable. Use emojis appropriate for humor.",
        CaptionStyle::Deep => " Make them thoughtful, inspiring, or reflective. Use emojis that convey depth.",
        CaptionStyle::Savage => " Make them bold, confident, and a bit edgy. Use emojis that convey attitude.",
        CaptionStyle::Creative => " Make them imaginative, unique, and artistic. Use creative and expressive emojis.",
        CaptionStyle::General => " Make them engaging and suitable for a general audience. Include relevant emojis and hashtags. Vary the length.",
    });
    prompt.push_str("\n\nFormat the output as a numbered list (1-5) of captions.");
    prompt
}

/// Prompt asking for a comma-separated hashtag list.
pub fn hashtag_prompt(topic: &str) -> String {
    format!(
        "Generate 10-15 highly relevant and viral TikTok hashtags for the topic: \"{topic}\".\nInclude a mix of broad, niche, and trending hashtags.\nFormat the output as a comma-separated list of hashtags, each starting with '#'. Do not include any explanations or extra text."
    )
}

// Instruction-tuned models sometimes echo the prompt; keep what follows the marker.
fn after_inst_marker(raw: &str) -> &str {
    raw.split("[/INST]")
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(raw)
}

/// Keep `N.`-numbered lines, without their numbering.
pub fn parse_captions(raw: &str) -> Vec<String> {
    after_inst_marker(raw)
        .lines()
        .filter(|line| NUMBERED_LINE.is_match(line))
        .map(|line| NUMBERED_LINE.replace(line, "").trim().to_string())
        .collect()
}

/// Split on whitespace and commas, keep `#` tags, lowercase and dedupe in order.
pub fn parse_hashtags(raw: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in TAG_SEPARATORS.split(after_inst_marker(raw)) {
        let tag = tag.trim();
        if tag.is_empty() || !tag.starts_with('#') {
            continue;
        }
        let tag = tag.to_lowercase();
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Canned captions for mock mode.
pub fn mock_captions(style: CaptionStyle) -> Vec<String> {
    let style = serde_json::to_value(style)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    vec![
        format!("Mock Caption 1 (HF): The scene depicts a digital dream. ({style})"),
        "Mock Caption 2 (HF): Pixels and passion.".to_string(),
        "Mock Caption 3 (HF): Where AI meets creativity.".to_string(),
        "Mock Caption 4 (HF): Crafting the future, one byte at a time.".to_string(),
        "Mock Caption 5 (HF): Your vision, powered by open source.".to_string(),
    ]
}

/// Canned hashtags for mock mode. The numbered tags are derived from the topic.
pub fn mock_hashtags(topic: &str) -> Vec<String> {
    let slug: String = topic
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .take(10)
        .collect();
    let mut tags = vec![
        format!("#HuggingFaceViral_{slug}"),
        "#JayverseHF".to_string(),
        "#OpenSourceAI".to_string(),
        "#FreeTierMagic".to_string(),
        "#ContentStrategy".to_string(),
        "#DigitalMarketing".to_string(),
        "#MemeTrends".to_string(),
        "#GrowthHacking".to_string(),
    ];
    for i in 0..5u64 {
        let mut h = Fnv1a64::new_default();
        h.write_bytes(topic.as_bytes());
        h.write_u64(i);
        tags.push(format!("#HFGen{}", h.finish() % 100));
    }
    tags
}

/// Pull a readable message out of an upstream error body.
pub fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let fallback = format!(
        "upstream responded with status {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string();
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return fallback;
    };
    let candidates = [
        json.pointer("/error/message"),
        json.get("error"),
        json.get("message"),
        json.get("detail"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str().map(str::to_string))
        .unwrap_or(fallback)
}

/// Client for the hosted caption, hashtag and scene models.
pub struct AiProxy {
    cfg: AiConfig,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for AiProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiProxy").field("cfg", &self.cfg).finish()
    }
}

impl AiProxy {
    /// Build a client for `cfg`.
    pub fn new(cfg: AiConfig) -> JayverseResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .map_err(|e| JayverseError::proxy(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { cfg, client })
    }

    /// Whether canned responses are returned.
    pub fn is_mock(&self) -> bool {
        self.cfg.mock
    }

    /// Five captions for an image description.
    #[tracing::instrument(skip(self))]
    pub fn generate_captions(&self, req: &CaptionRequest) -> JayverseResult<CaptionsResponse> {
        if req.image_description_text.trim().is_empty() {
            return Err(JayverseError::validation(
                "A text description of the image is required.",
            ));
        }
        if self.cfg.mock {
            return Ok(CaptionsResponse {
                captions: mock_captions(req.style),
            });
        }
        let prompt = caption_prompt(&req.image_description_text, req.style);
        let raw = self
            .chat(&prompt, 300)
            .map_err(|e| wrap_failure("Failed to generate captions", e))?;
        Ok(CaptionsResponse {
            captions: parse_captions(&raw),
        })
    }

    /// Hashtags for a topic.
    #[tracing::instrument(skip(self))]
    pub fn generate_hashtags(&self, req: &HashtagRequest) -> JayverseResult<HashtagsResponse> {
        if req.topic.trim().is_empty() {
            return Err(JayverseError::validation(
                "Topic is required to generate hashtags.",
            ));
        }
        if self.cfg.mock {
            return Ok(HashtagsResponse {
                hashtags: mock_hashtags(&req.topic),
            });
        }
        let raw = self
            .chat(&hashtag_prompt(&req.topic), 150)
            .map_err(|e| wrap_failure("Failed to generate hashtags", e))?;
        Ok(HashtagsResponse {
            hashtags: parse_hashtags(&raw),
        })
    }

    /// An image for a script description, as a JPEG data URL.
    #[tracing::instrument(skip(self))]
    pub fn generate_scene(&self, req: &SceneRequest) -> JayverseResult<SceneResponse> {
        if req.script_description.trim().is_empty() {
            return Err(JayverseError::validation(
                "Script description is required to generate a scene.",
            ));
        }
        if self.cfg.mock {
            return Ok(SceneResponse {
                image_url: MOCK_SCENE_URL.to_string(),
            });
        }
        let body = serde_json::json!({
            "prompt": req.script_description,
            "response_format": "base64",
            "model": self.cfg.image_model,
        });
        let json = self
            .post_json(&self.cfg.image_endpoint, &body)
            .map_err(|e| wrap_failure("Failed to generate scene", e))?;
        let b64 = json
            .pointer("/generations/0/image")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                JayverseError::proxy(
                    "Failed to generate scene: response contained no image data",
                )
            })?;
        Ok(SceneResponse {
            image_url: format!("data:image/jpeg;base64,{b64}"),
        })
    }

    fn token(&self) -> JayverseResult<&str> {
        self.cfg
            .api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                JayverseError::proxy("Server configuration error: Hugging Face API token missing.")
            })
    }

    fn chat(&self, prompt: &str, max_tokens: u32) -> JayverseResult<String> {
        let body = serde_json::json!({
            "messages": [{ "role": "user", "content": prompt }],
            "model": self.cfg.text_model,
            "max_tokens": max_tokens,
            "temperature": 0.7,
            "stream": false,
        });
        let json = self.post_json(&self.cfg.chat_endpoint, &body)?;
        json.pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| JayverseError::proxy("model returned no generated text"))
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> JayverseResult<serde_json::Value> {
        let token = self.token()?;
        let payload = serde_json::to_vec(body)
            .map_err(|e| JayverseError::serde(format!("encode request: {e}")))?;
        tracing::debug!(url, bytes = payload.len(), "calling inference endpoint");

        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .map_err(|e| JayverseError::proxy(describe_reqwest_error(&e)))?;
        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| JayverseError::proxy(format!("read response: {e}")))?;
        tracing::debug!(status = status.as_u16(), "inference endpoint responded");

        if !status.is_success() {
            return Err(JayverseError::proxy(upstream_error_message(status, &text)));
        }
        serde_json::from_str(&text)
            .map_err(|e| JayverseError::proxy(format!("invalid JSON from upstream: {e}")))
    }
}

fn describe_reqwest_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("could not connect: {e}")
    } else {
        format!("request failed: {e}")
    }
}

fn wrap_failure(what: &str, e: JayverseError) -> JayverseError {
    match e {
        JayverseError::Proxy(msg) if msg.starts_with("Server configuration error") => {
            JayverseError::Proxy(msg)
        }
        JayverseError::Proxy(msg) => JayverseError::proxy(format!("{what}: {msg}")),
        other => other,
    }
}

/// Raw image bytes of a generated scene.
pub fn scene_image_bytes(resp: &SceneResponse) -> JayverseResult<Vec<u8>> {
    crate::encode::export::decode_data_url(&resp.image_url).map(|(_, bytes)| bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/proxy/ai.rs"]
mod tests;
