//! Campaign data model: briefs, generated copy, and generated images.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Parameters that fully determine one generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBrief {
    pub service: String,
    pub audience: String,
    pub tone: String,
    /// Empty when no live music is featured.
    #[serde(default)]
    pub music_choice: String,
    #[serde(default)]
    pub aesthetic_profile: String,
    #[serde(default)]
    pub feature_founder: bool,
}

impl CampaignBrief {
    #[must_use]
    pub fn has_music(&self) -> bool {
        !self.music_choice.trim().is_empty()
    }
}

/// Target platforms that receive generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Reels,
    Tiktok,
    Youtube,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Facebook,
        Platform::Instagram,
        Platform::Reels,
        Platform::Tiktok,
        Platform::Youtube,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Facebook => "facebook",
            Platform::Instagram => "instagram",
            Platform::Reels => "reels",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated copy for every platform plus one image prompt.
///
/// Built once per brief and never mutated afterwards. Serializes flat, e.g.
/// `{"facebook": "...", ..., "imagePrompt": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignContent {
    #[serde(flatten)]
    texts: BTreeMap<Platform, String>,
    #[serde(rename = "imagePrompt")]
    image_prompt: String,
}

impl CampaignContent {
    /// Builds content from per-platform texts and an image prompt.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing or blank field.
    pub fn new(
        texts: BTreeMap<Platform, String>,
        image_prompt: String,
    ) -> Result<Self, &'static str> {
        for platform in Platform::ALL {
            match texts.get(&platform) {
                Some(text) if !text.trim().is_empty() => {}
                _ => return Err(platform.as_str()),
            }
        }
        if image_prompt.trim().is_empty() {
            return Err("imagePrompt");
        }
        Ok(Self {
            texts,
            image_prompt,
        })
    }

    #[must_use]
    pub fn text(&self, platform: Platform) -> &str {
        self.texts.get(&platform).map_or("", String::as_str)
    }

    #[must_use]
    pub fn image_prompt(&self) -> &str {
        &self.image_prompt
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    #[default]
    Square,
    Portrait,
    Landscape,
}

impl AspectRatio {
    /// Numeric ratio understood by the image model.
    #[must_use]
    pub fn as_ratio(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
        }
    }
}

/// Quality tier requested from the image model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "1k")]
    Base,
    #[serde(rename = "2k")]
    High,
    #[serde(rename = "8k")]
    Ultra,
}

impl Resolution {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Base => "1k",
            Resolution::High => "2k",
            Resolution::Ultra => "8k",
        }
    }

    /// Quality descriptors appended to the prompt; `None` at the base tier.
    #[must_use]
    pub fn prompt_suffix(self) -> Option<&'static str> {
        match self {
            Resolution::Base => None,
            Resolution::High => Some("4k resolution, detailed, professional photography"),
            Resolution::Ultra => Some(
                "8k resolution, highly detailed, sharp focus, hyper-realistic, masterpiece, best quality",
            ),
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw image bytes returned by the image model.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    bytes: Vec<u8>,
    mime_type: String,
    source: String,
}

impl GeneratedImage {
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Model and resolution tag, e.g. `imagen-4.0-generate-001@1k`.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Encodes the image as a `data:<mime>;base64,...` URL.
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }

    /// Decodes a `data:image/...;base64,...` URL into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidImageData`] if the URL is not a base64
    /// image data URL or decodes to nothing.
    pub fn from_data_url(data_url: &str, source: impl Into<String>) -> Result<Self, CoreError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::InvalidImageData("missing data: prefix".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidImageData("missing ',' separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| CoreError::InvalidImageData("payload is not base64".to_string()))?;
        if !mime_type.starts_with("image/") {
            return Err(CoreError::InvalidImageData(format!(
                "unsupported media type '{mime_type}'"
            )));
        }

        let bytes = BASE64_STANDARD
            .decode(payload.trim())
            .map_err(|e| CoreError::InvalidImageData(e.to_string()))?;
        if bytes.is_empty() {
            return Err(CoreError::InvalidImageData(
                "decoded image is empty".to_string(),
            ));
        }
        Ok(Self::new(bytes, mime_type, source))
    }
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("source", &self.source)
            .finish()
    }
}

/// Image handed to a publisher: generated bytes or an already-public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostImage {
    Generated(GeneratedImage),
    Url(String),
}

impl PostImage {
    /// Interprets a dashboard-supplied image reference.
    ///
    /// `data:` URLs are decoded into bytes; anything else is treated as an
    /// external URL.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidImageData`] for a malformed `data:` URL.
    pub fn parse(reference: &str) -> Result<Self, CoreError> {
        let trimmed = reference.trim();
        if trimmed.starts_with("data:") {
            GeneratedImage::from_data_url(trimmed, "upload").map(PostImage::Generated)
        } else {
            Ok(PostImage::Url(trimmed.to_string()))
        }
    }
}

impl From<GeneratedImage> for PostImage {
    fn from(image: GeneratedImage) -> Self {
        PostImage::Generated(image)
    }
}
