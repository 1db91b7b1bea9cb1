//! Imagen-backed image generator.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use campaign_core::{AspectRatio, GeneratedImage, Resolution};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::http::{build_client, read_json};
use crate::ModelEndpoint;

const DEFAULT_MIME_TYPE: &str = "image/png";

/// Renders one image per prompt via an image-generation model.
pub struct ImageGenerator {
    client: Client,
    endpoint: ModelEndpoint,
}

impl ImageGenerator {
    /// # Errors
    ///
    /// Returns [`GenerationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(endpoint: ModelEndpoint) -> Result<Self, GenerationError> {
        let client = build_client(&endpoint.user_agent)?;
        Ok(Self { client, endpoint })
    }

    /// Generates exactly one image for `prompt`.
    ///
    /// The prompt is augmented with quality descriptors for the requested
    /// resolution tier; the aspect ratio is mapped to the model's numeric form.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::InvalidInput`] for a blank prompt, before any network call.
    /// - [`GenerationError::Configuration`] if no API key is configured.
    /// - [`GenerationError::Http`] / [`GenerationError::Api`] on transport or model errors.
    /// - [`GenerationError::EmptyImage`] when the response carries no image bytes,
    ///   even with a 2xx status.
    pub async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        resolution: Resolution,
    ) -> Result<GeneratedImage, GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::InvalidInput("prompt is required".into()));
        }
        let api_key = self.endpoint.require_api_key()?;

        let request = PredictRequest {
            instances: vec![Instance {
                prompt: augment_prompt(prompt, resolution),
            }],
            parameters: Parameters {
                aspect_ratio: aspect_ratio.as_ratio(),
                sample_count: 1,
            },
        };

        tracing::debug!(
            model = %self.endpoint.model,
            aspect_ratio = aspect_ratio.as_ratio(),
            resolution = %resolution,
            "image: requesting generation"
        );

        let response = self
            .client
            .post(self.endpoint.method_url("predict"))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;
        let body = read_json(response).await?;

        let parsed: PredictResponse = serde_json::from_value(body)
            .map_err(|e| GenerationError::Malformed(format!("unexpected response shape: {e}")))?;
        let prediction = parsed
            .predictions
            .into_iter()
            .next()
            .filter(|p| p.bytes_base64_encoded.as_deref().is_some_and(|b| !b.is_empty()))
            .ok_or(GenerationError::EmptyImage)?;

        let encoded = prediction.bytes_base64_encoded.unwrap_or_default();
        let bytes = BASE64_STANDARD
            .decode(encoded.trim())
            .map_err(|e| GenerationError::InvalidImageData(e.to_string()))?;
        if bytes.is_empty() {
            return Err(GenerationError::EmptyImage);
        }

        let mime_type = prediction
            .mime_type
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        Ok(GeneratedImage::new(
            bytes,
            mime_type,
            format!("{}@{resolution}", self.endpoint.model),
        ))
    }
}

/// Appends the resolution tier's quality descriptors to `prompt`.
#[must_use]
pub fn augment_prompt(prompt: &str, resolution: Resolution) -> String {
    let prompt = prompt.trim();
    match resolution.prompt_suffix() {
        Some(suffix) => format!("{prompt}, {suffix}"),
        None => prompt.to_string(),
    }
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Instance>,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Instance {
    prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    aspect_ratio: &'static str,
    sample_count: u8,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_tier_leaves_prompt_untouched() {
        assert_eq!(augment_prompt("beach vows", Resolution::Base), "beach vows");
    }

    #[test]
    fn high_tier_adds_detail_descriptors() {
        assert_eq!(
            augment_prompt("beach vows", Resolution::High),
            "beach vows, 4k resolution, detailed, professional photography"
        );
    }

    #[test]
    fn ultra_tier_adds_sharp_focus_descriptors() {
        let prompt = augment_prompt("beach vows ", Resolution::Ultra);
        assert!(prompt.starts_with("beach vows, 8k resolution"));
        assert!(prompt.contains("highly detailed, sharp focus"));
    }
}
