//! Gemini-backed generator for multi-platform campaign copy.

use std::collections::BTreeMap;
use std::sync::Arc;

use campaign_core::{BrandProfile, CampaignBrief, CampaignContent, Platform};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::http::{build_client, read_json};
use crate::prompt::{build_system_prompt, build_user_prompt};
use crate::sanitize::extract_json_object;
use crate::ModelEndpoint;

/// Turns campaign briefs into per-platform copy via a text-generation model.
///
/// Issues exactly one request per [`generate`](Self::generate) call.
pub struct ContentGenerator {
    client: Client,
    endpoint: ModelEndpoint,
    brand: Arc<BrandProfile>,
}

impl ContentGenerator {
    /// # Errors
    ///
    /// Returns [`GenerationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(endpoint: ModelEndpoint, brand: Arc<BrandProfile>) -> Result<Self, GenerationError> {
        let client = build_client(&endpoint.user_agent)?;
        Ok(Self {
            client,
            endpoint,
            brand,
        })
    }

    #[must_use]
    pub fn brand(&self) -> &BrandProfile {
        &self.brand
    }

    /// Generates copy for all five platforms plus an image prompt.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::InvalidInput`] if the brief lacks a service, audience, or tone.
    /// - [`GenerationError::Configuration`] if no API key is configured.
    /// - [`GenerationError::Http`] / [`GenerationError::Api`] if the model is
    ///   unreachable or reports an error.
    /// - [`GenerationError::EmptyResponse`], [`GenerationError::Malformed`], or
    ///   [`GenerationError::Incomplete`] if the output cannot be reduced to
    ///   the expected record.
    pub async fn generate(&self, brief: &CampaignBrief) -> Result<CampaignContent, GenerationError> {
        validate_brief(brief)?;
        let api_key = self.endpoint.require_api_key()?;

        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: build_system_prompt(brief, &self.brand),
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: build_user_prompt(brief),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(
            model = %self.endpoint.model,
            service = %brief.service,
            audience = %brief.audience,
            "content: requesting campaign copy"
        );

        let response = self
            .client
            .post(self.endpoint.method_url("generateContent"))
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;
        let body = read_json(response).await?;

        let parsed: GenerateContentResponse = serde_json::from_value(body)
            .map_err(|e| GenerationError::Malformed(format!("unexpected response shape: {e}")))?;
        let raw_text = parsed.into_text().ok_or(GenerationError::EmptyResponse)?;

        parse_campaign_content(&raw_text)
    }
}

fn validate_brief(brief: &CampaignBrief) -> Result<(), GenerationError> {
    for (name, value) in [
        ("service", &brief.service),
        ("audience", &brief.audience),
        ("tone", &brief.tone),
    ] {
        if value.trim().is_empty() {
            return Err(GenerationError::InvalidInput(format!("{name} is required")));
        }
    }
    Ok(())
}

/// Reduces raw model text to a [`CampaignContent`].
///
/// # Errors
///
/// Returns [`GenerationError::Malformed`] when no parseable object with the
/// six expected string fields is found, or [`GenerationError::Incomplete`]
/// when one of them is blank.
pub fn parse_campaign_content(raw_text: &str) -> Result<CampaignContent, GenerationError> {
    let object = extract_json_object(raw_text)
        .ok_or_else(|| GenerationError::Malformed("no JSON object found in output".into()))?;

    let raw: RawCampaignContent = serde_json::from_str(object)
        .map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let texts: BTreeMap<Platform, String> = [
        (Platform::Facebook, raw.facebook),
        (Platform::Instagram, raw.instagram),
        (Platform::Reels, raw.reels),
        (Platform::Tiktok, raw.tiktok),
        (Platform::Youtube, raw.youtube),
    ]
    .into_iter()
    .collect();

    CampaignContent::new(texts, raw.image_prompt)
        .map_err(|field| GenerationError::Incomplete { field })
}

#[derive(Deserialize)]
struct RawCampaignContent {
    facebook: String,
    instagram: String,
    reels: String,
    tiktok: String,
    youtube: String,
    #[serde(rename = "imagePrompt")]
    image_prompt: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if non-blank.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}
