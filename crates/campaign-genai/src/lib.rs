//! Generative model clients for campaign copy and imagery.
//!
//! [`ContentGenerator`] turns a [`campaign_core::CampaignBrief`] into
//! per-platform copy plus an image prompt using a Gemini text model.
//! [`ImageGenerator`] renders a prompt with an Imagen model and returns the
//! raw image bytes. Neither retries; retry policy belongs to the caller.

pub mod content;
pub mod error;
pub mod image;
pub mod prompt;
pub mod sanitize;

mod http;

pub use content::ContentGenerator;
pub use error::GenerationError;
pub use image::ImageGenerator;
pub use sanitize::extract_json_object;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Where and how to reach one generative model.
#[derive(Clone)]
pub struct ModelEndpoint {
    /// `None` fails each call with [`GenerationError::Configuration`].
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub user_agent: String,
}

impl ModelEndpoint {
    #[must_use]
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            user_agent: "campaign/0.1 (social-automation)".to_string(),
        }
    }

    /// Points the endpoint at a different API root (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// `{base}/models/{model}:{method}`
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{method}",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    pub(crate) fn require_api_key(&self) -> Result<&str, GenerationError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| GenerationError::Configuration("GOOGLE_API_KEY is not configured".into()))
    }
}

impl std::fmt::Debug for ModelEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEndpoint")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
