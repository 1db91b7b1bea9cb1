//! The four-step campaign pipeline run on every scheduled tick.
//!
//! Steps are strictly sequential: content, image, Facebook, Instagram. The
//! first failure aborts the rest and is reported with the step that failed.

use std::sync::Arc;

use campaign_core::{
    AppConfig, AspectRatio, BrandProfile, CampaignBrief, Platform, PostImage, Resolution,
};
use campaign_genai::{ContentGenerator, GenerationError, ImageGenerator, ModelEndpoint};
use campaign_publish::{
    FacebookPublisher, GraphClient, InstagramPublisher, PollPolicy, PostId, PublishError,
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    Content,
    Image,
    Facebook,
    Instagram,
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PipelineStep::Content => "content",
            PipelineStep::Image => "image",
            PipelineStep::Facebook => "facebook",
            PipelineStep::Instagram => "instagram",
        })
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("content generation failed: {0}")]
    Content(#[source] GenerationError),

    #[error("image generation failed: {0}")]
    Image(#[source] GenerationError),

    #[error("facebook publish failed: {0}")]
    Facebook(#[source] PublishError),

    #[error("instagram publish failed: {0}")]
    Instagram(#[source] PublishError),
}

impl PipelineError {
    #[must_use]
    pub fn step(&self) -> PipelineStep {
        match self {
            PipelineError::Content(_) => PipelineStep::Content,
            PipelineError::Image(_) => PipelineStep::Image,
            PipelineError::Facebook(_) => PipelineStep::Facebook,
            PipelineError::Instagram(_) => PipelineStep::Instagram,
        }
    }
}

/// Outcome of a tick where every step succeeded.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub facebook_post_id: PostId,
    pub instagram_post_id: PostId,
}

/// Generation clients and publishers, constructed once at startup.
///
/// The HTTP surface reuses the same instances for manual requests.
pub struct CampaignPipeline {
    content: ContentGenerator,
    image: ImageGenerator,
    facebook: FacebookPublisher,
    instagram: InstagramPublisher,
}

impl CampaignPipeline {
    #[must_use]
    pub fn new(
        content: ContentGenerator,
        image: ImageGenerator,
        facebook: FacebookPublisher,
        instagram: InstagramPublisher,
    ) -> Self {
        Self {
            content,
            image,
            facebook,
            instagram,
        }
    }

    /// Builds every client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn from_config(config: &AppConfig, brand: Arc<BrandProfile>) -> anyhow::Result<Self> {
        let endpoint = |model: &str| {
            ModelEndpoint::new(config.google_api_key.clone(), model)
                .with_base_url(&config.google_base_url)
                .with_user_agent(&config.user_agent)
        };
        let content = ContentGenerator::new(endpoint(&config.text_model), brand)?;
        let image = ImageGenerator::new(endpoint(&config.image_model))?;

        let graph = GraphClient::with_base_url(&config.graph_base_url, &config.user_agent)?;
        let facebook = FacebookPublisher::new(graph.clone(), config.credentials.clone());
        let instagram = InstagramPublisher::new(graph, config.credentials.clone())
            .with_poll_policy(PollPolicy {
                interval: config.ig_poll_interval(),
                max_attempts: config.ig_poll_max_attempts,
            });

        Ok(Self::new(content, image, facebook, instagram))
    }

    #[must_use]
    pub fn content(&self) -> &ContentGenerator {
        &self.content
    }

    #[must_use]
    pub fn image(&self) -> &ImageGenerator {
        &self.image
    }

    #[must_use]
    pub fn facebook(&self) -> &FacebookPublisher {
        &self.facebook
    }

    #[must_use]
    pub fn instagram(&self) -> &InstagramPublisher {
        &self.instagram
    }

    /// Runs all four steps for `brief`, sharing one square base-tier image
    /// between both platforms.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for the first step that fails; later steps
    /// are not attempted.
    pub async fn run(&self, brief: &CampaignBrief) -> Result<PipelineReport, PipelineError> {
        let content = self
            .content
            .generate(brief)
            .await
            .map_err(PipelineError::Content)?;

        let image = self
            .image
            .generate(content.image_prompt(), AspectRatio::Square, Resolution::Base)
            .await
            .map_err(PipelineError::Image)?;
        let image = PostImage::from(image);

        let facebook_post_id = self
            .facebook
            .publish(content.text(Platform::Facebook), Some(&image))
            .await
            .map_err(PipelineError::Facebook)?;

        let instagram_post_id = self
            .instagram
            .publish(content.text(Platform::Instagram), Some(&image))
            .await
            .map_err(PipelineError::Instagram)?;

        Ok(PipelineReport {
            facebook_post_id,
            instagram_post_id,
        })
    }
}
