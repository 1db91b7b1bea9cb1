//! Instagram business-account publisher.
//!
//! The media API only accepts a publicly resolvable image URL, so generated
//! bytes are first staged as an unpublished Facebook page photo and the
//! photo's largest rendition URL is handed to the media container. Containers
//! are processed asynchronously and must report `FINISHED` before publishing.

use std::time::Duration;

use campaign_core::{PlatformCredentials, PostImage};
use serde::Deserialize;
use serde_json::json;

use crate::error::PublishError;
use crate::graph::{GraphClient, PostId};
use crate::require;

/// How often, and how many times, to check a container's processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 10,
        }
    }
}

pub struct InstagramPublisher {
    graph: GraphClient,
    credentials: PlatformCredentials,
    poll: PollPolicy,
}

impl InstagramPublisher {
    #[must_use]
    pub fn new(graph: GraphClient, credentials: PlatformCredentials) -> Self {
        Self {
            graph,
            credentials,
            poll: PollPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Publishes `image` with `caption` to the business account.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Configuration`] if the account id, page id, or token
    ///   is missing.
    /// - [`PublishError::MissingImage`] if `image` is `None`.
    /// - [`PublishError::Http`] / [`PublishError::Platform`] on transport or
    ///   Graph API errors.
    /// - [`PublishError::ProcessingFailed`] if the container reports `ERROR`.
    /// - [`PublishError::ProcessingTimeout`] if the container is not ready
    ///   within the poll budget.
    pub async fn publish(
        &self,
        caption: &str,
        image: Option<&PostImage>,
    ) -> Result<PostId, PublishError> {
        let ig_user_id = require(self.credentials.ig_user_id.as_deref(), "IG_USER_ID")?;
        let page_id = require(self.credentials.page_id.as_deref(), "FB_PAGE_ID")?;
        let token = require(
            self.credentials.page_access_token.as_deref(),
            "FB_PAGE_ACCESS_TOKEN",
        )?;
        let image = image.ok_or(PublishError::MissingImage)?;

        let token = self.graph.page_access_token(page_id, token).await;
        let image_url = self.public_image_url(page_id, &token, image, caption).await?;

        let container_id = self
            .graph
            .create(
                &format!("{ig_user_id}/media"),
                &json!({
                    "image_url": image_url,
                    "caption": caption,
                    "access_token": token,
                }),
                "media container",
            )
            .await?;
        tracing::debug!(ig_user_id, container_id = %container_id, "instagram: container created");

        self.wait_until_ready(&container_id, &token).await?;

        let post_id = self
            .graph
            .create(
                &format!("{ig_user_id}/media_publish"),
                &json!({ "creation_id": container_id, "access_token": token }),
                "media publish",
            )
            .await?;

        tracing::info!(ig_user_id, post_id = %post_id, "instagram: post published");
        Ok(PostId::from(post_id))
    }

    /// Staged photos carry the caption so the page copy matches the post.
    async fn public_image_url(
        &self,
        page_id: &str,
        token: &str,
        image: &PostImage,
        caption: &str,
    ) -> Result<String, PublishError> {
        match image {
            PostImage::Url(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
            PostImage::Url(_) => Err(PublishError::InvalidImageData(
                "image URL is empty".to_string(),
            )),
            PostImage::Generated(_) => {
                let photo_id = self
                    .graph
                    .upload_unpublished_photo(page_id, token, image, Some(caption))
                    .await?;
                let url = self.graph.largest_image_url(&photo_id, token).await?;
                tracing::debug!(photo_id = %photo_id, "instagram: image staged");
                Ok(url)
            }
        }
    }

    async fn wait_until_ready(&self, container_id: &str, token: &str) -> Result<(), PublishError> {
        for attempt in 1..=self.poll.max_attempts {
            let status: ContainerStatus = self
                .graph
                .fields(container_id, "status_code", token, "container status")
                .await?;
            let code = status.status_code.unwrap_or_default();

            if code.eq_ignore_ascii_case("FINISHED") {
                tracing::debug!(container_id, attempt, "instagram: container ready");
                return Ok(());
            }
            if code.eq_ignore_ascii_case("ERROR") {
                return Err(PublishError::ProcessingFailed(code));
            }

            tracing::debug!(
                container_id,
                attempt,
                status = %code,
                "instagram: container still processing"
            );
            if attempt < self.poll.max_attempts {
                tokio::time::sleep(self.poll.interval).await;
            }
        }

        Err(PublishError::ProcessingTimeout {
            attempts: self.poll.max_attempts,
        })
    }
}

#[derive(Deserialize)]
struct ContainerStatus {
    status_code: Option<String>,
}
