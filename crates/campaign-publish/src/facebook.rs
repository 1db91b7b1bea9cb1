//! Facebook page publisher.

use campaign_core::{PlatformCredentials, PostImage};
use serde_json::json;

use crate::error::PublishError;
use crate::graph::{GraphClient, PostId};
use crate::require;

/// Publishes text posts, optionally with one attached photo, to a page feed.
pub struct FacebookPublisher {
    graph: GraphClient,
    credentials: PlatformCredentials,
}

impl FacebookPublisher {
    #[must_use]
    pub fn new(graph: GraphClient, credentials: PlatformCredentials) -> Self {
        Self { graph, credentials }
    }

    /// Publishes `text` to the page feed.
    ///
    /// With an image, the photo is first uploaded unpublished and the feed
    /// entry then references it via `object_attachment`; the platform has no
    /// single-call status-with-binary post.
    ///
    /// # Errors
    ///
    /// - [`PublishError::Configuration`] if the page id or token is missing.
    /// - [`PublishError::Http`] / [`PublishError::Platform`] on transport or
    ///   Graph API errors.
    /// - [`PublishError::UnexpectedResponse`] if a response lacks an `id`.
    pub async fn publish(
        &self,
        text: &str,
        image: Option<&PostImage>,
    ) -> Result<PostId, PublishError> {
        let page_id = require(self.credentials.page_id.as_deref(), "FB_PAGE_ID")?;
        let token = require(
            self.credentials.page_access_token.as_deref(),
            "FB_PAGE_ACCESS_TOKEN",
        )?;

        let token = self.graph.page_access_token(page_id, token).await;
        let feed_path = format!("{page_id}/feed");

        let post_id = match image {
            Some(image) => {
                let photo_id = self
                    .graph
                    .upload_unpublished_photo(page_id, &token, image, None)
                    .await?;
                tracing::debug!(page_id, photo_id = %photo_id, "facebook: photo staged");
                self.graph
                    .create(
                        &feed_path,
                        &json!({
                            "access_token": token,
                            "message": text,
                            "object_attachment": photo_id,
                        }),
                        "feed post",
                    )
                    .await?
            }
            None => {
                self.graph
                    .create(
                        &feed_path,
                        &json!({ "access_token": token, "message": text }),
                        "feed post",
                    )
                    .await?
            }
        };

        tracing::info!(page_id, post_id = %post_id, "facebook: post published");
        Ok(PostId::from(post_id))
    }
}

/// Public permalink for a published page post.
#[must_use]
pub fn post_url(post_id: &PostId) -> String {
    format!("https://facebook.com/{post_id}")
}
