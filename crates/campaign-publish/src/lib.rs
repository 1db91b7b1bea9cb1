//! Social platform publishers built on the Facebook Graph API.
//!
//! [`FacebookPublisher`] posts to a page feed, attaching an image through an
//! unpublished photo upload. [`InstagramPublisher`] stages the image to get a
//! public URL, creates a media container, polls it until processed, then
//! publishes it. Both exchange the configured token for a page token first,
//! falling back to the configured token when the exchange fails.

pub mod error;
pub mod facebook;
pub mod graph;
pub mod instagram;

pub use error::PublishError;
pub use facebook::{post_url, FacebookPublisher};
pub use graph::{GraphClient, PostId, DEFAULT_GRAPH_BASE_URL};
pub use instagram::{InstagramPublisher, PollPolicy};

/// Returns the configured value, or a configuration error naming `var`.
fn require<'a>(value: Option<&'a str>, var: &str) -> Result<&'a str, PublishError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| PublishError::Configuration(format!("{var} is not configured")))
}
