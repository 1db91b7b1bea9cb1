//! One-shot publishing to Facebook or Instagram.

use std::path::Path;

use anyhow::Context;
use campaign_core::{AppConfig, GeneratedImage, PostImage};
use campaign_publish::{post_url, FacebookPublisher, GraphClient, InstagramPublisher, PollPolicy};
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum PublishCommands {
    /// Post to the Facebook page feed
    Facebook {
        #[arg(long)]
        message: String,
        /// Local image file, public URL, or `data:` URL
        #[arg(long)]
        image: Option<String>,
    },
    /// Publish a single image post to Instagram
    Instagram {
        #[arg(long)]
        caption: String,
        /// Local image file, public URL, or `data:` URL
        #[arg(long)]
        image: String,
    },
}

/// MIME type for a local image, by extension. Unknown extensions are sent as PNG.
pub(crate) fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

/// Resolves an `--image` argument into something a publisher can post.
///
/// # Errors
///
/// Returns an error for a malformed `data:` URL or an unreadable file.
pub(crate) async fn load_image(reference: &str) -> anyhow::Result<PostImage> {
    let reference = reference.trim();
    if reference.starts_with("data:")
        || reference.starts_with("http://")
        || reference.starts_with("https://")
    {
        return Ok(PostImage::parse(reference)?);
    }

    let path = Path::new(reference);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image file {}", path.display()))?;
    anyhow::ensure!(!bytes.is_empty(), "image file {} is empty", path.display());

    Ok(PostImage::Generated(GeneratedImage::new(
        bytes,
        mime_for_path(path),
        format!("file:{}", path.display()),
    )))
}

pub(crate) async fn run_publish(config: &AppConfig, command: PublishCommands) -> anyhow::Result<()> {
    let graph = GraphClient::with_base_url(&config.graph_base_url, &config.user_agent)?;

    match command {
        PublishCommands::Facebook { message, image } => {
            let image = match image {
                Some(reference) => Some(load_image(&reference).await?),
                None => None,
            };
            let publisher = FacebookPublisher::new(graph, config.credentials.clone());
            let post_id = publisher.publish(&message, image.as_ref()).await?;
            println!("facebook post {post_id}: {}", post_url(&post_id));
        }
        PublishCommands::Instagram { caption, image } => {
            let image = load_image(&image).await?;
            let publisher = InstagramPublisher::new(graph, config.credentials.clone())
                .with_poll_policy(PollPolicy {
                    interval: config.ig_poll_interval(),
                    max_attempts: config.ig_poll_max_attempts,
                });
            let post_id = publisher.publish(&caption, Some(&image)).await?;
            println!("instagram post {post_id}");
        }
    }

    Ok(())
}
