//! One-shot content and image generation.
//!
//! Brief fields left unset on the command line are drawn from the same
//! parameter pools the scheduler uses.

use std::path::Path;
use std::sync::Arc;

use campaign_core::{params, AppConfig, AspectRatio, CampaignBrief, Resolution};
use campaign_genai::{ContentGenerator, ImageGenerator, ModelEndpoint};
use clap::{Args, ValueEnum};
use rand::Rng;

#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct BriefArgs {
    /// Service to promote (e.g. "Catering Menu")
    #[arg(long)]
    pub service: Option<String>,
    #[arg(long)]
    pub audience: Option<String>,
    #[arg(long)]
    pub tone: Option<String>,
    /// Live music to feature; pass "" for none
    #[arg(long)]
    pub music: Option<String>,
    #[arg(long)]
    pub aesthetic: Option<String>,
    /// Write in the founder's first-person voice
    #[arg(long)]
    pub founder: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AspectArg {
    Square,
    Portrait,
    Landscape,
}

impl From<AspectArg> for AspectRatio {
    fn from(arg: AspectArg) -> Self {
        match arg {
            AspectArg::Square => AspectRatio::Square,
            AspectArg::Portrait => AspectRatio::Portrait,
            AspectArg::Landscape => AspectRatio::Landscape,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResolutionArg {
    #[value(name = "1k")]
    Base,
    #[value(name = "2k")]
    High,
    #[value(name = "8k")]
    Ultra,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Base => Resolution::Base,
            ResolutionArg::High => Resolution::High,
            ResolutionArg::Ultra => Resolution::Ultra,
        }
    }
}

/// Fills every unset field of `args` with a random draw.
pub(crate) fn resolve_brief<R: Rng + ?Sized>(
    args: &BriefArgs,
    rng: &mut R,
    founder_probability: f64,
) -> CampaignBrief {
    let drawn = params::random_brief(rng, founder_probability);
    CampaignBrief {
        service: args.service.clone().unwrap_or(drawn.service),
        audience: args.audience.clone().unwrap_or(drawn.audience),
        tone: args.tone.clone().unwrap_or(drawn.tone),
        music_choice: args.music.clone().unwrap_or(drawn.music_choice),
        aesthetic_profile: args.aesthetic.clone().unwrap_or(drawn.aesthetic_profile),
        feature_founder: args.founder.unwrap_or(drawn.feature_founder),
    }
}

fn endpoint(config: &AppConfig, model: &str) -> ModelEndpoint {
    ModelEndpoint::new(config.google_api_key.clone(), model)
        .with_base_url(&config.google_base_url)
        .with_user_agent(&config.user_agent)
}

/// Generate copy for a brief and print `{brief, content}` as JSON.
///
/// # Errors
///
/// Returns an error if the brand profile cannot be loaded or generation fails.
pub(crate) async fn run_generate(config: &AppConfig, args: &BriefArgs) -> anyhow::Result<()> {
    let brand = Arc::new(campaign_core::load_brand_profile(&config.brand_path)?);
    let brief = resolve_brief(args, &mut rand::rng(), config.founder_probability);
    tracing::info!(service = %brief.service, founder = brief.feature_founder, "generating content");

    let generator = ContentGenerator::new(endpoint(config, &config.text_model), brand)?;
    let content = generator.generate(&brief).await?;

    let output = serde_json::json!({ "brief": brief, "content": content });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Render one image and write the raw bytes to `out`.
///
/// # Errors
///
/// Returns an error if generation fails or the file cannot be written.
pub(crate) async fn run_image(
    config: &AppConfig,
    prompt: &str,
    aspect_ratio: AspectRatio,
    resolution: Resolution,
    out: &Path,
) -> anyhow::Result<()> {
    let generator = ImageGenerator::new(endpoint(config, &config.image_model))?;
    let image = generator.generate(prompt, aspect_ratio, resolution).await?;

    tokio::fs::write(out, image.bytes()).await?;
    println!(
        "wrote {} bytes ({}) to {} [source: {}]",
        image.bytes().len(),
        image.mime_type(),
        out.display(),
        image.source()
    );
    Ok(())
}
