mod generate;
mod publish;
mod schedule;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::generate::{AspectArg, BriefArgs, ResolutionArg};
use crate::publish::PublishCommands;
use crate::schedule::ScheduleCommands;

#[derive(Debug, Parser)]
#[command(name = "campaign-cli")]
#[command(about = "Campaign automation command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate copy for every platform from a brief
    Generate(BriefArgs),
    /// Render one image and write it to disk
    Image {
        /// Description of the image to render
        #[arg(long)]
        prompt: String,
        #[arg(long, value_enum, default_value_t = AspectArg::Square)]
        aspect_ratio: AspectArg,
        #[arg(long, value_enum, default_value_t = ResolutionArg::Base)]
        resolution: ResolutionArg,
        /// Output file for the image bytes
        #[arg(long)]
        out: PathBuf,
    },
    /// Publish a single post to one platform
    Publish {
        #[command(subcommand)]
        command: PublishCommands,
    },
    /// Inspect the persisted scheduler state
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = campaign_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Generate(args)) => generate::run_generate(&config, &args).await?,
        Some(Commands::Image {
            prompt,
            aspect_ratio,
            resolution,
            out,
        }) => {
            generate::run_image(&config, &prompt, aspect_ratio.into(), resolution.into(), &out)
                .await?;
        }
        Some(Commands::Publish { command }) => publish::run_publish(&config, command).await?,
        Some(Commands::Schedule {
            command: ScheduleCommands::Status,
        }) => schedule::run_status(&config)?,
        None => println!("campaign-cli: no command given; see --help"),
    }

    Ok(())
}
