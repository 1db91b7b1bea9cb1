mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use campaign_core::StateStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::{AuthState, RateLimitState},
    scheduler::{CampaignPipeline, CampaignScheduler, ScheduleSettings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = campaign_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let brand = Arc::new(campaign_core::load_brand_profile(&config.brand_path)?);
    tracing::info!(brand = %brand.name, "loaded brand profile");

    let pipeline = Arc::new(CampaignPipeline::from_config(&config, brand)?);
    let scheduler = CampaignScheduler::new(
        Arc::clone(&pipeline),
        StateStore::new(&config.state_path),
        ScheduleSettings::from_config(&config),
    )
    .await?;
    if let Err(e) = scheduler.resume().await {
        tracing::error!(error = %e, "failed to resume persisted schedule");
    }

    let auth = AuthState::from_config(&config)?;
    let rate_limit = RateLimitState::from_config(&config);
    let app = build_app(
        AppState {
            scheduler,
            pipeline,
        },
        auth,
        rate_limit,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        schedule_zone = %config.schedule_zone,
        "campaign server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
