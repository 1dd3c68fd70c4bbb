mod api;
mod config;
mod identity;
mod labels;
mod provider;
mod resolver;

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use anyhow::{Context, Result};
use crate::api::cors::OriginMatcher;
use crate::config::Config;
use crate::identity::SelfIdentity;
use crate::labels::LabelKeys;
use crate::provider::docker::DockerProvider;
use crate::provider::ContainerProvider;
use crate::resolver::QueryResolver;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("dockinfod=info,tower_http=info")
                })
        )
        .init();

    tracing::info!("Starting dockinfod");

    // Load config
    let config_path = std::env::args().nth(1);
    let config = Config::load_or_default(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?
        .with_env();

    tracing::info!(
        "Label prefix {}, CORS origins {:?}",
        config.labels.prefix,
        config.cors.origins
    );

    // Connect to Docker; a dead daemon is reported per request, not fatal
    let docker = DockerProvider::connect(&config.docker)?;
    match docker.ping().await {
        Ok(()) => tracing::info!("Docker client initialized"),
        Err(e) => tracing::error!("Failed to reach Docker daemon: {:#}", e),
    }
    let provider: Arc<dyn ContainerProvider> = Arc::new(docker);

    // Resolve own container once
    let candidate = identity::candidate(config.identity.container.as_deref());
    let self_identity = SelfIdentity::resolve(provider.as_ref(), candidate).await;

    let resolver = QueryResolver::new(
        provider,
        LabelKeys::new(&config.labels.prefix),
        self_identity,
    );

    // Build API router
    let app_state = api::routes::AppState {
        resolver: Arc::new(resolver),
    };
    let app = api::routes::router(app_state, OriginMatcher::new(&config.cors.origins));

    // Bind HTTP server
    let listener = tokio::net::TcpListener::bind(&config.api.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", config.api.listen))?;

    tracing::info!("API listening on {}", config.api.listen);

    // Run server with graceful shutdown
    let cancel = CancellationToken::new();
    let server_cancel = cancel.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    shutdown_signal().await?;

    tracing::info!("Shutdown signal received");

    cancel.cancel();
    let _ = server_handle.await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM from `docker stop`
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("Failed to listen for SIGTERM")?;
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.context("Failed to listen for ctrl-c")?,
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    Ok(())
}
