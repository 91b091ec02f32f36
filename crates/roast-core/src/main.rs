use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roast_core::server;
use roast_core::{Config, RoastService, SessionManager};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "roast=debug,roast_core=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🔥 Roast starting up...");

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Configuration loaded");
    info!("  Chat API: {}", config.fireworks_api_url);
    info!("  Chat model: {}", config.chat_model);
    info!(
        "  Vision: {} ({})",
        config.vision_backend.as_str(),
        config.vision_model
    );
    info!("  Request timeout: {:?}", config.request_timeout);
    if config.max_retries > 0 {
        info!("  Retries enabled: {}", config.max_retries);
    }

    let service = RoastService::from_config(&config).context("Failed to set up model clients")?;
    let manager = Arc::new(SessionManager::new(service));

    let app = server::router(manager);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.http_port))?;
    info!("🔥 Roast is listening on port {}", config.http_port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await?;

    Ok(())
}
