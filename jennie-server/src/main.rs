//! jennie-server entry point.

use anyhow::{Context, Result};
use jennie_common::config::Config;
use jennie_common::logging::init_logging;
use jennie_server::{build_router, AppState};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

/// Maximum accepted request body size.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    let config = Config::load_with_env()?;
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );
    if let Some(path) = &config.env_file {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }
    for warning in &config.load_warnings {
        tracing::warn!("{}", warning);
    }
    config.validate().context("Invalid configuration")?;

    tracing::info!("JENNIE API v{}", env!("CARGO_PKG_VERSION"));

    if config.gemini_api_key().is_some() {
        tracing::info!(model = %config.gemini.model, "Gemini API configured");
    } else {
        tracing::warn!("GEMINI_API_KEY not set; chat requests will fail until it is configured");
    }
    if config.dev_mode {
        tracing::warn!("Development mode enabled; upstream errors are returned to clients");
    }

    let state = AppState::from_config(&config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = build_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );
    tracing::info!("JENNIE backend running on http://{}", addr);
    tracing::info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
