//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development when you only want the REST server (with OpenAPI/Swagger UI). The
//! workspace's main `casedesk-run` binary runs both gRPC and REST concurrently.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use casedesk_core::{config::core_config_from_env, LetterService};

/// Starts the REST API server on `CASEDESK_REST_ADDR` (default: 0.0.0.0:3000).
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the core configuration or template library cannot be loaded,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("casedesk=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CASEDESK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting Casedesk REST API on {}", addr);

    let cfg = Arc::new(core_config_from_env()?);
    tracing::info!(
        "case data: {}, templates: {}",
        cfg.case_data_dir().display(),
        cfg.template_dir().display()
    );
    let letters = Arc::new(LetterService::open(cfg)?);
    tracing::info!("{} letter templates loaded", letters.templates().len());

    let app = router(AppState { letters });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
