use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{CasedeskService, auth_interceptor};
use api_rest::{AppState, router};
use api_shared::ApiKeyGuard;
use api_shared::pb::casedesk_server::CasedeskServer;
use casedesk_core::{LetterService, config::core_config_from_env};

/// Main entry point for Casedesk
///
/// Starts both gRPC and REST servers concurrently, sharing one letter service:
/// - gRPC server on port 50051 (configurable via CASEDESK_ADDR)
/// - REST server on port 3000 (configurable via CASEDESK_REST_ADDR)
///
/// The gRPC server requires authentication via the x-api-key header.
///
/// # Environment Variables
/// - `CASEDESK_ADDR`: gRPC server address (default: "0.0.0.0:50051")
/// - `CASEDESK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CASEDESK_DATA_DIR`: case and organisation data (default: "case_data")
/// - `CASEDESK_TEMPLATE_DIR`: letter templates (default: "<data dir>/templates")
/// - `CASEDESK_PAGE_SIZE`: default page size (default: "letter")
/// - `CASEDESK_RECENT_UPDATES`: recent updates listed in letters (default: 3)
/// - `API_KEY`: API key for gRPC authentication
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("casedesk=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let grpc_addr: SocketAddr = std::env::var("CASEDESK_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;
    let rest_addr = std::env::var("CASEDESK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = Arc::new(core_config_from_env()?);
    let letters = Arc::new(LetterService::open(cfg)?);

    tracing::info!("++ Starting Casedesk gRPC on {}", grpc_addr);
    tracing::info!("++ Starting Casedesk REST on {}", rest_addr);

    // Start REST server
    let rest_app = router(AppState {
        letters: letters.clone(),
    });
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    let rest_server = tokio::spawn(async move { axum::serve(listener, rest_app).await });

    // Start gRPC server
    let grpc_server = Server::builder()
        .add_service(CasedeskServer::with_interceptor(
            CasedeskService::new(letters),
            auth_interceptor(ApiKeyGuard::from_env()),
        ))
        .serve(grpc_addr);

    // Run both
    let (rest_result, grpc_result) = tokio::join!(rest_server, grpc_server);
    rest_result??;
    grpc_result?;

    Ok(())
}
