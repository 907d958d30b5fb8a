//! Standalone gRPC server binary.
//!
//! ## Purpose
//! Runs the gRPC server on its own. The workspace's main `casedesk-run` binary runs both gRPC
//! and REST concurrently.

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tonic_reflection::server::Builder;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{auth_interceptor, pb::casedesk_server::CasedeskServer, CasedeskService};
use api_shared::{ApiKeyGuard, FILE_DESCRIPTOR_SET};
use casedesk_core::{config::core_config_from_env, LetterService};

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

    let addr: SocketAddr = std::env::var("CASEDESK_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:50051".into())
        .parse()?;

    tracing::info!("-- Starting Casedesk gRPC on {}", addr);

    let cfg = Arc::new(core_config_from_env()?);
    let letters = Arc::new(LetterService::open(cfg)?);

    let svc = CasedeskService::new(letters);
    let guard = ApiKeyGuard::from_env();
    let mut server_builder = Server::builder().add_service(CasedeskServer::with_interceptor(
        svc,
        auth_interceptor(guard),
    ));

    if std::env::var("CASEDESK_ENABLE_REFLECTION").unwrap_or_else(|_| "false".to_string())
        == "true"
    {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        server_builder = server_builder.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    } else {
        tracing::info!("gRPC server reflection disabled");
    }

    server_builder.serve(addr).await?;

    Ok(())
}
