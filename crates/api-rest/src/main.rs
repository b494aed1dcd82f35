//! Standalone REST gateway binary.
//!
//! ## Purpose
//! Runs the REST gateway on its own, forwarding to gRPC services at the configured addresses.
//!
//! ## Intended use
//! Useful when the gRPC services run elsewhere. The workspace's main `hms-run` binary runs
//! both gRPC and REST concurrently.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState, RestConfig};
use api_shared::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = RestConfig::from_env()?;
    let app = router(AppState::connect_lazy(&cfg)?);

    tracing::info!("-- Starting hospital REST gateway on {}", cfg.addr);

    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
