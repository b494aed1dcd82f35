use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{ApiKeyInterceptor, GrpcConfig, GrpcServices, GrpcStaffDirectory, grpc_router};
use api_rest::{AppState, RestConfig, router};
use api_shared::shutdown_signal;
use hms_core::config::{database_url_from_env_value, max_connections_from_env_value};
use hms_core::{CoreConfig, db};

/// Main entry point for the hospital services
///
/// Starts both servers concurrently:
/// - gRPC server hosting the patient, staff and appointment services (`HMS_GRPC_ADDR`)
/// - REST gateway forwarding to them (`HMS_REST_ADDR`)
///
/// The appointment service reaches the staff service through `STAFF_SERVICE_ADDR`, which by
/// default points back at this process. gRPC calls require the `x-api-key` header.
///
/// # Environment Variables
/// - `DATABASE_URL`, `DB_MAX_CONNECTIONS`: SQLite database
/// - `HMS_GRPC_ADDR`: gRPC server address (default: "0.0.0.0:50051")
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `PATIENT_SERVICE_ADDR`, `STAFF_SERVICE_ADDR`, `APPOINTMENT_SERVICE_ADDR`: backend URLs
/// - `API_KEY`: API key for gRPC authentication
/// - `HMS_ENABLE_REFLECTION`: set to `true` to expose gRPC reflection
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hms=info".parse()?)
                .add_directive("api_grpc=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let core_cfg = CoreConfig::new(
        database_url_from_env_value(std::env::var("DATABASE_URL").ok()),
        max_connections_from_env_value(std::env::var("DB_MAX_CONNECTIONS").ok())?,
    )?;
    let grpc_cfg = GrpcConfig::from_env()?;
    let rest_cfg = RestConfig::from_env()?;

    let pool = db::connect(&core_cfg).await?;
    db::migrate(&pool).await?;
    let seeded = db::seed_lookups(&pool).await?;
    tracing::info!(?seeded, "database ready");

    let staff_directory = GrpcStaffDirectory::connect_lazy(
        grpc_cfg.staff_service_addr.clone(),
        grpc_cfg.api_key.as_deref(),
    )?;
    let grpc = grpc_router(
        GrpcServices::new(pool, Arc::new(staff_directory)),
        ApiKeyInterceptor::new(grpc_cfg.api_key.clone()),
        grpc_cfg.enable_reflection,
    )?;
    let rest_app = router(AppState::connect_lazy(&rest_cfg)?);

    tracing::info!("++ Starting hospital gRPC on {}", grpc_cfg.addr);
    tracing::info!("++ Starting hospital REST on {}", rest_cfg.addr);

    let listener = tokio::net::TcpListener::bind(rest_cfg.addr).await?;
    let rest_server = async move {
        axum::serve(listener, rest_app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    };
    let grpc_server = grpc.serve_with_shutdown(grpc_cfg.addr, shutdown_signal());

    let (rest_result, grpc_result) = tokio::join!(rest_server, grpc_server);
    rest_result?;
    grpc_result?;

    Ok(())
}
