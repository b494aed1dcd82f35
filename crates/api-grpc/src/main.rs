use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_grpc::{grpc_router, ApiKeyInterceptor, GrpcConfig, GrpcServices, GrpcStaffDirectory};
use api_shared::shutdown_signal;
use hms_core::config::{database_url_from_env_value, max_connections_from_env_value};
use hms_core::{db, CoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hms=info".parse()?)
                .add_directive("api_grpc=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let core_cfg = CoreConfig::new(
        database_url_from_env_value(std::env::var("DATABASE_URL").ok()),
        max_connections_from_env_value(std::env::var("DB_MAX_CONNECTIONS").ok())?,
    )?;
    let cfg = GrpcConfig::from_env()?;

    let pool = db::connect(&core_cfg).await?;
    db::migrate(&pool).await?;
    db::seed_lookups(&pool).await?;

    let staff_directory =
        GrpcStaffDirectory::connect_lazy(cfg.staff_service_addr.clone(), cfg.api_key.as_deref())?;
    let services = GrpcServices::new(pool, Arc::new(staff_directory));
    let router = grpc_router(
        services,
        ApiKeyInterceptor::new(cfg.api_key.clone()),
        cfg.enable_reflection,
    )?;

    tracing::info!("-- Starting hospital gRPC services on {}", cfg.addr);
    router.serve_with_shutdown(cfg.addr, shutdown_signal()).await?;

    Ok(())
}
