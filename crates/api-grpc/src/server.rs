//! Assembles the tonic server hosting the patient, staff and appointment services.

use std::net::SocketAddr;
use std::sync::Arc;

use api_shared::pb::{
    appointment_api_server::AppointmentApiServer, patient_api_server::PatientApiServer,
    staff_api_server::StaffApiServer,
};
use api_shared::FILE_DESCRIPTOR_SET;
use hms_core::{
    AppointmentService, PatientService, SqlitePool, StaffDirectory, StaffService,
};
use tonic::transport::server::Router;
use tonic::transport::Server;
use tonic_reflection::server::Builder;

use crate::service::{ApiKeyInterceptor, AppointmentGrpc, PatientGrpc, StaffGrpc};

/// Default address of the local staff service.
pub const DEFAULT_SERVICE_ADDR: &str = "http://127.0.0.1:50051";

/// Settings for the gRPC server, resolved once at startup.
#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub addr: SocketAddr,
    pub enable_reflection: bool,
    pub staff_service_addr: String,
    pub api_key: Option<String>,
}

impl GrpcConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let addr = std::env::var("HMS_GRPC_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:50051".into())
            .parse()?;
        let enable_reflection = std::env::var("HMS_ENABLE_REFLECTION")
            .map(|v| v == "true")
            .unwrap_or(false);
        let staff_service_addr =
            std::env::var("STAFF_SERVICE_ADDR").unwrap_or_else(|_| DEFAULT_SERVICE_ADDR.into());

        Ok(Self {
            addr,
            enable_reflection,
            staff_service_addr,
            api_key: api_shared::auth::api_key_from_env(),
        })
    }
}

/// The three controllers served together.
#[derive(Clone)]
pub struct GrpcServices {
    pub patient: PatientGrpc,
    pub staff: StaffGrpc,
    pub appointment: AppointmentGrpc,
}

impl GrpcServices {
    /// Controllers backed by `pool`, with the appointment service asking `staff_directory`
    /// about doctor availability.
    pub fn new(pool: SqlitePool, staff_directory: Arc<dyn StaffDirectory>) -> Self {
        Self {
            patient: PatientGrpc::new(PatientService::with_pool(pool.clone())),
            staff: StaffGrpc::new(StaffService::with_pool(pool.clone())),
            appointment: AppointmentGrpc::new(AppointmentService::with_pool(pool, staff_directory)),
        }
    }
}

/// Builds the router with every service behind the API-key interceptor.
pub fn grpc_router(
    services: GrpcServices,
    interceptor: ApiKeyInterceptor,
    enable_reflection: bool,
) -> anyhow::Result<Router> {
    let mut router = Server::builder()
        .add_service(PatientApiServer::with_interceptor(
            services.patient,
            interceptor.clone(),
        ))
        .add_service(StaffApiServer::with_interceptor(
            services.staff,
            interceptor.clone(),
        ))
        .add_service(AppointmentApiServer::with_interceptor(
            services.appointment,
            interceptor,
        ));

    if enable_reflection {
        let reflection_service = Builder::configure()
            .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
            .build_v1()?;
        router = router.add_service(reflection_service);
        tracing::info!("gRPC server reflection enabled");
    } else {
        tracing::info!("gRPC server reflection disabled");
    }

    Ok(router)
}
