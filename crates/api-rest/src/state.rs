use api_shared::auth::API_KEY_HEADER;
use api_shared::pb::{
    appointment_api_client::AppointmentApiClient, patient_api_client::PatientApiClient,
    staff_api_client::StaffApiClient,
};
use axum::http::HeaderMap;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};

use crate::RestConfig;

/// Application state for the REST gateway
///
/// One tonic client per backend service. Clients are cheap to clone and share one channel.
#[derive(Clone)]
pub struct AppState {
    pub patients: PatientApiClient<Channel>,
    pub staff: StaffApiClient<Channel>,
    pub appointments: AppointmentApiClient<Channel>,
}

impl AppState {
    /// Builds clients that connect on first use, so the gateway starts even while a backend
    /// is down.
    pub fn connect_lazy(cfg: &RestConfig) -> anyhow::Result<Self> {
        Ok(Self {
            patients: PatientApiClient::new(lazy_channel(&cfg.patient_service_addr)?),
            staff: StaffApiClient::new(lazy_channel(&cfg.staff_service_addr)?),
            appointments: AppointmentApiClient::new(lazy_channel(
                &cfg.appointment_service_addr,
            )?),
        })
    }
}

fn lazy_channel(addr: &str) -> anyhow::Result<Channel> {
    Ok(Endpoint::from_shared(addr.to_owned())?.connect_lazy())
}

/// Wraps `message` in a gRPC request carrying the caller's `x-api-key`, if any.
pub fn forward<T>(headers: &HeaderMap, message: T) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    let key = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<MetadataValue<Ascii>>().ok());
    if let Some(key) = key {
        request.metadata_mut().insert(API_KEY_HEADER, key);
    }
    request
}
