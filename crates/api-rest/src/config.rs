use std::net::SocketAddr;

/// Default address for every backend service.
pub const DEFAULT_SERVICE_ADDR: &str = "http://127.0.0.1:50051";

/// Gateway settings, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub addr: SocketAddr,
    pub patient_service_addr: String,
    pub staff_service_addr: String,
    pub appointment_service_addr: String,
}

impl RestConfig {
    /// Reads `HMS_REST_ADDR` and the `*_SERVICE_ADDR` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let service_addr = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| DEFAULT_SERVICE_ADDR.into())
        };

        Ok(Self {
            addr: std::env::var("HMS_REST_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".into())
                .parse()?,
            patient_service_addr: service_addr("PATIENT_SERVICE_ADDR"),
            staff_service_addr: service_addr("STAFF_SERVICE_ADDR"),
            appointment_service_addr: service_addr("APPOINTMENT_SERVICE_ADDR"),
        })
    }
}
