use crate::pb::HealthRes;

/// Simple health service that can be used by both gRPC and REST APIs
///
/// Every hospital service answers its `Health` RPC through this type, naming itself in the
/// message so a caller behind the gateway can tell which backend answered.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the named service is healthy.
    pub fn check_health(service: &str) -> HealthRes {
        HealthRes {
            ok: true,
            message: format!("{service} is alive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_health_names_service() {
        let res = HealthService::check_health("patient-service");
        assert!(res.ok);
        assert_eq!(res.message, "patient-service is alive");
    }
}
