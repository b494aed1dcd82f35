//! gRPC controllers: thin adapters from wire messages to the core use cases.

mod appointment;
mod patient;
mod staff;

pub use appointment::AppointmentGrpc;
pub use patient::PatientGrpc;
pub use staff::StaffGrpc;

use std::sync::Arc;

use api_shared::auth;
use tonic::service::Interceptor;
use tonic::{Request, Status};

/// Authentication interceptor for gRPC requests.
///
/// Holds the key resolved at startup; `None` rejects every call with `INTERNAL`.
#[derive(Clone, Default)]
pub struct ApiKeyInterceptor {
    expected: Option<Arc<str>>,
}

impl ApiKeyInterceptor {
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.map(Arc::from),
        }
    }
}

impl Interceptor for ApiKeyInterceptor {
    fn call(&mut self, req: Request<()>) -> Result<Request<()>, Status> {
        let api_key = auth::api_key_from_metadata(req.metadata())?;
        auth::check_api_key(api_key, self.expected.as_deref())?;
        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    fn request_with_key(key: &str) -> Request<()> {
        let mut req = Request::new(());
        req.metadata_mut()
            .insert(auth::API_KEY_HEADER, key.parse().expect("valid metadata value"));
        req
    }

    #[test]
    fn test_interceptor_accepts_matching_key() {
        let mut interceptor = ApiKeyInterceptor::new(Some("secret".into()));
        assert!(interceptor.call(request_with_key("secret")).is_ok());
    }

    #[test]
    fn test_interceptor_rejects_missing_and_wrong_keys() {
        let mut interceptor = ApiKeyInterceptor::new(Some("secret".into()));
        let missing = interceptor
            .call(Request::new(()))
            .expect_err("missing key should fail");
        assert_eq!(missing.code(), Code::Unauthenticated);

        let wrong = interceptor
            .call(request_with_key("other"))
            .expect_err("wrong key should fail");
        assert_eq!(wrong.code(), Code::Unauthenticated);
    }

    #[test]
    fn test_interceptor_without_configured_key_is_internal() {
        let mut interceptor = ApiKeyInterceptor::new(None);
        let err = interceptor
            .call(request_with_key("secret"))
            .expect_err("unconfigured server should fail");
        assert_eq!(err.code(), Code::Internal);
    }
}
