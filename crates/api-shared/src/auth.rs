//! API key checks shared by the gRPC interceptor and the REST gateway.

use std::env;

/// Metadata / header key carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reads the expected API key from the `API_KEY` environment variable.
///
/// Called once at startup; an empty value counts as unset.
pub fn api_key_from_env() -> Option<String> {
    env::var("API_KEY").ok().filter(|key| !key.is_empty())
}

/// Validates the provided API key against the expected one.
///
/// Returns `Ok(())` if the key is valid, `UNAUTHENTICATED` if it does not match, and
/// `INTERNAL` when the server has no key configured.
#[allow(clippy::result_large_err)]
pub fn check_api_key(provided_key: &str, expected_key: Option<&str>) -> Result<(), tonic::Status> {
    let expected_key =
        expected_key.ok_or_else(|| tonic::Status::internal("API_KEY not set in environment"))?;

    if !provided_key.is_empty() && provided_key == expected_key {
        Ok(())
    } else {
        Err(tonic::Status::unauthenticated("Invalid API key"))
    }
}

/// Extracts the API key from request metadata.
#[allow(clippy::result_large_err)]
pub fn api_key_from_metadata(metadata: &tonic::metadata::MetadataMap) -> Result<&str, tonic::Status> {
    metadata
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| tonic::Status::unauthenticated("Missing x-api-key header"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_key_is_accepted() {
        assert!(check_api_key("secret", Some("secret")).is_ok());
    }

    #[test]
    fn wrong_key_is_unauthenticated() {
        let err = check_api_key("nope", Some("secret")).expect_err("wrong key should fail");
        assert_eq!(err.code(), tonic::Code::Unauthenticated);
    }

    #[test]
    fn empty_key_never_matches() {
        assert!(check_api_key("", Some("")).is_err());
    }

    #[test]
    fn unset_server_key_is_internal() {
        let err = check_api_key("secret", None).expect_err("unset key should fail");
        assert_eq!(err.code(), tonic::Code::Internal);
    }

    #[test]
    fn missing_metadata_is_unauthenticated() {
        let metadata = tonic::metadata::MetadataMap::new();
        let err = api_key_from_metadata(&metadata).expect_err("missing header should fail");
        assert_eq!(err.code(), tonic::Code::Unauthenticated);
    }

    #[test]
    fn metadata_key_is_read() {
        let mut metadata = tonic::metadata::MetadataMap::new();
        metadata.insert(API_KEY_HEADER, "secret".parse().expect("valid metadata value"));
        assert_eq!(api_key_from_metadata(&metadata).expect("header present"), "secret");
    }
}
