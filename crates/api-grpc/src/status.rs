//! Mapping from use-case errors to gRPC status codes.

use hms_core::ServiceError;
use tonic::Status;

/// Converts a use-case error into the status returned to the caller.
///
/// Database failures are logged here and replaced by a generic message.
pub fn to_status(err: ServiceError) -> Status {
    match err {
        ServiceError::NotFound(msg) => Status::not_found(msg),
        ServiceError::InvalidInput(msg) => Status::invalid_argument(msg),
        ServiceError::Text(e) => Status::invalid_argument(e.to_string()),
        ServiceError::Range(e) => Status::invalid_argument(e.to_string()),
        ServiceError::Conflict(msg) => Status::already_exists(msg),
        ServiceError::Unavailable(msg) => Status::unavailable(msg),
        ServiceError::Internal(msg) => {
            tracing::error!(error = %msg, "internal error");
            Status::internal(msg)
        }
        ServiceError::Database(e) => {
            tracing::error!(error = %e, "database error");
            Status::internal("an unexpected error occurred")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_client_errors_map_to_client_codes() {
        assert_eq!(to_status(ServiceError::NotFound("x".into())).code(), Code::NotFound);
        assert_eq!(
            to_status(ServiceError::InvalidInput("x".into())).code(),
            Code::InvalidArgument
        );
        assert_eq!(
            to_status(ServiceError::Conflict("x".into())).code(),
            Code::AlreadyExists
        );
        assert_eq!(
            to_status(ServiceError::Unavailable("x".into())).code(),
            Code::Unavailable
        );
    }

    #[test]
    fn test_database_errors_hide_detail() {
        let status = to_status(ServiceError::Database(hms_core::DbError::RowNotFound));
        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "an unexpected error occurred");
    }
}
