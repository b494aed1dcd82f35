//! # API Shared
//!
//! Shared utilities and definitions for the hospital APIs.
//!
//! Contains:
//! - Protobuf-generated types, servers and clients (`pb` module)
//! - Shared services like `HealthService`
//! - Authentication utilities (usable by both gRPC and REST)
//! - Graceful-shutdown signal handling for the server binaries
//!
//! Used by `api-grpc` and `api-rest` for common functionality.

// The generated code is placed into OUT_DIR at build time by the build script.
pub mod pb {
    tonic::include_proto!("hospital.v1");
}

pub mod auth;
pub mod health;
pub mod shutdown;

pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("proto_descriptor");

pub use health::HealthService;
pub use shutdown::shutdown_signal;
pub use pb::*;
