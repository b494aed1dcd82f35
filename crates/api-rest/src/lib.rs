//! # API REST
//!
//! REST gateway for the hospital services.
//!
//! Handles:
//! - HTTP endpoints with axum, each forwarded to a gRPC service through a tonic client
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status-code mapping)
//!
//! Uses `api-shared` for the generated message types and clients.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod docs;
pub mod error;
pub mod routes;
pub mod state;

pub use config::RestConfig;
pub use routes::router;
pub use state::AppState;
