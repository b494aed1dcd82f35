//! # API gRPC
//!
//! tonic implementations of the hospital services.
//!
//! - `service`: controllers for `PatientApi`, `StaffApi` and `AppointmentApi`, plus the API-key
//!   interceptor
//! - `convert`: wire message ↔ domain mapping
//! - `status`: use-case error → `tonic::Status`
//! - `staff_client`: the appointment service's view of the remote staff service
//! - `server`: router assembly and startup configuration

pub mod convert;
pub mod server;
pub mod service;
pub mod staff_client;
pub mod status;

pub use api_shared::pb;
pub use server::{grpc_router, GrpcConfig, GrpcServices};
pub use service::{ApiKeyInterceptor, AppointmentGrpc, PatientGrpc, StaffGrpc};
pub use staff_client::GrpcStaffDirectory;
