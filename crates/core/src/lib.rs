//! # HMS Core
//!
//! Core business logic for the hospital management services.
//!
//! This crate contains the use cases and their persistence:
//! - Patient registration, details and medical history
//! - Staff, task schedules, lookup tables and doctor availability
//! - Appointment booking, status changes and rescheduling
//! - SQLite storage through `sqlx`
//!
//! **No API concerns**: Authentication, HTTP/gRPC servers, or service interfaces belong in
//! `api-grpc`, `api-rest`, or `api-shared`.

pub mod appointment;
pub mod availability;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod patient;
pub mod repositories;
pub mod shared;
pub mod staff;
pub mod validation;

use std::sync::Arc;

pub use sqlx::{Error as DbError, SqlitePool};

pub use appointment::{
    Appointment, AppointmentService, AppointmentStatus, NewAppointment, Reschedule,
    StaffDirectory,
};
pub use availability::TimeSlot;
pub use config::CoreConfig;
pub use error::{ServiceError, ServiceResult};
pub use hms_types::{NonEmptyText, TimeRange};
pub use patient::{MedicalRecord, NewMedicalRecord, NewPatient, Patient, PatientService, PatientUpdate};
pub use shared::{ListOptions, Page};
pub use staff::{
    LookupEntry, LookupKind, NewStaff, NewTask, Staff, StaffFilter, StaffService, StaffUpdate,
    Task,
};

use repositories::appointment::SqliteAppointmentRepository;
use repositories::patient::SqlitePatientRepository;
use repositories::staff::SqliteStaffRepository;

impl PatientService {
    /// Patient service backed by the SQLite repository on `pool`.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(SqlitePatientRepository::new(pool)))
    }
}

impl StaffService {
    /// Staff service backed by the SQLite repository on `pool`.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self::new(Arc::new(SqliteStaffRepository::new(pool)))
    }
}

impl AppointmentService {
    /// Appointment service backed by the SQLite repository on `pool`.
    pub fn with_pool(pool: SqlitePool, staff: Arc<dyn StaffDirectory>) -> Self {
        Self::new(Arc::new(SqliteAppointmentRepository::new(pool)), staff)
    }
}
