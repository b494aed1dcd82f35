//! Appointment persistence.

use async_trait::async_trait;
use chrono::Duration;
use hms_types::{NonEmptyText, TimeRange};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::appointment::{Appointment, AppointmentStatus};
use crate::db::{from_millis, parse_stored_uuid, to_millis};
use crate::{ServiceError, ServiceResult};

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Inserts the appointment unless another live appointment of the doctor overlaps it.
    /// The check and the write are one statement. Returns false on a clash.
    async fn insert_if_free(&self, appointment: &Appointment) -> ServiceResult<bool>;
    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Appointment>>;
    async fn update(&self, appointment: &Appointment) -> ServiceResult<()>;
    /// Writes the appointment's new slot and place unless the slot now clashes with another
    /// live appointment of the doctor. Returns false on a clash.
    async fn move_if_free(&self, appointment: &Appointment) -> ServiceResult<bool>;
    /// True when a non-cancelled appointment of the doctor overlaps `range`.
    /// `exclude` names an appointment to leave out, typically the one being moved.
    async fn has_conflict(
        &self,
        doctor_id: Uuid,
        range: TimeRange,
        exclude: Option<Uuid>,
    ) -> ServiceResult<bool>;
    async fn for_patient(&self, patient_id: Uuid) -> ServiceResult<Vec<Appointment>>;
    async fn for_doctor(&self, doctor_id: Uuid, window: TimeRange)
        -> ServiceResult<Vec<Appointment>>;
}

#[derive(Clone)]
pub struct SqliteAppointmentRepository {
    pool: SqlitePool,
}

impl SqliteAppointmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn appointment_from_row(row: &SqliteRow) -> ServiceResult<Appointment> {
    let id: String = row.try_get("id")?;
    let patient_id: String = row.try_get("patient_id")?;
    let doctor_id: String = row.try_get("doctor_id")?;
    let status: String = row.try_get("status")?;
    let start = from_millis("appointments.appointment_time", row.try_get("appointment_time")?)?;
    let seconds: i64 = row.try_get("duration_seconds")?;

    Ok(Appointment {
        id: parse_stored_uuid("appointments.id", &id)?,
        patient_id: parse_stored_uuid("appointments.patient_id", &patient_id)?,
        doctor_id: parse_stored_uuid("appointments.doctor_id", &doctor_id)?,
        slot: TimeRange::starting_at(start, Duration::seconds(seconds)).map_err(|_| {
            ServiceError::Internal("stored appointment has a negative duration".into())
        })?,
        reason: NonEmptyText::new(row.try_get::<String, _>("reason")?)?,
        status: status.parse().map_err(|_| {
            ServiceError::Internal(format!("stored appointment status '{status}' is unknown"))
        })?,
        notes: row.try_get("notes")?,
        place: row.try_get("place")?,
        created_at: from_millis("appointments.created_at", row.try_get("created_at")?)?,
        updated_at: from_millis("appointments.updated_at", row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    async fn insert_if_free(&self, appointment: &Appointment) -> ServiceResult<bool> {
        let result = sqlx::query(
            "INSERT INTO appointments
                (id, patient_id, doctor_id, appointment_time, duration_seconds, reason, status,
                 notes, place, created_at, updated_at)
             SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?
             WHERE NOT EXISTS (
                SELECT 1 FROM appointments
                WHERE doctor_id = ? AND status != ?
                  AND appointment_time < ?
                  AND appointment_time + duration_seconds * 1000 > ?
             )",
        )
        .bind(appointment.id.to_string())
        .bind(appointment.patient_id.to_string())
        .bind(appointment.doctor_id.to_string())
        .bind(to_millis(appointment.appointment_time()))
        .bind(appointment.duration().num_seconds())
        .bind(appointment.reason.as_str())
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(&appointment.place)
        .bind(to_millis(appointment.created_at))
        .bind(to_millis(appointment.updated_at))
        .bind(appointment.doctor_id.to_string())
        .bind(AppointmentStatus::Cancelled.as_str())
        .bind(to_millis(appointment.slot.end()))
        .bind(to_millis(appointment.slot.start()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Appointment>> {
        sqlx::query("SELECT * FROM appointments WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(appointment_from_row)
            .transpose()
    }

    async fn update(&self, appointment: &Appointment) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE appointments
             SET appointment_time = ?, duration_seconds = ?, status = ?, notes = ?, place = ?,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(to_millis(appointment.appointment_time()))
        .bind(appointment.duration().num_seconds())
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(&appointment.place)
        .bind(to_millis(appointment.updated_at))
        .bind(appointment.id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn move_if_free(&self, appointment: &Appointment) -> ServiceResult<bool> {
        let result = sqlx::query(
            "UPDATE appointments
             SET appointment_time = ?, duration_seconds = ?, status = ?, place = ?,
                 updated_at = ?
             WHERE id = ?
               AND NOT EXISTS (
                SELECT 1 FROM appointments
                WHERE doctor_id = ? AND status != ? AND id != ?
                  AND appointment_time < ?
                  AND appointment_time + duration_seconds * 1000 > ?
               )",
        )
        .bind(to_millis(appointment.appointment_time()))
        .bind(appointment.duration().num_seconds())
        .bind(appointment.status.as_str())
        .bind(&appointment.place)
        .bind(to_millis(appointment.updated_at))
        .bind(appointment.id.to_string())
        .bind(appointment.doctor_id.to_string())
        .bind(AppointmentStatus::Cancelled.as_str())
        .bind(appointment.id.to_string())
        .bind(to_millis(appointment.slot.end()))
        .bind(to_millis(appointment.slot.start()))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn has_conflict(
        &self,
        doctor_id: Uuid,
        range: TimeRange,
        exclude: Option<Uuid>,
    ) -> ServiceResult<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM appointments
             WHERE doctor_id = ? AND status != ? AND id != ?
               AND appointment_time < ?
               AND appointment_time + duration_seconds * 1000 > ?
             LIMIT 1",
        )
        .bind(doctor_id.to_string())
        .bind(AppointmentStatus::Cancelled.as_str())
        .bind(exclude.map(|id| id.to_string()).unwrap_or_default())
        .bind(to_millis(range.end()))
        .bind(to_millis(range.start()))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn for_patient(&self, patient_id: Uuid) -> ServiceResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT * FROM appointments WHERE patient_id = ? ORDER BY appointment_time DESC",
        )
        .bind(patient_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    async fn for_doctor(
        &self,
        doctor_id: Uuid,
        window: TimeRange,
    ) -> ServiceResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT * FROM appointments
             WHERE doctor_id = ? AND appointment_time >= ? AND appointment_time < ?
             ORDER BY appointment_time ASC",
        )
        .bind(doctor_id.to_string())
        .bind(to_millis(window.start()))
        .bind(to_millis(window.end()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(appointment_from_row).collect()
    }
}
