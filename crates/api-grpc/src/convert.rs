//! Conversions between wire messages and core types.
//!
//! Parsing helpers return `tonic::Status` directly so controllers can reject malformed ids,
//! instants and ranges with `INVALID_ARGUMENT` before any use case runs.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use tonic::Status;
use uuid::Uuid;

use api_shared::pb;
use hms_core::{
    Appointment, AppointmentStatus, LookupEntry, MedicalRecord, Patient, Staff, Task, TimeRange,
    TimeSlot,
};

/// Parses a required UUID field.
#[allow(clippy::result_large_err)]
pub fn parse_uuid(what: &str, value: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(value.trim())
        .map_err(|_| Status::invalid_argument(format!("invalid {what} ID format: {value}")))
}

/// Parses a UUID field where empty (or the nil UUID) means "not given".
#[allow(clippy::result_large_err)]
pub fn parse_optional_uuid(what: &str, value: &str) -> Result<Option<Uuid>, Status> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_uuid(what, value).map(|id| Some(id).filter(|id| !id.is_nil()))
}

/// Parses an RFC 3339 instant.
#[allow(clippy::result_large_err)]
pub fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>, Status> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            Status::invalid_argument(format!("invalid {field}: expected an RFC 3339 timestamp"))
        })
}

#[allow(clippy::result_large_err)]
pub fn parse_optional_instant(field: &str, value: &str) -> Result<Option<DateTime<Utc>>, Status> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_instant(field, value).map(Some)
}

/// Parses a `YYYY-MM-DD` date where empty means "not given".
#[allow(clippy::result_large_err)]
pub fn parse_optional_date(field: &str, value: &str) -> Result<Option<NaiveDate>, Status> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Status::invalid_argument(format!("invalid {field}: expected YYYY-MM-DD")))
}

/// Parses both bounds of a time range; an end before the start is rejected.
#[allow(clippy::result_large_err)]
pub fn parse_range(start: &str, end: &str) -> Result<TimeRange, Status> {
    let start = parse_instant("start_time", start)?;
    let end = parse_instant("end_time", end)?;
    TimeRange::new(start, end).map_err(|_| Status::invalid_argument("invalid time range"))
}

#[allow(clippy::result_large_err)]
pub fn parse_duration_seconds(seconds: i64) -> Result<Duration, Status> {
    Duration::try_seconds(seconds)
        .ok_or_else(|| Status::invalid_argument("duration_seconds is out of range"))
}

#[allow(clippy::result_large_err)]
pub fn parse_status(value: i32) -> Result<AppointmentStatus, Status> {
    match pb::AppointmentStatus::try_from(value) {
        Ok(pb::AppointmentStatus::Scheduled) => Ok(AppointmentStatus::Scheduled),
        Ok(pb::AppointmentStatus::Confirmed) => Ok(AppointmentStatus::Confirmed),
        Ok(pb::AppointmentStatus::Cancelled) => Ok(AppointmentStatus::Cancelled),
        Ok(pb::AppointmentStatus::Completed) => Ok(AppointmentStatus::Completed),
        Ok(pb::AppointmentStatus::NoShow) => Ok(AppointmentStatus::NoShow),
        Ok(pb::AppointmentStatus::Unspecified) => {
            Err(Status::invalid_argument("appointment status is required"))
        }
        Err(_) => Err(Status::invalid_argument(format!(
            "unknown appointment status: {value}"
        ))),
    }
}

pub fn status_to_pb(status: AppointmentStatus) -> pb::AppointmentStatus {
    match status {
        AppointmentStatus::Scheduled => pb::AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed => pb::AppointmentStatus::Confirmed,
        AppointmentStatus::Cancelled => pb::AppointmentStatus::Cancelled,
        AppointmentStatus::Completed => pb::AppointmentStatus::Completed,
        AppointmentStatus::NoShow => pb::AppointmentStatus::NoShow,
    }
}

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn patient_to_pb(patient: Patient) -> pb::Patient {
    pb::Patient {
        id: patient.id.to_string(),
        first_name: patient.first_name.into_inner(),
        last_name: patient.last_name.into_inner(),
        date_of_birth: format_date(patient.date_of_birth),
        gender: patient.gender,
        phone_number: patient.phone_number.into_inner(),
        address: patient.address,
        medical_history: patient
            .medical_history
            .into_iter()
            .map(medical_record_to_pb)
            .collect(),
        created_at: format_instant(patient.created_at),
        updated_at: format_instant(patient.updated_at),
    }
}

pub fn medical_record_to_pb(record: MedicalRecord) -> pb::MedicalRecord {
    pb::MedicalRecord {
        id: record.id.to_string(),
        patient_id: record.patient_id.to_string(),
        date: format_instant(record.date),
        staff_id: record.staff_id.to_string(),
        diagnosis: record.diagnosis.into_inner(),
        treatment: record.treatment,
        notes: record.notes,
        created_at: format_instant(record.created_at),
        updated_at: format_instant(record.updated_at),
    }
}

pub fn staff_to_pb(staff: Staff) -> pb::Staff {
    pb::Staff {
        id: staff.id.to_string(),
        first_name: staff.first_name.into_inner(),
        last_name: staff.last_name.into_inner(),
        date_of_birth: format_date(Some(staff.date_of_birth)),
        phone_number: staff.phone_number.into_inner(),
        address: staff.address,
        role_id: staff.role_id.into_inner(),
        status_id: staff.status_id.into_inner(),
        specialization: staff.specialization,
        nurse_type: staff.nurse_type,
        schedule: staff.schedule.into_iter().map(task_to_pb).collect(),
        created_at: format_instant(staff.created_at),
        updated_at: format_instant(staff.updated_at),
    }
}

pub fn task_to_pb(task: Task) -> pb::Task {
    pb::Task {
        id: task.id.to_string(),
        title: task.title.into_inner(),
        description: task.description,
        priority: task.priority,
        start_time: format_instant(task.window.start()),
        end_time: format_instant(task.window.end()),
        status_id: task.status_id.into_inner(),
        created_at: format_instant(task.created_at),
        updated_at: format_instant(task.updated_at),
    }
}

pub fn lookup_to_pb(entry: LookupEntry) -> pb::LookupEntry {
    pb::LookupEntry {
        name: entry.name.into_inner(),
        description: entry.description,
    }
}

pub fn slot_to_pb(slot: TimeSlot) -> pb::TimeSlot {
    pb::TimeSlot {
        doctor_id: slot.doctor_id.to_string(),
        start_time: format_instant(slot.range.start()),
        end_time: format_instant(slot.range.end()),
    }
}

/// Parses a slot received from the staff service, describing what was wrong on failure.
pub fn slot_from_pb(slot: &pb::TimeSlot) -> Result<TimeSlot, String> {
    let doctor_id = Uuid::parse_str(&slot.doctor_id)
        .map_err(|_| format!("bad doctor id '{}'", slot.doctor_id))?;
    let start = DateTime::parse_from_rfc3339(&slot.start_time)
        .map_err(|_| format!("bad start time '{}'", slot.start_time))?
        .with_timezone(&Utc);
    let end = DateTime::parse_from_rfc3339(&slot.end_time)
        .map_err(|_| format!("bad end time '{}'", slot.end_time))?
        .with_timezone(&Utc);
    let range = TimeRange::new(start, end).map_err(|e| e.to_string())?;
    Ok(TimeSlot { doctor_id, range })
}

pub fn appointment_to_pb(appointment: Appointment) -> pb::Appointment {
    pb::Appointment {
        id: appointment.id.to_string(),
        patient_id: appointment.patient_id.to_string(),
        doctor_id: appointment.doctor_id.to_string(),
        appointment_time: format_instant(appointment.appointment_time()),
        duration_seconds: appointment.duration().num_seconds(),
        reason: appointment.reason.into_inner(),
        status: status_to_pb(appointment.status) as i32,
        notes: appointment.notes,
        place: appointment.place,
        created_at: format_instant(appointment.created_at),
        updated_at: format_instant(appointment.updated_at),
    }
}
