//! Appointment service and related types.
//!
//! Books patients in with doctors. Whether a doctor is free is decided in two steps: the staff
//! directory must report a free slot covering the whole appointment, and no other live
//! appointment for that doctor may overlap it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use hms_types::{NonEmptyText, TimeRange};
use uuid::Uuid;

use crate::availability::{fits_in_any, TimeSlot};
use crate::repositories::appointment::AppointmentRepository;
use crate::validation::{require_id, require_text};
use crate::{ServiceError, ServiceResult};

/// Source of doctor availability, normally the staff service.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    /// Free slots for `doctor_id` inside `window`.
    ///
    /// Implementations return `NotFound` for an unknown doctor and `Unavailable` when the
    /// directory cannot be reached.
    async fn doctor_availability(
        &self,
        doctor_id: Uuid,
        window: TimeRange,
    ) -> ServiceResult<Vec<TimeSlot>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::NoShow => "NoShow",
        }
    }

    /// Completed and cancelled appointments are final.
    pub fn is_final(self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(AppointmentStatus::Scheduled),
            "Confirmed" => Ok(AppointmentStatus::Confirmed),
            "Cancelled" => Ok(AppointmentStatus::Cancelled),
            "Completed" => Ok(AppointmentStatus::Completed),
            "NoShow" => Ok(AppointmentStatus::NoShow),
            other => Err(ServiceError::InvalidInput(format!(
                "unknown appointment status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// `[appointment_time, appointment_time + duration)`
    pub slot: TimeRange,
    pub reason: NonEmptyText,
    pub status: AppointmentStatus,
    pub notes: String,
    pub place: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_time: Option<DateTime<Utc>>,
    pub duration: Duration,
    pub reason: String,
    pub notes: String,
    pub place: String,
}

#[derive(Debug, Clone, Default)]
pub struct Reschedule {
    pub new_time: Option<DateTime<Utc>>,
    pub new_duration: Option<Duration>,
    /// `None` keeps the current place.
    pub new_place: Option<String>,
}

impl Appointment {
    pub fn appointment_time(&self) -> DateTime<Utc> {
        self.slot.start()
    }

    pub fn duration(&self) -> Duration {
        self.slot.duration()
    }

    /// Moves to `new_status`. A final status can only be "set" to itself.
    ///
    /// Returns true when the status changed.
    pub fn set_status(
        &mut self,
        new_status: AppointmentStatus,
        now: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        if self.status.is_final() && self.status != new_status {
            return Err(ServiceError::Conflict(format!(
                "cannot change status of a {} appointment to {}",
                self.status, new_status
            )));
        }
        if self.status == new_status {
            return Ok(false);
        }
        self.status = new_status;
        self.updated_at = now;
        Ok(true)
    }

    /// Applies a new time and optionally a new duration and place.
    ///
    /// Only scheduled or confirmed appointments can move. A confirmed appointment stays
    /// confirmed, anything else returns to scheduled.
    pub fn reschedule(
        &mut self,
        new_time: DateTime<Utc>,
        new_duration: Option<Duration>,
        new_place: Option<String>,
        now: DateTime<Utc>,
    ) -> ServiceResult<bool> {
        if !matches!(
            self.status,
            AppointmentStatus::Scheduled | AppointmentStatus::Confirmed
        ) {
            return Err(ServiceError::Conflict(format!(
                "cannot reschedule appointment with status {}",
                self.status
            )));
        }

        let duration = new_duration.unwrap_or_else(|| self.duration());
        let slot = TimeRange::starting_at(new_time, duration)?;
        let mut changed = slot != self.slot;
        self.slot = slot;

        if let Some(place) = new_place {
            if place != self.place {
                self.place = place;
                changed = true;
            }
        }

        if changed {
            if self.status != AppointmentStatus::Confirmed {
                self.status = AppointmentStatus::Scheduled;
            }
            self.updated_at = now;
        }
        Ok(changed)
    }
}

fn require_positive(duration: Duration) -> ServiceResult<Duration> {
    if duration <= Duration::zero() {
        return Err(ServiceError::InvalidInput(
            "appointment duration must be positive".into(),
        ));
    }
    Ok(duration)
}

/// Appointment use cases - no API concerns
#[derive(Clone)]
pub struct AppointmentService {
    repo: Arc<dyn AppointmentRepository>,
    staff: Arc<dyn StaffDirectory>,
}

impl AppointmentService {
    /// Creates a new instance of AppointmentService.
    pub fn new(repo: Arc<dyn AppointmentRepository>, staff: Arc<dyn StaffDirectory>) -> Self {
        Self { repo, staff }
    }

    async fn doctor_is_free(
        &self,
        doctor_id: Uuid,
        requested: TimeRange,
        moving: Option<Uuid>,
    ) -> ServiceResult<bool> {
        let slots = match self.staff.doctor_availability(doctor_id, requested).await {
            Ok(slots) => slots,
            Err(ServiceError::NotFound(_)) => {
                tracing::debug!(%doctor_id, "doctor unknown to staff directory");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if !fits_in_any(&slots, &requested) {
            tracing::debug!(%doctor_id, slots = slots.len(), "no free slot covers request");
            return Ok(false);
        }

        let clash = self
            .repo
            .has_conflict(doctor_id, requested, moving)
            .await?;
        Ok(!clash)
    }

    /// True when the doctor can take an appointment spanning `requested`.
    pub async fn check_doctor_availability(
        &self,
        doctor_id: Uuid,
        requested: TimeRange,
    ) -> ServiceResult<bool> {
        let doctor_id = require_id(doctor_id, "doctor")?;
        self.doctor_is_free(doctor_id, requested, None).await
    }

    /// Books an appointment in `Scheduled` state.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a missing id, reason or time, or a non-positive duration.
    /// - `Conflict` when the doctor is not free for the whole appointment.
    pub async fn schedule_appointment(&self, input: NewAppointment) -> ServiceResult<Appointment> {
        let patient_id = require_id(input.patient_id, "patient")?;
        let doctor_id = require_id(input.doctor_id, "doctor")?;
        let reason = require_text(&input.reason, "appointment reason is required")?;
        let start = input.appointment_time.ok_or_else(|| {
            ServiceError::InvalidInput("appointment time is required".into())
        })?;
        let duration = require_positive(input.duration)?;
        let slot = TimeRange::starting_at(start, duration)?;

        if !self.doctor_is_free(doctor_id, slot, None).await? {
            tracing::warn!(%doctor_id, start = %slot.start(), "doctor unavailable");
            return Err(ServiceError::Conflict(
                "doctor is not available at the requested time".into(),
            ));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            slot,
            reason,
            status: AppointmentStatus::Scheduled,
            notes: input.notes.trim().to_owned(),
            place: input.place.trim().to_owned(),
            created_at: now,
            updated_at: now,
        };

        if !self.repo.insert_if_free(&appointment).await? {
            tracing::warn!(%doctor_id, start = %slot.start(), "slot taken by a concurrent booking");
            return Err(ServiceError::Conflict(
                "doctor is not available at the requested time".into(),
            ));
        }
        tracing::info!(
            appointment_id = %appointment.id,
            %patient_id,
            %doctor_id,
            "appointment scheduled"
        );
        Ok(appointment)
    }

    pub async fn get_appointment_details(&self, appointment_id: Uuid) -> ServiceResult<Appointment> {
        let appointment_id = require_id(appointment_id, "appointment")?;
        self.repo
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("appointment not found".into()))
    }

    pub async fn update_appointment_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> ServiceResult<Appointment> {
        let mut appointment = self.get_appointment_details(appointment_id).await?;
        let from = appointment.status;

        if appointment.set_status(status, Utc::now())? {
            self.repo.update(&appointment).await?;
            tracing::info!(%appointment_id, %from, to = %status, "appointment status changed");
        }
        Ok(appointment)
    }

    /// Moves an appointment, re-checking the doctor's availability for the new slot.
    ///
    /// The appointment's own current slot never counts as a clash.
    pub async fn reschedule_appointment(
        &self,
        appointment_id: Uuid,
        request: Reschedule,
    ) -> ServiceResult<Appointment> {
        let now = Utc::now();
        let new_time = request
            .new_time
            .ok_or_else(|| ServiceError::InvalidInput("new appointment time is required".into()))?;
        if new_time < now {
            return Err(ServiceError::InvalidInput(
                "new appointment time cannot be in the past".into(),
            ));
        }
        let new_duration = request.new_duration.map(require_positive).transpose()?;
        let new_place = request
            .new_place
            .map(|p| p.trim().to_owned())
            .filter(|p| !p.is_empty());

        let mut appointment = self.get_appointment_details(appointment_id).await?;
        let previous_slot = appointment.slot;

        if !appointment.reschedule(new_time, new_duration, new_place, now)? {
            return Ok(appointment);
        }

        if appointment.slot == previous_slot {
            self.repo.update(&appointment).await?;
        } else if !self
            .doctor_is_free(appointment.doctor_id, appointment.slot, Some(appointment.id))
            .await?
            || !self.repo.move_if_free(&appointment).await?
        {
            return Err(ServiceError::Conflict(
                "doctor is not available at the requested time".into(),
            ));
        }

        tracing::info!(%appointment_id, start = %appointment.slot.start(), "appointment rescheduled");
        Ok(appointment)
    }

    pub async fn cancel_appointment(&self, appointment_id: Uuid) -> ServiceResult<()> {
        self.update_appointment_status(appointment_id, AppointmentStatus::Cancelled)
            .await
            .map(|_| ())
    }

    /// A patient's appointments, most recent first.
    pub async fn get_appointments_for_patient(
        &self,
        patient_id: Uuid,
    ) -> ServiceResult<Vec<Appointment>> {
        let patient_id = require_id(patient_id, "patient")?;
        self.repo.for_patient(patient_id).await
    }

    /// A doctor's appointments starting inside `[window.start, window.end)`, earliest first.
    pub async fn get_appointments_for_doctor(
        &self,
        doctor_id: Uuid,
        window: TimeRange,
    ) -> ServiceResult<Vec<Appointment>> {
        let doctor_id = require_id(doctor_id, "doctor")?;
        self.repo.for_doctor(doctor_id, window).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{connect_in_memory, seed_lookups};
    use crate::repositories::appointment::SqliteAppointmentRepository;
    use crate::repositories::staff::SqliteStaffRepository;
    use crate::staff::{NewStaff, NewTask, StaffService};
    use chrono::{NaiveDate, TimeZone};

    /// Directory double: every doctor is either free all day, unknown, or unreachable.
    enum FakeDirectory {
        AlwaysFree,
        UnknownDoctor,
        Down,
    }

    #[async_trait]
    impl StaffDirectory for FakeDirectory {
        async fn doctor_availability(
            &self,
            doctor_id: Uuid,
            window: TimeRange,
        ) -> ServiceResult<Vec<TimeSlot>> {
            match self {
                FakeDirectory::AlwaysFree => Ok(vec![TimeSlot {
                    doctor_id,
                    range: window,
                }]),
                FakeDirectory::UnknownDoctor => Err(ServiceError::NotFound("doctor not found".into())),
                FakeDirectory::Down => Err(ServiceError::Unavailable("staff service down".into())),
            }
        }
    }

    async fn service_with(directory: FakeDirectory) -> AppointmentService {
        let pool = connect_in_memory().await.expect("connect_in_memory should succeed");
        AppointmentService::new(
            Arc::new(SqliteAppointmentRepository::new(pool)),
            Arc::new(directory),
        )
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2099, 1, day, hour, minute, 0)
            .single()
            .expect("valid test timestamp")
    }

    fn booking(doctor_id: Uuid, start: DateTime<Utc>, minutes: i64) -> NewAppointment {
        NewAppointment {
            patient_id: Uuid::new_v4(),
            doctor_id,
            appointment_time: Some(start),
            duration: Duration::minutes(minutes),
            reason: "Check-up".into(),
            notes: String::new(),
            place: "Room 4".into(),
        }
    }

    #[test]
    fn test_final_status_cannot_change() {
        let now = at(5, 8, 0);
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            slot: TimeRange::starting_at(at(5, 9, 0), Duration::minutes(30)).expect("valid"),
            reason: NonEmptyText::new("Check-up").expect("valid"),
            status: AppointmentStatus::Completed,
            notes: String::new(),
            place: String::new(),
            created_at: now,
            updated_at: now,
        };

        assert!(!appointment
            .set_status(AppointmentStatus::Completed, now)
            .expect("same status is a no-op"));
        let err = appointment
            .set_status(AppointmentStatus::Scheduled, now)
            .expect_err("final status should not change");
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(matches!(
            appointment.reschedule(at(6, 9, 0), None, None, now),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn test_reschedule_keeps_confirmed_and_resets_others() {
        let now = at(5, 8, 0);
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            slot: TimeRange::starting_at(at(5, 9, 0), Duration::minutes(30)).expect("valid"),
            reason: NonEmptyText::new("Check-up").expect("valid"),
            status: AppointmentStatus::Confirmed,
            notes: String::new(),
            place: "Room 1".into(),
            created_at: now,
            updated_at: now,
        };

        assert!(appointment
            .reschedule(at(5, 10, 0), Some(Duration::minutes(45)), None, now)
            .expect("reschedule should succeed"));
        assert_eq!(appointment.status, AppointmentStatus::Confirmed);
        assert_eq!(appointment.duration(), Duration::minutes(45));
        assert_eq!(appointment.place, "Room 1");

        assert!(!appointment
            .reschedule(at(5, 10, 0), None, Some("Room 1".into()), now)
            .expect("unchanged reschedule should succeed"));
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().ok(), Some(status));
        }
        assert!("Lost".parse::<AppointmentStatus>().is_err());
    }

    #[tokio::test]
    async fn test_schedule_and_fetch() {
        let service = service_with(FakeDirectory::AlwaysFree).await;
        let doctor_id = Uuid::new_v4();

        let booked = service
            .schedule_appointment(booking(doctor_id, at(5, 9, 0), 30))
            .await
            .expect("schedule should succeed");
        assert_eq!(booked.status, AppointmentStatus::Scheduled);

        let fetched = service
            .get_appointment_details(booked.id)
            .await
            .expect("get should succeed");
        assert_eq!(fetched.slot, booked.slot);
        assert_eq!(fetched.place, "Room 4");
    }

    #[tokio::test]
    async fn test_schedule_validation() {
        let service = service_with(FakeDirectory::AlwaysFree).await;
        let doctor_id = Uuid::new_v4();

        assert!(matches!(
            service
                .schedule_appointment(booking(doctor_id, at(5, 9, 0), 0))
                .await,
            Err(ServiceError::InvalidInput(_))
        ));

        let mut missing_reason = booking(doctor_id, at(5, 9, 0), 30);
        missing_reason.reason = " ".into();
        assert!(matches!(
            service.schedule_appointment(missing_reason).await,
            Err(ServiceError::InvalidInput(_))
        ));

        assert!(matches!(
            service
                .schedule_appointment(booking(Uuid::nil(), at(5, 9, 0), 30))
                .await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_overlapping_booking_is_conflict_unless_cancelled() {
        let service = service_with(FakeDirectory::AlwaysFree).await;
        let doctor_id = Uuid::new_v4();

        let first = service
            .schedule_appointment(booking(doctor_id, at(5, 9, 0), 60))
            .await
            .expect("first booking should succeed");

        let err = service
            .schedule_appointment(booking(doctor_id, at(5, 9, 30), 30))
            .await
            .expect_err("overlap should fail");
        assert!(matches!(err, ServiceError::Conflict(msg) if msg == "doctor is not available at the requested time"));

        service
            .schedule_appointment(booking(doctor_id, at(5, 10, 0), 30))
            .await
            .expect("back-to-back booking should succeed");

        service
            .cancel_appointment(first.id)
            .await
            .expect("cancel should succeed");
        service
            .schedule_appointment(booking(doctor_id, at(5, 9, 30), 30))
            .await
            .expect("slot freed by cancellation should be bookable");
    }

    #[tokio::test]
    async fn test_directory_errors() {
        let unknown = service_with(FakeDirectory::UnknownDoctor).await;
        let range = TimeRange::new(at(5, 9, 0), at(5, 10, 0)).expect("valid");
        assert!(!unknown
            .check_doctor_availability(Uuid::new_v4(), range)
            .await
            .expect("unknown doctor is simply unavailable"));

        let down = service_with(FakeDirectory::Down).await;
        assert!(matches!(
            down.check_doctor_availability(Uuid::new_v4(), range).await,
            Err(ServiceError::Unavailable(_))
        ));
        assert!(matches!(
            down.check_doctor_availability(Uuid::nil(), range).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_status_updates_and_cancel() {
        let service = service_with(FakeDirectory::AlwaysFree).await;
        let booked = service
            .schedule_appointment(booking(Uuid::new_v4(), at(6, 9, 0), 30))
            .await
            .expect("schedule should succeed");

        let confirmed = service
            .update_appointment_status(booked.id, AppointmentStatus::Confirmed)
            .await
            .expect("confirm should succeed");
        assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

        service
            .cancel_appointment(booked.id)
            .await
            .expect("cancel should succeed");
        let err = service
            .update_appointment_status(booked.id, AppointmentStatus::Completed)
            .await
            .expect_err("cancelled appointment is final");
        assert!(matches!(err, ServiceError::Conflict(_)));

        assert!(matches!(
            service.cancel_appointment(Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_reschedule_rules() {
        let service = service_with(FakeDirectory::AlwaysFree).await;
        let doctor_id = Uuid::new_v4();
        let booked = service
            .schedule_appointment(booking(doctor_id, at(7, 9, 0), 60))
            .await
            .expect("schedule should succeed");
        service
            .schedule_appointment(booking(doctor_id, at(7, 11, 0), 60))
            .await
            .expect("second booking should succeed");

        // Overlapping its own old slot is fine.
        let moved = service
            .reschedule_appointment(
                booked.id,
                Reschedule {
                    new_time: Some(at(7, 9, 30)),
                    ..Default::default()
                },
            )
            .await
            .expect("reschedule should succeed");
        assert_eq!(moved.appointment_time(), at(7, 9, 30));

        let err = service
            .reschedule_appointment(
                booked.id,
                Reschedule {
                    new_time: Some(at(7, 10, 30)),
                    ..Default::default()
                },
            )
            .await
            .expect_err("clash with second booking should fail");
        assert!(matches!(err, ServiceError::Conflict(_)));

        let past = Utc::now() - Duration::days(1);
        assert!(matches!(
            service
                .reschedule_appointment(
                    booked.id,
                    Reschedule {
                        new_time: Some(past),
                        ..Default::default()
                    },
                )
                .await,
            Err(ServiceError::InvalidInput(_))
        ));

        assert!(matches!(
            service
                .reschedule_appointment(
                    booked.id,
                    Reschedule {
                        new_time: Some(at(8, 9, 0)),
                        new_duration: Some(Duration::zero()),
                        new_place: None,
                    },
                )
                .await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_no_show_cannot_be_rescheduled() {
        let service = service_with(FakeDirectory::AlwaysFree).await;
        let booked = service
            .schedule_appointment(booking(Uuid::new_v4(), at(8, 9, 0), 30))
            .await
            .expect("schedule should succeed");
        service
            .update_appointment_status(booked.id, AppointmentStatus::NoShow)
            .await
            .expect("no-show should succeed");

        let err = service
            .reschedule_appointment(
                booked.id,
                Reschedule {
                    new_time: Some(at(8, 11, 0)),
                    ..Default::default()
                },
            )
            .await
            .expect_err("no-show appointment should not move");
        assert!(matches!(err, ServiceError::Conflict(_)));

        let stored = service
            .get_appointment_details(booked.id)
            .await
            .expect("get should succeed");
        assert_eq!(stored.appointment_time(), at(8, 9, 0));
        assert_eq!(stored.status, AppointmentStatus::NoShow);
    }

    #[tokio::test]
    async fn test_guarded_writes_refuse_overlaps() {
        let pool = connect_in_memory().await.expect("connect_in_memory should succeed");
        let repo = SqliteAppointmentRepository::new(pool);
        let doctor_id = Uuid::new_v4();
        let now = at(1, 8, 0);
        let appointment = |start: DateTime<Utc>| Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id,
            slot: TimeRange::starting_at(start, Duration::minutes(60)).expect("valid"),
            reason: NonEmptyText::new("Check-up").expect("valid"),
            status: AppointmentStatus::Scheduled,
            notes: String::new(),
            place: String::new(),
            created_at: now,
            updated_at: now,
        };

        let first = appointment(at(11, 9, 0));
        assert!(repo.insert_if_free(&first).await.expect("insert should succeed"));
        let overlapping = appointment(at(11, 9, 30));
        assert!(!repo
            .insert_if_free(&overlapping)
            .await
            .expect("insert should succeed"));
        assert!(repo
            .find_by_id(overlapping.id)
            .await
            .expect("find should succeed")
            .is_none());

        let mut second = appointment(at(11, 10, 0));
        assert!(repo.insert_if_free(&second).await.expect("insert should succeed"));
        second.slot = TimeRange::starting_at(at(11, 9, 15), Duration::minutes(30)).expect("valid");
        assert!(!repo.move_if_free(&second).await.expect("move should succeed"));

        // Its own old slot does not count.
        second.slot = TimeRange::starting_at(at(11, 10, 30), Duration::minutes(60)).expect("valid");
        assert!(repo.move_if_free(&second).await.expect("move should succeed"));
        let stored = repo
            .find_by_id(second.id)
            .await
            .expect("find should succeed")
            .expect("appointment should exist");
        assert_eq!(stored.appointment_time(), at(11, 10, 30));
    }

    #[tokio::test]
    async fn test_listing_orders() {
        let service = service_with(FakeDirectory::AlwaysFree).await;
        let doctor_id = Uuid::new_v4();
        let patient_id = Uuid::new_v4();

        for hour in [14, 9, 11] {
            let mut input = booking(doctor_id, at(9, hour, 0), 30);
            input.patient_id = patient_id;
            service
                .schedule_appointment(input)
                .await
                .expect("schedule should succeed");
        }

        let for_patient = service
            .get_appointments_for_patient(patient_id)
            .await
            .expect("patient listing should succeed");
        let hours: Vec<DateTime<Utc>> = for_patient.iter().map(|a| a.appointment_time()).collect();
        assert_eq!(hours, vec![at(9, 14, 0), at(9, 11, 0), at(9, 9, 0)]);

        let window = TimeRange::new(at(9, 9, 0), at(9, 14, 0)).expect("valid");
        let for_doctor = service
            .get_appointments_for_doctor(doctor_id, window)
            .await
            .expect("doctor listing should succeed");
        let hours: Vec<DateTime<Utc>> = for_doctor.iter().map(|a| a.appointment_time()).collect();
        assert_eq!(hours, vec![at(9, 9, 0), at(9, 11, 0)], "end bound is exclusive");
    }

    #[tokio::test]
    async fn test_staff_service_as_directory() {
        let pool = connect_in_memory().await.expect("connect_in_memory should succeed");
        seed_lookups(&pool).await.expect("seed_lookups should succeed");
        let staff = StaffService::new(Arc::new(SqliteStaffRepository::new(pool.clone())));
        let service = AppointmentService::new(
            Arc::new(SqliteAppointmentRepository::new(pool)),
            Arc::new(staff.clone()),
        );

        let doctor = staff
            .add_staff(NewStaff {
                first_name: "Meredith".into(),
                last_name: "Grey".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1978, 9, 27),
                phone_number: "555-3000".into(),
                role_id: "Doctor".into(),
                status_id: "Active".into(),
                ..Default::default()
            })
            .await
            .expect("add_staff should succeed");
        staff
            .assign_task(
                doctor.id,
                NewTask {
                    title: "Surgery".into(),
                    start_time: Some(at(10, 10, 0)),
                    end_time: Some(at(10, 12, 0)),
                    status_id: "Pending".into(),
                    ..Default::default()
                },
            )
            .await
            .expect("assign_task should succeed");

        let during_surgery = TimeRange::new(at(10, 11, 0), at(10, 11, 30)).expect("valid");
        assert!(!service
            .check_doctor_availability(doctor.id, during_surgery)
            .await
            .expect("check should succeed"));

        let after_surgery = TimeRange::new(at(10, 12, 0), at(10, 12, 30)).expect("valid");
        assert!(service
            .check_doctor_availability(doctor.id, after_surgery)
            .await
            .expect("check should succeed"));

        staff
            .assign_task(
                doctor.id,
                NewTask {
                    title: "Phone reminder".into(),
                    start_time: Some(at(10, 14, 0)),
                    end_time: Some(at(10, 14, 0)),
                    status_id: "Pending".into(),
                    ..Default::default()
                },
            )
            .await
            .expect("assign_task should succeed");
        let mut across_reminder = booking(doctor.id, at(10, 13, 30), 60);
        across_reminder.reason = "Follow-up".into();
        let booked = service
            .schedule_appointment(across_reminder)
            .await
            .expect("zero-length task should not block the booking");
        assert_eq!(booked.duration(), Duration::minutes(60));
    }
}
