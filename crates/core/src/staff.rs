//! Staff service and related types.
//!
//! Manages staff members, their task schedules and the lookup tables (roles, staff statuses,
//! task statuses) that classify them. Also answers doctor availability for the appointment
//! service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use hms_types::{NonEmptyText, TimeRange};
use uuid::Uuid;

use crate::appointment::StaffDirectory;
use crate::availability::{free_ranges, TimeSlot};
use crate::constants::{ACTIVE_STATUS, CANCELLED_TASK_STATUS, DOCTOR_ROLE};
use crate::repositories::staff::StaffRepository;
use crate::shared::{ListOptions, Page};
use crate::validation::{replace_string, replace_text, replace_value, require_id, require_text};
use crate::{ServiceError, ServiceResult};

const MISSING_STAFF_INFO: &str = "missing required staff information";

/// The three name-keyed lookup tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    StaffRole,
    StaffStatus,
    TaskStatus,
}

impl LookupKind {
    pub fn table(self) -> &'static str {
        match self {
            LookupKind::StaffRole => "staff_roles",
            LookupKind::StaffStatus => "staff_statuses",
            LookupKind::TaskStatus => "task_statuses",
        }
    }

    /// Human label used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            LookupKind::StaffRole => "role",
            LookupKind::StaffStatus => "status",
            LookupKind::TaskStatus => "task status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupEntry {
    pub name: NonEmptyText,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Staff {
    pub id: Uuid,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub date_of_birth: NaiveDate,
    pub phone_number: NonEmptyText,
    pub address: String,
    pub role_id: NonEmptyText,
    pub status_id: NonEmptyText,
    pub specialization: String,
    pub nurse_type: String,
    /// Only populated by detail lookups.
    pub schedule: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub title: NonEmptyText,
    pub description: String,
    pub priority: i32,
    pub window: TimeRange,
    pub status_id: NonEmptyText,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewStaff {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: String,
    pub address: String,
    pub role_id: String,
    pub status_id: String,
    pub specialization: String,
    pub nurse_type: String,
}

/// Partial update: blank strings and `None` leave the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct StaffUpdate {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub phone_number: String,
    pub address: String,
    pub specialization: String,
    pub nurse_type: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub status_id: String,
}

#[derive(Debug, Clone, Default)]
pub struct StaffFilter {
    pub role_id: Option<String>,
    pub status_id: Option<String>,
}

impl Staff {
    /// Applies the non-empty fields of `update`, bumping `updated_at` only if something changed.
    pub fn apply_update(&mut self, update: StaffUpdate, now: DateTime<Utc>) -> bool {
        let mut changed = replace_text(&mut self.first_name, &update.first_name);
        changed |= replace_text(&mut self.last_name, &update.last_name);
        changed |= replace_value(&mut self.date_of_birth, update.date_of_birth);
        changed |= replace_text(&mut self.phone_number, &update.phone_number);
        changed |= replace_string(&mut self.address, &update.address);
        changed |= replace_string(&mut self.specialization, &update.specialization);
        changed |= replace_string(&mut self.nurse_type, &update.nurse_type);

        if changed {
            self.updated_at = now;
        }
        changed
    }
}

impl NewTask {
    /// Validates the input and builds a task with a fresh id.
    ///
    /// The status name is only checked for presence here; whether it exists is a storage
    /// question answered by the service.
    fn into_task(self, now: DateTime<Utc>) -> ServiceResult<Task> {
        let title = require_text(&self.title, "task title is required")?;
        let status_id = require_text(&self.status_id, "task status is required")?;
        let (Some(start), Some(end)) = (self.start_time, self.end_time) else {
            return Err(ServiceError::InvalidInput(
                "task start and end times are required".into(),
            ));
        };
        let window = TimeRange::new(start, end).map_err(|_| {
            ServiceError::InvalidInput("task end time must not be before its start time".into())
        })?;

        Ok(Task {
            id: Uuid::new_v4(),
            title,
            description: self.description.trim().to_owned(),
            priority: self.priority,
            window,
            status_id,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Staff use cases - no API concerns
#[derive(Clone)]
pub struct StaffService {
    repo: Arc<dyn StaffRepository>,
}

impl StaffService {
    /// Creates a new instance of StaffService.
    pub fn new(repo: Arc<dyn StaffRepository>) -> Self {
        Self { repo }
    }

    async fn ensure_lookup(&self, kind: LookupKind, name: &str) -> ServiceResult<()> {
        if self.repo.lookup_exists(kind, name).await? {
            Ok(())
        } else {
            Err(ServiceError::InvalidInput(format!(
                "invalid {} ID: {name}",
                kind.label()
            )))
        }
    }

    async fn build_tasks(
        &self,
        inputs: Vec<NewTask>,
        now: DateTime<Utc>,
    ) -> ServiceResult<Vec<Task>> {
        let mut tasks = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            let task = input.into_task(now).map_err(|e| match e {
                ServiceError::InvalidInput(msg) => {
                    ServiceError::InvalidInput(format!("task {}: {msg}", index + 1))
                }
                other => other,
            })?;
            self.ensure_lookup(LookupKind::TaskStatus, task.status_id.as_str())
                .await?;
            tasks.push(task);
        }
        Ok(tasks)
    }

    /// Adds a staff member.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when a required field is missing or the role/status does not exist.
    /// - `Conflict` when the phone number is already in use.
    pub async fn add_staff(&self, input: NewStaff) -> ServiceResult<Staff> {
        let now = Utc::now();
        let staff = Staff {
            id: Uuid::new_v4(),
            first_name: require_text(&input.first_name, MISSING_STAFF_INFO)?,
            last_name: require_text(&input.last_name, MISSING_STAFF_INFO)?,
            date_of_birth: input
                .date_of_birth
                .ok_or_else(|| ServiceError::InvalidInput(MISSING_STAFF_INFO.into()))?,
            phone_number: require_text(&input.phone_number, MISSING_STAFF_INFO)?,
            address: input.address.trim().to_owned(),
            role_id: require_text(&input.role_id, MISSING_STAFF_INFO)?,
            status_id: require_text(&input.status_id, MISSING_STAFF_INFO)?,
            specialization: input.specialization.trim().to_owned(),
            nurse_type: input.nurse_type.trim().to_owned(),
            schedule: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.ensure_lookup(LookupKind::StaffRole, staff.role_id.as_str())
            .await?;
        self.ensure_lookup(LookupKind::StaffStatus, staff.status_id.as_str())
            .await?;

        self.repo.insert_staff(&staff).await?;
        tracing::info!(staff_id = %staff.id, role = %staff.role_id, "staff member added");
        Ok(staff)
    }

    /// Fetches a staff member with their scheduled tasks.
    pub async fn get_staff_details(&self, staff_id: Uuid) -> ServiceResult<Staff> {
        let staff_id = require_id(staff_id, "staff")?;
        self.repo.find_staff(staff_id).await?.ok_or_else(|| {
            tracing::warn!(%staff_id, "staff member not found");
            ServiceError::NotFound("staff not found".into())
        })
    }

    pub async fn update_staff_details(
        &self,
        staff_id: Uuid,
        update: StaffUpdate,
    ) -> ServiceResult<Staff> {
        let mut staff = self.get_staff_details(staff_id).await?;

        if staff.apply_update(update, Utc::now()) {
            self.repo.update_staff(&staff).await?;
            tracing::info!(%staff_id, "staff details updated");
        }
        Ok(staff)
    }

    /// Adds tasks to a staff member's schedule in a single transaction.
    ///
    /// Every task is validated before anything is written; an empty list changes nothing.
    pub async fn update_staff_schedule(
        &self,
        staff_id: Uuid,
        tasks: Vec<NewTask>,
    ) -> ServiceResult<()> {
        let staff_id = require_id(staff_id, "staff")?;
        let tasks = self.build_tasks(tasks, Utc::now()).await?;

        if !self.repo.staff_exists(staff_id).await? {
            return Err(ServiceError::NotFound("staff not found".into()));
        }
        if tasks.is_empty() {
            return Ok(());
        }

        self.repo.insert_tasks_for(staff_id, &tasks).await?;
        tracing::info!(%staff_id, tasks = tasks.len(), "staff schedule updated");
        Ok(())
    }

    /// Moves a staff member to another status (for example `OnLeave`).
    pub async fn set_staff_availability(
        &self,
        staff_id: Uuid,
        status_id: &str,
    ) -> ServiceResult<()> {
        let staff_id = require_id(staff_id, "staff")?;
        let status_id = require_text(status_id, "status ID is required")?;
        self.ensure_lookup(LookupKind::StaffStatus, status_id.as_str())
            .await?;

        let affected = self
            .repo
            .set_staff_status(staff_id, status_id.as_str(), Utc::now())
            .await?;
        if affected == 0 {
            return Err(ServiceError::NotFound("staff not found".into()));
        }
        tracing::info!(%staff_id, status = %status_id, "staff status set");
        Ok(())
    }

    /// Free time of active doctors inside `window`.
    ///
    /// With a `doctor_id` only that doctor is considered: an unknown id is `NotFound`, while a
    /// staff member who is not an active doctor simply has no slots. Tasks that were cancelled
    /// do not block time.
    pub async fn get_doctor_availability(
        &self,
        doctor_id: Option<Uuid>,
        window: TimeRange,
    ) -> ServiceResult<Vec<TimeSlot>> {
        let doctors = match doctor_id {
            Some(id) => {
                let staff = self
                    .repo
                    .find_staff(id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound("doctor not found".into()))?;
                if staff.role_id.as_str() != DOCTOR_ROLE || staff.status_id.as_str() != ACTIVE_STATUS
                {
                    tracing::debug!(doctor_id = %id, "staff member is not an active doctor");
                    return Ok(Vec::new());
                }
                vec![id]
            }
            None => self.repo.staff_ids_with(DOCTOR_ROLE, ACTIVE_STATUS).await?,
        };

        let mut slots = Vec::new();
        for doctor_id in doctors {
            let busy = self
                .repo
                .busy_ranges(doctor_id, window, CANCELLED_TASK_STATUS)
                .await?;
            slots.extend(
                free_ranges(window, &busy)
                    .into_iter()
                    .map(|range| TimeSlot { doctor_id, range }),
            );
        }
        Ok(slots)
    }

    /// Creates a task and places it on the staff member's schedule.
    pub async fn assign_task(&self, staff_id: Uuid, input: NewTask) -> ServiceResult<Task> {
        let staff_id = require_id(staff_id, "staff")?;
        let mut tasks = self.build_tasks(vec![input], Utc::now()).await?;

        if !self.repo.staff_exists(staff_id).await? {
            return Err(ServiceError::InvalidInput(format!(
                "staff member {staff_id} does not exist"
            )));
        }

        self.repo.insert_tasks_for(staff_id, &tasks).await?;
        let task = tasks.remove(0);
        tracing::info!(%staff_id, task_id = %task.id, "task assigned");
        Ok(task)
    }

    /// All tasks on a staff member's schedule, earliest first.
    pub async fn track_workload(&self, staff_id: Uuid) -> ServiceResult<Vec<Task>> {
        let staff_id = require_id(staff_id, "staff")?;
        if !self.repo.staff_exists(staff_id).await? {
            return Err(ServiceError::NotFound("staff not found".into()));
        }
        self.repo.tasks_for(staff_id).await
    }

    pub async fn list_staff(
        &self,
        filter: StaffFilter,
        options: ListOptions,
    ) -> ServiceResult<Page<Staff>> {
        self.repo.list_staff(&filter, options).await
    }

    /// Lists tasks, most recently created first.
    pub async fn list_tasks(
        &self,
        status_id: Option<String>,
        options: ListOptions,
    ) -> ServiceResult<Page<Task>> {
        self.repo.list_tasks(status_id.as_deref(), options).await
    }

    /// Adds a role, staff status or task status.
    pub async fn add_lookup(
        &self,
        kind: LookupKind,
        name: &str,
        description: &str,
    ) -> ServiceResult<LookupEntry> {
        let entry = LookupEntry {
            name: require_text(name, &format!("{} name is required", kind.label()))?,
            description: description.trim().to_owned(),
        };
        self.repo.insert_lookup(kind, &entry).await?;
        tracing::info!(table = kind.table(), name = %entry.name, "lookup entry added");
        Ok(entry)
    }

    pub async fn list_lookups(&self, kind: LookupKind) -> ServiceResult<Vec<LookupEntry>> {
        self.repo.list_lookups(kind).await
    }
}

#[async_trait]
impl StaffDirectory for StaffService {
    async fn doctor_availability(
        &self,
        doctor_id: Uuid,
        window: TimeRange,
    ) -> ServiceResult<Vec<TimeSlot>> {
        self.get_doctor_availability(Some(doctor_id), window).await
    }
}
