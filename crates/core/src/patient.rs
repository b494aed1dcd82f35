//! Patient service and related types.
//!
//! Registers patients, keeps their contact details current and appends medical records to
//! their history.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use hms_types::NonEmptyText;
use uuid::Uuid;

use crate::repositories::patient::PatientRepository;
use crate::shared::{ListOptions, Page};
use crate::validation::{replace_string, replace_text, replace_value, require_id, require_text};
use crate::{ServiceError, ServiceResult};

const MISSING_PATIENT_INFO: &str = "missing required patient information";
const MISSING_RECORD_INFO: &str = "missing required medical record information";

/// A registered patient.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: NonEmptyText,
    pub last_name: NonEmptyText,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub phone_number: NonEmptyText,
    pub address: String,
    /// Only populated by detail lookups; list results leave it empty.
    pub medical_history: Vec<MedicalRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry of a patient's medical history.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicalRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub date: DateTime<Utc>,
    pub staff_id: Uuid,
    pub diagnosis: NonEmptyText,
    pub treatment: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration input. Text fields are raw caller input.
#[derive(Debug, Clone, Default)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub phone_number: String,
    pub address: String,
}

/// Partial update: blank strings and `None` leave the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub phone_number: String,
    pub address: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewMedicalRecord {
    pub staff_id: String,
    pub date: Option<DateTime<Utc>>,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: String,
}

impl Patient {
    /// Applies the non-empty fields of `update`, bumping `updated_at` only if something changed.
    pub fn apply_update(&mut self, update: PatientUpdate, now: DateTime<Utc>) -> bool {
        let mut changed = replace_text(&mut self.first_name, &update.first_name);
        changed |= replace_text(&mut self.last_name, &update.last_name);
        changed |= replace_value(&mut self.date_of_birth, update.date_of_birth.map(Some));
        changed |= replace_string(&mut self.gender, &update.gender);
        changed |= replace_text(&mut self.phone_number, &update.phone_number);
        changed |= replace_string(&mut self.address, &update.address);

        if changed {
            self.updated_at = now;
        }
        changed
    }
}

/// Patient use cases - no API concerns
#[derive(Clone)]
pub struct PatientService {
    repo: Arc<dyn PatientRepository>,
}

impl PatientService {
    /// Creates a new instance of PatientService.
    pub fn new(repo: Arc<dyn PatientRepository>) -> Self {
        Self { repo }
    }

    /// Registers a new patient.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when first name, last name or phone number is missing.
    /// - `Conflict` when the phone number is already registered.
    pub async fn register_patient(&self, input: NewPatient) -> ServiceResult<Patient> {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: require_text(&input.first_name, MISSING_PATIENT_INFO)?,
            last_name: require_text(&input.last_name, MISSING_PATIENT_INFO)?,
            date_of_birth: input.date_of_birth,
            gender: input.gender.trim().to_owned(),
            phone_number: require_text(&input.phone_number, MISSING_PATIENT_INFO)?,
            address: input.address.trim().to_owned(),
            medical_history: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert(&patient).await?;
        tracing::info!(patient_id = %patient.id, "patient registered");
        Ok(patient)
    }

    /// Fetches a patient together with their medical history.
    pub async fn get_patient_details(&self, patient_id: Uuid) -> ServiceResult<Patient> {
        let patient_id = require_id(patient_id, "patient")?;
        self.repo.find_by_id(patient_id).await?.ok_or_else(|| {
            tracing::warn!(%patient_id, "patient not found");
            ServiceError::NotFound("patient not found".into())
        })
    }

    /// Applies a partial update and returns the stored patient.
    pub async fn update_patient_details(
        &self,
        patient_id: Uuid,
        update: PatientUpdate,
    ) -> ServiceResult<Patient> {
        let mut patient = self.get_patient_details(patient_id).await?;

        if patient.apply_update(update, Utc::now()) {
            self.repo.update(&patient).await?;
            tracing::info!(%patient_id, "patient details updated");
        } else {
            tracing::debug!(%patient_id, "patient update had no changes");
        }
        Ok(patient)
    }

    /// Appends a medical record to a patient's history.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when staff id, diagnosis or date is missing, or the staff id is not a UUID.
    /// - `NotFound` when the patient does not exist.
    pub async fn add_medical_record(
        &self,
        patient_id: Uuid,
        input: NewMedicalRecord,
    ) -> ServiceResult<MedicalRecord> {
        let patient_id = require_id(patient_id, "patient")?;
        let staff_id = require_text(&input.staff_id, MISSING_RECORD_INFO)?;
        let diagnosis = require_text(&input.diagnosis, MISSING_RECORD_INFO)?;
        let date = input
            .date
            .ok_or_else(|| ServiceError::InvalidInput(MISSING_RECORD_INFO.into()))?;
        let staff_id = Uuid::parse_str(staff_id.as_str())
            .map_err(|_| ServiceError::InvalidInput("invalid staff ID format".into()))?;

        if !self.repo.exists(patient_id).await? {
            return Err(ServiceError::NotFound("patient not found".into()));
        }

        let now = Utc::now();
        let record = MedicalRecord {
            id: Uuid::new_v4(),
            patient_id,
            date,
            staff_id,
            diagnosis,
            treatment: input.treatment.trim().to_owned(),
            notes: input.notes.trim().to_owned(),
            created_at: now,
            updated_at: now,
        };

        self.repo.insert_medical_record(&record).await?;
        tracing::info!(%patient_id, record_id = %record.id, "medical record added");
        Ok(record)
    }

    /// Returns a patient's medical history, oldest first. Never absent, possibly empty.
    pub async fn get_patient_medical_history(
        &self,
        patient_id: Uuid,
    ) -> ServiceResult<Vec<MedicalRecord>> {
        Ok(self.get_patient_details(patient_id).await?.medical_history)
    }

    /// Lists patients, newest registration first.
    pub async fn list_patients(&self, options: ListOptions) -> ServiceResult<Page<Patient>> {
        self.repo.list(options).await
    }
}
