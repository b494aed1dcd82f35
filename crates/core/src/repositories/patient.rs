//! Patient persistence.

use async_trait::async_trait;
use hms_types::NonEmptyText;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::db::{
    conflict_on_unique, format_date, from_millis, parse_stored_date, parse_stored_uuid, to_millis,
};
use crate::patient::{MedicalRecord, Patient};
use crate::shared::{ListOptions, Page};
use crate::ServiceResult;

const DUPLICATE_PHONE: &str = "a patient with this phone number already exists";

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn insert(&self, patient: &Patient) -> ServiceResult<()>;
    /// Loads the patient with its medical history.
    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Patient>>;
    async fn exists(&self, id: Uuid) -> ServiceResult<bool>;
    /// Writes every scalar field; the medical history is left untouched.
    async fn update(&self, patient: &Patient) -> ServiceResult<()>;
    async fn insert_medical_record(&self, record: &MedicalRecord) -> ServiceResult<()>;
    async fn list(&self, options: ListOptions) -> ServiceResult<Page<Patient>>;
}

#[derive(Clone)]
pub struct SqlitePatientRepository {
    pool: SqlitePool,
}

impl SqlitePatientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn medical_history(&self, patient_id: Uuid) -> ServiceResult<Vec<MedicalRecord>> {
        let rows = sqlx::query(
            "SELECT id, patient_id, record_date, staff_id, diagnosis, treatment, notes,
                    created_at, updated_at
             FROM medical_records
             WHERE patient_id = ?
             ORDER BY record_date ASC, created_at ASC",
        )
        .bind(patient_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(record_from_row).collect()
    }
}

fn patient_from_row(row: &SqliteRow) -> ServiceResult<Patient> {
    let id: String = row.try_get("id")?;
    let date_of_birth: Option<String> = row.try_get("date_of_birth")?;

    Ok(Patient {
        id: parse_stored_uuid("patients.id", &id)?,
        first_name: NonEmptyText::new(row.try_get::<String, _>("first_name")?)?,
        last_name: NonEmptyText::new(row.try_get::<String, _>("last_name")?)?,
        date_of_birth: date_of_birth
            .as_deref()
            .map(|d| parse_stored_date("patients.date_of_birth", d))
            .transpose()?,
        gender: row.try_get("gender")?,
        phone_number: NonEmptyText::new(row.try_get::<String, _>("phone_number")?)?,
        address: row.try_get("address")?,
        medical_history: Vec::new(),
        created_at: from_millis("patients.created_at", row.try_get("created_at")?)?,
        updated_at: from_millis("patients.updated_at", row.try_get("updated_at")?)?,
    })
}

fn record_from_row(row: &SqliteRow) -> ServiceResult<MedicalRecord> {
    let id: String = row.try_get("id")?;
    let patient_id: String = row.try_get("patient_id")?;
    let staff_id: String = row.try_get("staff_id")?;

    Ok(MedicalRecord {
        id: parse_stored_uuid("medical_records.id", &id)?,
        patient_id: parse_stored_uuid("medical_records.patient_id", &patient_id)?,
        date: from_millis("medical_records.record_date", row.try_get("record_date")?)?,
        staff_id: parse_stored_uuid("medical_records.staff_id", &staff_id)?,
        diagnosis: NonEmptyText::new(row.try_get::<String, _>("diagnosis")?)?,
        treatment: row.try_get("treatment")?,
        notes: row.try_get("notes")?,
        created_at: from_millis("medical_records.created_at", row.try_get("created_at")?)?,
        updated_at: from_millis("medical_records.updated_at", row.try_get("updated_at")?)?,
    })
}

#[async_trait]
impl PatientRepository for SqlitePatientRepository {
    async fn insert(&self, patient: &Patient) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO patients
                (id, first_name, last_name, date_of_birth, gender, phone_number, address,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(patient.id.to_string())
        .bind(patient.first_name.as_str())
        .bind(patient.last_name.as_str())
        .bind(patient.date_of_birth.map(format_date))
        .bind(&patient.gender)
        .bind(patient.phone_number.as_str())
        .bind(&patient.address)
        .bind(to_millis(patient.created_at))
        .bind(to_millis(patient.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_PHONE))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> ServiceResult<Option<Patient>> {
        let row = sqlx::query("SELECT * FROM patients WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut patient = patient_from_row(&row)?;
        patient.medical_history = self.medical_history(id).await?;
        Ok(Some(patient))
    }

    async fn exists(&self, id: Uuid) -> ServiceResult<bool> {
        let row = sqlx::query("SELECT 1 FROM patients WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn update(&self, patient: &Patient) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE patients
             SET first_name = ?, last_name = ?, date_of_birth = ?, gender = ?,
                 phone_number = ?, address = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(patient.first_name.as_str())
        .bind(patient.last_name.as_str())
        .bind(patient.date_of_birth.map(format_date))
        .bind(&patient.gender)
        .bind(patient.phone_number.as_str())
        .bind(&patient.address)
        .bind(to_millis(patient.updated_at))
        .bind(patient.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_PHONE))?;
        Ok(())
    }

    async fn insert_medical_record(&self, record: &MedicalRecord) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO medical_records
                (id, patient_id, record_date, staff_id, diagnosis, treatment, notes,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.patient_id.to_string())
        .bind(to_millis(record.date))
        .bind(record.staff_id.to_string())
        .bind(record.diagnosis.as_str())
        .bind(&record.treatment)
        .bind(&record.notes)
        .bind(to_millis(record.created_at))
        .bind(to_millis(record.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, options: ListOptions) -> ServiceResult<Page<Patient>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS n FROM patients")
            .fetch_one(&self.pool)
            .await?
            .try_get("n")?;

        let rows = sqlx::query(
            "SELECT * FROM patients ORDER BY created_at DESC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(i64::from(options.limit()))
        .bind(i64::from(options.offset()))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items: rows
                .iter()
                .map(patient_from_row)
                .collect::<ServiceResult<_>>()?,
            total: u32::try_from(total).unwrap_or(u32::MAX),
        })
    }
}
