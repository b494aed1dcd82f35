//! Staff, task and lookup-table persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hms_types::{NonEmptyText, TimeRange};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::db::{
    conflict_on_unique, format_date, from_millis, parse_stored_date, parse_stored_uuid, to_millis,
};
use crate::shared::{ListOptions, Page};
use crate::staff::{LookupEntry, LookupKind, Staff, StaffFilter, Task};
use crate::{ServiceError, ServiceResult};

const DUPLICATE_PHONE: &str = "a staff member with this phone number already exists";

#[async_trait]
pub trait StaffRepository: Send + Sync {
    async fn lookup_exists(&self, kind: LookupKind, name: &str) -> ServiceResult<bool>;
    /// Fails with `Conflict` when the name is taken.
    async fn insert_lookup(&self, kind: LookupKind, entry: &LookupEntry) -> ServiceResult<()>;
    async fn list_lookups(&self, kind: LookupKind) -> ServiceResult<Vec<LookupEntry>>;

    async fn insert_staff(&self, staff: &Staff) -> ServiceResult<()>;
    /// Loads the staff member with their schedule.
    async fn find_staff(&self, id: Uuid) -> ServiceResult<Option<Staff>>;
    async fn staff_exists(&self, id: Uuid) -> ServiceResult<bool>;
    async fn update_staff(&self, staff: &Staff) -> ServiceResult<()>;
    /// Returns the number of rows changed.
    async fn set_staff_status(
        &self,
        id: Uuid,
        status_id: &str,
        updated_at: DateTime<Utc>,
    ) -> ServiceResult<u64>;
    async fn list_staff(&self, filter: &StaffFilter, options: ListOptions)
        -> ServiceResult<Page<Staff>>;
    async fn staff_ids_with(&self, role_id: &str, status_id: &str) -> ServiceResult<Vec<Uuid>>;

    /// Inserts the tasks and their schedule entries atomically.
    async fn insert_tasks_for(&self, staff_id: Uuid, tasks: &[Task]) -> ServiceResult<()>;
    async fn tasks_for(&self, staff_id: Uuid) -> ServiceResult<Vec<Task>>;
    /// Non-empty windows of the staff member's tasks overlapping `window`, skipping
    /// `ignore_status`.
    async fn busy_ranges(
        &self,
        staff_id: Uuid,
        window: TimeRange,
        ignore_status: &str,
    ) -> ServiceResult<Vec<TimeRange>>;
    async fn list_tasks(
        &self,
        status_id: Option<&str>,
        options: ListOptions,
    ) -> ServiceResult<Page<Task>>;
}

#[derive(Clone)]
pub struct SqliteStaffRepository {
    pool: SqlitePool,
}

impl SqliteStaffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn staff_from_row(row: &SqliteRow) -> ServiceResult<Staff> {
    let id: String = row.try_get("id")?;
    let date_of_birth: String = row.try_get("date_of_birth")?;

    Ok(Staff {
        id: parse_stored_uuid("staff.id", &id)?,
        first_name: NonEmptyText::new(row.try_get::<String, _>("first_name")?)?,
        last_name: NonEmptyText::new(row.try_get::<String, _>("last_name")?)?,
        date_of_birth: parse_stored_date("staff.date_of_birth", &date_of_birth)?,
        phone_number: NonEmptyText::new(row.try_get::<String, _>("phone_number")?)?,
        address: row.try_get("address")?,
        role_id: NonEmptyText::new(row.try_get::<String, _>("role_id")?)?,
        status_id: NonEmptyText::new(row.try_get::<String, _>("status_id")?)?,
        specialization: row.try_get("specialization")?,
        nurse_type: row.try_get("nurse_type")?,
        schedule: Vec::new(),
        created_at: from_millis("staff.created_at", row.try_get("created_at")?)?,
        updated_at: from_millis("staff.updated_at", row.try_get("updated_at")?)?,
    })
}

fn stored_window(row: &SqliteRow) -> ServiceResult<TimeRange> {
    let start = from_millis("tasks.start_time", row.try_get("start_time")?)?;
    let end = from_millis("tasks.end_time", row.try_get("end_time")?)?;
    TimeRange::new(start, end)
        .map_err(|_| ServiceError::Internal("stored task ends before it starts".into()))
}

fn task_from_row(row: &SqliteRow) -> ServiceResult<Task> {
    let id: String = row.try_get("id")?;

    Ok(Task {
        id: parse_stored_uuid("tasks.id", &id)?,
        title: NonEmptyText::new(row.try_get::<String, _>("title")?)?,
        description: row.try_get("description")?,
        priority: row.try_get("priority")?,
        window: stored_window(row)?,
        status_id: NonEmptyText::new(row.try_get::<String, _>("status_id")?)?,
        created_at: from_millis("tasks.created_at", row.try_get("created_at")?)?,
        updated_at: from_millis("tasks.updated_at", row.try_get("updated_at")?)?,
    })
}

fn page_total(total: i64) -> u32 {
    u32::try_from(total).unwrap_or(u32::MAX)
}

#[async_trait]
impl StaffRepository for SqliteStaffRepository {
    async fn lookup_exists(&self, kind: LookupKind, name: &str) -> ServiceResult<bool> {
        let sql = format!("SELECT 1 FROM {} WHERE name = ?", kind.table());
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert_lookup(&self, kind: LookupKind, entry: &LookupEntry) -> ServiceResult<()> {
        let sql = format!(
            "INSERT INTO {} (name, description) VALUES (?, ?)",
            kind.table()
        );
        sqlx::query(&sql)
            .bind(entry.name.as_str())
            .bind(&entry.description)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, format!("{} '{}' already exists", kind.label(), entry.name))
            })?;
        Ok(())
    }

    async fn list_lookups(&self, kind: LookupKind) -> ServiceResult<Vec<LookupEntry>> {
        let sql = format!("SELECT name, description FROM {} ORDER BY name", kind.table());
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> ServiceResult<LookupEntry> {
                Ok(LookupEntry {
                    name: NonEmptyText::new(row.try_get::<String, _>("name")?)?,
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }

    async fn insert_staff(&self, staff: &Staff) -> ServiceResult<()> {
        sqlx::query(
            "INSERT INTO staff
                (id, first_name, last_name, date_of_birth, phone_number, address, role_id,
                 status_id, specialization, nurse_type, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(staff.id.to_string())
        .bind(staff.first_name.as_str())
        .bind(staff.last_name.as_str())
        .bind(format_date(staff.date_of_birth))
        .bind(staff.phone_number.as_str())
        .bind(&staff.address)
        .bind(staff.role_id.as_str())
        .bind(staff.status_id.as_str())
        .bind(&staff.specialization)
        .bind(&staff.nurse_type)
        .bind(to_millis(staff.created_at))
        .bind(to_millis(staff.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_PHONE))?;
        Ok(())
    }

    async fn find_staff(&self, id: Uuid) -> ServiceResult<Option<Staff>> {
        let row = sqlx::query("SELECT * FROM staff WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut staff = staff_from_row(&row)?;
        staff.schedule = self.tasks_for(id).await?;
        Ok(Some(staff))
    }

    async fn staff_exists(&self, id: Uuid) -> ServiceResult<bool> {
        let row = sqlx::query("SELECT 1 FROM staff WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn update_staff(&self, staff: &Staff) -> ServiceResult<()> {
        sqlx::query(
            "UPDATE staff
             SET first_name = ?, last_name = ?, date_of_birth = ?, phone_number = ?,
                 address = ?, specialization = ?, nurse_type = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(staff.first_name.as_str())
        .bind(staff.last_name.as_str())
        .bind(format_date(staff.date_of_birth))
        .bind(staff.phone_number.as_str())
        .bind(&staff.address)
        .bind(&staff.specialization)
        .bind(&staff.nurse_type)
        .bind(to_millis(staff.updated_at))
        .bind(staff.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, DUPLICATE_PHONE))?;
        Ok(())
    }

    async fn set_staff_status(
        &self,
        id: Uuid,
        status_id: &str,
        updated_at: DateTime<Utc>,
    ) -> ServiceResult<u64> {
        let result = sqlx::query("UPDATE staff SET status_id = ?, updated_at = ? WHERE id = ?")
            .bind(status_id)
            .bind(to_millis(updated_at))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn list_staff(
        &self,
        filter: &StaffFilter,
        options: ListOptions,
    ) -> ServiceResult<Page<Staff>> {
        let role = filter.role_id.as_deref();
        let status = filter.status_id.as_deref();

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS n FROM staff
             WHERE (? IS NULL OR role_id = ?) AND (? IS NULL OR status_id = ?)",
        )
        .bind(role)
        .bind(role)
        .bind(status)
        .bind(status)
        .fetch_one(&self.pool)
        .await?
        .try_get("n")?;

        let rows = sqlx::query(
            "SELECT * FROM staff
             WHERE (? IS NULL OR role_id = ?) AND (? IS NULL OR status_id = ?)
             ORDER BY last_name, first_name, id
             LIMIT ? OFFSET ?",
        )
        .bind(role)
        .bind(role)
        .bind(status)
        .bind(status)
        .bind(i64::from(options.limit()))
        .bind(i64::from(options.offset()))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items: rows
                .iter()
                .map(staff_from_row)
                .collect::<ServiceResult<_>>()?,
            total: page_total(total),
        })
    }

    async fn staff_ids_with(&self, role_id: &str, status_id: &str) -> ServiceResult<Vec<Uuid>> {
        let rows = sqlx::query("SELECT id FROM staff WHERE role_id = ? AND status_id = ? ORDER BY id")
            .bind(role_id)
            .bind(status_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> ServiceResult<Uuid> {
                let id: String = row.try_get("id")?;
                parse_stored_uuid("staff.id", &id)
            })
            .collect()
    }

    async fn insert_tasks_for(&self, staff_id: Uuid, tasks: &[Task]) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;

        for task in tasks {
            sqlx::query(
                "INSERT INTO tasks
                    (id, title, description, priority, start_time, end_time, status_id,
                     created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(task.id.to_string())
            .bind(task.title.as_str())
            .bind(&task.description)
            .bind(task.priority)
            .bind(to_millis(task.window.start()))
            .bind(to_millis(task.window.end()))
            .bind(task.status_id.as_str())
            .bind(to_millis(task.created_at))
            .bind(to_millis(task.updated_at))
            .execute(&mut *tx)
            .await?;

            sqlx::query("INSERT INTO schedule_entries (staff_id, task_id) VALUES (?, ?)")
                .bind(staff_id.to_string())
                .bind(task.id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn tasks_for(&self, staff_id: Uuid) -> ServiceResult<Vec<Task>> {
        let rows = sqlx::query(
            "SELECT t.* FROM tasks t
             JOIN schedule_entries s ON s.task_id = t.id
             WHERE s.staff_id = ?
             ORDER BY t.start_time ASC, t.id ASC",
        )
        .bind(staff_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    async fn busy_ranges(
        &self,
        staff_id: Uuid,
        window: TimeRange,
        ignore_status: &str,
    ) -> ServiceResult<Vec<TimeRange>> {
        let rows = sqlx::query(
            "SELECT t.start_time, t.end_time FROM tasks t
             JOIN schedule_entries s ON s.task_id = t.id
             WHERE s.staff_id = ? AND t.status_id != ?
               AND t.end_time > t.start_time
               AND t.start_time < ? AND t.end_time > ?",
        )
        .bind(staff_id.to_string())
        .bind(ignore_status)
        .bind(to_millis(window.end()))
        .bind(to_millis(window.start()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(stored_window).collect()
    }

    async fn list_tasks(
        &self,
        status_id: Option<&str>,
        options: ListOptions,
    ) -> ServiceResult<Page<Task>> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS n FROM tasks WHERE (? IS NULL OR status_id = ?)")
            .bind(status_id)
            .bind(status_id)
            .fetch_one(&self.pool)
            .await?
            .try_get("n")?;

        let rows = sqlx::query(
            "SELECT * FROM tasks
             WHERE (? IS NULL OR status_id = ?)
             ORDER BY created_at DESC, id ASC
             LIMIT ? OFFSET ?",
        )
        .bind(status_id)
        .bind(status_id)
        .bind(i64::from(options.limit()))
        .bind(i64::from(options.offset()))
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items: rows
                .iter()
                .map(task_from_row)
                .collect::<ServiceResult<_>>()?,
            total: page_total(total),
        })
    }
}
