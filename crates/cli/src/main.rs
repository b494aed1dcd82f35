use clap::{Parser, Subcommand};
use hms_core::config::{database_url_from_env_value, max_connections_from_env_value};
use hms_core::{
    db, CoreConfig, ListOptions, PatientService, Staff, StaffFilter, StaffService,
};

#[derive(Parser)]
#[command(name = "hms")]
#[command(about = "Hospital management admin CLI")]
struct Cli {
    /// Database URL (defaults to DATABASE_URL, then a local SQLite file)
    #[arg(long)]
    database_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema if it does not exist
    Migrate,
    /// Insert the default staff roles, staff statuses and task statuses
    Seed,
    /// List patients, newest first
    Patients {
        #[arg(long, default_value_t = 50)]
        limit: u32,
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// List staff members
    Staff {
        /// Only staff with this role (e.g. Doctor)
        #[arg(long)]
        role: Option<String>,
        /// Only staff with this status (e.g. Active)
        #[arg(long)]
        status: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let cfg = CoreConfig::new(
        database_url_from_env_value(cli.database_url.or_else(|| std::env::var("DATABASE_URL").ok())),
        max_connections_from_env_value(std::env::var("DB_MAX_CONNECTIONS").ok())?,
    )?;
    let pool = db::connect(&cfg).await?;

    match cli.command {
        Commands::Migrate => {
            db::migrate(&pool).await?;
            println!("Schema is up to date ({}).", cfg.database_url());
        }
        Commands::Seed => {
            db::migrate(&pool).await?;
            let report = db::seed_lookups(&pool).await?;
            println!(
                "Seeded {} staff roles, {} staff statuses, {} task statuses.",
                report.staff_roles, report.staff_statuses, report.task_statuses
            );
        }
        Commands::Patients { limit, offset } => {
            let service = PatientService::with_pool(pool);
            let page = service
                .list_patients(ListOptions::new(limit, offset))
                .await?;
            if page.items.is_empty() {
                println!("No patients found.");
            } else {
                for patient in &page.items {
                    println!(
                        "ID: {}, Name: {} {}, Phone: {}, Registered: {}",
                        patient.id,
                        patient.first_name,
                        patient.last_name,
                        patient.phone_number,
                        patient.created_at.format("%Y-%m-%d %H:%M"),
                    );
                }
                println!("Showing {} of {} patients.", page.items.len(), page.total);
            }
        }
        Commands::Staff {
            role,
            status,
            limit,
        } => {
            let service = StaffService::with_pool(pool);
            let filter = StaffFilter {
                role_id: role,
                status_id: status,
            };
            let page = service
                .list_staff(filter, ListOptions::new(limit, 0))
                .await?;
            if page.items.is_empty() {
                println!("No staff found.");
            } else {
                for staff in &page.items {
                    println!("{}", staff_line(staff));
                }
                println!("Showing {} of {} staff.", page.items.len(), page.total);
            }
        }
    }

    Ok(())
}

/// One row of `hms staff`. Listings carry no schedules, so only the staff record is shown.
fn staff_line(staff: &Staff) -> String {
    format!(
        "ID: {}, Name: {} {}, Role: {}, Status: {}, Phone: {}",
        staff.id,
        staff.first_name,
        staff.last_name,
        staff.role_id,
        staff.status_id,
        staff.phone_number,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hms_core::NewStaff;

    #[tokio::test]
    async fn test_staff_line_shows_listed_fields() {
        let pool = db::connect_in_memory()
            .await
            .expect("connect_in_memory should succeed");
        db::seed_lookups(&pool).await.expect("seed_lookups should succeed");
        let service = StaffService::with_pool(pool);
        service
            .add_staff(NewStaff {
                first_name: "Miranda".into(),
                last_name: "Bailey".into(),
                date_of_birth: NaiveDate::from_ymd_opt(1970, 2, 1),
                phone_number: "555-4000".into(),
                role_id: "Doctor".into(),
                status_id: "Active".into(),
                ..Default::default()
            })
            .await
            .expect("add_staff should succeed");

        let page = service
            .list_staff(StaffFilter::default(), ListOptions::default())
            .await
            .expect("list_staff should succeed");
        let line = staff_line(&page.items[0]);
        assert!(line.contains("Name: Miranda Bailey"));
        assert!(line.contains("Role: Doctor, Status: Active"));
        assert!(line.contains("Phone: 555-4000"));
    }
}
