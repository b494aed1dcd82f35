//! Controller tests calling the generated service traits directly.

use std::sync::Arc;

use api_grpc::pb::{
    self, appointment_api_server::AppointmentApi, patient_api_server::PatientApi,
    staff_api_server::StaffApi,
};
use api_grpc::GrpcServices;
use chrono::{Duration, DurationRound, Utc};
use hms_core::{db, StaffService};
use tonic::{Code, Request};

async fn services() -> GrpcServices {
    let pool = db::connect_in_memory()
        .await
        .expect("connect_in_memory should succeed");
    db::seed_lookups(&pool)
        .await
        .expect("seed_lookups should succeed");
    let directory = Arc::new(StaffService::with_pool(pool.clone()));
    GrpcServices::new(pool, directory)
}

fn register_req(phone: &str) -> pb::RegisterPatientReq {
    pb::RegisterPatientReq {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        date_of_birth: "1815-12-10".into(),
        gender: "female".into(),
        phone_number: phone.into(),
        address: "12 St James's Square".into(),
    }
}

async fn add_doctor(services: &GrpcServices, phone: &str) -> pb::Staff {
    services
        .staff
        .add_staff(Request::new(pb::AddStaffReq {
            first_name: "John".into(),
            last_name: "Watson".into(),
            date_of_birth: "1852-08-07".into(),
            phone_number: phone.into(),
            address: "221B Baker St".into(),
            role_id: "Doctor".into(),
            status_id: "Active".into(),
            specialization: "General practice".into(),
            nurse_type: String::new(),
        }))
        .await
        .expect("add_staff should succeed")
        .into_inner()
}

fn tomorrow_at_ten() -> chrono::DateTime<Utc> {
    let midnight = Utc::now()
        .duration_trunc(Duration::days(1))
        .expect("truncation should succeed");
    midnight + Duration::days(1) + Duration::hours(10)
}

#[tokio::test]
async fn test_patient_health_names_service() {
    let services = services().await;
    let res = services
        .patient
        .health(Request::new(()))
        .await
        .expect("health should succeed")
        .into_inner();
    assert!(res.ok);
    assert_eq!(res.message, "patient-service is alive");
}

#[tokio::test]
async fn test_register_and_fetch_patient() {
    let services = services().await;
    let created = services
        .patient
        .register_patient(Request::new(register_req("555-0100")))
        .await
        .expect("register_patient should succeed")
        .into_inner();
    assert_eq!(created.date_of_birth, "1815-12-10");

    let fetched = services
        .patient
        .get_patient_details(Request::new(pb::PatientIdReq {
            patient_id: created.id.clone(),
        }))
        .await
        .expect("get_patient_details should succeed")
        .into_inner();
    assert_eq!(fetched.first_name, "Ada");
    assert!(fetched.medical_history.is_empty());
}

#[tokio::test]
async fn test_duplicate_phone_is_already_exists() {
    let services = services().await;
    services
        .patient
        .register_patient(Request::new(register_req("555-0101")))
        .await
        .expect("first registration should succeed");

    let err = services
        .patient
        .register_patient(Request::new(register_req("555-0101")))
        .await
        .expect_err("duplicate phone should fail");
    assert_eq!(err.code(), Code::AlreadyExists);
}

#[tokio::test]
async fn test_malformed_ids_are_invalid_argument() {
    let services = services().await;
    let err = services
        .patient
        .get_patient_details(Request::new(pb::PatientIdReq {
            patient_id: "not-a-uuid".into(),
        }))
        .await
        .expect_err("bad id should fail");
    assert_eq!(err.code(), Code::InvalidArgument);

    let err = services
        .staff
        .track_workload(Request::new(pb::StaffIdReq {
            staff_id: uuid::Uuid::new_v4().to_string(),
        }))
        .await
        .expect_err("unknown staff should fail");
    assert_eq!(err.code(), Code::NotFound);
}

#[tokio::test]
async fn test_medical_record_round_trip_through_controller() {
    let services = services().await;
    let patient = services
        .patient
        .register_patient(Request::new(register_req("555-0102")))
        .await
        .expect("register_patient should succeed")
        .into_inner();
    let doctor = add_doctor(&services, "555-0200").await;

    services
        .patient
        .add_medical_record(Request::new(pb::AddMedicalRecordReq {
            patient_id: patient.id.clone(),
            staff_id: doctor.id,
            date: "2024-03-01T09:30:00Z".into(),
            diagnosis: "Influenza".into(),
            treatment: "Rest".into(),
            notes: String::new(),
        }))
        .await
        .expect("add_medical_record should succeed");

    let history = services
        .patient
        .get_patient_medical_history(Request::new(pb::PatientIdReq {
            patient_id: patient.id,
        }))
        .await
        .expect("history should succeed")
        .into_inner();
    assert_eq!(history.records.len(), 1);
    assert_eq!(history.records[0].date, "2024-03-01T09:30:00Z");
}

#[tokio::test]
async fn test_lookup_tables_are_seeded_and_extendable() {
    let services = services().await;
    services
        .staff
        .add_staff_role(Request::new(pb::LookupEntry {
            name: "Surgeon".into(),
            description: "Performs operations".into(),
        }))
        .await
        .expect("add_staff_role should succeed");

    let roles = services
        .staff
        .list_staff_roles(Request::new(()))
        .await
        .expect("list_staff_roles should succeed")
        .into_inner();
    let names: Vec<_> = roles.entries.iter().map(|e| e.name.as_str()).collect();
    assert!(names.contains(&"Doctor"));
    assert!(names.contains(&"Surgeon"));
}

#[tokio::test]
async fn test_schedule_and_double_book_appointment() {
    let services = services().await;
    let patient = services
        .patient
        .register_patient(Request::new(register_req("555-0103")))
        .await
        .expect("register_patient should succeed")
        .into_inner();
    let doctor = add_doctor(&services, "555-0201").await;
    let start = tomorrow_at_ten();

    let request = pb::ScheduleAppointmentReq {
        patient_id: patient.id.clone(),
        doctor_id: doctor.id.clone(),
        appointment_time: start.to_rfc3339(),
        duration_seconds: 1800,
        reason: "Check-up".into(),
        notes: String::new(),
        place: "Room 3".into(),
    };
    let appointment = services
        .appointment
        .schedule_appointment(Request::new(request.clone()))
        .await
        .expect("schedule_appointment should succeed")
        .into_inner();
    assert_eq!(appointment.status, pb::AppointmentStatus::Scheduled as i32);
    assert_eq!(appointment.duration_seconds, 1800);

    let err = services
        .appointment
        .schedule_appointment(Request::new(request))
        .await
        .expect_err("overlapping booking should fail");
    assert_eq!(err.code(), Code::AlreadyExists);

    let listed = services
        .appointment
        .get_appointments_for_patient(Request::new(pb::PatientAppointmentsReq {
            patient_id: patient.id,
        }))
        .await
        .expect("listing should succeed")
        .into_inner();
    assert_eq!(listed.appointments.len(), 1);
}

#[tokio::test]
async fn test_cancel_then_status_change_is_rejected() {
    let services = services().await;
    let patient = services
        .patient
        .register_patient(Request::new(register_req("555-0104")))
        .await
        .expect("register_patient should succeed")
        .into_inner();
    let doctor = add_doctor(&services, "555-0202").await;

    let appointment = services
        .appointment
        .schedule_appointment(Request::new(pb::ScheduleAppointmentReq {
            patient_id: patient.id,
            doctor_id: doctor.id,
            appointment_time: tomorrow_at_ten().to_rfc3339(),
            duration_seconds: 900,
            reason: "Follow-up".into(),
            ..Default::default()
        }))
        .await
        .expect("schedule_appointment should succeed")
        .into_inner();

    services
        .appointment
        .cancel_appointment(Request::new(pb::AppointmentIdReq {
            appointment_id: appointment.id.clone(),
        }))
        .await
        .expect("cancel should succeed");

    let err = services
        .appointment
        .update_appointment_status(Request::new(pb::UpdateAppointmentStatusReq {
            appointment_id: appointment.id.clone(),
            status: pb::AppointmentStatus::Confirmed as i32,
        }))
        .await
        .expect_err("cancelled appointment is final");
    assert_eq!(err.code(), Code::AlreadyExists);

    let err = services
        .appointment
        .update_appointment_status(Request::new(pb::UpdateAppointmentStatusReq {
            appointment_id: appointment.id,
            status: pb::AppointmentStatus::Unspecified as i32,
        }))
        .await
        .expect_err("unspecified status should fail");
    assert_eq!(err.code(), Code::InvalidArgument);
}

#[tokio::test]
async fn test_doctor_availability_reports_free_window() {
    let services = services().await;
    let doctor = add_doctor(&services, "555-0203").await;
    let start = tomorrow_at_ten();

    let res = services
        .staff
        .get_doctor_availability(Request::new(pb::DoctorAvailabilityReq {
            doctor_id: doctor.id.clone(),
            start_time: start.to_rfc3339(),
            end_time: (start + Duration::hours(2)).to_rfc3339(),
        }))
        .await
        .expect("availability should succeed")
        .into_inner();
    assert_eq!(res.slots.len(), 1);
    assert_eq!(res.slots[0].doctor_id, doctor.id);

    let err = services
        .staff
        .get_doctor_availability(Request::new(pb::DoctorAvailabilityReq {
            doctor_id: doctor.id,
            start_time: (start + Duration::hours(2)).to_rfc3339(),
            end_time: start.to_rfc3339(),
        }))
        .await
        .expect_err("reversed window should fail");
    assert_eq!(err.code(), Code::InvalidArgument);
}
