//! OpenAPI document served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use api_shared::pb;

use crate::error::ErrorBody;
use crate::routes::{self, appointments, patients, staff};

#[derive(OpenApi)]
#[openapi(
    info(title = "Hospital Management REST gateway"),
    paths(
        routes::health,
        patients::register_patient,
        patients::list_patients,
        patients::get_patient_details,
        patients::update_patient_details,
        patients::add_medical_record,
        patients::get_patient_medical_history,
        staff::add_staff,
        staff::list_staff,
        staff::get_staff_details,
        staff::update_staff_details,
        staff::update_staff_schedule,
        staff::set_staff_availability,
        staff::assign_task,
        staff::track_workload,
        staff::list_tasks,
        staff::get_doctor_availability,
        staff::add_staff_role,
        staff::list_staff_roles,
        staff::add_staff_status,
        staff::list_staff_statuses,
        staff::add_task_status,
        staff::list_task_statuses,
        appointments::schedule_appointment,
        appointments::get_appointment_details,
        appointments::update_appointment_status,
        appointments::reschedule_appointment,
        appointments::cancel_appointment,
        appointments::get_appointments_for_patient,
        appointments::get_appointments_for_doctor,
    ),
    components(schemas(
        ErrorBody,
        pb::HealthRes,
        pb::Patient,
        pb::MedicalRecord,
        pb::RegisterPatientReq,
        pb::UpdatePatientDetailsReq,
        pb::AddMedicalRecordReq,
        pb::MedicalHistoryRes,
        pb::ListPatientsRes,
        pb::LookupEntry,
        pb::LookupList,
        pb::Staff,
        pb::Task,
        pb::TaskInput,
        pb::AddStaffReq,
        pb::UpdateStaffDetailsReq,
        pb::UpdateStaffScheduleReq,
        pb::SetStaffAvailabilityReq,
        pb::TimeSlot,
        pb::DoctorAvailabilityRes,
        pb::WorkloadRes,
        pb::ListStaffRes,
        pb::ListTasksRes,
        pb::AppointmentStatus,
        pb::Appointment,
        pb::ScheduleAppointmentReq,
        pb::UpdateAppointmentStatusReq,
        pb::RescheduleAppointmentReq,
        pb::AppointmentListRes,
    )),
    tags(
        (name = "patients", description = "Patient registration and medical history"),
        (name = "staff", description = "Staff, schedules and doctor availability"),
        (name = "lookups", description = "Staff roles, staff statuses and task statuses"),
        (name = "appointments", description = "Appointment booking")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_gateway_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/v1/patients/{id}"));
        assert!(doc.paths.paths.contains_key("/v1/doctors/availability"));
        assert!(doc.paths.paths.contains_key("/v1/appointments/{id}/reschedule"));
    }
}
