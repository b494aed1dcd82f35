use api_shared::pb::{self, appointment_api_server::AppointmentApi};
use api_shared::HealthService;
use hms_core::{AppointmentService, NewAppointment, Reschedule};
use tonic::{Request, Response, Status};

use crate::convert::{
    appointment_to_pb, parse_duration_seconds, parse_optional_instant, parse_range, parse_status,
    parse_uuid,
};
use crate::status::to_status;

#[derive(Clone)]
pub struct AppointmentGrpc {
    appointment_service: AppointmentService,
}

impl AppointmentGrpc {
    pub fn new(appointment_service: AppointmentService) -> Self {
        Self {
            appointment_service,
        }
    }
}

fn appointment_list(appointments: Vec<hms_core::Appointment>) -> pb::AppointmentListRes {
    pb::AppointmentListRes {
        appointments: appointments.into_iter().map(appointment_to_pb).collect(),
    }
}

#[tonic::async_trait]
impl AppointmentApi for AppointmentGrpc {
    async fn health(&self, _req: Request<()>) -> Result<Response<pb::HealthRes>, Status> {
        Ok(Response::new(HealthService::check_health(
            "appointment-service",
        )))
    }

    async fn schedule_appointment(
        &self,
        req: Request<pb::ScheduleAppointmentReq>,
    ) -> Result<Response<pb::Appointment>, Status> {
        let req = req.into_inner();
        let input = NewAppointment {
            patient_id: parse_uuid("patient", &req.patient_id)?,
            doctor_id: parse_uuid("doctor", &req.doctor_id)?,
            appointment_time: parse_optional_instant("appointment_time", &req.appointment_time)?,
            duration: parse_duration_seconds(req.duration_seconds)?,
            reason: req.reason,
            notes: req.notes,
            place: req.place,
        };

        let appointment = self
            .appointment_service
            .schedule_appointment(input)
            .await
            .map_err(to_status)?;
        Ok(Response::new(appointment_to_pb(appointment)))
    }

    async fn get_appointment_details(
        &self,
        req: Request<pb::AppointmentIdReq>,
    ) -> Result<Response<pb::Appointment>, Status> {
        let appointment_id = parse_uuid("appointment", &req.into_inner().appointment_id)?;
        let appointment = self
            .appointment_service
            .get_appointment_details(appointment_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(appointment_to_pb(appointment)))
    }

    async fn update_appointment_status(
        &self,
        req: Request<pb::UpdateAppointmentStatusReq>,
    ) -> Result<Response<pb::Appointment>, Status> {
        let req = req.into_inner();
        let appointment_id = parse_uuid("appointment", &req.appointment_id)?;
        let status = parse_status(req.status)?;

        let appointment = self
            .appointment_service
            .update_appointment_status(appointment_id, status)
            .await
            .map_err(to_status)?;
        Ok(Response::new(appointment_to_pb(appointment)))
    }

    async fn reschedule_appointment(
        &self,
        req: Request<pb::RescheduleAppointmentReq>,
    ) -> Result<Response<pb::Appointment>, Status> {
        let req = req.into_inner();
        let appointment_id = parse_uuid("appointment", &req.appointment_id)?;
        let request = Reschedule {
            new_time: parse_optional_instant("new_time", &req.new_time)?,
            new_duration: req
                .new_duration_seconds
                .map(parse_duration_seconds)
                .transpose()?,
            new_place: Some(req.new_place).filter(|place| !place.trim().is_empty()),
        };

        let appointment = self
            .appointment_service
            .reschedule_appointment(appointment_id, request)
            .await
            .map_err(to_status)?;
        Ok(Response::new(appointment_to_pb(appointment)))
    }

    async fn cancel_appointment(
        &self,
        req: Request<pb::AppointmentIdReq>,
    ) -> Result<Response<()>, Status> {
        let appointment_id = parse_uuid("appointment", &req.into_inner().appointment_id)?;
        self.appointment_service
            .cancel_appointment(appointment_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(()))
    }

    async fn check_doctor_availability(
        &self,
        req: Request<pb::CheckDoctorAvailabilityReq>,
    ) -> Result<Response<pb::CheckDoctorAvailabilityRes>, Status> {
        let req = req.into_inner();
        let doctor_id = parse_uuid("doctor", &req.doctor_id)?;
        let requested = parse_range(&req.start_time, &req.end_time)?;

        let available = self
            .appointment_service
            .check_doctor_availability(doctor_id, requested)
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::CheckDoctorAvailabilityRes { available }))
    }

    async fn get_appointments_for_patient(
        &self,
        req: Request<pb::PatientAppointmentsReq>,
    ) -> Result<Response<pb::AppointmentListRes>, Status> {
        let patient_id = parse_uuid("patient", &req.into_inner().patient_id)?;
        let appointments = self
            .appointment_service
            .get_appointments_for_patient(patient_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(appointment_list(appointments)))
    }

    async fn get_appointments_for_doctor(
        &self,
        req: Request<pb::DoctorAppointmentsReq>,
    ) -> Result<Response<pb::AppointmentListRes>, Status> {
        let req = req.into_inner();
        let doctor_id = parse_uuid("doctor", &req.doctor_id)?;
        let window = parse_range(&req.start_time, &req.end_time)?;

        let appointments = self
            .appointment_service
            .get_appointments_for_doctor(doctor_id, window)
            .await
            .map_err(to_status)?;
        Ok(Response::new(appointment_list(appointments)))
    }
}
