use api_shared::pb::{self, patient_api_server::PatientApi};
use api_shared::HealthService;
use hms_core::{ListOptions, NewMedicalRecord, NewPatient, PatientService, PatientUpdate};
use tonic::{Request, Response, Status};

use crate::convert::{
    medical_record_to_pb, parse_optional_date, parse_optional_instant, parse_uuid, patient_to_pb,
};
use crate::status::to_status;

#[derive(Clone)]
pub struct PatientGrpc {
    patient_service: PatientService,
}

impl PatientGrpc {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

#[tonic::async_trait]
impl PatientApi for PatientGrpc {
    async fn health(&self, _req: Request<()>) -> Result<Response<pb::HealthRes>, Status> {
        Ok(Response::new(HealthService::check_health("patient-service")))
    }

    async fn register_patient(
        &self,
        req: Request<pb::RegisterPatientReq>,
    ) -> Result<Response<pb::Patient>, Status> {
        let req = req.into_inner();
        let input = NewPatient {
            date_of_birth: parse_optional_date("date_of_birth", &req.date_of_birth)?,
            first_name: req.first_name,
            last_name: req.last_name,
            gender: req.gender,
            phone_number: req.phone_number,
            address: req.address,
        };

        let patient = self
            .patient_service
            .register_patient(input)
            .await
            .map_err(to_status)?;
        Ok(Response::new(patient_to_pb(patient)))
    }

    async fn get_patient_details(
        &self,
        req: Request<pb::PatientIdReq>,
    ) -> Result<Response<pb::Patient>, Status> {
        let patient_id = parse_uuid("patient", &req.into_inner().patient_id)?;
        let patient = self
            .patient_service
            .get_patient_details(patient_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(patient_to_pb(patient)))
    }

    async fn update_patient_details(
        &self,
        req: Request<pb::UpdatePatientDetailsReq>,
    ) -> Result<Response<pb::Patient>, Status> {
        let req = req.into_inner();
        let patient_id = parse_uuid("patient", &req.patient_id)?;
        let update = PatientUpdate {
            date_of_birth: parse_optional_date("date_of_birth", &req.date_of_birth)?,
            first_name: req.first_name,
            last_name: req.last_name,
            gender: req.gender,
            phone_number: req.phone_number,
            address: req.address,
        };

        let patient = self
            .patient_service
            .update_patient_details(patient_id, update)
            .await
            .map_err(to_status)?;
        Ok(Response::new(patient_to_pb(patient)))
    }

    async fn add_medical_record(
        &self,
        req: Request<pb::AddMedicalRecordReq>,
    ) -> Result<Response<pb::MedicalRecord>, Status> {
        let req = req.into_inner();
        let patient_id = parse_uuid("patient", &req.patient_id)?;
        let input = NewMedicalRecord {
            date: parse_optional_instant("date", &req.date)?,
            staff_id: req.staff_id,
            diagnosis: req.diagnosis,
            treatment: req.treatment,
            notes: req.notes,
        };

        let record = self
            .patient_service
            .add_medical_record(patient_id, input)
            .await
            .map_err(to_status)?;
        Ok(Response::new(medical_record_to_pb(record)))
    }

    async fn get_patient_medical_history(
        &self,
        req: Request<pb::PatientIdReq>,
    ) -> Result<Response<pb::MedicalHistoryRes>, Status> {
        let patient_id = parse_uuid("patient", &req.into_inner().patient_id)?;
        let records = self
            .patient_service
            .get_patient_medical_history(patient_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::MedicalHistoryRes {
            records: records.into_iter().map(medical_record_to_pb).collect(),
        }))
    }

    async fn list_patients(
        &self,
        req: Request<pb::ListPatientsReq>,
    ) -> Result<Response<pb::ListPatientsRes>, Status> {
        let req = req.into_inner();
        let page = self
            .patient_service
            .list_patients(ListOptions::new(req.limit, req.offset))
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::ListPatientsRes {
            patients: page.items.into_iter().map(patient_to_pb).collect(),
            total: page.total,
        }))
    }
}
