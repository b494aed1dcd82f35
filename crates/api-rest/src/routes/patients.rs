use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;

use api_shared::pb;

use super::PageQuery;
use crate::error::{ApiResult, ErrorBody};
use crate::state::forward;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/v1/patients",
    tag = "patients",
    request_body = pb::RegisterPatientReq,
    responses(
        (status = 201, description = "Patient registered", body = pb::Patient),
        (status = 400, description = "Missing or malformed fields", body = ErrorBody),
        (status = 409, description = "Phone number already registered", body = ErrorBody)
    )
)]
/// Register a new patient.
#[axum::debug_handler]
pub async fn register_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<pb::RegisterPatientReq>,
) -> ApiResult<(StatusCode, Json<pb::Patient>)> {
    let patient = state
        .patients
        .clone()
        .register_patient(forward(&headers, body))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/v1/patients",
    tag = "patients",
    params(PageQuery),
    responses(
        (status = 200, description = "A page of patients, newest first", body = pb::ListPatientsRes)
    )
)]
#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<pb::ListPatientsRes>> {
    let req = pb::ListPatientsReq {
        limit: page.limit,
        offset: page.offset,
    };
    let res = state
        .patients
        .clone()
        .list_patients(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    get,
    path = "/v1/patients/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "Patient UUID")),
    responses(
        (status = 200, description = "Patient with medical history", body = pb::Patient),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_patient_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<pb::Patient>> {
    let req = pb::PatientIdReq { patient_id: id };
    let res = state
        .patients
        .clone()
        .get_patient_details(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    put,
    path = "/v1/patients/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "Patient UUID")),
    request_body = pb::UpdatePatientDetailsReq,
    responses(
        (status = 200, description = "Updated patient", body = pb::Patient),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
/// Update a patient's details. Empty fields are left unchanged.
#[axum::debug_handler]
pub async fn update_patient_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::UpdatePatientDetailsReq>,
) -> ApiResult<Json<pb::Patient>> {
    let req = pb::UpdatePatientDetailsReq {
        patient_id: id,
        ..body
    };
    let res = state
        .patients
        .clone()
        .update_patient_details(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    post,
    path = "/v1/patients/{id}/medical-records",
    tag = "patients",
    params(("id" = String, Path, description = "Patient UUID")),
    request_body = pb::AddMedicalRecordReq,
    responses(
        (status = 201, description = "Record added", body = pb::MedicalRecord),
        (status = 400, description = "Missing or malformed fields", body = ErrorBody),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn add_medical_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::AddMedicalRecordReq>,
) -> ApiResult<(StatusCode, Json<pb::MedicalRecord>)> {
    let req = pb::AddMedicalRecordReq {
        patient_id: id,
        ..body
    };
    let record = state
        .patients
        .clone()
        .add_medical_record(forward(&headers, req))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    get,
    path = "/v1/patients/{id}/medical-records",
    tag = "patients",
    params(("id" = String, Path, description = "Patient UUID")),
    responses(
        (status = 200, description = "Medical history, oldest first", body = pb::MedicalHistoryRes),
        (status = 404, description = "Patient not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_patient_medical_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<pb::MedicalHistoryRes>> {
    let req = pb::PatientIdReq { patient_id: id };
    let res = state
        .patients
        .clone()
        .get_patient_medical_history(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}
