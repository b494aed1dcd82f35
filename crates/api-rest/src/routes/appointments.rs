use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use serde::Deserialize;
use utoipa::IntoParams;

use api_shared::pb;

use crate::error::{ApiResult, ErrorBody};
use crate::state::forward;
use crate::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct WindowQuery {
    /// RFC 3339, inclusive.
    pub start_time: String,
    /// RFC 3339, exclusive.
    pub end_time: String,
}

#[utoipa::path(
    post,
    path = "/v1/appointments",
    tag = "appointments",
    request_body = pb::ScheduleAppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = pb::Appointment),
        (status = 400, description = "Missing or malformed fields", body = ErrorBody),
        (status = 409, description = "Doctor is not available", body = ErrorBody),
        (status = 503, description = "Staff service unreachable", body = ErrorBody)
    )
)]
/// Book an appointment after checking the doctor's availability.
#[axum::debug_handler]
pub async fn schedule_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<pb::ScheduleAppointmentReq>,
) -> ApiResult<(StatusCode, Json<pb::Appointment>)> {
    let appointment = state
        .appointments
        .clone()
        .schedule_appointment(forward(&headers, body))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(appointment)))
}

#[utoipa::path(
    get,
    path = "/v1/appointments/{id}",
    tag = "appointments",
    params(("id" = String, Path, description = "Appointment UUID")),
    responses(
        (status = 200, description = "The appointment", body = pb::Appointment),
        (status = 404, description = "Appointment not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_appointment_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<pb::Appointment>> {
    let req = pb::AppointmentIdReq { appointment_id: id };
    let res = state
        .appointments
        .clone()
        .get_appointment_details(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    put,
    path = "/v1/appointments/{id}/status",
    tag = "appointments",
    params(("id" = String, Path, description = "Appointment UUID")),
    request_body = pb::UpdateAppointmentStatusReq,
    responses(
        (status = 200, description = "Appointment with its new status", body = pb::Appointment),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 409, description = "Transition not allowed", body = ErrorBody)
    )
)]
/// Change an appointment's status. `status` is the integer value of `AppointmentStatus`.
#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::UpdateAppointmentStatusReq>,
) -> ApiResult<Json<pb::Appointment>> {
    let req = pb::UpdateAppointmentStatusReq {
        appointment_id: id,
        ..body
    };
    let res = state
        .appointments
        .clone()
        .update_appointment_status(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    put,
    path = "/v1/appointments/{id}/reschedule",
    tag = "appointments",
    params(("id" = String, Path, description = "Appointment UUID")),
    request_body = pb::RescheduleAppointmentReq,
    responses(
        (status = 200, description = "Moved appointment", body = pb::Appointment),
        (status = 400, description = "Missing or past time", body = ErrorBody),
        (status = 409, description = "Doctor not available or appointment closed", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::RescheduleAppointmentReq>,
) -> ApiResult<Json<pb::Appointment>> {
    let req = pb::RescheduleAppointmentReq {
        appointment_id: id,
        ..body
    };
    let res = state
        .appointments
        .clone()
        .reschedule_appointment(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    post,
    path = "/v1/appointments/{id}/cancel",
    tag = "appointments",
    params(("id" = String, Path, description = "Appointment UUID")),
    responses(
        (status = 204, description = "Appointment cancelled"),
        (status = 404, description = "Appointment not found", body = ErrorBody),
        (status = 409, description = "Appointment already closed", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let req = pb::AppointmentIdReq { appointment_id: id };
    state
        .appointments
        .clone()
        .cancel_appointment(forward(&headers, req))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/v1/patients/{id}/appointments",
    tag = "appointments",
    params(("id" = String, Path, description = "Patient UUID")),
    responses(
        (status = 200, description = "The patient's appointments, newest first", body = pb::AppointmentListRes)
    )
)]
#[axum::debug_handler]
pub async fn get_appointments_for_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<pb::AppointmentListRes>> {
    let req = pb::PatientAppointmentsReq { patient_id: id };
    let res = state
        .appointments
        .clone()
        .get_appointments_for_patient(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    get,
    path = "/v1/doctors/{id}/appointments",
    tag = "appointments",
    params(("id" = String, Path, description = "Doctor UUID"), WindowQuery),
    responses(
        (status = 200, description = "Appointments starting inside the window, oldest first", body = pb::AppointmentListRes),
        (status = 400, description = "Malformed window", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_appointments_for_doctor(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(window): Query<WindowQuery>,
) -> ApiResult<Json<pb::AppointmentListRes>> {
    let req = pb::DoctorAppointmentsReq {
        doctor_id: id,
        start_time: window.start_time,
        end_time: window.end_time,
    };
    let res = state
        .appointments
        .clone()
        .get_appointments_for_doctor(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}
