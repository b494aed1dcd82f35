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
pub struct StaffQuery {
    /// Only staff with this role.
    pub role: String,
    /// Only staff with this status.
    pub status: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct TaskQuery {
    /// Only tasks with this status.
    pub status: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct AvailabilityQuery {
    /// A single doctor; omitted means every active doctor.
    pub doctor_id: String,
    /// RFC 3339 window start.
    pub start_time: String,
    /// RFC 3339 window end.
    pub end_time: String,
}

#[utoipa::path(
    post,
    path = "/v1/staff",
    tag = "staff",
    request_body = pb::AddStaffReq,
    responses(
        (status = 201, description = "Staff member added", body = pb::Staff),
        (status = 400, description = "Missing fields or unknown role/status", body = ErrorBody),
        (status = 409, description = "Phone number already in use", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn add_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<pb::AddStaffReq>,
) -> ApiResult<(StatusCode, Json<pb::Staff>)> {
    let staff = state
        .staff
        .clone()
        .add_staff(forward(&headers, body))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(staff)))
}

#[utoipa::path(
    get,
    path = "/v1/staff",
    tag = "staff",
    params(StaffQuery),
    responses(
        (status = 200, description = "A page of staff members", body = pb::ListStaffRes)
    )
)]
#[axum::debug_handler]
pub async fn list_staff(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StaffQuery>,
) -> ApiResult<Json<pb::ListStaffRes>> {
    let req = pb::ListStaffReq {
        role_id: query.role,
        status_id: query.status,
        limit: query.limit,
        offset: query.offset,
    };
    let res = state.staff.clone().list_staff(forward(&headers, req)).await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    get,
    path = "/v1/staff/{id}",
    tag = "staff",
    params(("id" = String, Path, description = "Staff UUID")),
    responses(
        (status = 200, description = "Staff member with schedule", body = pb::Staff),
        (status = 404, description = "Staff member not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_staff_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<pb::Staff>> {
    let req = pb::StaffIdReq { staff_id: id };
    let res = state
        .staff
        .clone()
        .get_staff_details(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    put,
    path = "/v1/staff/{id}",
    tag = "staff",
    params(("id" = String, Path, description = "Staff UUID")),
    request_body = pb::UpdateStaffDetailsReq,
    responses(
        (status = 200, description = "Updated staff member", body = pb::Staff),
        (status = 404, description = "Staff member not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn update_staff_details(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::UpdateStaffDetailsReq>,
) -> ApiResult<Json<pb::Staff>> {
    let req = pb::UpdateStaffDetailsReq {
        staff_id: id,
        ..body
    };
    let res = state
        .staff
        .clone()
        .update_staff_details(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    put,
    path = "/v1/staff/{id}/schedule",
    tag = "staff",
    params(("id" = String, Path, description = "Staff UUID")),
    request_body = pb::UpdateStaffScheduleReq,
    responses(
        (status = 204, description = "Tasks added to the schedule"),
        (status = 400, description = "Invalid task", body = ErrorBody),
        (status = 404, description = "Staff member not found", body = ErrorBody)
    )
)]
/// Append tasks to a staff member's schedule.
#[axum::debug_handler]
pub async fn update_staff_schedule(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::UpdateStaffScheduleReq>,
) -> ApiResult<StatusCode> {
    let req = pb::UpdateStaffScheduleReq {
        staff_id: id,
        ..body
    };
    state
        .staff
        .clone()
        .update_staff_schedule(forward(&headers, req))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/v1/staff/{id}/status",
    tag = "staff",
    params(("id" = String, Path, description = "Staff UUID")),
    request_body = pb::SetStaffAvailabilityReq,
    responses(
        (status = 204, description = "Status changed"),
        (status = 400, description = "Unknown status", body = ErrorBody),
        (status = 404, description = "Staff member not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn set_staff_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::SetStaffAvailabilityReq>,
) -> ApiResult<StatusCode> {
    let req = pb::SetStaffAvailabilityReq {
        staff_id: id,
        ..body
    };
    state
        .staff
        .clone()
        .set_staff_availability(forward(&headers, req))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/v1/staff/{id}/tasks",
    tag = "staff",
    params(("id" = String, Path, description = "Staff UUID")),
    request_body = pb::TaskInput,
    responses(
        (status = 201, description = "Task assigned", body = pb::Task),
        (status = 400, description = "Invalid task or unknown staff member", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn assign_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<pb::TaskInput>,
) -> ApiResult<(StatusCode, Json<pb::Task>)> {
    let req = pb::AssignTaskReq {
        staff_id: id,
        task: Some(body),
    };
    let task = state
        .staff
        .clone()
        .assign_task(forward(&headers, req))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get,
    path = "/v1/staff/{id}/workload",
    tag = "staff",
    params(("id" = String, Path, description = "Staff UUID")),
    responses(
        (status = 200, description = "Tasks on the staff member's schedule", body = pb::WorkloadRes),
        (status = 404, description = "Staff member not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn track_workload(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<Json<pb::WorkloadRes>> {
    let req = pb::StaffIdReq { staff_id: id };
    let res = state
        .staff
        .clone()
        .track_workload(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    get,
    path = "/v1/tasks",
    tag = "staff",
    params(TaskQuery),
    responses(
        (status = 200, description = "A page of tasks", body = pb::ListTasksRes)
    )
)]
#[axum::debug_handler]
pub async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Json<pb::ListTasksRes>> {
    let req = pb::ListTasksReq {
        status_id: query.status,
        limit: query.limit,
        offset: query.offset,
    };
    let res = state.staff.clone().list_tasks(forward(&headers, req)).await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    get,
    path = "/v1/doctors/availability",
    tag = "staff",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots inside the window", body = pb::DoctorAvailabilityRes),
        (status = 400, description = "Malformed window", body = ErrorBody),
        (status = 404, description = "Doctor not found", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn get_doctor_availability(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<pb::DoctorAvailabilityRes>> {
    let req = pb::DoctorAvailabilityReq {
        doctor_id: query.doctor_id,
        start_time: query.start_time,
        end_time: query.end_time,
    };
    let res = state
        .staff
        .clone()
        .get_doctor_availability(forward(&headers, req))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    post,
    path = "/v1/staff-roles",
    tag = "lookups",
    request_body = pb::LookupEntry,
    responses(
        (status = 201, description = "Role added", body = pb::LookupEntry),
        (status = 409, description = "Role already exists", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn add_staff_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<pb::LookupEntry>,
) -> ApiResult<(StatusCode, Json<pb::LookupEntry>)> {
    let entry = state
        .staff
        .clone()
        .add_staff_role(forward(&headers, body))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/v1/staff-roles",
    tag = "lookups",
    responses((status = 200, description = "All staff roles", body = pb::LookupList))
)]
#[axum::debug_handler]
pub async fn list_staff_roles(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<pb::LookupList>> {
    let res = state
        .staff
        .clone()
        .list_staff_roles(forward(&headers, ()))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    post,
    path = "/v1/staff-statuses",
    tag = "lookups",
    request_body = pb::LookupEntry,
    responses(
        (status = 201, description = "Status added", body = pb::LookupEntry),
        (status = 409, description = "Status already exists", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn add_staff_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<pb::LookupEntry>,
) -> ApiResult<(StatusCode, Json<pb::LookupEntry>)> {
    let entry = state
        .staff
        .clone()
        .add_staff_status(forward(&headers, body))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/v1/staff-statuses",
    tag = "lookups",
    responses((status = 200, description = "All staff statuses", body = pb::LookupList))
)]
#[axum::debug_handler]
pub async fn list_staff_statuses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<pb::LookupList>> {
    let res = state
        .staff
        .clone()
        .list_staff_statuses(forward(&headers, ()))
        .await?;
    Ok(Json(res.into_inner()))
}

#[utoipa::path(
    post,
    path = "/v1/task-statuses",
    tag = "lookups",
    request_body = pb::LookupEntry,
    responses(
        (status = 201, description = "Task status added", body = pb::LookupEntry),
        (status = 409, description = "Task status already exists", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn add_task_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<pb::LookupEntry>,
) -> ApiResult<(StatusCode, Json<pb::LookupEntry>)> {
    let entry = state
        .staff
        .clone()
        .add_task_status(forward(&headers, body))
        .await?
        .into_inner();
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/v1/task-statuses",
    tag = "lookups",
    responses((status = 200, description = "All task statuses", body = pb::LookupList))
)]
#[axum::debug_handler]
pub async fn list_task_statuses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<pb::LookupList>> {
    let res = state
        .staff
        .clone()
        .list_task_statuses(forward(&headers, ()))
        .await?;
    Ok(Json(res.into_inner()))
}
