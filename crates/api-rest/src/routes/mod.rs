//! HTTP routes and their handlers.

pub mod appointments;
pub mod patients;
pub mod staff;

use axum::extract::State;
use axum::response::Json;
use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{pb, HealthService};

use crate::docs::ApiDoc;
use crate::AppState;

/// Paging parameters shared by the list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(default)]
pub struct PageQuery {
    /// Maximum number of items (0 uses the server default).
    pub limit: u32,
    pub offset: u32,
}

/// Builds the gateway router with every route, Swagger UI and CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/v1/patients",
            get(patients::list_patients).post(patients::register_patient),
        )
        .route(
            "/v1/patients/:id",
            get(patients::get_patient_details).put(patients::update_patient_details),
        )
        .route(
            "/v1/patients/:id/medical-records",
            get(patients::get_patient_medical_history).post(patients::add_medical_record),
        )
        .route(
            "/v1/patients/:id/appointments",
            get(appointments::get_appointments_for_patient),
        )
        .route("/v1/staff", get(staff::list_staff).post(staff::add_staff))
        .route(
            "/v1/staff/:id",
            get(staff::get_staff_details).put(staff::update_staff_details),
        )
        .route("/v1/staff/:id/schedule", put(staff::update_staff_schedule))
        .route("/v1/staff/:id/status", put(staff::set_staff_availability))
        .route("/v1/staff/:id/tasks", post(staff::assign_task))
        .route("/v1/staff/:id/workload", get(staff::track_workload))
        .route("/v1/tasks", get(staff::list_tasks))
        .route("/v1/doctors/availability", get(staff::get_doctor_availability))
        .route(
            "/v1/doctors/:id/appointments",
            get(appointments::get_appointments_for_doctor),
        )
        .route(
            "/v1/staff-roles",
            get(staff::list_staff_roles).post(staff::add_staff_role),
        )
        .route(
            "/v1/staff-statuses",
            get(staff::list_staff_statuses).post(staff::add_staff_status),
        )
        .route(
            "/v1/task-statuses",
            get(staff::list_task_statuses).post(staff::add_task_status),
        )
        .route("/v1/appointments", post(appointments::schedule_appointment))
        .route(
            "/v1/appointments/:id",
            get(appointments::get_appointment_details),
        )
        .route(
            "/v1/appointments/:id/status",
            put(appointments::update_appointment_status),
        )
        .route(
            "/v1/appointments/:id/reschedule",
            put(appointments::reschedule_appointment),
        )
        .route(
            "/v1/appointments/:id/cancel",
            post(appointments::cancel_appointment),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
/// Health check endpoint for the gateway itself; backends are not contacted.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<pb::HealthRes> {
    Json(HealthService::check_health("rest-gateway"))
}
