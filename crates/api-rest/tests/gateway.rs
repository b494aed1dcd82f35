//! Gateway routes against in-process gRPC services.

use std::sync::Arc;

use api_grpc::{grpc_router, ApiKeyInterceptor, GrpcServices};
use api_rest::{router, AppState, RestConfig};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use hms_core::{db, StaffService};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tower::ServiceExt;

const KEY: &str = "gateway-key";

struct Gateway {
    app: Router,
    _shutdown: oneshot::Sender<()>,
}

async fn gateway() -> Gateway {
    let pool = db::connect_in_memory()
        .await
        .expect("connect_in_memory should succeed");
    db::seed_lookups(&pool)
        .await
        .expect("seed_lookups should succeed");
    let directory = Arc::new(StaffService::with_pool(pool.clone()));
    let grpc = grpc_router(
        GrpcServices::new(pool, directory),
        ApiKeyInterceptor::new(Some(KEY.into())),
        false,
    )
    .expect("router should build");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = format!("http://{}", listener.local_addr().expect("local_addr"));
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = grpc
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                let _ = rx.await;
            })
            .await;
    });

    let cfg = RestConfig {
        addr: "127.0.0.1:0".parse().expect("valid socket address"),
        patient_service_addr: addr.clone(),
        staff_service_addr: addr.clone(),
        appointment_service_addr: addr,
    };
    Gateway {
        app: router(AppState::connect_lazy(&cfg).expect("clients should build")),
        _shutdown: tx,
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", KEY)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => builder.body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body should be JSON")
    };
    (status, value)
}

fn patient_body(phone: &str) -> Value {
    json!({
        "first_name": "Mary",
        "last_name": "Seacole",
        "date_of_birth": "1805-11-23",
        "phone_number": phone,
    })
}

#[tokio::test]
async fn health_is_served_locally() {
    let gw = gateway().await;
    let (status, body) = send(&gw.app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn register_then_fetch_patient() {
    let gw = gateway().await;
    let (status, created) = send(&gw.app, "POST", "/v1/patients", Some(patient_body("555-7000"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("id should be a string").to_owned();

    let (status, fetched) = send(&gw.app, "GET", &format!("/v1/patients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["last_name"], json!("Seacole"));

    let (status, list) = send(&gw.app, "GET", "/v1/patients?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], json!(1));
}

#[tokio::test]
async fn backend_errors_become_http_errors() {
    let gw = gateway().await;
    let (status, body) = send(&gw.app, "GET", "/v1/patients/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_ARGUMENT"));

    send(&gw.app, "POST", "/v1/patients", Some(patient_body("555-7001"))).await;
    let (status, body) = send(&gw.app, "POST", "/v1/patients", Some(patient_body("555-7001"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], json!("ALREADY_EXISTS"));

    let missing = format!("/v1/appointments/{}", uuid_like());
    let (status, _) = send(&gw.app, "GET", &missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let gw = gateway().await;
    let request = Request::builder()
        .uri("/v1/staff-roles")
        .body(Body::empty())
        .expect("request should build");
    let response = gw
        .app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staff_schedule_and_workload() {
    let gw = gateway().await;
    let (status, staff) = send(
        &gw.app,
        "POST",
        "/v1/staff",
        Some(json!({
            "first_name": "Florence",
            "last_name": "Nightingale",
            "date_of_birth": "1820-05-12",
            "phone_number": "555-7100",
            "role_id": "Nurse",
            "status_id": "Active",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = staff["id"].as_str().expect("id should be a string").to_owned();

    let (status, _) = send(
        &gw.app,
        "PUT",
        &format!("/v1/staff/{id}/schedule"),
        Some(json!({
            "tasks": [{
                "title": "Ward round",
                "priority": 2,
                "start_time": "2030-06-03T08:00:00Z",
                "end_time": "2030-06-03T09:00:00Z",
                "status_id": "Pending",
            }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, workload) = send(&gw.app, "GET", &format!("/v1/staff/{id}/workload"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(workload["tasks"][0]["title"], json!("Ward round"));

    let (status, _) = send(
        &gw.app,
        "PUT",
        &format!("/v1/staff/{id}/status"),
        Some(json!({ "status_id": "OnLeave" })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn book_and_cancel_appointment() {
    let gw = gateway().await;
    let (_, patient) = send(&gw.app, "POST", "/v1/patients", Some(patient_body("555-7200"))).await;
    let (_, doctor) = send(
        &gw.app,
        "POST",
        "/v1/staff",
        Some(json!({
            "first_name": "Elizabeth",
            "last_name": "Blackwell",
            "date_of_birth": "1821-02-03",
            "phone_number": "555-7201",
            "role_id": "Doctor",
            "status_id": "Active",
        })),
    )
    .await;
    let start = (chrono::Utc::now() + chrono::Duration::days(2)).to_rfc3339();

    let (status, appointment) = send(
        &gw.app,
        "POST",
        "/v1/appointments",
        Some(json!({
            "patient_id": patient["id"],
            "doctor_id": doctor["id"],
            "appointment_time": start,
            "duration_seconds": 1200,
            "reason": "Consultation",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = appointment["id"].as_str().expect("id should be a string").to_owned();

    let (status, _) = send(&gw.app, "POST", &format!("/v1/appointments/{id}/cancel"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, fetched) = send(&gw.app, "GET", &format!("/v1/appointments/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], json!(3));
}

fn uuid_like() -> &'static str {
    "6f1c9a52-8f7e-4a63-9d0b-2b6c1e0f4a11"
}
