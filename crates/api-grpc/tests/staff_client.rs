//! The remote staff directory against an in-process tonic server.

use std::sync::Arc;

use api_grpc::{grpc_router, ApiKeyInterceptor, GrpcServices, GrpcStaffDirectory};
use chrono::{Duration, TimeZone, Utc};
use hms_core::{db, NewStaff, ServiceError, StaffDirectory, StaffService, TimeRange};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;

const KEY: &str = "test-key";

struct Harness {
    addr: String,
    staff: StaffService,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for Harness {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn start_server() -> Harness {
    let pool = db::connect_in_memory()
        .await
        .expect("connect_in_memory should succeed");
    db::seed_lookups(&pool)
        .await
        .expect("seed_lookups should succeed");
    let staff = StaffService::with_pool(pool.clone());
    let services = GrpcServices::new(pool, Arc::new(staff.clone()));
    let router = grpc_router(services, ApiKeyInterceptor::new(Some(KEY.into())), false)
        .expect("router should build");

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = listener.local_addr().expect("local_addr should succeed");
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = router
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async {
                let _ = rx.await;
            })
            .await;
    });

    Harness {
        addr: format!("http://{addr}"),
        staff,
        shutdown: Some(tx),
    }
}

fn window() -> TimeRange {
    let start = Utc
        .with_ymd_and_hms(2030, 6, 3, 9, 0, 0)
        .single()
        .expect("valid test timestamp");
    TimeRange::new(start, start + Duration::hours(8)).expect("valid test range")
}

#[tokio::test]
async fn test_remote_directory_returns_free_slots() {
    let harness = start_server().await;
    let doctor = harness
        .staff
        .add_staff(NewStaff {
            first_name: "Leonard".into(),
            last_name: "McCoy".into(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1927, 1, 20),
            phone_number: "555-0300".into(),
            role_id: "Doctor".into(),
            status_id: "Active".into(),
            ..Default::default()
        })
        .await
        .expect("add_staff should succeed");

    let directory =
        GrpcStaffDirectory::connect_lazy(harness.addr.clone(), Some(KEY)).expect("valid address");
    let slots = directory
        .doctor_availability(doctor.id, window())
        .await
        .expect("availability should succeed");
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].doctor_id, doctor.id);
    assert_eq!(slots[0].range, window());
}

#[tokio::test]
async fn test_remote_directory_maps_not_found() {
    let harness = start_server().await;
    let directory =
        GrpcStaffDirectory::connect_lazy(harness.addr.clone(), Some(KEY)).expect("valid address");

    let err = directory
        .doctor_availability(uuid::Uuid::new_v4(), window())
        .await
        .expect_err("unknown doctor should fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_remote_directory_without_key_is_unavailable() {
    let harness = start_server().await;
    let directory =
        GrpcStaffDirectory::connect_lazy(harness.addr.clone(), None).expect("valid address");

    let err = directory
        .doctor_availability(uuid::Uuid::new_v4(), window())
        .await
        .expect_err("unauthenticated call should fail");
    assert!(matches!(err, ServiceError::Unavailable(_)));
}
