//! Staff directory backed by a remote staff service.

use api_shared::auth::API_KEY_HEADER;
use api_shared::pb::{staff_api_client::StaffApiClient, DoctorAvailabilityReq};
use hms_core::{ServiceError, ServiceResult, StaffDirectory, TimeRange, TimeSlot};
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Request};
use uuid::Uuid;

use crate::convert::{format_instant, slot_from_pb};

/// Asks the staff service for doctor availability on behalf of the appointment service.
#[derive(Clone)]
pub struct GrpcStaffDirectory {
    client: StaffApiClient<Channel>,
    api_key: Option<MetadataValue<Ascii>>,
}

impl GrpcStaffDirectory {
    /// Creates a directory that connects on first use.
    ///
    /// `api_key`, when given, is sent as `x-api-key` on every call.
    pub fn connect_lazy(addr: impl Into<String>, api_key: Option<&str>) -> anyhow::Result<Self> {
        let channel = Endpoint::from_shared(addr.into())?.connect_lazy();
        let api_key = api_key
            .map(|key| key.parse::<MetadataValue<Ascii>>())
            .transpose()?;
        Ok(Self::new(StaffApiClient::new(channel), api_key))
    }

    pub fn new(client: StaffApiClient<Channel>, api_key: Option<MetadataValue<Ascii>>) -> Self {
        Self { client, api_key }
    }
}

#[tonic::async_trait]
impl StaffDirectory for GrpcStaffDirectory {
    async fn doctor_availability(
        &self,
        doctor_id: Uuid,
        window: TimeRange,
    ) -> ServiceResult<Vec<TimeSlot>> {
        let mut request = Request::new(DoctorAvailabilityReq {
            doctor_id: doctor_id.to_string(),
            start_time: format_instant(window.start()),
            end_time: format_instant(window.end()),
        });
        if let Some(key) = &self.api_key {
            request.metadata_mut().insert(API_KEY_HEADER, key.clone());
        }

        let response = self
            .client
            .clone()
            .get_doctor_availability(request)
            .await
            .map_err(|status| match status.code() {
                Code::NotFound => ServiceError::NotFound(status.message().to_owned()),
                _ => {
                    tracing::warn!(code = ?status.code(), error = %status.message(), "staff service call failed");
                    ServiceError::Unavailable("staff service is unavailable".into())
                }
            })?;

        let slots = response
            .into_inner()
            .slots
            .iter()
            .filter_map(|slot| match slot_from_pb(slot) {
                Ok(slot) => Some(slot),
                Err(reason) => {
                    tracing::warn!(%doctor_id, %reason, "skipping malformed availability slot");
                    None
                }
            })
            .collect();
        Ok(slots)
    }
}
