use api_shared::pb::{self, staff_api_server::StaffApi};
use api_shared::HealthService;
use hms_core::{
    ListOptions, LookupKind, NewStaff, NewTask, StaffFilter, StaffService, StaffUpdate,
};
use tonic::{Request, Response, Status};

use crate::convert::{
    lookup_to_pb, parse_optional_date, parse_optional_instant, parse_optional_uuid, parse_range,
    parse_uuid, slot_to_pb, staff_to_pb, task_to_pb,
};
use crate::status::to_status;

#[derive(Clone)]
pub struct StaffGrpc {
    staff_service: StaffService,
}

impl StaffGrpc {
    pub fn new(staff_service: StaffService) -> Self {
        Self { staff_service }
    }

    async fn add_lookup(
        &self,
        kind: LookupKind,
        req: Request<pb::LookupEntry>,
    ) -> Result<Response<pb::LookupEntry>, Status> {
        let req = req.into_inner();
        let entry = self
            .staff_service
            .add_lookup(kind, &req.name, &req.description)
            .await
            .map_err(to_status)?;
        Ok(Response::new(lookup_to_pb(entry)))
    }

    async fn list_lookups(&self, kind: LookupKind) -> Result<Response<pb::LookupList>, Status> {
        let entries = self
            .staff_service
            .list_lookups(kind)
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::LookupList {
            entries: entries.into_iter().map(lookup_to_pb).collect(),
        }))
    }
}

#[allow(clippy::result_large_err)]
fn task_from_pb(task: pb::TaskInput) -> Result<NewTask, Status> {
    Ok(NewTask {
        start_time: parse_optional_instant("start_time", &task.start_time)?,
        end_time: parse_optional_instant("end_time", &task.end_time)?,
        title: task.title,
        description: task.description,
        priority: task.priority,
        status_id: task.status_id,
    })
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[tonic::async_trait]
impl StaffApi for StaffGrpc {
    async fn health(&self, _req: Request<()>) -> Result<Response<pb::HealthRes>, Status> {
        Ok(Response::new(HealthService::check_health("staff-service")))
    }

    async fn add_staff(&self, req: Request<pb::AddStaffReq>) -> Result<Response<pb::Staff>, Status> {
        let req = req.into_inner();
        let input = NewStaff {
            date_of_birth: parse_optional_date("date_of_birth", &req.date_of_birth)?,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            address: req.address,
            role_id: req.role_id,
            status_id: req.status_id,
            specialization: req.specialization,
            nurse_type: req.nurse_type,
        };

        let staff = self
            .staff_service
            .add_staff(input)
            .await
            .map_err(to_status)?;
        Ok(Response::new(staff_to_pb(staff)))
    }

    async fn get_staff_details(
        &self,
        req: Request<pb::StaffIdReq>,
    ) -> Result<Response<pb::Staff>, Status> {
        let staff_id = parse_uuid("staff", &req.into_inner().staff_id)?;
        let staff = self
            .staff_service
            .get_staff_details(staff_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(staff_to_pb(staff)))
    }

    async fn update_staff_details(
        &self,
        req: Request<pb::UpdateStaffDetailsReq>,
    ) -> Result<Response<pb::Staff>, Status> {
        let req = req.into_inner();
        let staff_id = parse_uuid("staff", &req.staff_id)?;
        let update = StaffUpdate {
            date_of_birth: parse_optional_date("date_of_birth", &req.date_of_birth)?,
            first_name: req.first_name,
            last_name: req.last_name,
            phone_number: req.phone_number,
            address: req.address,
            specialization: req.specialization,
            nurse_type: req.nurse_type,
        };

        let staff = self
            .staff_service
            .update_staff_details(staff_id, update)
            .await
            .map_err(to_status)?;
        Ok(Response::new(staff_to_pb(staff)))
    }

    async fn update_staff_schedule(
        &self,
        req: Request<pb::UpdateStaffScheduleReq>,
    ) -> Result<Response<()>, Status> {
        let req = req.into_inner();
        let staff_id = parse_uuid("staff", &req.staff_id)?;
        let tasks = req
            .tasks
            .into_iter()
            .map(task_from_pb)
            .collect::<Result<Vec<_>, _>>()?;

        self.staff_service
            .update_staff_schedule(staff_id, tasks)
            .await
            .map_err(to_status)?;
        Ok(Response::new(()))
    }

    async fn set_staff_availability(
        &self,
        req: Request<pb::SetStaffAvailabilityReq>,
    ) -> Result<Response<()>, Status> {
        let req = req.into_inner();
        let staff_id = parse_uuid("staff", &req.staff_id)?;
        self.staff_service
            .set_staff_availability(staff_id, &req.status_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(()))
    }

    async fn get_doctor_availability(
        &self,
        req: Request<pb::DoctorAvailabilityReq>,
    ) -> Result<Response<pb::DoctorAvailabilityRes>, Status> {
        let req = req.into_inner();
        let doctor_id = parse_optional_uuid("doctor", &req.doctor_id)?;
        let window = parse_range(&req.start_time, &req.end_time)?;

        let slots = self
            .staff_service
            .get_doctor_availability(doctor_id, window)
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::DoctorAvailabilityRes {
            slots: slots.into_iter().map(slot_to_pb).collect(),
        }))
    }

    async fn assign_task(&self, req: Request<pb::AssignTaskReq>) -> Result<Response<pb::Task>, Status> {
        let req = req.into_inner();
        let staff_id = parse_uuid("staff", &req.staff_id)?;
        let task = req
            .task
            .ok_or_else(|| Status::invalid_argument("task is required"))?;

        let task = self
            .staff_service
            .assign_task(staff_id, task_from_pb(task)?)
            .await
            .map_err(to_status)?;
        Ok(Response::new(task_to_pb(task)))
    }

    async fn track_workload(
        &self,
        req: Request<pb::StaffIdReq>,
    ) -> Result<Response<pb::WorkloadRes>, Status> {
        let staff_id = parse_uuid("staff", &req.into_inner().staff_id)?;
        let tasks = self
            .staff_service
            .track_workload(staff_id)
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::WorkloadRes {
            tasks: tasks.into_iter().map(task_to_pb).collect(),
        }))
    }

    async fn list_staff(
        &self,
        req: Request<pb::ListStaffReq>,
    ) -> Result<Response<pb::ListStaffRes>, Status> {
        let req = req.into_inner();
        let filter = StaffFilter {
            role_id: non_empty(req.role_id),
            status_id: non_empty(req.status_id),
        };

        let page = self
            .staff_service
            .list_staff(filter, ListOptions::new(req.limit, req.offset))
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::ListStaffRes {
            staff: page.items.into_iter().map(staff_to_pb).collect(),
            total: page.total,
        }))
    }

    async fn list_tasks(
        &self,
        req: Request<pb::ListTasksReq>,
    ) -> Result<Response<pb::ListTasksRes>, Status> {
        let req = req.into_inner();
        let page = self
            .staff_service
            .list_tasks(non_empty(req.status_id), ListOptions::new(req.limit, req.offset))
            .await
            .map_err(to_status)?;
        Ok(Response::new(pb::ListTasksRes {
            tasks: page.items.into_iter().map(task_to_pb).collect(),
            total: page.total,
        }))
    }

    async fn add_staff_role(
        &self,
        req: Request<pb::LookupEntry>,
    ) -> Result<Response<pb::LookupEntry>, Status> {
        self.add_lookup(LookupKind::StaffRole, req).await
    }

    async fn list_staff_roles(&self, _req: Request<()>) -> Result<Response<pb::LookupList>, Status> {
        self.list_lookups(LookupKind::StaffRole).await
    }

    async fn add_staff_status(
        &self,
        req: Request<pb::LookupEntry>,
    ) -> Result<Response<pb::LookupEntry>, Status> {
        self.add_lookup(LookupKind::StaffStatus, req).await
    }

    async fn list_staff_statuses(
        &self,
        _req: Request<()>,
    ) -> Result<Response<pb::LookupList>, Status> {
        self.list_lookups(LookupKind::StaffStatus).await
    }

    async fn add_task_status(
        &self,
        req: Request<pb::LookupEntry>,
    ) -> Result<Response<pb::LookupEntry>, Status> {
        self.add_lookup(LookupKind::TaskStatus, req).await
    }

    async fn list_task_statuses(
        &self,
        _req: Request<()>,
    ) -> Result<Response<pb::LookupList>, Status> {
        self.list_lookups(LookupKind::TaskStatus).await
    }
}
