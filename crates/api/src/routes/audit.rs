use axum::Json;
use sched_core::{
    report::{audit, Audit},
    validate, Catalog,
};
use serde::Deserialize;
use types::{ClassSubjectAssignment, Instance, TimetableEntry};
use utoipa::ToSchema;

use crate::error::ApiError;

#[derive(Deserialize, ToSchema)]
pub struct AuditIn {
    pub instance: Instance,
    pub assignments: Vec<ClassSubjectAssignment>,
    pub entries: Vec<TimetableEntry>,
}

#[utoipa::path(
    post,
    path = "/v1/audit",
    request_body = AuditIn,
    responses(
        (status = 200, description = "Double bookings and quota shortfalls of a supplied timetable", body = Audit),
        (status = 400, description = "Instance is invalid")
    )
)]
pub async fn audit_handler(Json(input): Json<AuditIn>) -> Result<Json<Audit>, ApiError> {
    validate(&input.instance).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let catalog = Catalog::build(&input.instance);
    Ok(Json(audit(&catalog, &input.assignments, &input.entries)))
}
