use axum::{
    extract::{Path, State},
    Json,
};
use jobs::JobStatus;
use sched_core::{
    record_result,
    report::{class_grids, teacher_grids, WeekGrid},
    MemoryRecorder,
};
use serde::Serialize;
use types::{ClassSubjectAssignment, ScheduleResult, TimetableEntry};
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct GridsOut {
    pub classes: Vec<WeekGrid>,
    pub teachers: Vec<WeekGrid>,
}

/// The rows a finished job hands to downstream reporting.
#[derive(Serialize, ToSchema)]
pub struct RowsOut {
    pub assignments: Vec<ClassSubjectAssignment>,
    pub entries: Vec<TimetableEntry>,
}

fn finished(state: &AppState, id: &str) -> Result<ScheduleResult, ApiError> {
    match state.jobs.get(id) {
        None => Err(ApiError::not_found("job", id)),
        Some(JobStatus::Solved { result }) | Some(JobStatus::Shortfall { result }) => Ok(result),
        Some(JobStatus::Failed { message }) => Err(ApiError::conflict(format!("job {id} failed: {message}"))),
        Some(_) => Err(ApiError::conflict(format!("job {id} is not finished"))),
    }
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Job status", body = JobStatus),
            (status = 404, description = "Unknown job")
        )
    )]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    state
        .jobs
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("job", &id))
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/result",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Schedule result", body = ScheduleResult),
            (status = 404, description = "Unknown job"),
            (status = 409, description = "Job still running or failed")
        )
    )]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleResult>, ApiError> {
    finished(&state, &id).map(Json)
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/grids",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "Weekly grids per class and per teacher", body = GridsOut),
            (status = 404, description = "Unknown job"),
            (status = 409, description = "Job still running or failed")
        )
    )]
pub async fn grids(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GridsOut>, ApiError> {
    let res = finished(&state, &id)?;
    Ok(Json(GridsOut {
        classes: class_grids(&res.entries),
        teachers: teacher_grids(&res.entries),
    }))
}

#[utoipa::path(
        get,
        path = "/v1/jobs/{id}/rows",
        params(("id" = String, Path, description = "Job ID")),
        responses(
            (status = 200, description = "One row per assignment and per timetable entry", body = RowsOut),
            (status = 404, description = "Unknown job"),
            (status = 409, description = "Job still running or failed")
        )
    )]
pub async fn rows(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RowsOut>, ApiError> {
    let res = finished(&state, &id)?;
    let mut rec = MemoryRecorder::default();
    record_result(&res, &mut rec);
    Ok(Json(RowsOut {
        assignments: rec.assignments,
        entries: rec.entries,
    }))
}
