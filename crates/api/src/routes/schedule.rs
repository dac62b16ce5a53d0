use crate::state::AppState;
use axum::{extract::State, Json};
use types::ScheduleEnvelope;
use utoipa::ToSchema;

#[derive(serde::Serialize, ToSchema)]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

#[utoipa::path(
        post,
        path = "/v1/schedule",
        request_body = ScheduleEnvelope,
        responses((status = 200, description = "Job enqueued", body = JobCreated))
    )]
pub async fn schedule(
    State(state): State<AppState>,
    Json(env): Json<ScheduleEnvelope>,
) -> Json<JobCreated> {
    let id = state.jobs.enqueue(env);
    tracing::info!(job = %id.0, "schedule job queued");
    Json(JobCreated {
        job_id: id.0,
        status: "queued",
    })
}
