use axum::{extract::Path, Json};
use solver_greedy::demo::{self, DemoData};
use types::ScheduleEnvelope;

use crate::error::ApiError;

#[utoipa::path(
        get,
        path = "/v1/demo-data",
        responses((status = 200, description = "Demo school ids", body = [String]))
    )]
pub async fn list() -> Json<Vec<&'static str>> {
    Json(demo::list_demo_data())
}

/// A ready-to-post schedule request for one of the demo schools.
#[utoipa::path(
        get,
        path = "/v1/demo-data/{id}",
        params(("id" = String, Path, description = "SMALL or LARGE")),
        responses(
            (status = 200, description = "Demo schedule request", body = ScheduleEnvelope),
            (status = 404, description = "Unknown demo school")
        )
    )]
pub async fn by_id(Path(id): Path<String>) -> Result<Json<ScheduleEnvelope>, ApiError> {
    let demo: DemoData = id.parse().map_err(|_| ApiError::not_found("demo school", &id))?;
    Ok(Json(demo::envelope(demo, 0)))
}
