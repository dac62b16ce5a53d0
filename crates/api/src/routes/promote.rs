use axum::Json;
use sched_core::catalog::promote_class_teachers;
use types::Class;

/// Year rollover: last year's classes mapped to the ids they carry this year,
/// keeping their class and co-class teachers.
#[utoipa::path(
        post,
        path = "/v1/promote",
        request_body = [Class],
        responses((status = 200, description = "Classes with promoted ids", body = [Class]))
    )]
pub async fn promote(Json(previous): Json<Vec<Class>>) -> Json<Vec<Class>> {
    let promoted = promote_class_teachers(&previous);
    tracing::info!(classes = previous.len(), promoted = promoted.len(), "class teachers promoted");
    Json(promoted)
}
