mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod audit;
    pub mod demo;
    pub mod health;
    pub mod jobs;
    pub mod promote;
    pub mod schedule;
    pub mod validate;
}

use axum::{
    routing::{get, post},
    Router,
};

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::schedule::schedule,
            routes::jobs::status,
            routes::jobs::result,
            routes::jobs::grids,
            routes::jobs::rows,
            routes::promote::promote,
            routes::demo::list,
            routes::demo::by_id,
            routes::validate::validate_handler,
            routes::audit::audit_handler,
        ),
        components(schemas(
            types::Instance, types::Subject, types::Teacher, types::Class, types::WeeklyQuota,
            types::OfferedSubject, types::ClassOffering, types::ElectiveChoice,
            types::ScheduleParams, types::ScheduleEnvelope, types::ActivityBlock,
            types::TierPolicy, types::GradeBand, types::TierOverride,
            types::Qualification, types::Role, types::Intensity, types::Day, types::Period,
            types::ClassSubjectAssignment, types::TimetableEntry, types::SwapRecord,
            types::Shortfall, types::QuotaIssue, types::Violation, types::ScheduleResult,
            types::SubjectId, types::TeacherId, types::ClassId,
            jobs::JobId, jobs::JobStatus,
            sched_core::report::WeekGrid, sched_core::report::DayRow, sched_core::report::Audit,
            routes::validate::ValidationReport,
            routes::schedule::JobCreated,
            routes::jobs::GridsOut,
            routes::jobs::RowsOut,
            routes::audit::AuditIn,
            routes::health::Health
        )),
        tags(
            (name = "timetabler", description = "School timetable API")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let cfg = config::ServerConfig::from_env()?;
    let app_state = state::AppState::new_default();

    let app = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/schedule", post(routes::schedule::schedule))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/audit", post(routes::audit::audit_handler))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/jobs/:id/grids", get(routes::jobs::grids))
        .route("/v1/jobs/:id/rows", get(routes::jobs::rows))
        .route("/v1/promote", post(routes::promote::promote))
        .route("/v1/demo-data", get(routes::demo::list))
        .route("/v1/demo-data/:id", get(routes::demo::by_id))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack(cfg.body_limit))
        .with_state(app_state);

    let addr = cfg.addr();
    tracing::info!(%addr, body_limit = cfg.body_limit, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
