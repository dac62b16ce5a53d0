use parking_lot::RwLock;
use sched_core::{ScheduleEnvelope, ScheduleResult, Solver};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    /// Every quota met.
    Solved { result: ScheduleResult },
    /// Finished with at least one (class, subject) below quota.
    Shortfall { result: ScheduleResult },
    Failed { message: String },
}

impl JobStatus {
    pub fn result(&self) -> Option<&ScheduleResult> {
        match self {
            JobStatus::Solved { result } | JobStatus::Shortfall { result } => Some(result),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    solver: Arc<S>,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self {
            inner: Default::default(),
            solver: Arc::new(solver),
        }
    }

    pub fn enqueue(&self, env: ScheduleEnvelope) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            map.write().insert(id_for_task.clone(), JobStatus::Running);
            // A panicking solver still has to leave the job in a final state.
            let run = tokio::spawn(async move { solver.solve(env).await });
            let status = match run.await {
                Ok(Ok(result)) if result.shortfalls.is_empty() => JobStatus::Solved { result },
                Ok(Ok(result)) => JobStatus::Shortfall { result },
                Ok(Err(e)) => {
                    error!(job = %id_for_task, ?e, "job failed");
                    JobStatus::Failed {
                        message: e.to_string(),
                    }
                }
                Err(e) => {
                    error!(job = %id_for_task, ?e, "solver task aborted");
                    JobStatus::Failed {
                        message: format!("solver aborted: {e}"),
                    }
                }
            };
            info!(job = %id_for_task, done = status.result().is_some(), "job finished");
            map.write().insert(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}
