use jobs::InMemJobs;
use solver_greedy::GreedySolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<GreedySolver>>,
}

impl AppState {
    pub fn new_default() -> Self {
        Self {
            jobs: Arc::new(InMemJobs::new(GreedySolver::new())),
        }
    }
}
