pub mod balance;
pub mod class_teachers;
pub mod demo;
pub mod repair;
pub mod synth;

use async_trait::async_trait;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{
    catalog::{resolve_offerings, Catalog},
    quota_inconsistencies, report, validate, validate_params, ScheduleEnvelope, ScheduleError, ScheduleResult,
    Solver, Timetable, ValidationError,
};
use tracing::{info, info_span};

pub use repair::Repairer;
pub use synth::{Flagged, Synthesizer};

/// Greedy timetable builder: balance teachers, place triples day by day,
/// then swap lessons to close what placement left open.
#[derive(Clone, Debug, Default)]
pub struct GreedySolver;

impl GreedySolver {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self, env: &ScheduleEnvelope) -> Result<ScheduleResult, ScheduleError> {
        let inst = &env.instance;
        let params = &env.params;
        let _span = info_span!("schedule", seed = params.seed).entered();

        validate(inst)?;
        validate_params(params)?;
        let quota_issues = quota_inconsistencies(inst, params.weekly_periods);
        let mut catalog = Catalog::build(inst);
        if let Some(a) = &params.activity {
            if catalog.subject(&a.subject).is_none() {
                return Err(ValidationError::Msg(format!("activity subject {} is unknown", a.subject)).into());
            }
        }
        let plans = resolve_offerings(inst);
        catalog.check_quotas(&plans)?;

        let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
        let (assignments, loads) =
            balance::assign_teachers(&catalog, &plans, &params.tiers, &mut rng)?;
        class_teachers::appoint_class_teachers(&mut catalog, &assignments, &mut rng);
        class_teachers::derive_co_class_teachers(&mut catalog);

        let mut timetable = Timetable::new();
        let fixed = match &params.activity {
            Some(a) => {
                synth::preseed_activity(&catalog, &mut timetable, a);
                a.periods.clone()
            }
            None => Vec::new(),
        };

        let synthesis = Synthesizer::new(&catalog, params.max_attempts).run(&mut timetable, &assignments)?;

        let swaps = if params.repair && !synthesis.paradoxes.is_empty() {
            Repairer::new(&catalog, &fixed).repair(&mut timetable, &synthesis.paradoxes)?
        } else {
            Vec::new()
        };

        let shortfalls = report::shortfalls(&catalog, &assignments, &timetable);
        let missing_after_repair: u32 = shortfalls.iter().map(|s| s.missing).sum();
        let status = if shortfalls.is_empty() { "solved" } else { "shortfall" };
        info!(
            status,
            entries = timetable.len(),
            swaps = swaps.len(),
            missing = missing_after_repair,
            "schedule built"
        );

        let stats = serde_json::json!({
            "seed": params.seed,
            "entries": timetable.len(),
            "paradoxes": synthesis.paradoxes.len(),
            "swaps": swaps.len(),
            "missing_after_synthesis": synthesis.missing_total,
            "missing_after_repair": missing_after_repair,
            "max_teacher_load": loads.max(),
        });

        Ok(ScheduleResult {
            status: status.to_string(),
            classes: catalog.classes().to_vec(),
            assignments,
            entries: timetable.into_entries(),
            shortfalls,
            swaps,
            quota_issues,
            stats,
        })
    }
}

#[async_trait]
impl Solver for GreedySolver {
    async fn solve(&self, env: ScheduleEnvelope) -> anyhow::Result<ScheduleResult> {
        Ok(self.run(&env)?)
    }
}
