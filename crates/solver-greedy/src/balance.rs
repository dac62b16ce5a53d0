//! Teacher load balancing: one teacher per (class, subject), picked among
//! the least loaded eligible teachers.

use rand::{seq::SliceRandom, Rng};
use sched_core::{Catalog, ClassPlan, ScheduleError};
use std::collections::HashMap;
use tracing::{debug, error, info};
use types::{ClassSubjectAssignment, Teacher, TeacherId, TierPolicy};

/// Periods-of-responsibility handed out so far in this run, per teacher.
#[derive(Clone, Debug, Default)]
pub struct LoadTable {
    loads: HashMap<TeacherId, u32>,
}

impl LoadTable {
    pub fn load(&self, teacher: &TeacherId) -> u32 {
        self.loads.get(teacher).copied().unwrap_or(0)
    }

    fn bump(&mut self, teacher: &TeacherId) -> u32 {
        let n = self.loads.entry(teacher.clone()).or_default();
        *n += 1;
        *n
    }

    pub fn max(&self) -> u32 {
        self.loads.values().copied().max().unwrap_or(0)
    }
}

pub fn assign_teachers<R: Rng + ?Sized>(
    catalog: &Catalog,
    plans: &[ClassPlan],
    tiers: &TierPolicy,
    rng: &mut R,
) -> Result<(Vec<ClassSubjectAssignment>, LoadTable), ScheduleError> {
    let mut loads = LoadTable::default();
    let mut assignments = Vec::new();

    for plan in plans {
        let grade = catalog.grade_of(&plan.class)?;
        for subject in &plan.subjects {
            let tier = tiers.required(grade, subject);
            let eligible: Vec<&Teacher> = catalog
                .teachers_for(subject)
                .filter(|t| tier.map_or(true, |q| t.qualification == q))
                .collect();

            let no_teacher = || ScheduleError::NoEligibleTeacher {
                class: plan.class.clone(),
                subject: subject.clone(),
            };
            let Some(min_load) = eligible.iter().map(|t| loads.load(&t.id)).min() else {
                error!(class = %plan.class, %subject, ?tier, "no eligible teacher found");
                return Err(no_teacher());
            };
            let least_loaded: Vec<&Teacher> = eligible
                .into_iter()
                .filter(|t| loads.load(&t.id) == min_load)
                .collect();
            let chosen = least_loaded.choose(rng).ok_or_else(no_teacher)?;

            let load = loads.bump(&chosen.id);
            debug!(class = %plan.class, %subject, teacher = %chosen.id, load, "assigned teacher");
            assignments.push(ClassSubjectAssignment {
                class: plan.class.clone(),
                subject: subject.clone(),
                teacher: chosen.id.clone(),
            });
        }
    }

    info!(
        assignments = assignments.len(),
        max_load = loads.max(),
        "teacher assignment completed"
    );
    Ok((assignments, loads))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use types::{Class, GradeBand, Instance, Qualification, Role, TierOverride};

    fn teacher(id: &str, subject: &str, q: Qualification) -> Teacher {
        Teacher {
            id: id.into(),
            name: id.into(),
            subject: subject.into(),
            qualification: q,
            role: Role::None,
            serial: 0,
        }
    }

    fn catalog(teachers: Vec<Teacher>, classes: &[&str]) -> Catalog {
        Catalog::build(&Instance {
            subjects: vec![],
            teachers,
            classes: classes.iter().map(|&c| Class::new(c)).collect(),
            offerings: vec![],
            quotas: vec![],
            electives: vec![],
        })
    }

    fn plan(class: &str, subjects: &[&str]) -> ClassPlan {
        ClassPlan {
            class: class.into(),
            subjects: subjects.iter().map(|&s| s.into()).collect(),
        }
    }

    #[test]
    fn spreads_load_evenly() {
        let cat = catalog(
            vec![
                teacher("E1", "ENG", Qualification::Tgt),
                teacher("E2", "ENG", Qualification::Tgt),
                teacher("E3", "ENG", Qualification::Tgt),
            ],
            &["6A", "6B", "6C", "6D", "6E", "6F", "6G"],
        );
        let plans: Vec<_> = ["6A", "6B", "6C", "6D", "6E", "6F", "6G"]
            .iter()
            .map(|c| plan(c, &["ENG"]))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let (assignments, loads) =
            assign_teachers(&cat, &plans, &TierPolicy::default(), &mut rng).unwrap();
        assert_eq!(assignments.len(), 7);
        let mut l: Vec<u32> = ["E1", "E2", "E3"].iter().map(|t| loads.load(&(*t).into())).collect();
        l.sort();
        assert_eq!(l, vec![2, 2, 3]);
    }

    #[test]
    fn same_seed_same_choices() {
        let cat = catalog(
            vec![teacher("E1", "ENG", Qualification::Tgt), teacher("E2", "ENG", Qualification::Tgt)],
            &["6A", "6B", "6C"],
        );
        let plans: Vec<_> = ["6A", "6B", "6C"].iter().map(|c| plan(c, &["ENG"])).collect();
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            assign_teachers(&cat, &plans, &TierPolicy::default(), &mut rng).unwrap().0
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn tiers_filter_eligibility() {
        let cat = catalog(
            vec![
                teacher("J", "ENG", Qualification::Tgt),
                teacher("S", "ENG", Qualification::Pgt),
                teacher("P1", "PE", Qualification::Tgt),
                teacher("P2", "PE", Qualification::Pgt),
            ],
            &["7A", "11A"],
        );
        let tiers = TierPolicy {
            bands: vec![
                GradeBand { min_grade: 6, max_grade: 10, qualification: Qualification::Tgt },
                GradeBand { min_grade: 11, max_grade: 12, qualification: Qualification::Pgt },
            ],
            overrides: vec![TierOverride { subject: "PE".into(), qualification: Qualification::Pgt }],
        };
        let plans = vec![plan("7A", &["ENG", "PE"]), plan("11A", &["ENG", "PE"])];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (a, _) = assign_teachers(&cat, &plans, &tiers, &mut rng).unwrap();
        let got: Vec<_> = a.iter().map(|x| x.teacher.0.as_str()).collect();
        assert_eq!(got, vec!["J", "P2", "S", "P2"]);
    }

    #[test]
    fn missing_teacher_is_fatal() {
        let cat = catalog(vec![teacher("E1", "ENG", Qualification::Tgt)], &["6A"]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let err = assign_teachers(&cat, &[plan("6A", &["ENG", "MAT"])], &TierPolicy::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::NoEligibleTeacher { ref class, ref subject } if class.0 == "6A" && subject.0 == "MAT"
        ));
    }
}
