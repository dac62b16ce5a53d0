use proptest::prelude::*;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{catalog::resolve_offerings, Catalog, Timetable};
use solver_greedy::{balance, GreedySolver, Synthesizer};
use std::collections::{HashMap, HashSet};
use types::{
    Class, ClassOffering, Day, Instance, Intensity, Qualification, Role, ScheduleEnvelope,
    ScheduleParams, Subject, Teacher, TierPolicy, WeeklyQuota,
};

/// (per-week quota, is block, teacher count) per subject.
type SubjectSpec = (u32, bool, usize);

fn school(sections: usize, specs: &[SubjectSpec]) -> Instance {
    let classes: Vec<Class> = ['A', 'B', 'C', 'D']
        .iter()
        .take(sections)
        .map(|s| Class::new(format!("6{s}").as_str()))
        .collect();
    let mut subjects = Vec::new();
    let mut teachers = Vec::new();
    let mut quotas = Vec::new();
    for (i, &(per_week, block, count)) in specs.iter().enumerate() {
        let id = format!("S{i}");
        subjects.push(Subject {
            id: id.as_str().into(),
            name: id.clone(),
            intensity: if block { Intensity::Block } else { Intensity::Single },
        });
        for n in 0..count {
            teachers.push(Teacher {
                id: format!("{id}T{n}").as_str().into(),
                name: format!("{id} teacher {n}"),
                subject: id.as_str().into(),
                qualification: Qualification::Tgt,
                role: Role::None,
                serial: n as u32,
            });
        }
        quotas.push(WeeklyQuota { grade: 6, subject: id.as_str().into(), per_week });
    }
    let offerings = classes
        .iter()
        .map(|c| ClassOffering {
            class: c.id.clone(),
            subjects: subjects.iter().map(|s| s.id.0.as_str().into()).collect(),
        })
        .collect();
    Instance { subjects, teachers, classes, offerings, quotas, electives: vec![] }
}

fn subject_specs() -> impl Strategy<Value = Vec<SubjectSpec>> {
    prop::collection::vec((1u32..=8, any::<bool>(), 1usize..=3), 2..=6)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn timetable_never_double_books(sections in 1usize..=4, specs in subject_specs(), seed in any::<u64>()) {
        let env = ScheduleEnvelope {
            instance: school(sections, &specs),
            params: ScheduleParams::default().with_seed(seed),
        };
        let res = GreedySolver::new().run(&env).unwrap();

        let mut class_slots = HashSet::new();
        let mut teacher_slots = HashSet::new();
        for e in &res.entries {
            prop_assert!(class_slots.insert((e.class.clone(), e.period)));
            prop_assert!(teacher_slots.insert((e.teacher.clone(), e.period)));
        }

        let mut counts: HashMap<(String, String), u32> = HashMap::new();
        for e in &res.entries {
            *counts.entry((e.class.0.clone(), e.subject.0.clone())).or_default() += 1;
        }
        for a in &res.assignments {
            let q = env.instance.quotas.iter().find(|q| q.subject == a.subject).unwrap().per_week;
            let got = counts.get(&(a.class.0.clone(), a.subject.0.clone())).copied().unwrap_or(0);
            prop_assert!(got <= q);
            let missing = res.shortfalls.iter()
                .find(|s| s.class == a.class && s.subject == a.subject)
                .map_or(0, |s| s.missing);
            prop_assert_eq!(got + missing, q);
        }

        for s in &res.swaps {
            prop_assert!(!s.vacated.is_first_of_day());
        }
    }

    #[test]
    fn load_spread_within_a_subject_is_at_most_one(
        sections in 1usize..=4, specs in subject_specs(), seed in any::<u64>()
    ) {
        let inst = school(sections, &specs);
        let catalog = Catalog::build(&inst);
        let plans = resolve_offerings(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (_, loads) = balance::assign_teachers(&catalog, &plans, &TierPolicy::default(), &mut rng).unwrap();

        for subject in &inst.subjects {
            let l: Vec<u32> = catalog.teachers_for(&subject.id).map(|t| loads.load(&t.id)).collect();
            let (min, max) = (l.iter().min().unwrap(), l.iter().max().unwrap());
            prop_assert!(max - min <= 1, "{}: {:?}", subject.id, l);
        }
    }

    #[test]
    fn blocks_are_contiguous_and_one_per_class_day(
        sections in 1usize..=4, specs in subject_specs(), seed in any::<u64>()
    ) {
        let inst = school(sections, &specs);
        let catalog = Catalog::build(&inst);
        let plans = resolve_offerings(&inst);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (assignments, _) = balance::assign_teachers(&catalog, &plans, &TierPolicy::default(), &mut rng).unwrap();

        let mut tt = Timetable::new();
        let report = Synthesizer::new(&catalog, 3).run(&mut tt, &assignments).unwrap();

        let mut pair_days: HashSet<(String, Day)> = HashSet::new();
        for pl in report.placements.iter().filter(|pl| pl.periods.len() == 2) {
            let (a, b) = (pl.periods[0], pl.periods[1]);
            prop_assert_eq!(a.day, b.day);
            prop_assert_eq!(a.next_in_day(), Some(b));
            prop_assert!(pair_days.insert((pl.class.0.clone(), a.day)));
        }

        let mut block_windows: HashSet<(String, String, Day)> = HashSet::new();
        for pl in &report.placements {
            if catalog.intensity(&pl.subject) == Intensity::Block {
                let key = (pl.class.0.clone(), pl.subject.0.clone(), pl.periods[0].day);
                prop_assert!(block_windows.insert(key), "second window for {:?}", pl);
            }
        }

        // No class here has a class teacher, so period 1 stays reserved.
        prop_assert!(tt.entries().iter().all(|e| !e.period.is_first_of_day()));
    }

    #[test]
    fn runs_are_reproducible_per_seed(sections in 1usize..=3, specs in subject_specs(), seed in any::<u64>()) {
        let env = ScheduleEnvelope {
            instance: school(sections, &specs),
            params: ScheduleParams::default().with_seed(seed),
        };
        let a = GreedySolver::new().run(&env).unwrap();
        let b = GreedySolver::new().run(&env).unwrap();
        prop_assert_eq!(a.entries, b.entries);
        prop_assert_eq!(a.classes, b.classes);
    }
}
