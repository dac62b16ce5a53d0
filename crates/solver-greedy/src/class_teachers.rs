use rand::{seq::SliceRandom, Rng};
use sched_core::Catalog;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, error};
use types::{ClassId, ClassSubjectAssignment, Intensity, Role, TeacherId};

/// Appoints a class teacher to every class that has none, drawn at random
/// from the teachers assigned to that class. A class teacher opens the day
/// with a single lesson, so only teachers of single-intensity subjects
/// qualify. Activity coordinators and teachers who already lead a class are
/// skipped. Returns the appointments.
pub fn appoint_class_teachers<R: Rng + ?Sized>(
    catalog: &mut Catalog,
    assignments: &[ClassSubjectAssignment],
    rng: &mut R,
) -> Vec<(ClassId, TeacherId)> {
    let mut taken: HashSet<TeacherId> = catalog
        .classes()
        .iter()
        .filter_map(|c| c.class_teacher.clone())
        .collect();
    let open: Vec<ClassId> = catalog
        .classes()
        .iter()
        .filter(|c| c.class_teacher.is_none())
        .map(|c| c.id.clone())
        .collect();

    let mut appointed = Vec::new();
    for class in open {
        let mut candidates: Vec<&TeacherId> = Vec::new();
        for a in assignments.iter().filter(|a| a.class == class) {
            let eligible = !taken.contains(&a.teacher)
                && !candidates.contains(&&a.teacher)
                && catalog.intensity(&a.subject) == Intensity::Single
                && catalog
                    .teacher(&a.teacher)
                    .is_some_and(|t| t.role != Role::ActivityCoordinator);
            if eligible {
                candidates.push(&a.teacher);
            }
        }
        let Some(&chosen) = candidates.choose(rng) else {
            error!(%class, "no teacher available to lead the class");
            continue;
        };
        let chosen = chosen.clone();
        debug!(%class, teacher = %chosen, "class teacher appointed");
        taken.insert(chosen.clone());
        if let Some(c) = catalog.class_mut(&class) {
            c.class_teacher = Some(chosen.clone());
        }
        appointed.push((class, chosen));
    }
    appointed
}

/// Within each grade the class teacher of a section co-leads the section
/// before it; the first section is co-led by the last section's teacher.
pub fn derive_co_class_teachers(catalog: &mut Catalog) {
    let mut grades: BTreeMap<u8, Vec<(char, ClassId, Option<TeacherId>)>> = BTreeMap::new();
    for c in catalog.classes() {
        if let (Some(grade), Some(section)) = (c.id.grade(), c.id.section()) {
            grades
                .entry(grade)
                .or_default()
                .push((section, c.id.clone(), c.class_teacher.clone()));
        }
    }

    for (grade, mut sections) in grades {
        if sections.len() < 2 {
            continue;
        }
        sections.sort_by_key(|(s, _, _)| *s);
        let n = sections.len();
        for i in 0..n {
            let target = &sections[(i + n - 1) % n].1;
            let co = sections[i].2.clone();
            debug!(grade, class = %target, co_teacher = ?co, "co-class teacher derived");
            if let Some(c) = catalog.class_mut(target) {
                c.co_class_teacher = co;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use types::{Class, Instance, Qualification, Subject, Teacher};

    fn teacher(id: &str, role: Role) -> Teacher {
        Teacher {
            id: id.into(),
            name: id.into(),
            subject: "ENG".into(),
            qualification: Qualification::Tgt,
            role,
            serial: 0,
        }
    }

    fn assign(class: &str, teacher: &str) -> ClassSubjectAssignment {
        ClassSubjectAssignment {
            class: class.into(),
            subject: "ENG".into(),
            teacher: teacher.into(),
        }
    }

    fn catalog(classes: Vec<Class>, teachers: Vec<Teacher>) -> Catalog {
        Catalog::build(&Instance {
            subjects: vec![],
            teachers,
            classes,
            offerings: vec![],
            quotas: vec![],
            electives: vec![],
        })
    }

    #[test]
    fn appointment_skips_coordinators_and_existing_leads() {
        let mut a6 = Class::new("6A");
        a6.class_teacher = Some("T1".into());
        let mut cat = catalog(
            vec![a6, Class::new("6B")],
            vec![
                teacher("T1", Role::ClassTeacher),
                teacher("T2", Role::ActivityCoordinator),
                teacher("T3", Role::None),
            ],
        );
        let assignments = vec![assign("6B", "T1"), assign("6B", "T2"), assign("6B", "T3")];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let got = appoint_class_teachers(&mut cat, &assignments, &mut rng);
        assert_eq!(got, vec![(ClassId::from("6B"), TeacherId::from("T3"))]);
        assert_eq!(cat.class_teacher(&"6B".into()), Some(&"T3".into()));
        assert_eq!(cat.class_teacher(&"6A".into()), Some(&"T1".into()));
    }

    #[test]
    fn class_without_candidates_stays_open() {
        let mut cat = catalog(vec![Class::new("6A")], vec![teacher("T2", Role::ActivityCoordinator)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(appoint_class_teachers(&mut cat, &[assign("6A", "T2")], &mut rng).is_empty());
        assert_eq!(cat.class_teacher(&"6A".into()), None);
    }

    #[test]
    fn block_subject_teachers_do_not_lead() {
        let mut cat = Catalog::build(&Instance {
            subjects: vec![Subject { id: "PHY".into(), name: "Physics".into(), intensity: Intensity::Block }],
            teachers: vec![teacher("P1", Role::None)],
            classes: vec![Class::new("9A")],
            offerings: vec![],
            quotas: vec![],
            electives: vec![],
        });
        let phy = ClassSubjectAssignment { class: "9A".into(), subject: "PHY".into(), teacher: "P1".into() };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(appoint_class_teachers(&mut cat, &[phy], &mut rng).is_empty());
        assert_eq!(cat.class_teacher(&"9A".into()), None);
    }

    #[test]
    fn co_teachers_shift_one_section_back_and_wrap() {
        let classes = ["6C", "6A", "6B", "7A"]
            .iter()
            .map(|id| {
                let mut c = Class::new(*id);
                c.class_teacher = Some(format!("CT{id}").as_str().into());
                c
            })
            .collect();
        let mut cat = catalog(classes, vec![]);
        derive_co_class_teachers(&mut cat);
        let co = |id: &str| cat.class(&id.into()).and_then(|c| c.co_class_teacher.clone());
        assert_eq!(co("6A"), Some("CT6B".into()));
        assert_eq!(co("6B"), Some("CT6C".into()));
        assert_eq!(co("6C"), Some("CT6A".into()));
        assert_eq!(co("7A"), None);
    }
}
