//! In-memory entity catalog.
//!
//! Subjects, teachers, classes and weekly quotas are materialized once per
//! run into indexed maps so the scheduling loops never re-scan the input.

use std::collections::HashMap;
use tracing::{debug, warn};
use types::{Class, ClassId, Instance, Intensity, Subject, SubjectId, Teacher, TeacherId};

use crate::ScheduleError;

/// Ordered, concrete subject list of one class after alternatives are resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassPlan {
    pub class: ClassId,
    pub subjects: Vec<SubjectId>,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    subjects: HashMap<SubjectId, Subject>,
    teachers: Vec<Teacher>,
    teacher_index: HashMap<TeacherId, usize>,
    by_subject: HashMap<SubjectId, Vec<usize>>,
    classes: Vec<Class>,
    class_index: HashMap<ClassId, usize>,
    quotas: HashMap<(u8, SubjectId), u32>,
}

impl Catalog {
    pub fn build(inst: &Instance) -> Self {
        let subjects = inst
            .subjects
            .iter()
            .map(|s| (s.id.clone(), s.clone()))
            .collect();

        let teachers = inst.teachers.clone();
        let teacher_index = teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), i))
            .collect();
        let mut by_subject: HashMap<SubjectId, Vec<usize>> = HashMap::new();
        for (i, t) in teachers.iter().enumerate() {
            by_subject.entry(t.subject.clone()).or_default().push(i);
        }
        for v in by_subject.values_mut() {
            v.sort_by(|&a, &b| {
                (teachers[a].serial, &teachers[a].id).cmp(&(teachers[b].serial, &teachers[b].id))
            });
        }

        let classes = inst.classes.clone();
        let class_index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let quotas = inst
            .quotas
            .iter()
            .map(|q| ((q.grade, q.subject.clone()), q.per_week))
            .collect();

        Self {
            subjects,
            teachers,
            teacher_index,
            by_subject,
            classes,
            class_index,
            quotas,
        }
    }

    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.get(id)
    }

    pub fn intensity(&self, id: &SubjectId) -> Intensity {
        self.subject(id).map(|s| s.intensity).unwrap_or_default()
    }

    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teacher_index.get(id).map(|&i| &self.teachers[i])
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// Teachers of `subject` in (serial, id) order.
    pub fn teachers_for<'a>(&'a self, subject: &SubjectId) -> impl Iterator<Item = &'a Teacher> + 'a {
        self.by_subject
            .get(subject)
            .into_iter()
            .flatten()
            .map(move |&i| &self.teachers[i])
    }

    pub fn class(&self, id: &ClassId) -> Option<&Class> {
        self.class_index.get(id).map(|&i| &self.classes[i])
    }

    pub fn classes(&self) -> &[Class] {
        &self.classes
    }

    pub fn class_mut(&mut self, id: &ClassId) -> Option<&mut Class> {
        self.class_index.get(id).map(|&i| &mut self.classes[i])
    }

    pub fn class_teacher(&self, id: &ClassId) -> Option<&TeacherId> {
        self.class(id).and_then(|c| c.class_teacher.as_ref())
    }

    pub fn grade_of(&self, id: &ClassId) -> Result<u8, ScheduleError> {
        self.class(id)
            .and_then(|c| c.id.grade())
            .ok_or_else(|| ScheduleError::UnknownClass(id.clone()))
    }

    pub fn quota(&self, grade: u8, subject: &SubjectId) -> Option<u32> {
        self.quotas.get(&(grade, subject.clone())).copied()
    }

    pub fn quota_for(&self, class: &ClassId, subject: &SubjectId) -> Result<u32, ScheduleError> {
        let grade = self.grade_of(class)?;
        self.quota(grade, subject)
            .ok_or_else(|| ScheduleError::MissingQuota {
                grade,
                subject: subject.clone(),
            })
    }

    /// Every planned (class, subject) must have a quota before anything is placed.
    pub fn check_quotas(&self, plans: &[ClassPlan]) -> Result<(), ScheduleError> {
        for p in plans {
            for s in &p.subjects {
                self.quota_for(&p.class, s)?;
            }
        }
        Ok(())
    }
}

/// Resolves `"A/B"` offering cells to one subject per class. An elective
/// choice naming one of the alternatives wins; otherwise the first one is taken.
pub fn resolve_offerings(inst: &Instance) -> Vec<ClassPlan> {
    let mut plans = Vec::with_capacity(inst.offerings.len());
    for o in &inst.offerings {
        let chosen: Vec<&SubjectId> = inst
            .electives
            .iter()
            .filter(|e| e.class == o.class)
            .map(|e| &e.subject)
            .collect();

        let mut subjects = Vec::with_capacity(o.subjects.len());
        for cell in &o.subjects {
            let alts = cell.alternatives();
            let pick = match alts.as_slice() {
                [] => continue,
                [only] => only.clone(),
                [first, ..] => match alts.iter().find(|a| chosen.contains(a)) {
                    Some(a) => a.clone(),
                    None => {
                        warn!(class = %o.class, cell = %cell.0, fallback = %first,
                            "no elective choice recorded, taking the first alternative");
                        first.clone()
                    }
                },
            };
            debug!(class = %o.class, subject = %pick, "offered subject resolved");
            subjects.push(pick);
        }
        plans.push(ClassPlan {
            class: o.class.clone(),
            subjects,
        });
    }
    plans
}

/// Carries last year's class and co-class teachers over to the classes the
/// same sections become this year. 8 rolls back to 6, 10 to 9, 12 to 11.
pub fn promote_class_teachers(previous: &[Class]) -> Vec<Class> {
    previous
        .iter()
        .filter_map(|c| {
            let grade = c.id.grade()?;
            let next = match grade {
                8 => 6,
                10 => 9,
                12 => 11,
                g => g + 1,
            };
            let id = c.id.with_grade(next)?;
            Some(Class {
                id,
                class_teacher: c.class_teacher.clone(),
                co_class_teacher: c.co_class_teacher.clone(),
            })
        })
        .collect()
}
