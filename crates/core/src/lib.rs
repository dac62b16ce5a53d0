pub mod catalog;
pub mod recorder;
pub mod report;
pub mod timetable;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::warn;

pub use catalog::{Catalog, ClassPlan};
pub use recorder::{record_result, MemoryRecorder, Recorder};
pub use timetable::Timetable;
pub use types::{
    Class, ClassId, ClassSubjectAssignment, Instance, Period, QuotaIssue, ScheduleEnvelope,
    ScheduleParams, ScheduleResult, Shortfall, Subject, SubjectId, SwapRecord, Teacher, TeacherId,
    TimetableEntry,
};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid instance: {0}")]
    Msg(String),
}

impl ValidationError {
    pub fn messages(&self) -> Vec<String> {
        match self {
            ValidationError::Msg(msg) => msg
                .split(';')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no eligible teacher found for {class} - {subject}")]
    NoEligibleTeacher { class: ClassId, subject: SubjectId },
    #[error("no weekly quota for grade {grade} - {subject}")]
    MissingQuota { grade: u8, subject: SubjectId },
    #[error("unknown class {0}")]
    UnknownClass(ClassId),
    #[error("period {0} is outside the week")]
    OutsideWeek(Period),
    #[error("class {class} has nothing at {period}")]
    EmptySlot { class: ClassId, period: Period },
    #[error("period {period} already taken by class {class} or teacher {teacher}")]
    Conflict {
        class: ClassId,
        teacher: TeacherId,
        period: Period,
    },
}

impl ScheduleError {
    /// Errors that abort a run before anything has been placed.
    pub fn is_fatal_precondition(&self) -> bool {
        matches!(
            self,
            ScheduleError::Validation(_)
                | ScheduleError::NoEligibleTeacher { .. }
                | ScheduleError::MissingQuota { .. }
        )
    }
}

pub fn validate(inst: &Instance) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    fn chk_unique<I: ToString>(name: &str, ids: impl Iterator<Item = I>, errors: &mut Vec<String>) {
        let mut seen = HashSet::new();
        for id in ids {
            let s = id.to_string();
            if !seen.insert(s.clone()) {
                errors.push(format!("duplicate {name} id: {s}"));
            }
        }
    }
    chk_unique("subject", inst.subjects.iter().map(|x| &x.id), &mut errors);
    chk_unique("teacher", inst.teachers.iter().map(|x| &x.id), &mut errors);
    chk_unique("class", inst.classes.iter().map(|x| &x.id), &mut errors);
    chk_unique(
        "quota",
        inst.quotas.iter().map(|q| format!("{}/{}", q.grade, q.subject)),
        &mut errors,
    );

    let subjects: HashSet<_> = inst.subjects.iter().map(|s| &s.id).collect();
    let teachers: HashSet<_> = inst.teachers.iter().map(|t| &t.id).collect();
    let classes: HashSet<_> = inst.classes.iter().map(|c| &c.id).collect();

    for t in &inst.teachers {
        if !subjects.contains(&t.subject) {
            errors.push(format!(
                "teacher {} teaches unknown subject {}",
                t.id, t.subject
            ));
        }
    }

    for c in &inst.classes {
        if c.id.grade().is_none() {
            errors.push(format!("class {} has no grade", c.id));
        }
        if let Some(ct) = &c.class_teacher {
            if !teachers.contains(ct) {
                errors.push(format!(
                    "class {} references missing class teacher {}",
                    c.id, ct
                ));
            }
        }
    }

    let mut ct_seen: HashMap<&TeacherId, &ClassId> = HashMap::new();
    for c in &inst.classes {
        if let Some(ct) = &c.class_teacher {
            if let Some(other) = ct_seen.insert(ct, &c.id) {
                errors.push(format!(
                    "teacher {} is class teacher of both {} and {}",
                    ct, other, c.id
                ));
            }
        }
    }

    for o in &inst.offerings {
        if !classes.contains(&o.class) {
            errors.push(format!("offering references missing class {}", o.class));
        }
        for cell in &o.subjects {
            for s in cell.alternatives() {
                if !subjects.contains(&s) {
                    errors.push(format!(
                        "offering for {} references missing subject {}",
                        o.class, s
                    ));
                }
            }
        }
    }

    for q in &inst.quotas {
        if !subjects.contains(&q.subject) {
            errors.push(format!(
                "quota for grade {} references missing subject {}",
                q.grade, q.subject
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

/// Run parameters that refer to the week: every activity period must exist.
pub fn validate_params(params: &ScheduleParams) -> Result<(), ValidationError> {
    let Some(activity) = &params.activity else {
        return Ok(());
    };
    let errors: Vec<String> = activity
        .periods
        .iter()
        .filter(|p| !p.in_week())
        .map(|p| format!("activity period {p} is outside the week"))
        .collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Msg(errors.join("; ")))
    }
}

/// Grades whose quotas do not add up to the weekly period count. These are
/// reported, never fatal.
pub fn quota_inconsistencies(inst: &Instance, expected: u32) -> Vec<QuotaIssue> {
    let mut totals: HashMap<u8, u32> = HashMap::new();
    for q in &inst.quotas {
        *totals.entry(q.grade).or_default() += q.per_week;
    }
    let mut issues: Vec<QuotaIssue> = totals
        .into_iter()
        .filter(|&(_, total)| total != expected)
        .map(|(grade, total)| QuotaIssue {
            grade,
            total,
            expected,
        })
        .collect();
    issues.sort_by_key(|i| i.grade);
    for i in &issues {
        warn!(
            grade = i.grade,
            total = i.total,
            expected = i.expected,
            "weekly quotas do not sum to the expected period count"
        );
    }
    issues
}

#[async_trait]
pub trait Solver: Send + Sync + 'static {
    async fn solve(&self, env: ScheduleEnvelope) -> anyhow::Result<ScheduleResult>;
}
