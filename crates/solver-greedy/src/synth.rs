//! Greedy placement of (class, subject, teacher) triples into the week.
//!
//! Triples are walked once, class-teacher triples first. Each triple gets up
//! to `max_attempts` passes over the day rotation, taking at most one window
//! per day per pass. Period 1 of a class stays free until its class teacher's
//! triple has been placed.
//!
//! Block subjects take two consecutive periods when the class has not had a
//! block that day and at least two periods remain. This guard stands in for
//! "remaining exceeds the days left in the pass", which would never let a
//! quota of 4 form a block over a six-day week. A block subject holds at
//! most one window per day, pair or single. Whatever cannot be placed is
//! flagged for repair.

use sched_core::{Catalog, ScheduleError, Timetable};
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info, warn};
use types::{
    ActivityBlock, ClassId, ClassSubjectAssignment, Day, Intensity, Period, SubjectId, TeacherId,
    TimetableEntry, PERIODS_PER_DAY,
};

/// Day order of one placement pass. Alternating days spreads a subject's
/// lessons across the week before doubling up.
pub const DAY_ROTATION: [Day; 6] = [Day::Mon, Day::Wed, Day::Fri, Day::Tue, Day::Thu, Day::Sat];

/// A triple still short of its quota after every pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Flagged {
    pub class: ClassId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub missing: u32,
}

/// One window placed by the synthesizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub class: ClassId,
    pub subject: SubjectId,
    pub periods: Vec<Period>,
}

#[derive(Clone, Debug, Default)]
pub struct SynthesisReport {
    pub placements: Vec<Placement>,
    pub paradoxes: Vec<Flagged>,
    /// Sum over triples of periods still missing after synthesis.
    pub missing_total: u32,
}

/// Puts the activity lesson into its fixed periods for every class with a
/// class teacher. Slots already taken are skipped with a warning.
pub fn preseed_activity(
    catalog: &Catalog,
    timetable: &mut Timetable,
    activity: &ActivityBlock,
) -> usize {
    let mut placed = 0;
    for class in catalog.classes() {
        let Some(teacher) = &class.class_teacher else {
            continue;
        };
        for &period in &activity.periods {
            if !timetable.is_free(period, &class.id, teacher) {
                warn!(class = %class.id, %period, "activity slot already taken");
                continue;
            }
            let entry = TimetableEntry {
                class: class.id.clone(),
                subject: activity.subject.clone(),
                teacher: teacher.clone(),
                period,
            };
            if timetable.insert(entry).is_ok() {
                placed += 1;
            }
        }
    }
    info!(subject = %activity.subject, placed, "activity periods pre-seeded");
    placed
}

/// First window of `len` consecutive periods on `day`, starting no earlier
/// than `start_from`, in which both the class and the teacher are free.
pub fn get_periods(
    timetable: &Timetable,
    class: &ClassId,
    teacher: &TeacherId,
    day: Day,
    start_from: u8,
    len: u8,
) -> Option<Vec<Period>> {
    if len == 0 || len > PERIODS_PER_DAY {
        return None;
    }
    (start_from.max(1)..=PERIODS_PER_DAY + 1 - len).find_map(|start| {
        let window: Vec<Period> = (start..start + len)
            .filter_map(|n| Period::new(day, n))
            .collect();
        window
            .iter()
            .all(|&p| timetable.is_free(p, class, teacher))
            .then_some(window)
    })
}

pub struct Synthesizer<'a> {
    catalog: &'a Catalog,
    max_attempts: u32,
    blocked_days: HashMap<ClassId, HashSet<Day>>,
    anchored: HashMap<ClassId, bool>,
}

impl<'a> Synthesizer<'a> {
    pub fn new(catalog: &'a Catalog, max_attempts: u32) -> Self {
        Self {
            catalog,
            max_attempts,
            blocked_days: HashMap::new(),
            anchored: HashMap::new(),
        }
    }

    fn is_class_teacher_triple(&self, t: &ClassSubjectAssignment) -> bool {
        self.catalog.class_teacher(&t.class) == Some(&t.teacher)
    }

    /// Class-teacher triples first, input order otherwise.
    pub fn order<'t>(&self, triples: &'t [ClassSubjectAssignment]) -> Vec<&'t ClassSubjectAssignment> {
        let (mut first, rest): (Vec<_>, Vec<_>) = triples
            .iter()
            .partition(|t| self.is_class_teacher_triple(t));
        first.extend(rest);
        first
    }

    /// A class is anchored once period 1 may be used by any subject, which
    /// happens only when its class teacher's triple has been placed. Until
    /// then period 1 stays reserved.
    fn init_anchors(&mut self) {
        for class in self.catalog.classes() {
            self.anchored.insert(class.id.clone(), false);
        }
    }

    fn is_anchored(&self, class: &ClassId) -> bool {
        self.anchored.get(class).copied().unwrap_or(false)
    }

    fn day_blocked(&self, class: &ClassId, day: Day) -> bool {
        self.blocked_days
            .get(class)
            .is_some_and(|days| days.contains(&day))
    }

    pub fn run(
        &mut self,
        timetable: &mut Timetable,
        triples: &[ClassSubjectAssignment],
    ) -> Result<SynthesisReport, ScheduleError> {
        self.init_anchors();
        let mut report = SynthesisReport::default();

        for t in self.order(triples) {
            let quota = self.catalog.quota_for(&t.class, &t.subject)?;
            let remaining = self.place(timetable, t, quota, &mut report.placements)?;

            if remaining > 0 {
                error!(
                    class = %t.class, subject = %t.subject, teacher = %t.teacher, missing = remaining,
                    "paradox: no free window left for the teacher and class"
                );
                report.paradoxes.push(Flagged {
                    class: t.class.clone(),
                    subject: t.subject.clone(),
                    teacher: t.teacher.clone(),
                    missing: remaining,
                });
            }

            let assigned = timetable.assigned_count(&t.class, &t.subject);
            if assigned != quota {
                warn!(class = %t.class, subject = %t.subject, assigned, quota, "assigned periods differ from quota");
                report.missing_total += quota.saturating_sub(assigned);
            }
        }

        info!(
            entries = timetable.len(),
            paradoxes = report.paradoxes.len(),
            missing = report.missing_total,
            "synthesis completed"
        );
        Ok(report)
    }

    /// Places one triple and returns how many periods are still missing.
    fn place(
        &mut self,
        timetable: &mut Timetable,
        t: &ClassSubjectAssignment,
        quota: u32,
        placements: &mut Vec<Placement>,
    ) -> Result<u32, ScheduleError> {
        let is_ct = self.is_class_teacher_triple(t);
        let block_triple = self.catalog.intensity(&t.subject) == Intensity::Block && !is_ct;
        let mut remaining = quota.saturating_sub(timetable.assigned_count(&t.class, &t.subject));
        let mut used_days: HashSet<Day> = HashSet::new();

        let mut attempt = 0;
        while remaining > 0 && attempt < self.max_attempts {
            attempt += 1;
            for day in DAY_ROTATION {
                if remaining == 0 {
                    break;
                }
                if block_triple && used_days.contains(&day) {
                    continue;
                }
                let start_from = if is_ct || self.is_anchored(&t.class) { 1 } else { 2 };
                let want_block = block_triple
                    && remaining >= 2
                    && !self.day_blocked(&t.class, day);

                let window = if want_block {
                    get_periods(timetable, &t.class, &t.teacher, day, start_from, 2)
                        .or_else(|| get_periods(timetable, &t.class, &t.teacher, day, start_from, 1))
                } else {
                    get_periods(timetable, &t.class, &t.teacher, day, start_from, 1)
                };
                let Some(window) = window else {
                    continue;
                };

                for &period in &window {
                    timetable.insert(TimetableEntry {
                        class: t.class.clone(),
                        subject: t.subject.clone(),
                        teacher: t.teacher.clone(),
                        period,
                    })?;
                }
                if window.len() == 2 {
                    self.blocked_days.entry(t.class.clone()).or_default().insert(day);
                }
                used_days.insert(day);
                remaining -= window.len() as u32;
                debug!(
                    class = %t.class, subject = %t.subject, teacher = %t.teacher,
                    %day, attempt, periods = ?window.iter().map(|p| p.number).collect::<Vec<_>>(),
                    "placed"
                );
                placements.push(Placement {
                    class: t.class.clone(),
                    subject: t.subject.clone(),
                    periods: window,
                });
            }
        }

        if is_ct {
            self.anchored.insert(t.class.clone(), true);
        }
        Ok(remaining)
    }
}
