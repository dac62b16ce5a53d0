//! Swap-based repair of flagged triples.
//!
//! For a class short on some subject, a lesson at period `j` is handed to the
//! under-assigned teacher when that teacher is free at `j`, and the displaced
//! lesson moves to an open period of the class where its own teacher is free.

use sched_core::{Catalog, ScheduleError, Timetable};
use std::collections::HashSet;
use tracing::{debug, info, warn};
use types::{ClassId, Intensity, Period, SwapRecord, TimetableEntry};

use crate::synth::Flagged;

pub struct Repairer<'a> {
    catalog: &'a Catalog,
    fixed: HashSet<Period>,
}

impl<'a> Repairer<'a> {
    /// `fixed` periods (the activity block) are never touched.
    pub fn new(catalog: &'a Catalog, fixed: &[Period]) -> Self {
        Self {
            catalog,
            fixed: fixed.iter().copied().collect(),
        }
    }

    /// Periods of `class` that repair must leave alone: fixed periods, the
    /// first period of each day, and both halves of every placed block.
    pub fn protected(&self, timetable: &Timetable, class: &ClassId) -> HashSet<Period> {
        let mut out: HashSet<Period> = self.fixed.clone();
        for p in Period::week() {
            if p.is_first_of_day() {
                out.insert(p);
            }
            let Some(e) = timetable.entry_at(class, p) else {
                continue;
            };
            if self.catalog.intensity(&e.subject) != Intensity::Block {
                continue;
            }
            let Some(next) = p.next_in_day() else {
                continue;
            };
            let pair = timetable
                .entry_at(class, next)
                .is_some_and(|n| n.subject == e.subject && n.teacher == e.teacher);
            if pair {
                out.insert(p);
                out.insert(next);
            }
        }
        out
    }

    pub fn repair(
        &self,
        timetable: &mut Timetable,
        flagged: &[Flagged],
    ) -> Result<Vec<SwapRecord>, ScheduleError> {
        let mut swaps = Vec::new();

        for f in flagged {
            let quota = self.catalog.quota_for(&f.class, &f.subject)?;
            let mut short = quota.saturating_sub(timetable.assigned_count(&f.class, &f.subject));
            if short == 0 {
                continue;
            }

            let protected = self.protected(timetable, &f.class);
            let mut open: Vec<Period> = Period::week()
                .filter(|p| !protected.contains(p) && timetable.class_is_free(&f.class, *p))
                .collect();

            for j in Period::week() {
                if short == 0 {
                    break;
                }
                if protected.contains(&j) {
                    continue;
                }
                let Some(current) = timetable.entry_at(&f.class, j).cloned() else {
                    continue;
                };
                if current.teacher == f.teacher
                    || !timetable.free_periods(&f.teacher).contains(&j.index())
                {
                    continue;
                }
                let displaced_free = timetable.free_periods(&current.teacher);
                let Some(slot) = open
                    .iter()
                    .position(|k| displaced_free.contains(&k.index()))
                else {
                    continue;
                };
                let k = open.remove(slot);

                timetable.reassign(&f.class, j, f.subject.clone(), f.teacher.clone())?;
                timetable.insert(TimetableEntry {
                    class: f.class.clone(),
                    subject: current.subject.clone(),
                    teacher: current.teacher.clone(),
                    period: k,
                })?;
                short -= 1;

                debug!(class = %f.class, vacated = %j, reassigned = %k, teacher = %f.teacher,
                    displaced = %current.teacher, "swap applied");
                swaps.push(SwapRecord {
                    class: f.class.clone(),
                    vacated: j,
                    new_teacher: f.teacher.clone(),
                    new_subject: f.subject.clone(),
                    reassigned: k,
                    displaced_teacher: current.teacher,
                    displaced_subject: current.subject,
                });
            }

            if short > 0 {
                warn!(class = %f.class, subject = %f.subject, teacher = %f.teacher, missing = short,
                    "repair could not close the gap");
            }
        }

        info!(swaps = swaps.len(), "repair completed");
        Ok(swaps)
    }
}
