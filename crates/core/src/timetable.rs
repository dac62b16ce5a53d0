//! The working timetable and its availability view.
//!
//! Entries are the only state. The class and teacher occupancy indices are
//! maintained by the same methods that change entries, so availability
//! queries always agree with the entry list.

use std::collections::{BTreeSet, HashMap};
use types::{ClassId, Period, SubjectId, TeacherId, TimetableEntry, PERIODS_PER_WEEK};

use crate::ScheduleError;

type SlotRow = Vec<Option<usize>>;

fn slot(period: Period) -> Option<usize> {
    period.in_week().then(|| period.index() as usize - 1)
}

fn empty_row() -> SlotRow {
    vec![None; PERIODS_PER_WEEK as usize]
}

#[derive(Clone, Debug, Default)]
pub struct Timetable {
    entries: Vec<TimetableEntry>,
    by_class: HashMap<ClassId, SlotRow>,
    by_teacher: HashMap<TeacherId, SlotRow>,
    counts: HashMap<ClassId, HashMap<SubjectId, u32>>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = TimetableEntry>,
    ) -> Result<Self, ScheduleError> {
        let mut tt = Self::new();
        for e in entries {
            tt.insert(e)?;
        }
        Ok(tt)
    }

    pub fn entries(&self) -> &[TimetableEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TimetableEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// False for periods outside the week.
    pub fn class_is_free(&self, class: &ClassId, period: Period) -> bool {
        slot(period).is_some_and(|s| self.by_class.get(class).map_or(true, |row| row[s].is_none()))
    }

    pub fn teacher_is_free(&self, teacher: &TeacherId, period: Period) -> bool {
        slot(period).is_some_and(|s| self.by_teacher.get(teacher).map_or(true, |row| row[s].is_none()))
    }

    /// True iff neither the class nor the teacher has an entry at `period`.
    pub fn is_free(&self, period: Period, class: &ClassId, teacher: &TeacherId) -> bool {
        self.class_is_free(class, period) && self.teacher_is_free(teacher, period)
    }

    pub fn entry_at(&self, class: &ClassId, period: Period) -> Option<&TimetableEntry> {
        let s = slot(period)?;
        self.by_class
            .get(class)
            .and_then(|row| row[s])
            .map(|i| &self.entries[i])
    }

    /// Period indices (1..=48) in which `teacher` has nothing.
    pub fn free_periods(&self, teacher: &TeacherId) -> BTreeSet<u8> {
        Period::week()
            .filter(|&p| self.teacher_is_free(teacher, p))
            .map(Period::index)
            .collect()
    }

    pub fn assigned_count(&self, class: &ClassId, subject: &SubjectId) -> u32 {
        self.counts
            .get(class)
            .and_then(|m| m.get(subject))
            .copied()
            .unwrap_or(0)
    }

    pub fn insert(&mut self, entry: TimetableEntry) -> Result<(), ScheduleError> {
        let s = slot(entry.period).ok_or(ScheduleError::OutsideWeek(entry.period))?;
        if !self.is_free(entry.period, &entry.class, &entry.teacher) {
            return Err(ScheduleError::Conflict {
                class: entry.class,
                teacher: entry.teacher,
                period: entry.period,
            });
        }
        let i = self.entries.len();
        self.by_class.entry(entry.class.clone()).or_insert_with(empty_row)[s] = Some(i);
        self.by_teacher.entry(entry.teacher.clone()).or_insert_with(empty_row)[s] = Some(i);
        *self
            .counts
            .entry(entry.class.clone())
            .or_default()
            .entry(entry.subject.clone())
            .or_default() += 1;
        self.entries.push(entry);
        Ok(())
    }

    /// Hands the class's lesson at `period` to another teacher and subject.
    /// Returns the entry as it was before.
    pub fn reassign(
        &mut self,
        class: &ClassId,
        period: Period,
        subject: SubjectId,
        teacher: TeacherId,
    ) -> Result<TimetableEntry, ScheduleError> {
        let s = slot(period).ok_or(ScheduleError::OutsideWeek(period))?;
        let i = self
            .by_class
            .get(class)
            .and_then(|row| row[s])
            .ok_or_else(|| ScheduleError::EmptySlot {
                class: class.clone(),
                period,
            })?;
        if self.entries[i].teacher != teacher && !self.teacher_is_free(&teacher, period) {
            return Err(ScheduleError::Conflict {
                class: class.clone(),
                teacher,
                period,
            });
        }

        let before = self.entries[i].clone();
        if let Some(row) = self.by_teacher.get_mut(&before.teacher) {
            row[s] = None;
        }
        if let Some(n) = self
            .counts
            .get_mut(class)
            .and_then(|m| m.get_mut(&before.subject))
        {
            *n -= 1;
        }

        self.by_teacher.entry(teacher.clone()).or_insert_with(empty_row)[s] = Some(i);
        *self
            .counts
            .entry(class.clone())
            .or_default()
            .entry(subject.clone())
            .or_default() += 1;
        self.entries[i].subject = subject;
        self.entries[i].teacher = teacher;
        Ok(before)
    }
}
