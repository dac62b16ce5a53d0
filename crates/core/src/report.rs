use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use types::{
    ClassId, ClassSubjectAssignment, Day, Period, Shortfall, SubjectId, TimetableEntry, Violation,
    PERIODS_PER_DAY,
};
use utoipa::ToSchema;

use crate::{Catalog, Timetable};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DayRow {
    pub day: Day,
    pub cells: Vec<Option<String>>,
}

/// A week laid out as 6 day rows of 8 period cells, for one class or teacher.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct WeekGrid {
    pub owner: String,
    pub days: Vec<DayRow>,
}

impl WeekGrid {
    fn empty(owner: String) -> Self {
        Self {
            owner,
            days: Day::ALL
                .iter()
                .map(|&day| DayRow {
                    day,
                    cells: vec![None; PERIODS_PER_DAY as usize],
                })
                .collect(),
        }
    }

    fn set(&mut self, period: Period, value: String) {
        let cell = self
            .days
            .get_mut(period.day.ordinal() as usize)
            .and_then(|row| row.cells.get_mut((period.number as usize).checked_sub(1)?));
        if let Some(cell) = cell {
            *cell = Some(value);
        }
    }

    /// Header row `Day,1..8` followed by one row per day.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.days.len() + 1);
        let mut header = vec!["Day".to_string()];
        header.extend((1..=PERIODS_PER_DAY).map(|n| n.to_string()));
        rows.push(header);
        for d in &self.days {
            let mut row = vec![day_label(d.day).to_string()];
            row.extend(d.cells.iter().map(|c| c.clone().unwrap_or_default()));
            rows.push(row);
        }
        rows
    }

    pub fn render(&self) -> String {
        let mut out = format!("--- {} ---\n", self.owner);
        for row in self.rows() {
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

fn day_label(day: Day) -> &'static str {
    match day {
        Day::Mon => "Mon",
        Day::Tue => "Tue",
        Day::Wed => "Wed",
        Day::Thu => "Thu",
        Day::Fri => "Fri",
        Day::Sat => "Sat",
    }
}

/// One grid per class, sorted by class id. Cells read `SUBJECT (TEACHER)`.
pub fn class_grids(entries: &[TimetableEntry]) -> Vec<WeekGrid> {
    let mut grids: BTreeMap<&str, WeekGrid> = BTreeMap::new();
    for e in entries {
        grids
            .entry(e.class.0.as_str())
            .or_insert_with(|| WeekGrid::empty(e.class.to_string()))
            .set(e.period, format!("{} ({})", e.subject, e.teacher));
    }
    grids.into_values().collect()
}

/// One grid per teacher, sorted by teacher id. Cells hold the class taught.
pub fn teacher_grids(entries: &[TimetableEntry]) -> Vec<WeekGrid> {
    let mut grids: BTreeMap<&str, WeekGrid> = BTreeMap::new();
    for e in entries {
        grids
            .entry(e.teacher.0.as_str())
            .or_insert_with(|| WeekGrid::empty(e.teacher.to_string()))
            .set(e.period, e.class.to_string());
    }
    grids.into_values().collect()
}

fn shortfall_rows(
    catalog: &Catalog,
    assignments: &[ClassSubjectAssignment],
    count: impl Fn(&ClassId, &SubjectId) -> u32,
) -> Vec<Shortfall> {
    assignments
        .iter()
        .filter_map(|a| {
            let required = catalog.quota_for(&a.class, &a.subject).ok()?;
            let assigned = count(&a.class, &a.subject);
            (assigned < required).then(|| Shortfall {
                class: a.class.clone(),
                subject: a.subject.clone(),
                teacher: a.teacher.clone(),
                required,
                assigned,
                missing: required - assigned,
            })
        })
        .collect()
}

/// (class, subject) pairs below quota in the current timetable.
pub fn shortfalls(
    catalog: &Catalog,
    assignments: &[ClassSubjectAssignment],
    timetable: &Timetable,
) -> Vec<Shortfall> {
    shortfall_rows(catalog, assignments, |c, s| timetable.assigned_count(c, s))
}

#[derive(Clone, Debug, Default, Serialize, ToSchema)]
pub struct Audit {
    pub violations: Vec<Violation>,
    pub shortfalls: Vec<Shortfall>,
    pub missing_total: u32,
}

/// Checks an externally supplied entry set: double bookings of classes or
/// teachers, and quota shortfalls of the given assignments.
pub fn audit(
    catalog: &Catalog,
    assignments: &[ClassSubjectAssignment],
    entries: &[TimetableEntry],
) -> Audit {
    let mut violations = Vec::new();
    let mut class_slots: HashMap<(&ClassId, Period), &TimetableEntry> = HashMap::new();
    let mut teacher_slots: HashMap<(&str, Period), &TimetableEntry> = HashMap::new();
    let mut counts: HashMap<(&ClassId, &SubjectId), u32> = HashMap::new();

    for e in entries {
        if let Some(prev) = class_slots.insert((&e.class, e.period), e) {
            violations.push(Violation {
                r#type: "class_double_booking".into(),
                details: serde_json::json!({
                    "class": e.class,
                    "period": e.period.to_string(),
                    "teachers": [prev.teacher, e.teacher],
                }),
            });
        }
        if let Some(prev) = teacher_slots.insert((e.teacher.0.as_str(), e.period), e) {
            violations.push(Violation {
                r#type: "teacher_double_booking".into(),
                details: serde_json::json!({
                    "teacher": e.teacher,
                    "period": e.period.to_string(),
                    "classes": [prev.class, e.class],
                }),
            });
        }
        *counts.entry((&e.class, &e.subject)).or_default() += 1;
    }

    let shortfalls = shortfall_rows(catalog, assignments, |c, s| {
        counts.get(&(c, s)).copied().unwrap_or(0)
    });
    let missing_total = shortfalls.iter().map(|s| s.missing).sum();
    Audit {
        violations,
        shortfalls,
        missing_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Class, Instance, WeeklyQuota};

    fn entry(class: &str, subject: &str, teacher: &str, day: Day, n: u8) -> TimetableEntry {
        TimetableEntry {
            class: class.into(),
            subject: subject.into(),
            teacher: teacher.into(),
            period: Period::new(day, n).unwrap(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::build(&Instance {
            subjects: vec![],
            teachers: vec![],
            classes: vec![Class::new("6A"), Class::new("6B")],
            offerings: vec![],
            quotas: vec![WeeklyQuota { grade: 6, subject: "ENG".into(), per_week: 3 }],
            electives: vec![],
        })
    }

    #[test]
    fn class_grid_renders_day_rows() {
        let entries = vec![
            entry("6A", "ENG", "AB", Day::Mon, 1),
            entry("6A", "MAT", "CD", Day::Mon, 2),
            entry("6A", "ENG", "AB", Day::Sat, 8),
        ];
        let grids = class_grids(&entries);
        assert_eq!(grids.len(), 1);
        insta::assert_snapshot!(grids[0].render(), @r###"
        --- 6A ---
        Day,1,2,3,4,5,6,7,8
        Mon,ENG (AB),MAT (CD),,,,,,
        Tue,,,,,,,,
        Wed,,,,,,,,
        Thu,,,,,,,,
        Fri,,,,,,,,
        Sat,,,,,,,,ENG (AB)
        "###);
    }

    #[test]
    fn grid_ignores_hand_built_periods_outside_the_week() {
        let mut stray = entry("6A", "ENG", "AB", Day::Sat, 8);
        stray.period.number = 9;
        let grids = class_grids(&[stray, entry("6A", "MAT", "CD", Day::Mon, 1)]);
        let filled: usize = grids[0].days.iter().map(|d| d.cells.iter().flatten().count()).sum();
        assert_eq!(filled, 1);
    }

    #[test]
    fn teacher_grids_are_sorted_and_hold_classes() {
        let entries = vec![
            entry("6B", "MAT", "CD", Day::Wed, 4),
            entry("6A", "ENG", "AB", Day::Mon, 1),
        ];
        let grids = teacher_grids(&entries);
        let owners: Vec<_> = grids.iter().map(|g| g.owner.as_str()).collect();
        assert_eq!(owners, vec!["AB", "CD"]);
        assert_eq!(grids[1].days[2].cells[3].as_deref(), Some("6B"));
        assert_eq!(grids[1].rows()[3][4], "6B");
    }

    #[test]
    fn shortfalls_follow_timetable_counts() {
        let cat = catalog();
        let assignments = vec![ClassSubjectAssignment {
            class: "6A".into(),
            subject: "ENG".into(),
            teacher: "AB".into(),
        }];
        let tt = Timetable::from_entries(vec![entry("6A", "ENG", "AB", Day::Mon, 1)]).unwrap();
        let s = shortfalls(&cat, &assignments, &tt);
        assert_eq!(s.len(), 1);
        assert_eq!((s[0].required, s[0].assigned, s[0].missing), (3, 1, 2));
    }

    #[test]
    fn audit_flags_double_bookings() {
        let cat = catalog();
        let assignments = vec![ClassSubjectAssignment {
            class: "6A".into(),
            subject: "ENG".into(),
            teacher: "AB".into(),
        }];
        let entries = vec![
            entry("6A", "ENG", "AB", Day::Mon, 1),
            entry("6A", "ENG", "XY", Day::Mon, 1),
            entry("6B", "ENG", "AB", Day::Mon, 1),
            entry("6A", "ENG", "AB", Day::Tue, 1),
        ];
        let a = audit(&cat, &assignments, &entries);
        let kinds: Vec<_> = a.violations.iter().map(|v| v.r#type.as_str()).collect();
        assert_eq!(kinds, vec!["class_double_booking", "teacher_double_booking"]);
        assert!(a.shortfalls.is_empty());
        assert_eq!(a.missing_total, 0);
    }
}
