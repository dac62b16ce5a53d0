//! Demo school generators, served by the API and used by the benchmark and
//! the scenario tests.

use types::{
    ActivityBlock, Class, ClassOffering, Instance, Intensity, Qualification, Role, ScheduleEnvelope,
    ScheduleParams, Subject, Teacher, WeeklyQuota,
};

/// Periods a demo teacher is expected to carry per week.
const TARGET_LOAD: u32 = 30;

pub const ACTIVITY_SUBJECT: &str = "CCA";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoData {
    Small,
    Large,
}

impl std::str::FromStr for DemoData {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SMALL" => Ok(DemoData::Small),
            "LARGE" => Ok(DemoData::Large),
            _ => Err(()),
        }
    }
}

impl DemoData {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemoData::Small => "SMALL",
            DemoData::Large => "LARGE",
        }
    }

    fn grades(&self) -> std::ops::RangeInclusive<u8> {
        match self {
            DemoData::Small => 6..=7,
            DemoData::Large => 6..=12,
        }
    }

    fn sections(&self) -> &'static [char] {
        match self {
            DemoData::Small => &['A', 'B'],
            DemoData::Large => &['A', 'B', 'C', 'D', 'E'],
        }
    }
}

pub fn list_demo_data() -> Vec<&'static str> {
    vec![DemoData::Small.as_str(), DemoData::Large.as_str()]
}

/// (id, name, intensity, periods per week). Sums to 48.
const CURRICULUM: &[(&str, &str, Intensity, u32)] = &[
    ("ENG", "English", Intensity::Single, 7),
    ("HIN", "Hindi", Intensity::Single, 6),
    ("MAT", "Mathematics", Intensity::Single, 8),
    ("SCI", "Science", Intensity::Block, 6),
    ("SST", "Social Studies", Intensity::Single, 7),
    ("SAN", "Sanskrit", Intensity::Single, 4),
    ("CS", "Computer Science", Intensity::Block, 2),
    ("PE", "Physical Education", Intensity::Single, 3),
    ("ART", "Art", Intensity::Single, 3),
    (ACTIVITY_SUBJECT, "Co-curricular Activity", Intensity::Single, 2),
];

pub fn generate(demo: DemoData) -> Instance {
    let grades: Vec<u8> = demo.grades().collect();
    let classes: Vec<Class> = grades
        .iter()
        .flat_map(|g| demo.sections().iter().map(move |s| Class::new(format!("{g}{s}").as_str())))
        .collect();
    let class_count = classes.len() as u32;

    let subjects = CURRICULUM
        .iter()
        .map(|&(id, name, intensity, _)| Subject {
            id: id.into(),
            name: name.to_string(),
            intensity,
        })
        .collect();

    let mut teachers = Vec::new();
    for &(id, name, _, per_week) in CURRICULUM {
        let (count, role) = if id == ACTIVITY_SUBJECT {
            (1, Role::ActivityCoordinator)
        } else {
            ((class_count * per_week).div_ceil(TARGET_LOAD).max(1), Role::None)
        };
        for n in 1..=count {
            teachers.push(Teacher {
                id: format!("{id}{n}").as_str().into(),
                name: format!("{name} teacher {n}"),
                subject: id.into(),
                qualification: Qualification::Tgt,
                role,
                serial: teachers.len() as u32 + 1,
            });
        }
    }

    let offerings = classes
        .iter()
        .map(|c| ClassOffering {
            class: c.id.clone(),
            subjects: CURRICULUM.iter().map(|&(id, ..)| id.into()).collect(),
        })
        .collect();

    let quotas = grades
        .iter()
        .flat_map(|&grade| {
            CURRICULUM.iter().map(move |&(id, _, _, per_week)| WeeklyQuota {
                grade,
                subject: id.into(),
                per_week,
            })
        })
        .collect();

    Instance {
        subjects,
        teachers,
        classes,
        offerings,
        quotas,
        electives: vec![],
    }
}

/// A demo school with the activity block on Saturday's first two periods.
pub fn envelope(demo: DemoData, seed: u64) -> ScheduleEnvelope {
    ScheduleEnvelope {
        instance: generate(demo),
        params: ScheduleParams {
            activity: Some(ActivityBlock {
                subject: ACTIVITY_SUBJECT.into(),
                periods: ActivityBlock::default_periods(),
            }),
            ..ScheduleParams::default().with_seed(seed)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_quotas_fill_the_week() {
        let inst = generate(DemoData::Small);
        assert_eq!(inst.classes.len(), 4);
        assert!(sched_core::validate(&inst).is_ok());
        assert!(sched_core::quota_inconsistencies(&inst, 48).is_empty());
        assert_eq!("large".parse::<DemoData>(), Ok(DemoData::Large));
        assert!(list_demo_data().iter().all(|id| id.parse::<DemoData>().is_ok()));
        assert_eq!(generate(DemoData::Large).classes.len(), 35);
    }
}
