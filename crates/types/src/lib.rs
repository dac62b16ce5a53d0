use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

pub const DAYS_PER_WEEK: u8 = 6;
pub const PERIODS_PER_DAY: u8 = 8;
pub const PERIODS_PER_WEEK: u8 = DAYS_PER_WEEK * PERIODS_PER_DAY;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(SubjectId);
id_newtype!(TeacherId);
id_newtype!(ClassId);

impl ClassId {
    /// Leading digits of the id, e.g. `6` for "6A" and `11` for "11C".
    pub fn grade(&self) -> Option<u8> {
        let digits: String = self.0.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().ok()
    }

    /// Trailing section letter, upper-cased.
    pub fn section(&self) -> Option<char> {
        self.0
            .chars()
            .last()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_uppercase())
    }

    pub fn with_grade(&self, grade: u8) -> Option<ClassId> {
        self.section().map(|s| ClassId(format!("{grade}{s}")))
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Day {
    pub const ALL: [Day; DAYS_PER_WEEK as usize] =
        [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Day> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Mon => "mon",
            Day::Tue => "tue",
            Day::Wed => "wed",
            Day::Thu => "thu",
            Day::Fri => "fri",
            Day::Sat => "sat",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slot of the week: a day and a period number in `1..=8`.
///
/// Deserialization goes through [`Period::new`], so a period read from a
/// request is always inside the week.
#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, PartialOrd, Ord,
)]
#[serde(try_from = "RawPeriod")]
pub struct Period {
    pub day: Day,
    pub number: u8,
}

#[derive(Deserialize)]
struct RawPeriod {
    day: Day,
    number: u8,
}

impl TryFrom<RawPeriod> for Period {
    type Error = String;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        Period::new(raw.day, raw.number)
            .ok_or_else(|| format!("period number {} is outside 1..={PERIODS_PER_DAY}", raw.number))
    }
}

impl Period {
    pub fn new(day: Day, number: u8) -> Option<Period> {
        (1..=PERIODS_PER_DAY)
            .contains(&number)
            .then_some(Period { day, number })
    }

    /// False for a period built by hand with a number outside `1..=8`.
    pub fn in_week(self) -> bool {
        (1..=PERIODS_PER_DAY).contains(&self.number)
    }

    /// Week-wide index in `1..=48`: `day_ordinal * 8 + number`.
    pub fn index(self) -> u8 {
        self.day.ordinal() * PERIODS_PER_DAY + self.number
    }

    pub fn from_index(index: u8) -> Option<Period> {
        if !(1..=PERIODS_PER_WEEK).contains(&index) {
            return None;
        }
        let zero = index - 1;
        let day = Day::from_ordinal(zero / PERIODS_PER_DAY)?;
        Period::new(day, zero % PERIODS_PER_DAY + 1)
    }

    /// All 48 periods in index order.
    pub fn week() -> impl Iterator<Item = Period> {
        (1..=PERIODS_PER_WEEK).filter_map(Period::from_index)
    }

    pub fn is_first_of_day(self) -> bool {
        self.number == 1
    }

    pub fn next_in_day(self) -> Option<Period> {
        Period::new(self.day, self.number + 1)
    }

    pub fn prev_in_day(self) -> Option<Period> {
        self.number
            .checked_sub(1)
            .and_then(|n| Period::new(self.day, n))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.day, self.number)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    /// Prefers two consecutive periods.
    Block,
    #[default]
    Single,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Qualification {
    Prt,
    Tgt,
    Pgt,
    Misc,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    None,
    ClassTeacher,
    ActivityCoordinator,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    #[serde(default)]
    pub intensity: Intensity,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub subject: SubjectId,
    pub qualification: Qualification,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub serial: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct Class {
    pub id: ClassId,
    #[serde(default)]
    pub class_teacher: Option<TeacherId>,
    #[serde(default)]
    pub co_class_teacher: Option<TeacherId>,
}

impl Class {
    pub fn new(id: impl Into<ClassId>) -> Self {
        Self {
            id: id.into(),
            class_teacher: None,
            co_class_teacher: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct WeeklyQuota {
    pub grade: u8,
    pub subject: SubjectId,
    pub per_week: u32,
}

/// A subject cell of a class offering. `"PHY/BIO"` lists alternatives.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq)]
#[serde(transparent)]
pub struct OfferedSubject(pub String);

impl OfferedSubject {
    pub fn alternatives(&self) -> Vec<SubjectId> {
        self.0
            .split('/')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(SubjectId::from)
            .collect()
    }
}

impl From<&str> for OfferedSubject {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ClassOffering {
    pub class: ClassId,
    pub subjects: Vec<OfferedSubject>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ElectiveChoice {
    pub class: ClassId,
    pub subject: SubjectId,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Instance {
    pub subjects: Vec<Subject>,
    pub teachers: Vec<Teacher>,
    pub classes: Vec<Class>,
    pub offerings: Vec<ClassOffering>,
    pub quotas: Vec<WeeklyQuota>,
    #[serde(default)]
    pub electives: Vec<ElectiveChoice>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GradeBand {
    pub min_grade: u8,
    pub max_grade: u8,
    pub qualification: Qualification,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TierOverride {
    pub subject: SubjectId,
    pub qualification: Qualification,
}

/// Qualification filter applied by the load balancer. Empty means untiered.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Default)]
pub struct TierPolicy {
    #[serde(default)]
    pub bands: Vec<GradeBand>,
    #[serde(default)]
    pub overrides: Vec<TierOverride>,
}

impl TierPolicy {
    pub fn required(&self, grade: u8, subject: &SubjectId) -> Option<Qualification> {
        if let Some(o) = self.overrides.iter().find(|o| &o.subject == subject) {
            return Some(o.qualification);
        }
        self.bands
            .iter()
            .find(|b| (b.min_grade..=b.max_grade).contains(&grade))
            .map(|b| b.qualification)
    }
}

/// Campus-wide activity taught by each class teacher in fixed periods.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ActivityBlock {
    pub subject: SubjectId,
    #[serde(default = "ActivityBlock::default_periods")]
    pub periods: Vec<Period>,
}

impl ActivityBlock {
    pub fn default_periods() -> Vec<Period> {
        vec![
            Period { day: Day::Sat, number: 1 },
            Period { day: Day::Sat, number: 2 },
        ]
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleParams {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "ScheduleParams::default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "ScheduleParams::default_repair")]
    pub repair: bool,
    #[serde(default = "ScheduleParams::default_weekly_periods")]
    pub weekly_periods: u32,
    #[serde(default)]
    pub activity: Option<ActivityBlock>,
    #[serde(default)]
    pub tiers: TierPolicy,
}

impl ScheduleParams {
    fn default_max_attempts() -> u32 {
        3
    }
    fn default_repair() -> bool {
        true
    }
    fn default_weekly_periods() -> u32 {
        PERIODS_PER_WEEK as u32
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for ScheduleParams {
    fn default() -> Self {
        Self {
            seed: 0,
            max_attempts: Self::default_max_attempts(),
            repair: Self::default_repair(),
            weekly_periods: Self::default_weekly_periods(),
            activity: None,
            tiers: TierPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleEnvelope {
    pub instance: Instance,
    #[serde(default)]
    pub params: ScheduleParams,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct ClassSubjectAssignment {
    pub class: ClassId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct TimetableEntry {
    pub class: ClassId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub period: Period,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct SwapRecord {
    pub class: ClassId,
    /// Period handed to the under-assigned teacher.
    pub vacated: Period,
    pub new_teacher: TeacherId,
    pub new_subject: SubjectId,
    /// Open period the displaced lesson moved into.
    pub reassigned: Period,
    pub displaced_teacher: TeacherId,
    pub displaced_subject: SubjectId,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct Shortfall {
    pub class: ClassId,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub required: u32,
    pub assigned: u32,
    pub missing: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct QuotaIssue {
    pub grade: u8,
    pub total: u32,
    pub expected: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Violation {
    pub r#type: String,
    pub details: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct ScheduleResult {
    pub status: String,
    pub classes: Vec<Class>,
    pub assignments: Vec<ClassSubjectAssignment>,
    pub entries: Vec<TimetableEntry>,
    pub shortfalls: Vec<Shortfall>,
    pub swaps: Vec<SwapRecord>,
    pub quota_issues: Vec<QuotaIssue>,
    pub stats: serde_json::Value,
}
