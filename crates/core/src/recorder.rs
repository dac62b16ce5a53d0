//! Write-behind seam for downstream reporting: one row per class/subject
//! assignment and one row per committed timetable entry.

use types::{ClassSubjectAssignment, ScheduleResult, TimetableEntry};

pub trait Recorder {
    fn assignment(&mut self, row: &ClassSubjectAssignment);
    fn entry(&mut self, row: &TimetableEntry);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryRecorder {
    pub assignments: Vec<ClassSubjectAssignment>,
    pub entries: Vec<TimetableEntry>,
}

impl Recorder for MemoryRecorder {
    fn assignment(&mut self, row: &ClassSubjectAssignment) {
        self.assignments.push(row.clone());
    }

    fn entry(&mut self, row: &TimetableEntry) {
        self.entries.push(row.clone());
    }
}

/// Replays a finished run into `recorder`, assignments first.
pub fn record_result(result: &ScheduleResult, recorder: &mut dyn Recorder) {
    for a in &result.assignments {
        recorder.assignment(a);
    }
    for e in &result.entries {
        recorder.entry(e);
    }
}
