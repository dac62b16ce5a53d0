use axum::Json;
use sched_core::{
    catalog::{resolve_offerings, Catalog},
    quota_inconsistencies, validate,
};
use serde::Serialize;
use types::{Instance, QuotaIssue, PERIODS_PER_WEEK};

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
    /// Grades whose quotas do not fill the week. Never blocks a run.
    pub warnings: Vec<QuotaIssue>,
}

pub fn report(inst: &Instance) -> ValidationReport {
    let mut errors = match validate(inst) {
        Ok(()) => Vec::new(),
        Err(e) => e.messages(),
    };
    if errors.is_empty() {
        let catalog = Catalog::build(inst);
        if let Err(e) = catalog.check_quotas(&resolve_offerings(inst)) {
            errors.push(e.to_string());
        }
    }
    ValidationReport {
        ok: errors.is_empty(),
        errors,
        warnings: quota_inconsistencies(inst, PERIODS_PER_WEEK as u32),
    }
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = Instance,
    responses(
    (status = 200, description = "Validation result", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(inst): Json<Instance>) -> Json<ValidationReport> {
    Json(report(&inst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Class, ClassOffering, Intensity, Qualification, Role, Subject, Teacher, WeeklyQuota};

    fn instance() -> Instance {
        Instance {
            subjects: vec![Subject { id: "ENG".into(), name: "English".into(), intensity: Intensity::Single }],
            teachers: vec![Teacher {
                id: "E1".into(),
                name: "E. One".into(),
                subject: "ENG".into(),
                qualification: Qualification::Tgt,
                role: Role::None,
                serial: 1,
            }],
            classes: vec![Class::new("6A")],
            offerings: vec![ClassOffering { class: "6A".into(), subjects: vec!["ENG".into()] }],
            quotas: vec![WeeklyQuota { grade: 6, subject: "ENG".into(), per_week: 48 }],
            electives: vec![],
        }
    }

    #[test]
    fn clean_instance_has_no_findings() {
        let r = report(&instance());
        assert!(r.ok);
        assert!(r.errors.is_empty() && r.warnings.is_empty());
    }

    #[test]
    fn missing_quota_is_an_error_and_short_week_a_warning() {
        let mut inst = instance();
        inst.quotas[0].grade = 7;
        inst.quotas[0].per_week = 40;
        let r = report(&inst);
        assert!(!r.ok);
        assert_eq!(r.errors, vec!["no weekly quota for grade 6 - ENG".to_string()]);
        assert_eq!(r.warnings, vec![QuotaIssue { grade: 7, total: 40, expected: 48 }]);
    }
}
