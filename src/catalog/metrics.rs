//! Display values derived from stored project fields.

use chrono::NaiveDate;

use crate::models::{Project, ProjectView};

/// `current / target * 100`, 0 when the target is 0.
pub fn funding_percentage(current: u64, target: u64) -> f64 {
    if target == 0 {
        return 0.0;
    }
    current as f64 / target as f64 * 100.0
}

/// One decimal place, the way progress bars label it.
pub fn format_percentage(value: f64) -> String {
    format!("{:.1}", value)
}

/// Whole days until the deadline; past deadlines count as zero.
pub fn days_remaining(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days().max(0)
}

pub fn project_view(project: &Project, today: NaiveDate) -> ProjectView {
    let percentage = funding_percentage(project.current_amount, project.target_amount);
    ProjectView {
        project: project.clone(),
        funding_percentage: percentage,
        funding_percentage_label: format_percentage(percentage),
        days_remaining: days_remaining(project.deadline, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::PROJECTS;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_project_one_percentage() {
        let project = &PROJECTS[0];
        let pct = funding_percentage(project.current_amount, project.target_amount);
        assert!((pct - 61.666_666).abs() < 1e-3);
        assert_eq!(format_percentage(pct), "61.7");
    }

    #[test]
    fn test_percentage_for_every_fixture() {
        let labels: Vec<String> = PROJECTS
            .iter()
            .map(|p| format_percentage(funding_percentage(p.current_amount, p.target_amount)))
            .collect();
        assert_eq!(labels, vec!["61.7", "49.2", "58.3"]);
    }

    #[test]
    fn test_zero_target() {
        assert_eq!(funding_percentage(100, 0), 0.0);
    }

    #[test]
    fn test_days_remaining() {
        assert_eq!(days_remaining(day(2025, 12, 15), day(2025, 12, 1)), 14);
        assert_eq!(days_remaining(day(2025, 12, 15), day(2025, 12, 15)), 0);
        assert_eq!(days_remaining(day(2025, 12, 15), day(2026, 1, 1)), 0);
    }

    #[test]
    fn test_project_view_serializes_flat() {
        let view = project_view(&PROJECTS[0], day(2025, 9, 17));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["fundingPercentageLabel"], "61.7");
        assert_eq!(json["daysRemaining"], 89);
        assert_eq!(json["location"]["province"], "Salta");
    }
}
