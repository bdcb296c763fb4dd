//! Company dashboard aggregates.

use chrono::NaiveDate;
use serde::Serialize;

use super::metrics::{format_percentage, funding_percentage};
use crate::models::{CompanyDonation, CompanyStats, Project};

/// Yearly cap used by the tax deduction card.
pub const ANNUAL_DEDUCTION_LIMIT: u64 = 50_000;

/// Yearly giving goal used by the impact card.
pub const ANNUAL_DONATION_GOAL: u64 = 60_000;

/// Cumulative share of people helped reported per month.
const MONTHLY_IMPACT_SHARES: [(&str, f64); 6] = [
    ("Ene", 0.15),
    ("Feb", 0.25),
    ("Mar", 0.35),
    ("Abr", 0.5),
    ("May", 0.75),
    ("Jun", 1.0),
];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDeduction {
    pub accumulated: u64,
    pub annual_limit: u64,
    pub progress_percentage: String,
    /// Negative once the limit has been exceeded
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactProgress {
    pub annual_goal: u64,
    pub progress_percentage: String,
    pub monthly: Vec<MonthlyImpact>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyImpact {
    pub month: &'static str,
    pub people: u64,
}

/// A donation joined to the project it funded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationHistoryRow {
    pub donation_id: String,
    pub project_id: String,
    pub project_name: String,
    pub city: String,
    pub province: String,
    pub amount: u64,
    pub date: NaiveDate,
    pub tax_deductible: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDashboard {
    pub stats: CompanyStats,
    pub tax_deduction: TaxDeduction,
    pub impact: ImpactProgress,
    pub history: Vec<DonationHistoryRow>,
}

pub fn tax_deduction(stats: &CompanyStats) -> TaxDeduction {
    TaxDeduction {
        accumulated: stats.tax_deductions,
        annual_limit: ANNUAL_DEDUCTION_LIMIT,
        progress_percentage: format_percentage(funding_percentage(
            stats.tax_deductions,
            ANNUAL_DEDUCTION_LIMIT,
        )),
        remaining: ANNUAL_DEDUCTION_LIMIT as i64 - stats.tax_deductions as i64,
    }
}

pub fn monthly_impact(people_helped: u64) -> Vec<MonthlyImpact> {
    MONTHLY_IMPACT_SHARES
        .iter()
        .map(|(month, share)| MonthlyImpact {
            month,
            people: (people_helped as f64 * share).floor() as u64,
        })
        .collect()
}

pub fn impact_progress(stats: &CompanyStats) -> ImpactProgress {
    ImpactProgress {
        annual_goal: ANNUAL_DONATION_GOAL,
        progress_percentage: format_percentage(funding_percentage(
            stats.total_donated,
            ANNUAL_DONATION_GOAL,
        )),
        monthly: monthly_impact(stats.impact_metrics.people_helped),
    }
}

/// Join donations to projects. Donations naming an unknown project are skipped.
pub fn donation_history(
    donations: &[CompanyDonation],
    projects: &[Project],
) -> Vec<DonationHistoryRow> {
    donations
        .iter()
        .filter_map(|donation| {
            let Some(project) = projects.iter().find(|p| p.id == donation.project_id) else {
                tracing::debug!(
                    donation = %donation.id,
                    project = %donation.project_id,
                    "Skipping donation for unknown project"
                );
                return None;
            };
            Some(DonationHistoryRow {
                donation_id: donation.id.clone(),
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                city: project.location.city.clone(),
                province: project.location.province.clone(),
                amount: donation.amount,
                date: donation.date,
                tax_deductible: donation.tax_deductible,
            })
        })
        .collect()
}

pub fn company_dashboard(
    stats: &CompanyStats,
    donations: &[CompanyDonation],
    projects: &[Project],
) -> CompanyDashboard {
    CompanyDashboard {
        stats: stats.clone(),
        tax_deduction: tax_deduction(stats),
        impact: impact_progress(stats),
        history: donation_history(donations, projects),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::{COMPANY_DONATIONS, COMPANY_STATS, PROJECTS};

    #[test]
    fn test_tax_deduction_card() {
        let card = tax_deduction(&COMPANY_STATS);
        assert_eq!(card.accumulated, 13_680);
        assert_eq!(card.progress_percentage, "27.4");
        assert_eq!(card.remaining, 36_320);
    }

    #[test]
    fn test_impact_progress() {
        let impact = impact_progress(&COMPANY_STATS);
        assert_eq!(impact.progress_percentage, "76.0");
        let people: Vec<u64> = impact.monthly.iter().map(|m| m.people).collect();
        assert_eq!(people, vec![187, 312, 437, 625, 937, 1250]);
    }

    #[test]
    fn test_history_joins_projects() {
        let rows = donation_history(&COMPANY_DONATIONS, &PROJECTS);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].project_name, "Comedor Escolar San Martín");
        assert_eq!(rows[1].province, "Buenos Aires");
    }

    #[test]
    fn test_history_skips_unknown_project() {
        let mut donations = COMPANY_DONATIONS.clone();
        donations.push(CompanyDonation {
            id: "d9".to_string(),
            project_id: "404".to_string(),
            amount: 1,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            tax_deductible: false,
        });
        let rows = donation_history(&donations, &PROJECTS);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.donation_id != "d9"));
    }
}
