//! Company dashboard models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated social impact of a company's giving.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMetrics {
    pub people_helped: u64,
    pub communities_reached: u32,
    /// Sustainable Development Goal labels
    pub sdg_goals: Vec<String>,
}

/// Totals shown on the company dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStats {
    pub total_donated: u64,
    pub projects_supported: u32,
    pub tax_deductions: u64,
    pub impact_metrics: ImpactMetrics,
}

/// One donation made by the company.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDonation {
    pub id: String,
    pub project_id: String,
    pub amount: u64,
    pub date: NaiveDate,
    pub tax_deductible: bool,
}
