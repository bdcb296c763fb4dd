//! Company dashboard endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::catalog::dashboard::{self, CompanyDashboard, DonationHistoryRow};
use crate::catalog::fixtures::{COMPANY_DONATIONS, COMPANY_STATS, PROJECTS};
use crate::AppState;

/// GET /api/company/dashboard
pub async fn company_dashboard(State(state): State<AppState>) -> ApiResult<CompanyDashboard> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(
        dashboard::company_dashboard(&COMPANY_STATS, &COMPANY_DONATIONS, &PROJECTS),
        revision_id,
    )
}

/// GET /api/company/donations
pub async fn company_donations(
    State(state): State<AppState>,
) -> ApiResult<Vec<DonationHistoryRow>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(
        dashboard::donation_history(&COMPANY_DONATIONS, &PROJECTS),
        revision_id,
    )
}
