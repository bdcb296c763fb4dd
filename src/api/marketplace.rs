//! Marketplace ledger endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::models::{
    decimal, AddUpdateRequest, CreateProjectRequest, DonateRequest, MarketDonation,
    MarketLocation, MarketMilestone, MarketProject, MarketStats, MarketSummary, MarketUpdate,
    OwnerRequest, SetImpactRequest,
};
use crate::AppState;

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Cursor pagination: items strictly after `start_after`.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub start_after: u64,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageQuery {
    fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedProject {
    #[serde(with = "decimal")]
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub struct DonationReceipt {
    #[serde(with = "decimal")]
    pub seq: u64,
}

#[derive(Debug, Serialize)]
pub struct ImpactCount {
    #[serde(with = "decimal")]
    pub impacted_people: i128,
}

#[derive(Debug, Serialize)]
pub struct TextValue {
    pub value: String,
}

/// POST /api/marketplace/projects
pub async fn create_market_project(
    State(state): State<AppState>,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<CreatedProject> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.create_project(&request).await {
        Ok(id) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(CreatedProject { id }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects?start_after=&limit=
pub async fn list_market_projects(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<MarketProject>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.list_projects(page.start_after, page.limit()).await {
        Ok(projects) => success(projects, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}
pub async fn get_market_project(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MarketProject> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_project(id).await {
        Ok(project) => success(project, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/marketplace/projects/{id}/donations
pub async fn donate(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<DonateRequest>,
) -> ApiResult<DonationReceipt> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .market
        .donate(id, &request.donor, request.amount, request.timestamp)
        .await
    {
        Ok(seq) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(DonationReceipt { seq }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}/donations?start_after=&limit=
pub async fn list_market_donations(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<MarketDonation>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .market
        .list_donations(id, page.start_after, page.limit())
        .await
    {
        Ok(donations) => success(donations, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/marketplace/projects/{id}/updates - Owner only.
pub async fn add_market_update(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<AddUpdateRequest>,
) -> ApiResult<Vec<MarketUpdate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let added = state
        .market
        .add_update(
            id,
            &request.owner,
            &request.title,
            &request.body,
            request.timestamp,
        )
        .await;
    if let Err(e) = added {
        return error(e, revision_id);
    }

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    match state.market.list_updates(id).await {
        Ok(updates) => success(updates, new_revision),
        Err(e) => error(e, new_revision),
    }
}

/// GET /api/marketplace/projects/{id}/updates
pub async fn list_market_updates(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<MarketUpdate>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.list_updates(id).await {
        Ok(updates) => success(updates, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}/milestones
pub async fn list_market_milestones(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<Vec<MarketMilestone>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.list_milestones(id).await {
        Ok(milestones) => success(milestones, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/marketplace/projects/{id}/milestones/{index}/complete - Owner only.
pub async fn complete_market_milestone(
    State(state): State<AppState>,
    Path((id, index)): Path<(u64, u32)>,
    Json(request): Json<OwnerRequest>,
) -> ApiResult<Vec<MarketMilestone>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = state
        .market
        .complete_milestone(id, &request.owner, index)
        .await
    {
        return error(e, revision_id);
    }

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    match state.market.list_milestones(id).await {
        Ok(milestones) => success(milestones, new_revision),
        Err(e) => error(e, new_revision),
    }
}

/// GET /api/marketplace/projects/{id}/summary
pub async fn market_summary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MarketSummary> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_summary(id).await {
        Ok(summary) => success(summary, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}/stats
pub async fn market_stats(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MarketStats> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_dashboard_stats(id).await {
        Ok(stats) => success(stats, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}/location
pub async fn market_location(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<MarketLocation> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_location(id).await {
        Ok(location) => success(location, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}/impact-area
pub async fn market_impact_area(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<TextValue> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_impact_area(id).await {
        Ok(value) => success(TextValue { value }, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}/problem-statement
pub async fn market_problem_statement(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<TextValue> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_problem_statement(id).await {
        Ok(value) => success(TextValue { value }, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/marketplace/projects/{id}/impact - Owner only.
pub async fn set_impacted_people(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(request): Json<SetImpactRequest>,
) -> ApiResult<ImpactCount> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .market
        .set_impacted_people(id, &request.owner, request.impacted_people)
        .await
    {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(
                ImpactCount {
                    impacted_people: request.impacted_people,
                },
                new_revision,
            )
        }
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/projects/{id}/impact
pub async fn get_impacted_people(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> ApiResult<ImpactCount> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_impacted_people(id).await {
        Ok(impacted_people) => success(ImpactCount { impacted_people }, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/marketplace/donors/{donor}/impact
pub async fn get_donor_impacted_people(
    State(state): State<AppState>,
    Path(donor): Path<String>,
) -> ApiResult<ImpactCount> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.market.get_donor_impacted_people(&donor).await {
        Ok(impacted_people) => success(ImpactCount { impacted_people }, revision_id),
        Err(e) => error(e, revision_id),
    }
}
