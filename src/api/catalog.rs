//! Project catalog endpoints.

use axum::extract::{Path, Query, State};
use chrono::Local;
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::catalog::{self, filter::results_label, fixtures, metrics, CatalogSummary, ProjectFilter};
use crate::errors::AppError;
use crate::models::ProjectView;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListing {
    pub projects: Vec<ProjectView>,
    pub count: usize,
    pub label: String,
    pub has_active_filters: bool,
}

#[derive(Debug, Serialize)]
pub struct FilterOptions {
    pub categories: Vec<&'static str>,
    pub provinces: Vec<&'static str>,
}

/// GET /api/projects - Filtered listing, fixture order preserved.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(filter): Query<ProjectFilter>,
) -> ApiResult<ProjectListing> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    let today = Local::now().date_naive();

    let projects: Vec<ProjectView> = catalog::filter_projects(&fixtures::PROJECTS, &filter)
        .into_iter()
        .map(|p| metrics::project_view(p, today))
        .collect();

    success(
        ProjectListing {
            count: projects.len(),
            label: results_label(projects.len(), &filter),
            has_active_filters: filter.has_active_filters(),
            projects,
        },
        revision_id,
    )
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ProjectView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match catalog::find_project(&fixtures::PROJECTS, &id) {
        Some(project) => success(
            metrics::project_view(project, Local::now().date_naive()),
            revision_id,
        ),
        None => error(
            AppError::NotFound(format!("Project {} not found", id)),
            revision_id,
        ),
    }
}

/// GET /api/catalog/summary
pub async fn catalog_summary(State(state): State<AppState>) -> ApiResult<CatalogSummary> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(catalog::summary(&fixtures::PROJECTS), revision_id)
}

/// GET /api/catalog/filters
pub async fn catalog_filters(State(state): State<AppState>) -> ApiResult<FilterOptions> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(
        FilterOptions {
            categories: fixtures::CATEGORIES.to_vec(),
            provinces: fixtures::PROVINCES.to_vec(),
        },
        revision_id,
    )
}
