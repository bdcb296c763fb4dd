//! Donation wizard endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::catalog::{self, fixtures};
use crate::errors::AppError;
use crate::wizard::{PaymentMethod, WizardView};
use crate::AppState;

/// Either a suggested amount or free-form text.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub custom: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
}

/// POST /api/projects/{id}/wizard - Start a donation for a project.
pub async fn start_wizard(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<WizardView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let Some(project) = catalog::find_project(&fixtures::PROJECTS, &project_id) else {
        return error(
            AppError::NotFound(format!("Project {} not found", project_id)),
            revision_id,
        );
    };

    let view = state.wizards.create(project).await;
    tracing::debug!(wizard = %view.id, project = %project_id, "Donation wizard started");
    success(view, revision_id)
}

/// GET /api/wizards/{id}
pub async fn get_wizard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WizardView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.wizards.get(&id).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/wizards/{id}/amount - Pick or type an amount, then continue to payment.
pub async fn submit_amount(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<AmountRequest>,
) -> ApiResult<WizardView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.amount.is_none() && request.custom.is_none() {
        return error(
            AppError::Validation("Either amount or custom is required".to_string()),
            revision_id,
        );
    }

    let result = state
        .wizards
        .update(&id, |wizard| {
            match (request.amount, request.custom.as_deref()) {
                (Some(amount), _) => wizard.select_amount(amount)?,
                (None, Some(text)) => wizard.enter_custom_amount(text)?,
                (None, None) => {}
            }
            wizard.proceed_to_payment()
        })
        .await;

    match result {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/wizards/{id}/payment
pub async fn select_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<WizardView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .wizards
        .update(&id, |wizard| wizard.select_payment_method(request.method))
        .await
    {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/wizards/{id}/back
pub async fn go_back(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WizardView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .wizards
        .update(&id, |wizard| {
            wizard.go_back();
            Ok(())
        })
        .await
    {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/wizards/{id}/confirm - Start settlement; poll GET for the outcome.
pub async fn confirm_donation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WizardView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .wizards
        .confirm(
            &id,
            state.settlement.clone(),
            state.config.settlement_timeout(),
        )
        .await
    {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/wizards/{id}/reset
pub async fn reset_wizard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<WizardView> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state
        .wizards
        .update(&id, |wizard| {
            wizard.reset();
            Ok(())
        })
        .await
    {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/wizards/{id} - Abandon a wizard.
pub async fn discard_wizard(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<bool> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if state.wizards.remove(&id).await {
        success(true, revision_id)
    } else {
        error(
            AppError::NotFound(format!("Wizard {} not found", id)),
            revision_id,
        )
    }
}
