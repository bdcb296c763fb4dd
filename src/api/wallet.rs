//! Wallet session endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::wallet::{SessionStatus, SignedTransaction, WalletError, CONNECT_FAILED_MESSAGE};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SignRequest {
    pub xdr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResult {
    pub cancelled: bool,
    pub status: SessionStatus,
}

/// GET /api/wallet
pub async fn wallet_status(State(state): State<AppState>) -> ApiResult<SessionStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);
    success(state.wallet.status().await, revision_id)
}

/// POST /api/wallet/connect - Runs the whole connection flow.
///
/// Failures are logged with their cause; callers only see the generic message.
pub async fn connect_wallet(State(state): State<AppState>) -> ApiResult<SessionStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.wallet.connect().await {
        Ok(status) => success(status, revision_id),
        Err(WalletError::Store(msg)) => error(WalletError::Store(msg), revision_id),
        Err(_) => error(
            AppError::Wallet(CONNECT_FAILED_MESSAGE.to_string()),
            revision_id,
        ),
    }
}

/// POST /api/wallet/cancel
pub async fn cancel_wallet_connect(State(state): State<AppState>) -> ApiResult<CancelResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let cancelled = state.wallet.cancel_connect().await;
    if cancelled {
        tracing::info!("Wallet connection cancelled");
    }
    success(
        CancelResult {
            cancelled,
            status: state.wallet.status().await,
        },
        revision_id,
    )
}

/// POST /api/wallet/disconnect
pub async fn disconnect_wallet(State(state): State<AppState>) -> ApiResult<SessionStatus> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.wallet.disconnect().await {
        Ok(status) => success(status, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/wallet/sign - Have the connected wallet sign an envelope.
pub async fn sign_transaction(
    State(state): State<AppState>,
    Json(request): Json<SignRequest>,
) -> ApiResult<SignedTransaction> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.xdr.trim().is_empty() {
        return error(
            AppError::Validation("xdr is required".to_string()),
            revision_id,
        );
    }

    match state.wallet.sign_transaction(&request.xdr).await {
        Ok(signed) => success(signed, revision_id),
        Err(e) => error(e, revision_id),
    }
}
