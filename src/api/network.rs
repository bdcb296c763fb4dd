//! Stellar network endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::stellar::{
    AccountInfo, ContractClientOptions, Environment, PaymentRecord, RpcHealth, TransactionRecord,
};
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub environment: Environment,
    pub contract_id: String,
    pub rpc_url: String,
    /// Present while a wallet is connected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_client: Option<ContractClientOptions>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub xdr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<String>,
}

/// GET /api/network - Environment plus contract client options for the session.
pub async fn network_info(State(state): State<AppState>) -> ApiResult<NetworkInfo> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let contract_client = match state.wallet.address().await {
        Some(address) => match state.stellar.contract_client(&address) {
            Ok(options) => Some(options),
            Err(e) => {
                tracing::warn!("Session address unusable for contract client: {}", e);
                None
            }
        },
        None => None,
    };

    let config = state.stellar.config();
    success(
        NetworkInfo {
            environment: state.stellar.environment(),
            contract_id: config.contract_id.clone(),
            rpc_url: config.rpc_url.clone(),
            contract_client,
        },
        revision_id,
    )
}

/// GET /api/network/health - Soroban RPC health.
pub async fn network_health(State(state): State<AppState>) -> ApiResult<RpcHealth> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.stellar.rpc_health().await {
        Ok(health) => success(health, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/accounts/{address}
pub async fn load_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<AccountInfo> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.stellar.load_account(&address).await {
        Ok(account) => success(account, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/accounts/{address}/transactions
pub async fn account_transactions(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Vec<TransactionRecord>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.stellar.transactions(&address).await {
        Ok(records) => success(records, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/accounts/{address}/payments
pub async fn account_payments(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> ApiResult<Vec<PaymentRecord>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.stellar.payments(&address).await {
        Ok(records) => success(records, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/transactions - Sign with the connected wallet, then submit.
pub async fn submit_transaction(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> ApiResult<SubmitResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if request.xdr.trim().is_empty() {
        return error(
            AppError::Validation("xdr is required".to_string()),
            revision_id,
        );
    }

    let signed = match state.wallet.sign_transaction(&request.xdr).await {
        Ok(signed) => signed,
        Err(e) => return error(e, revision_id),
    };

    match state.stellar.submit_transaction(&signed.signed_tx_xdr).await {
        Ok(hash) => success(
            SubmitResult {
                hash,
                signer_address: signed.signer_address,
            },
            revision_id,
        ),
        Err(e) => error(e, revision_id),
    }
}
