//! Horizon / Soroban RPC client.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use super::types::{Page, Problem, RpcRequest, RpcResponse, SubmitResponse};
use super::{
    AccountInfo, ContractClientOptions, Environment, NetworkConfig, PaymentRecord, RpcHealth,
    StellarError, TransactionRecord,
};

/// Pass-through client for the configured network. No retries, no caching.
#[derive(Clone)]
pub struct StellarService {
    client: Client,
    config: NetworkConfig,
}

impl StellarService {
    pub fn new(config: NetworkConfig, timeout: Duration) -> Result<Self, StellarError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("trace-backend/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StellarError::Request {
                url: config.horizon_url.clone(),
                source: e,
            })?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        Environment {
            rpc: self.config.horizon_url.clone(),
            network_passphrase: self.config.network_passphrase.clone(),
        }
    }

    /// Options for a contract client acting on behalf of `public_key`.
    pub fn contract_client(&self, public_key: &str) -> Result<ContractClientOptions, StellarError> {
        validate_account_id(public_key)?;
        Ok(ContractClientOptions {
            contract_id: self.config.contract_id.clone(),
            rpc_url: self.config.rpc_url.clone(),
            network_passphrase: self.config.network_passphrase.clone(),
            public_key: public_key.to_string(),
        })
    }

    pub async fn load_account(&self, address: &str) -> Result<AccountInfo, StellarError> {
        validate_account_id(address)?;
        self.get_json(&format!("accounts/{}", address)).await
    }

    pub async fn transactions(&self, address: &str) -> Result<Vec<TransactionRecord>, StellarError> {
        validate_account_id(address)?;
        let page: Page<TransactionRecord> = self
            .get_json(&format!("accounts/{}/transactions", address))
            .await?;
        Ok(page.embedded.records)
    }

    pub async fn payments(&self, address: &str) -> Result<Vec<PaymentRecord>, StellarError> {
        validate_account_id(address)?;
        let page: Page<PaymentRecord> = self
            .get_json(&format!("accounts/{}/payments", address))
            .await?;
        Ok(page.embedded.records)
    }

    /// Submit a wallet-signed envelope and return its hash.
    pub async fn submit_transaction(&self, signed_xdr: &str) -> Result<String, StellarError> {
        let signed_xdr = signed_xdr.trim();
        if signed_xdr.is_empty() {
            return Err(StellarError::InvalidInput(
                "transaction envelope is empty".to_string(),
            ));
        }

        let url = self.horizon_url("transactions");
        let response = self
            .client
            .post(&url)
            .form(&[("tx", signed_xdr)])
            .send()
            .await
            .map_err(|e| StellarError::Request {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let problem: Problem = response.json().await.unwrap_or_default();
            let err = StellarError::Submission {
                status: status.as_u16(),
                title: problem
                    .title
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
                detail: problem.detail,
                result_codes: problem.extras.and_then(|e| e.result_codes),
            };
            tracing::error!("Error submitting transaction: {}", err);
            return Err(err);
        }

        let body: SubmitResponse = decode(&url, response).await?;
        tracing::info!("Transaction submitted: {}", body.hash);
        Ok(body.hash)
    }

    /// Soroban RPC `getHealth`.
    pub async fn rpc_health(&self) -> Result<RpcHealth, StellarError> {
        self.rpc_call("getHealth").await
    }

    async fn rpc_call<T: DeserializeOwned>(&self, method: &str) -> Result<T, StellarError> {
        let url = self.config.rpc_url.clone();
        let response = self
            .client
            .post(&url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id: 1,
                method,
            })
            .send()
            .await
            .map_err(|e| StellarError::Request {
                url: url.clone(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(StellarError::Status {
                url,
                status: status.as_u16(),
                detail: response.text().await.ok(),
            });
        }

        let body: RpcResponse<T> = decode(&url, response).await?;
        match (body.result, body.error) {
            (_, Some(err)) => Err(StellarError::Rpc {
                code: err.code,
                message: err.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(StellarError::Decode {
                url,
                message: "response carries neither result nor error".to_string(),
            }),
        }
    }

    fn horizon_url(&self, path: &str) -> String {
        format!("{}/{}", self.config.horizon_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, StellarError> {
        let url = self.horizon_url(path);
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StellarError::Request {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let problem: Problem = response.json().await.unwrap_or_default();
            return Err(StellarError::Status {
                url,
                status: status.as_u16(),
                detail: problem.detail.or(problem.title),
            });
        }
        decode(&url, response).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T, StellarError> {
    let bytes = response.bytes().await.map_err(|e| StellarError::Request {
        url: url.to_string(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| StellarError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Account ids are interpolated into URLs, so only plain alphanumerics pass.
fn validate_account_id(address: &str) -> Result<(), StellarError> {
    if address.is_empty() || !address.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StellarError::InvalidInput(format!(
            "invalid account id: {:?}",
            address
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::StatusCode,
        routing::{get, post},
        Form, Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    const ACCOUNT: &str = "GDTRACEMOCKWALLETADDRESSFORLOCALDEVELOPMENTONLY234567ABC";

    async fn account(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
        if id != ACCOUNT {
            return Err((
                StatusCode::NOT_FOUND,
                Json(json!({ "title": "Resource Missing", "detail": "not found" })),
            ));
        }
        Ok(Json(json!({
            "id": id,
            "account_id": id,
            "sequence": "123456789",
            "subentry_count": 0,
            "balances": [{ "balance": "10000.0000000", "asset_type": "native" }]
        })))
    }

    async fn transactions(Path(_id): Path<String>) -> Json<Value> {
        Json(json!({
            "_embedded": { "records": [{
                "id": "t1",
                "hash": "abc",
                "ledger": 42,
                "created_at": "2025-06-01T00:00:00Z",
                "source_account": ACCOUNT,
                "fee_charged": 100,
                "operation_count": 1,
                "successful": true
            }]}
        }))
    }

    async fn payments(Path(_id): Path<String>) -> Json<Value> {
        Json(json!({
            "_embedded": { "records": [{
                "id": "p1",
                "type": "payment",
                "created_at": "2025-06-01T00:00:00Z",
                "transaction_hash": "abc",
                "source_account": ACCOUNT,
                "from": ACCOUNT,
                "to": "GOTHER",
                "amount": "25.0000000",
                "asset_type": "native"
            }]}
        }))
    }

    async fn submit(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
        match form.get("tx").map(String::as_str) {
            Some("GOOD") => (StatusCode::OK, Json(json!({ "hash": "deadbeef" }))),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "title": "Transaction Failed",
                    "detail": "The transaction failed when submitted to the stellar network.",
                    "extras": { "result_codes": { "transaction": "tx_bad_seq" } }
                })),
            ),
        }
    }

    async fn rpc(Json(body): Json<Value>) -> Json<Value> {
        assert_eq!(body["method"], "getHealth");
        Json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "status": "healthy", "latestLedger": 100, "oldestLedger": 1, "ledgerRetentionWindow": 17280 }
        }))
    }

    async fn stub_service() -> StellarService {
        let app = Router::new()
            .route("/accounts/{id}", get(account))
            .route("/accounts/{id}/transactions", get(transactions))
            .route("/accounts/{id}/payments", get(payments))
            .route("/transactions", post(submit))
            .route("/rpc", post(rpc));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = NetworkConfig {
            horizon_url: format!("http://{}", addr),
            rpc_url: format!("http://{}/rpc", addr),
            ..NetworkConfig::testnet()
        };
        StellarService::new(config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_load_account() {
        let service = stub_service().await;
        let account = service.load_account(ACCOUNT).await.unwrap();
        assert_eq!(account.sequence, "123456789");
        assert_eq!(account.balances[0].asset_type, "native");
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let service = stub_service().await;
        let err = service.load_account("GMISSING").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_history() {
        let service = stub_service().await;
        let txs = service.transactions(ACCOUNT).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].fee_charged, "100");

        let payments = service.payments(ACCOUNT).await.unwrap();
        assert_eq!(payments[0].kind, "payment");
        assert_eq!(payments[0].amount.as_deref(), Some("25.0000000"));
    }

    #[tokio::test]
    async fn test_submit_success_and_failure() {
        let service = stub_service().await;
        assert_eq!(service.submit_transaction("GOOD").await.unwrap(), "deadbeef");

        match service.submit_transaction("BAD").await.unwrap_err() {
            StellarError::Submission {
                status,
                title,
                result_codes,
                ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(title, "Transaction Failed");
                assert_eq!(result_codes.unwrap()["transaction"], "tx_bad_seq");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_envelope_and_bad_ids() {
        let service = stub_service().await;
        assert!(matches!(
            service.submit_transaction("  ").await,
            Err(StellarError::InvalidInput(_))
        ));
        assert!(matches!(
            service.load_account("../fee_stats").await,
            Err(StellarError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_rpc_health() {
        let service = stub_service().await;
        let health = service.rpc_health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.latest_ledger, Some(100));
    }

    #[test]
    fn test_contract_client_and_environment() {
        let service =
            StellarService::new(NetworkConfig::testnet(), Duration::from_secs(1)).unwrap();
        let options = service.contract_client(ACCOUNT).unwrap();
        assert_eq!(options.contract_id, crate::stellar::MARKETPLACE_CONTRACT_ID);
        assert_eq!(options.rpc_url, crate::stellar::TESTNET_RPC_URL);

        let env = service.environment();
        assert_eq!(env.rpc, crate::stellar::TESTNET_HORIZON_URL);
        assert_eq!(env.network_passphrase, crate::stellar::TESTNET_PASSPHRASE);
    }
}
