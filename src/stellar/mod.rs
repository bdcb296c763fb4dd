//! Stellar network access.
//!
//! A thin client over Horizon (accounts, history, submission) and the Soroban
//! RPC endpoint. Nothing here holds or accepts secret keys: envelopes arrive
//! already signed by the user's wallet.

mod service;
mod types;

pub use service::*;
pub use types::*;

use thiserror::Error;

pub const TESTNET_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
pub const TESTNET_RPC_URL: &str = "https://soroban-testnet.stellar.org";
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const MARKETPLACE_CONTRACT_ID: &str =
    "CCVW6SNP3K2YIZCXH4SENOTROEP3IXEAOS4K3XTO4TTBLJLOAEIJM62N";

/// Endpoints and identity of the network the platform talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub horizon_url: String,
    pub rpc_url: String,
    pub network_passphrase: String,
    pub contract_id: String,
}

impl NetworkConfig {
    pub fn testnet() -> Self {
        Self {
            horizon_url: TESTNET_HORIZON_URL.to_string(),
            rpc_url: TESTNET_RPC_URL.to_string(),
            network_passphrase: TESTNET_PASSPHRASE.to_string(),
            contract_id: MARKETPLACE_CONTRACT_ID.to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

#[derive(Debug, Error)]
pub enum StellarError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}")]
    Status {
        url: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("failed to submit transaction: {title}")]
    Submission {
        status: u16,
        title: String,
        detail: Option<String>,
        result_codes: Option<serde_json::Value>,
    },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl StellarError {
    /// Whether the upstream reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StellarError::Status { status: 404, .. })
    }
}
