//! Configuration module for the Trace backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::stellar::{NetworkConfig, MARKETPLACE_CONTRACT_ID, TESTNET_HORIZON_URL, TESTNET_PASSPHRASE, TESTNET_RPC_URL};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for API authentication (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Horizon, Soroban RPC, passphrase and contract
    pub network: NetworkConfig,
    /// Upper bound on the whole wallet connection flow
    pub wallet_connect_timeout: Duration,
    /// How long the mock wallet takes to answer
    pub mock_wallet_delay: Duration,
    /// Simulated settlement delay for donations
    pub settlement_delay: Duration,
    /// Per-request timeout for Horizon and RPC calls
    pub http_timeout: Duration,
    /// Donation wizards untouched for this long are dropped
    pub wizard_idle_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_psk = env::var("TRACE_API_PSK").ok().filter(|s| !s.is_empty());

        let db_path = env::var("TRACE_DB_PATH")
            .unwrap_or_else(|_| "./data/trace.sqlite".to_string())
            .into();

        let bind_addr = env::var("TRACE_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid TRACE_BIND_ADDR format");

        let log_level = env::var("TRACE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let network = NetworkConfig {
            horizon_url: env::var("TRACE_HORIZON_URL")
                .unwrap_or_else(|_| TESTNET_HORIZON_URL.to_string()),
            rpc_url: env::var("TRACE_RPC_URL").unwrap_or_else(|_| TESTNET_RPC_URL.to_string()),
            network_passphrase: env::var("TRACE_NETWORK_PASSPHRASE")
                .unwrap_or_else(|_| TESTNET_PASSPHRASE.to_string()),
            contract_id: env::var("TRACE_CONTRACT_ID")
                .unwrap_or_else(|_| MARKETPLACE_CONTRACT_ID.to_string()),
        };

        Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            network,
            wallet_connect_timeout: Duration::from_secs(env_u64(
                "TRACE_WALLET_CONNECT_TIMEOUT_SECS",
                60,
            )),
            mock_wallet_delay: Duration::from_millis(env_u64("TRACE_MOCK_WALLET_DELAY_MS", 1000)),
            settlement_delay: Duration::from_millis(env_u64("TRACE_SETTLEMENT_DELAY_MS", 2000)),
            http_timeout: Duration::from_secs(env_u64("TRACE_HTTP_TIMEOUT_SECS", 30)),
            wizard_idle_timeout: Duration::from_secs(env_u64(
                "TRACE_WIZARD_IDLE_TIMEOUT_SECS",
                30 * 60,
            )),
        }
    }

    /// Upper bound for a settlement: the simulated delay plus slack.
    pub fn settlement_timeout(&self) -> Duration {
        self.settlement_delay + Duration::from_secs(30)
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("Invalid {} value: {:?}", name, value)),
        Err(_) => default,
    }
}
