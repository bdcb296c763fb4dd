//! Wallet session owned by the application root.
//!
//! Holds the connected address, persists it through a [`SessionStore`] so it
//! survives restarts, and tracks the in-flight connection attempt so it can be
//! cancelled.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use super::{cancel_pair, CancelHandle, SignedTransaction, WalletConnector, WalletError};

/// Shown to users when connecting fails, whatever the cause.
pub const CONNECT_FAILED_MESSAGE: &str = "Failed to connect wallet. Please try again.";
pub const DISCONNECT_FAILED_MESSAGE: &str = "Failed to disconnect wallet. Please try again.";

/// Persistence for the last connected address.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<String>, WalletError>;
    async fn save(&self, address: &str) -> Result<(), WalletError>;
    async fn clear(&self) -> Result<(), WalletError>;
}

/// Volatile store for tests and single-run tools.
#[derive(Default)]
pub struct MemorySessionStore {
    address: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<String>, WalletError> {
        Ok(self.address.read().await.clone())
    }

    async fn save(&self, address: &str) -> Result<(), WalletError> {
        *self.address.write().await = Some(address.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), WalletError> {
        *self.address.write().await = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub is_connected: bool,
    pub is_connecting: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GABCDE...WXYZ`
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[derive(Default)]
struct SessionState {
    address: Option<String>,
    error: Option<String>,
    pending: Option<(u64, CancelHandle)>,
    attempts: u64,
}

impl SessionState {
    fn status(&self) -> SessionStatus {
        SessionStatus {
            is_connected: self.address.is_some(),
            is_connecting: self.pending.is_some(),
            address: self.address.clone(),
            short_address: self.address.as_deref().map(short_address),
            error: self.error.clone(),
        }
    }
}

pub struct WalletSession {
    connector: WalletConnector,
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
}

impl WalletSession {
    pub fn new(connector: WalletConnector, store: Arc<dyn SessionStore>) -> Self {
        Self {
            connector,
            store,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Restore the persisted address, if any.
    pub async fn load(&self) -> Result<SessionStatus, WalletError> {
        let mut saved = self.store.load().await?;
        if let Some(address) = &saved {
            match self.connector.restore().await {
                Ok(()) => {
                    tracing::info!("Restored wallet session for {}", short_address(address))
                }
                Err(e) => {
                    tracing::warn!("Could not resume wallet session: {}", e);
                    self.store.clear().await?;
                    saved = None;
                }
            }
        }
        let mut state = self.state.write().await;
        state.address = saved;
        Ok(state.status())
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status()
    }

    pub async fn address(&self) -> Option<String> {
        self.state.read().await.address.clone()
    }

    /// Run the connection flow. A newer attempt supersedes an older one.
    pub async fn connect(&self) -> Result<SessionStatus, WalletError> {
        let (handle, signal) = cancel_pair();
        let attempt = {
            let mut state = self.state.write().await;
            if let Some((_, previous)) = state.pending.take() {
                previous.cancel();
            }
            state.attempts += 1;
            state.pending = Some((state.attempts, handle));
            state.error = None;
            state.attempts
        };

        let outcome = self.connector.connect(signal).await;

        let mut state = self.state.write().await;
        if state.pending.as_ref().map(|(id, _)| *id) != Some(attempt) {
            // Superseded or cancelled out from under us
            return Err(outcome.err().unwrap_or(WalletError::Cancelled));
        }
        state.pending = None;

        match outcome {
            Ok(address) => {
                if let Err(e) = self.store.save(&address).await {
                    tracing::warn!("Failed to persist wallet session: {}", e);
                }
                tracing::info!("Wallet connected: {}", short_address(&address));
                state.address = Some(address);
                state.error = None;
                Ok(state.status())
            }
            Err(e) => {
                tracing::error!("Failed to connect wallet: {}", e);
                state.address = None;
                state.error = Some(CONNECT_FAILED_MESSAGE.to_string());
                if let Err(clear_err) = self.store.clear().await {
                    tracing::warn!("Failed to clear wallet session: {}", clear_err);
                }
                Err(e)
            }
        }
    }

    /// Cancel the in-flight connection attempt. Returns whether one existed.
    pub async fn cancel_connect(&self) -> bool {
        let mut state = self.state.write().await;
        match state.pending.take() {
            Some((_, handle)) => {
                handle.cancel();
                state.address = None;
                state.error = Some(CONNECT_FAILED_MESSAGE.to_string());
                if let Err(e) = self.store.clear().await {
                    tracing::warn!("Failed to clear wallet session: {}", e);
                }
                true
            }
            None => false,
        }
    }

    pub async fn disconnect(&self) -> Result<SessionStatus, WalletError> {
        if let Err(e) = self.connector.disconnect().await {
            tracing::error!("Failed to disconnect wallet: {}", e);
            let mut state = self.state.write().await;
            state.error = Some(DISCONNECT_FAILED_MESSAGE.to_string());
            return Err(e);
        }

        self.store.clear().await?;
        let mut state = self.state.write().await;
        state.address = None;
        state.error = None;
        tracing::info!("Wallet disconnected");
        Ok(state.status())
    }

    /// Have the connected wallet sign an envelope.
    pub async fn sign_transaction(&self, xdr: &str) -> Result<SignedTransaction, WalletError> {
        if self.address().await.is_none() {
            return Err(WalletError::NotConnected);
        }
        self.connector.sign_transaction(xdr).await
    }
}
