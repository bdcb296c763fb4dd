//! Wallet kit boundary.
//!
//! The kit owns wallet selection, key custody and signing. This crate only
//! talks to it through [`WalletKit`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::WalletError;

/// A wallet the user picked in the selection modal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WalletOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    pub signed_tx_xdr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_address: Option<String>,
}

#[async_trait]
pub trait WalletKit: Send + Sync {
    /// Show the selection modal and wait for the user's choice.
    async fn open_modal(&self, title: &str) -> Result<WalletOption, WalletError>;

    async fn set_wallet(&self, wallet_id: &str) -> Result<(), WalletError>;

    /// Wallet selected when a persisted session is resumed without the modal.
    fn default_wallet_id(&self) -> &str;

    async fn get_address(&self) -> Result<String, WalletError>;

    async fn sign_transaction(
        &self,
        xdr: &str,
        network_passphrase: &str,
    ) -> Result<SignedTransaction, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;
}

pub const MOCK_WALLET_ID: &str = "mock";

/// Fake public key handed out by [`MockWalletKit`].
pub const MOCK_ADDRESS: &str = "GDTRACEMOCKWALLETADDRESSFORLOCALDEVELOPMENTONLY234567ABC";

/// How the mock answers the selection modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    Approve,
    Reject(String),
    /// The modal is never answered
    Hang,
    /// A wallet is selected but reports no address
    EmptyAddress,
}

/// Development kit: approves after a delay with a fixed address.
pub struct MockWalletKit {
    address: String,
    delay: Duration,
    behavior: MockBehavior,
    selected: RwLock<Option<String>>,
}

impl MockWalletKit {
    pub fn new(delay: Duration) -> Self {
        Self::with_behavior(delay, MockBehavior::Approve)
    }

    pub fn with_behavior(delay: Duration, behavior: MockBehavior) -> Self {
        Self {
            address: MOCK_ADDRESS.to_string(),
            delay,
            behavior,
            selected: RwLock::new(None),
        }
    }
}

#[async_trait]
impl WalletKit for MockWalletKit {
    async fn open_modal(&self, title: &str) -> Result<WalletOption, WalletError> {
        tracing::debug!("Mock wallet modal opened: {}", title);
        match &self.behavior {
            MockBehavior::Hang => std::future::pending().await,
            MockBehavior::Reject(reason) => {
                tokio::time::sleep(self.delay).await;
                Err(WalletError::Kit(reason.clone()))
            }
            MockBehavior::Approve | MockBehavior::EmptyAddress => {
                tokio::time::sleep(self.delay).await;
                Ok(WalletOption {
                    id: MOCK_WALLET_ID.to_string(),
                    name: "Mock Wallet".to_string(),
                })
            }
        }
    }

    async fn set_wallet(&self, wallet_id: &str) -> Result<(), WalletError> {
        if wallet_id != MOCK_WALLET_ID {
            return Err(WalletError::Kit(format!("unknown wallet {}", wallet_id)));
        }
        *self.selected.write().await = Some(wallet_id.to_string());
        Ok(())
    }

    fn default_wallet_id(&self) -> &str {
        MOCK_WALLET_ID
    }

    async fn get_address(&self) -> Result<String, WalletError> {
        if self.selected.read().await.is_none() {
            return Err(WalletError::Kit("no wallet selected".to_string()));
        }
        match self.behavior {
            MockBehavior::EmptyAddress => Ok(String::new()),
            _ => Ok(self.address.clone()),
        }
    }

    async fn sign_transaction(
        &self,
        xdr: &str,
        network_passphrase: &str,
    ) -> Result<SignedTransaction, WalletError> {
        if self.selected.read().await.is_none() {
            return Err(WalletError::NotConnected);
        }
        tracing::debug!(
            network = network_passphrase,
            "Mock wallet signing {} byte envelope",
            xdr.len()
        );
        // The mock holds no keys; the envelope comes back untouched
        Ok(SignedTransaction {
            signed_tx_xdr: xdr.to_string(),
            signer_address: Some(self.address.clone()),
        })
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        *self.selected.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_address_shape() {
        assert_eq!(MOCK_ADDRESS.len(), 56);
        assert!(MOCK_ADDRESS.starts_with('G'));
    }

    #[tokio::test]
    async fn test_mock_requires_selection_before_signing() {
        let kit = MockWalletKit::new(Duration::ZERO);
        assert_eq!(
            kit.sign_transaction("AAAA", "Test SDF Network ; September 2015")
                .await,
            Err(WalletError::NotConnected)
        );

        let option = kit.open_modal("Connect").await.unwrap();
        kit.set_wallet(&option.id).await.unwrap();
        let signed = kit
            .sign_transaction("AAAA", "Test SDF Network ; September 2015")
            .await
            .unwrap();
        assert_eq!(signed.signer_address.as_deref(), Some(MOCK_ADDRESS));
    }
}
