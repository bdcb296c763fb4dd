//! Wallet connection flow.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::{SignedTransaction, WalletError, WalletKit};

const MODAL_TITLE: &str = "Connect to your wallet";

/// Caller side of a cancellable operation.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        // No receivers left means there is nothing to cancel
        let _ = self.0.send(true);
    }
}

/// Callee side of a cancellable operation.
#[derive(Debug, Clone)]
pub struct CancelSignal(watch::Receiver<bool>);

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self(rx)
    }

    pub async fn cancelled(mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                // Handle dropped without cancelling
                std::future::pending::<()>().await;
            }
        }
    }
}

pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), CancelSignal(rx))
}

/// Adapts the kit's modal-driven selection into one bounded, cancellable call.
#[derive(Clone)]
pub struct WalletConnector {
    kit: Arc<dyn WalletKit>,
    network_passphrase: String,
    connect_timeout: Duration,
    /// Pause after selecting a wallet, before asking for its address
    init_delay: Duration,
}

impl WalletConnector {
    pub fn new(
        kit: Arc<dyn WalletKit>,
        network_passphrase: impl Into<String>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            kit,
            network_passphrase: network_passphrase.into(),
            connect_timeout,
            init_delay: Duration::from_millis(100),
        }
    }

    pub fn with_init_delay(mut self, init_delay: Duration) -> Self {
        self.init_delay = init_delay;
        self
    }

    pub async fn connect(&self, cancel: CancelSignal) -> Result<String, WalletError> {
        tokio::select! {
            outcome = tokio::time::timeout(self.connect_timeout, self.select_and_read()) => {
                match outcome {
                    Ok(result) => result,
                    Err(_) => Err(WalletError::TimedOut(self.connect_timeout)),
                }
            }
            _ = cancel.cancelled() => Err(WalletError::Cancelled),
        }
    }

    async fn select_and_read(&self) -> Result<String, WalletError> {
        let option = self.kit.open_modal(MODAL_TITLE).await?;
        tracing::debug!("Wallet selected: {} ({})", option.name, option.id);
        self.kit.set_wallet(&option.id).await?;

        tokio::time::sleep(self.init_delay).await;

        let address = self.kit.get_address().await?;
        if address.trim().is_empty() {
            return Err(WalletError::NoAddress);
        }
        Ok(address)
    }

    /// Reselect the default wallet for a session restored from storage.
    pub async fn restore(&self) -> Result<(), WalletError> {
        self.kit.set_wallet(self.kit.default_wallet_id()).await
    }

    pub async fn disconnect(&self) -> Result<(), WalletError> {
        self.kit.disconnect().await
    }

    /// Forward an envelope to the wallet. The network passphrase is the only
    /// thing added here; keys never pass through this process.
    pub async fn sign_transaction(&self, xdr: &str) -> Result<SignedTransaction, WalletError> {
        if xdr.trim().is_empty() {
            return Err(WalletError::Kit("empty transaction envelope".to_string()));
        }
        self.kit
            .sign_transaction(xdr, &self.network_passphrase)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{MockBehavior, MockWalletKit, MOCK_ADDRESS};

    const PASSPHRASE: &str = "Test SDF Network ; September 2015";

    fn connector(behavior: MockBehavior, timeout: Duration) -> WalletConnector {
        let kit = Arc::new(MockWalletKit::with_behavior(
            Duration::from_millis(5),
            behavior,
        ));
        WalletConnector::new(kit, PASSPHRASE, timeout).with_init_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_connect_returns_address() {
        let c = connector(MockBehavior::Approve, Duration::from_secs(1));
        let address = c.connect(CancelSignal::never()).await.unwrap();
        assert_eq!(address, MOCK_ADDRESS);
    }

    #[tokio::test]
    async fn test_connect_times_out() {
        let c = connector(MockBehavior::Hang, Duration::from_millis(20));
        assert_eq!(
            c.connect(CancelSignal::never()).await,
            Err(WalletError::TimedOut(Duration::from_millis(20)))
        );
    }

    #[tokio::test]
    async fn test_connect_can_be_cancelled() {
        let c = connector(MockBehavior::Hang, Duration::from_secs(30));
        let (handle, signal) = cancel_pair();

        let task = tokio::spawn(async move { c.connect(signal).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.cancel();

        assert_eq!(task.await.unwrap(), Err(WalletError::Cancelled));
    }

    #[tokio::test]
    async fn test_restore_allows_signing_without_modal() {
        let c = connector(MockBehavior::Hang, Duration::from_millis(20));
        c.restore().await.unwrap();

        let signed = c.sign_transaction("AAAA").await.unwrap();
        assert_eq!(signed.signer_address.as_deref(), Some(MOCK_ADDRESS));
    }

    #[tokio::test]
    async fn test_empty_address_is_an_error() {
        let c = connector(MockBehavior::EmptyAddress, Duration::from_secs(1));
        assert_eq!(
            c.connect(CancelSignal::never()).await,
            Err(WalletError::NoAddress)
        );
    }

    #[tokio::test]
    async fn test_kit_rejection_surfaces() {
        let c = connector(
            MockBehavior::Reject("user closed the modal".to_string()),
            Duration::from_secs(1),
        );
        assert_eq!(
            c.connect(CancelSignal::never()).await,
            Err(WalletError::Kit("user closed the modal".to_string()))
        );
    }
}
