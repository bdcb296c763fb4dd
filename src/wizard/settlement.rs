//! Settlement of a confirmed donation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;

use super::DonationSummary;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("settlement rejected: {0}")]
    Rejected(String),
    #[error("settlement did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Turns a confirmed donation into a transaction identifier.
#[async_trait]
pub trait Settlement: Send + Sync {
    async fn settle(&self, summary: &DonationSummary) -> Result<String, SettlementError>;
}

/// Stand-in for real settlement: waits, then mints an id. Never fails.
#[derive(Debug, Clone)]
pub struct SimulatedSettlement {
    delay: Duration,
}

impl SimulatedSettlement {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Settlement for SimulatedSettlement {
    async fn settle(&self, summary: &DonationSummary) -> Result<String, SettlementError> {
        tokio::time::sleep(self.delay).await;
        let id = transaction_id(Utc::now().timestamp_millis());
        tracing::info!(
            project = %summary.project_id,
            amount = summary.total,
            method = ?summary.method,
            transaction = %id,
            "Simulated donation settled"
        );
        Ok(id)
    }
}

/// `TX` followed by the last eight digits of the epoch milliseconds.
pub fn transaction_id(epoch_millis: i64) -> String {
    let digits = epoch_millis.to_string();
    let tail = &digits[digits.len().saturating_sub(8)..];
    format!("TX{}", tail)
}

/// Run a settlement bounded by `timeout`.
pub async fn settle_with_timeout(
    settlement: &dyn Settlement,
    summary: &DonationSummary,
    timeout: Duration,
) -> Result<String, SettlementError> {
    match tokio::time::timeout(timeout, settlement.settle(summary)).await {
        Ok(result) => result,
        Err(_) => Err(SettlementError::TimedOut(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::PaymentMethod;

    fn summary() -> DonationSummary {
        DonationSummary {
            project_id: "1".to_string(),
            project_name: "Comedor Escolar San Martín".to_string(),
            amount: 5000.0,
            method: PaymentMethod::Card,
            method_name: PaymentMethod::Card.display_name(),
            commission: 0.0,
            total: 5000.0,
        }
    }

    struct Stuck;

    #[async_trait]
    impl Settlement for Stuck {
        async fn settle(&self, _summary: &DonationSummary) -> Result<String, SettlementError> {
            std::future::pending().await
        }
    }

    #[test]
    fn test_transaction_id_uses_last_eight_digits() {
        assert_eq!(transaction_id(1_726_000_123_456), "TX00123456");
        assert_eq!(transaction_id(42), "TX42");
    }

    #[tokio::test]
    async fn test_simulated_settlement_returns_id() {
        let settlement = SimulatedSettlement::new(Duration::from_millis(5));
        let id = settlement.settle(&summary()).await.unwrap();
        assert!(id.starts_with("TX"));
        assert_eq!(id.len(), 10);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let result = settle_with_timeout(&Stuck, &summary(), Duration::from_millis(10)).await;
        assert_eq!(
            result,
            Err(SettlementError::TimedOut(Duration::from_millis(10)))
        );
    }
}
