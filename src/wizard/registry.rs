//! In-memory registry of live donation wizards.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use uuid::Uuid;

use super::{
    settle_with_timeout, DonationStep, DonationWizard, Settlement, WizardError, WizardView,
};
use crate::models::Project;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegistryError {
    #[error("wizard {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

/// Wizards idle for longer than this are dropped on the next insert.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct Entry {
    wizard: DonationWizard,
    touched: Instant,
}

impl Entry {
    fn new(wizard: DonationWizard) -> Self {
        Self {
            wizard,
            touched: Instant::now(),
        }
    }

    fn touch(&mut self) -> &mut DonationWizard {
        self.touched = Instant::now();
        &mut self.wizard
    }
}

/// Wizards keyed by id. Cloning shares the same map.
#[derive(Clone)]
pub struct WizardRegistry {
    wizards: Arc<RwLock<HashMap<String, Entry>>>,
    idle_timeout: Duration,
}

impl Default for WizardRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardRegistry {
    pub fn new() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            wizards: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub async fn create(&self, project: &Project) -> WizardView {
        let id = Uuid::new_v4().to_string();
        let wizard = DonationWizard::new(project);
        let view = WizardView::new(&id, &wizard);

        let mut wizards = self.wizards.write().await;
        let evicted = evict_idle(&mut wizards, self.idle_timeout);
        if evicted > 0 {
            tracing::debug!("Evicted {} idle donation wizards", evicted);
        }
        wizards.insert(id, Entry::new(wizard));
        view
    }

    /// Drop wizards nobody has touched within the idle timeout.
    pub async fn sweep(&self) -> usize {
        evict_idle(&mut *self.wizards.write().await, self.idle_timeout)
    }

    pub async fn get(&self, id: &str) -> Result<WizardView, RegistryError> {
        let mut wizards = self.wizards.write().await;
        wizards
            .get_mut(id)
            .map(|entry| WizardView::new(id, entry.touch()))
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Apply `f` to a wizard and return the resulting view.
    pub async fn update<F>(&self, id: &str, f: F) -> Result<WizardView, RegistryError>
    where
        F: FnOnce(&mut DonationWizard) -> Result<(), WizardError>,
    {
        let mut wizards = self.wizards.write().await;
        let wizard = wizards
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?
            .touch();
        f(wizard)?;
        Ok(WizardView::new(id, wizard))
    }

    /// Confirm the donation and settle it in the background.
    ///
    /// Returns the processing view immediately. The outcome lands on the same
    /// wizard unless it was reset or re-confirmed in the meantime.
    pub async fn confirm(
        &self,
        id: &str,
        settlement: Arc<dyn Settlement>,
        timeout: Duration,
    ) -> Result<WizardView, RegistryError> {
        let (summary, attempt, view) = {
            let mut wizards = self.wizards.write().await;
            let wizard = wizards
                .get_mut(id)
                .ok_or_else(|| RegistryError::NotFound(id.to_string()))?
                .touch();
            let summary = wizard.confirm()?;
            (summary, wizard.attempt(), WizardView::new(id, wizard))
        };

        let registry = self.clone();
        let id = id.to_string();
        tokio::spawn(async move {
            let outcome = settle_with_timeout(settlement.as_ref(), &summary, timeout).await;

            let mut wizards = registry.wizards.write().await;
            let Some(wizard) = wizards.get_mut(&id).map(Entry::touch) else {
                return;
            };
            if wizard.attempt() != attempt {
                tracing::debug!(wizard = %id, "Dropping stale settlement result");
                return;
            }
            let applied = match outcome {
                Ok(tx) => wizard.complete(tx),
                Err(e) => {
                    tracing::warn!(wizard = %id, "Donation settlement failed: {}", e);
                    wizard.fail(e.to_string())
                }
            };
            if let Err(e) = applied {
                tracing::debug!(wizard = %id, "Settlement result not applied: {}", e);
            }
        });

        Ok(view)
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.wizards.write().await.remove(id).is_some()
    }
}

/// Wizards still processing are kept so their settlement can land.
fn evict_idle(wizards: &mut HashMap<String, Entry>, idle_timeout: Duration) -> usize {
    let before = wizards.len();
    wizards.retain(|_, entry| {
        entry.wizard.step() == DonationStep::Processing || entry.touched.elapsed() < idle_timeout
    });
    before - wizards.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::PROJECTS;
    use crate::wizard::{DonationSummary, PaymentMethod, SettlementError, SimulatedSettlement};
    use async_trait::async_trait;

    struct Declined;

    #[async_trait]
    impl Settlement for Declined {
        async fn settle(&self, _summary: &DonationSummary) -> Result<String, SettlementError> {
            Err(SettlementError::Rejected("card declined".to_string()))
        }
    }

    async fn ready_to_confirm(registry: &WizardRegistry) -> String {
        let view = registry.create(&PROJECTS[0]).await;
        registry
            .update(&view.id, |w| {
                w.enter_custom_amount("5000")?;
                w.proceed_to_payment()?;
                w.select_payment_method(PaymentMethod::Card)
            })
            .await
            .unwrap();
        view.id
    }

    async fn wait_for_step(registry: &WizardRegistry, id: &str, step: DonationStep) -> WizardView {
        for _ in 0..100 {
            let view = registry.get(id).await.unwrap();
            if view.step == step {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("wizard never reached {step}");
    }

    #[tokio::test]
    async fn test_settles_to_success() {
        let registry = WizardRegistry::new();
        let id = ready_to_confirm(&registry).await;

        let settlement = Arc::new(SimulatedSettlement::new(Duration::from_millis(20)));
        let view = registry
            .confirm(&id, settlement, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(view.step, DonationStep::Processing);

        let done = wait_for_step(&registry, &id, DonationStep::Success).await;
        assert!(done.transaction_id.unwrap().starts_with("TX"));
    }

    #[tokio::test]
    async fn test_failed_settlement_returns_to_confirmation() {
        let registry = WizardRegistry::new();
        let id = ready_to_confirm(&registry).await;

        registry
            .confirm(&id, Arc::new(Declined), Duration::from_secs(5))
            .await
            .unwrap();

        let view = wait_for_step(&registry, &id, DonationStep::Confirmation).await;
        assert_eq!(
            view.last_error.as_deref(),
            Some("settlement rejected: card declined")
        );
    }

    #[tokio::test]
    async fn test_reset_during_processing_discards_result() {
        let registry = WizardRegistry::new();
        let id = ready_to_confirm(&registry).await;

        let settlement = Arc::new(SimulatedSettlement::new(Duration::from_millis(50)));
        registry
            .confirm(&id, settlement, Duration::from_secs(5))
            .await
            .unwrap();
        registry
            .update(&id, |w| {
                w.reset();
                Ok(())
            })
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;
        let view = registry.get(&id).await.unwrap();
        assert_eq!(view.step, DonationStep::Amount);
        assert!(view.transaction_id.is_none());
    }

    #[tokio::test]
    async fn test_idle_wizards_are_evicted() {
        let registry = WizardRegistry::with_idle_timeout(Duration::from_millis(100));
        let idle = registry.create(&PROJECTS[0]).await;
        let active = registry.create(&PROJECTS[1]).await;

        tokio::time::sleep(Duration::from_millis(60)).await;
        registry.get(&active.id).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        // Creating a wizard sweeps the stale one and keeps the touched one
        let fresh = registry.create(&PROJECTS[0]).await;
        assert_eq!(
            registry.get(&idle.id).await.unwrap_err(),
            RegistryError::NotFound(idle.id.clone())
        );
        registry.get(&active.id).await.unwrap();
        registry.get(&fresh.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_keeps_processing_wizards() {
        let registry = WizardRegistry::with_idle_timeout(Duration::from_millis(10));
        let id = ready_to_confirm(&registry).await;
        let other = registry.create(&PROJECTS[1]).await;

        let settlement = Arc::new(SimulatedSettlement::new(Duration::from_secs(5)));
        registry
            .confirm(&id, settlement, Duration::from_secs(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(registry.sweep().await, 1);
        assert!(registry.get(&other.id).await.is_err());
        assert_eq!(
            registry.get(&id).await.unwrap().step,
            DonationStep::Processing
        );
    }

    #[tokio::test]
    async fn test_unknown_wizard() {
        let registry = WizardRegistry::new();
        assert_eq!(
            registry.get("missing").await.unwrap_err(),
            RegistryError::NotFound("missing".to_string())
        );
    }
}
