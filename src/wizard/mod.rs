//! Donation wizard.
//!
//! A linear flow `amount → payment → confirmation → processing → success`
//! with backward steps from payment and confirmation. Settlement is pluggable
//! through [`Settlement`]; a failed settlement returns the wizard to the
//! confirmation step with the error recorded.

mod registry;
mod settlement;

pub use registry::*;
pub use settlement::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Project;

/// Amounts offered as one-click choices.
pub const SUGGESTED_AMOUNTS: [u64; 4] = [1_000, 2_500, 5_000, 10_000];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonationStep {
    Amount,
    Payment,
    Confirmation,
    Processing,
    Success,
}

impl DonationStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStep::Amount => "amount",
            DonationStep::Payment => "payment",
            DonationStep::Confirmation => "confirmation",
            DonationStep::Processing => "processing",
            DonationStep::Success => "success",
        }
    }
}

impl std::fmt::Display for DonationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Wallet,
    Card,
    Bank,
}

impl PaymentMethod {
    /// Label shown in the confirmation summary.
    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethod::Wallet => "Billetera Digital",
            PaymentMethod::Card => "Tarjeta de Crédito",
            PaymentMethod::Bank => "Transferencia Bancaria",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum WizardError {
    #[error("donation amount must be a positive number, got {0:?}")]
    InvalidAmount(String),
    #[error("cannot {action} while in the {from} step")]
    InvalidTransition {
        from: DonationStep,
        action: &'static str,
    },
}

/// What the donor is about to confirm.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DonationSummary {
    pub project_id: String,
    pub project_name: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub method_name: &'static str,
    /// Always zero: the platform charges no commission
    pub commission: f64,
    pub total: f64,
}

/// Wizard state for one donor and one project.
#[derive(Debug, Clone)]
pub struct DonationWizard {
    project_id: String,
    project_name: String,
    step: DonationStep,
    entered_amount: String,
    selected_amount: Option<u64>,
    payment_method: Option<PaymentMethod>,
    transaction_id: Option<String>,
    last_error: Option<String>,
    attempt: u64,
}

impl DonationWizard {
    pub fn new(project: &Project) -> Self {
        Self {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            step: DonationStep::Amount,
            entered_amount: String::new(),
            selected_amount: None,
            payment_method: None,
            transaction_id: None,
            last_error: None,
            attempt: 0,
        }
    }

    pub fn step(&self) -> DonationStep {
        self.step
    }

    pub fn entered_amount(&self) -> &str {
        &self.entered_amount
    }

    pub fn selected_amount(&self) -> Option<u64> {
        self.selected_amount
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Counter identifying the current settlement run.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    fn expect_step(&self, step: DonationStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == step {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                from: self.step,
                action,
            })
        }
    }

    /// Pick one of the suggested amounts.
    pub fn select_amount(&mut self, amount: u64) -> Result<(), WizardError> {
        self.expect_step(DonationStep::Amount, "select an amount")?;
        if !SUGGESTED_AMOUNTS.contains(&amount) {
            return Err(WizardError::InvalidAmount(amount.to_string()));
        }
        self.selected_amount = Some(amount);
        self.entered_amount = amount.to_string();
        Ok(())
    }

    /// Type a free-form amount. Clears any suggested selection.
    pub fn enter_custom_amount(&mut self, text: &str) -> Result<(), WizardError> {
        self.expect_step(DonationStep::Amount, "enter an amount")?;
        self.selected_amount = None;
        self.entered_amount = text.trim().to_string();
        Ok(())
    }

    /// Parsed amount, if the current entry is a strictly positive number.
    pub fn amount(&self) -> Option<f64> {
        self.entered_amount
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
    }

    pub fn proceed_to_payment(&mut self) -> Result<(), WizardError> {
        self.expect_step(DonationStep::Amount, "continue to payment")?;
        if self.amount().is_none() {
            return Err(WizardError::InvalidAmount(self.entered_amount.clone()));
        }
        self.step = DonationStep::Payment;
        Ok(())
    }

    pub fn select_payment_method(&mut self, method: PaymentMethod) -> Result<(), WizardError> {
        self.expect_step(DonationStep::Payment, "choose a payment method")?;
        self.payment_method = Some(method);
        self.step = DonationStep::Confirmation;
        Ok(())
    }

    /// Step back one screen. Only payment and confirmation have a way back.
    pub fn go_back(&mut self) {
        self.step = match self.step {
            DonationStep::Payment => DonationStep::Amount,
            DonationStep::Confirmation => DonationStep::Payment,
            other => other,
        };
    }

    pub fn summary(&self) -> Option<DonationSummary> {
        let amount = self.amount()?;
        let method = self.payment_method?;
        Some(DonationSummary {
            project_id: self.project_id.clone(),
            project_name: self.project_name.clone(),
            amount,
            method,
            method_name: method.display_name(),
            commission: 0.0,
            total: amount,
        })
    }

    /// Move to processing and return what must be settled.
    pub fn confirm(&mut self) -> Result<DonationSummary, WizardError> {
        self.expect_step(DonationStep::Confirmation, "confirm")?;
        let summary = self
            .summary()
            .ok_or_else(|| WizardError::InvalidAmount(self.entered_amount.clone()))?;
        self.step = DonationStep::Processing;
        self.last_error = None;
        self.attempt += 1;
        Ok(summary)
    }

    pub fn complete(&mut self, transaction_id: String) -> Result<(), WizardError> {
        self.expect_step(DonationStep::Processing, "complete")?;
        self.transaction_id = Some(transaction_id);
        self.step = DonationStep::Success;
        Ok(())
    }

    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), WizardError> {
        self.expect_step(DonationStep::Processing, "fail")?;
        self.last_error = Some(reason.into());
        self.step = DonationStep::Confirmation;
        Ok(())
    }

    /// Start over with a blank form.
    pub fn reset(&mut self) {
        self.step = DonationStep::Amount;
        self.payment_method = None;
        self.transaction_id = None;
        self.entered_amount.clear();
        self.selected_amount = None;
        self.last_error = None;
    }
}

/// Serializable snapshot of a wizard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub id: String,
    pub project_id: String,
    pub step: DonationStep,
    pub entered_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_amount: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DonationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub suggested_amounts: [u64; 4],
}

impl WizardView {
    pub fn new(id: &str, wizard: &DonationWizard) -> Self {
        Self {
            id: id.to_string(),
            project_id: wizard.project_id.clone(),
            step: wizard.step,
            entered_amount: wizard.entered_amount.clone(),
            selected_amount: wizard.selected_amount,
            payment_method: wizard.payment_method,
            summary: wizard.summary(),
            transaction_id: wizard.transaction_id.clone(),
            last_error: wizard.last_error.clone(),
            suggested_amounts: SUGGESTED_AMOUNTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::PROJECTS;

    fn wizard() -> DonationWizard {
        DonationWizard::new(&PROJECTS[0])
    }

    #[test]
    fn test_starts_at_amount() {
        let w = wizard();
        assert_eq!(w.step(), DonationStep::Amount);
        assert!(w.summary().is_none());
    }

    #[test]
    fn test_rejects_non_positive_and_non_numeric_amounts() {
        for bad in ["", "0", "-5", "abc", "NaN", "inf", "0.0"] {
            let mut w = wizard();
            w.enter_custom_amount(bad).unwrap();
            assert_eq!(
                w.proceed_to_payment(),
                Err(WizardError::InvalidAmount(bad.to_string()))
            );
            assert_eq!(w.step(), DonationStep::Amount);
        }
    }

    #[test]
    fn test_suggested_then_custom_clears_selection() {
        let mut w = wizard();
        w.select_amount(2_500).unwrap();
        assert_eq!(w.selected_amount(), Some(2_500));
        assert_eq!(w.entered_amount(), "2500");

        w.enter_custom_amount("1234.5").unwrap();
        assert_eq!(w.selected_amount(), None);
        assert_eq!(w.amount(), Some(1234.5));
    }

    #[test]
    fn test_only_suggested_amounts_can_be_selected() {
        let mut w = wizard();
        assert_eq!(
            w.select_amount(7),
            Err(WizardError::InvalidAmount("7".to_string()))
        );
        assert_eq!(w.selected_amount(), None);
        assert_eq!(w.entered_amount(), "");

        for amount in SUGGESTED_AMOUNTS {
            w.select_amount(amount).unwrap();
            assert_eq!(w.selected_amount(), Some(amount));
        }
    }

    #[test]
    fn test_full_run_and_reset() {
        let mut w = wizard();
        w.enter_custom_amount("5000").unwrap();
        w.proceed_to_payment().unwrap();
        w.select_payment_method(PaymentMethod::Card).unwrap();
        assert_eq!(w.step(), DonationStep::Confirmation);

        let summary = w.confirm().unwrap();
        assert_eq!(summary.amount, 5000.0);
        assert_eq!(summary.commission, 0.0);
        assert_eq!(summary.total, 5000.0);
        assert_eq!(summary.method_name, "Tarjeta de Crédito");
        assert_eq!(w.step(), DonationStep::Processing);

        w.complete("TX12345678".to_string()).unwrap();
        assert_eq!(w.step(), DonationStep::Success);
        assert_eq!(w.transaction_id(), Some("TX12345678"));

        w.reset();
        assert_eq!(w.step(), DonationStep::Amount);
        assert_eq!(w.entered_amount(), "");
        assert_eq!(w.selected_amount(), None);
        assert_eq!(w.payment_method(), None);
        assert_eq!(w.transaction_id(), None);
        assert_eq!(w.last_error(), None);
    }

    #[test]
    fn test_go_back() {
        let mut w = wizard();
        w.select_amount(1_000).unwrap();
        w.proceed_to_payment().unwrap();
        w.select_payment_method(PaymentMethod::Bank).unwrap();

        w.go_back();
        assert_eq!(w.step(), DonationStep::Payment);
        w.go_back();
        assert_eq!(w.step(), DonationStep::Amount);
        w.go_back();
        assert_eq!(w.step(), DonationStep::Amount);
    }

    #[test]
    fn test_no_way_back_from_processing() {
        let mut w = wizard();
        w.select_amount(1_000).unwrap();
        w.proceed_to_payment().unwrap();
        w.select_payment_method(PaymentMethod::Wallet).unwrap();
        w.confirm().unwrap();
        w.go_back();
        assert_eq!(w.step(), DonationStep::Processing);
    }

    #[test]
    fn test_failure_returns_to_confirmation() {
        let mut w = wizard();
        w.select_amount(1_000).unwrap();
        w.proceed_to_payment().unwrap();
        w.select_payment_method(PaymentMethod::Wallet).unwrap();
        w.confirm().unwrap();
        w.fail("network unreachable").unwrap();

        assert_eq!(w.step(), DonationStep::Confirmation);
        assert_eq!(w.last_error(), Some("network unreachable"));

        // Retrying clears the previous error
        w.confirm().unwrap();
        assert_eq!(w.last_error(), None);
        assert_eq!(w.attempt(), 2);
    }

    #[test]
    fn test_out_of_order_actions_are_rejected() {
        let mut w = wizard();
        assert!(matches!(
            w.select_payment_method(PaymentMethod::Card),
            Err(WizardError::InvalidTransition { from: DonationStep::Amount, .. })
        ));
        assert!(w.confirm().is_err());
        assert!(w.complete("TX1".to_string()).is_err());
    }
}
