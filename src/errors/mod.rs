//! Error handling module for the Trace backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::marketplace::MarketError;
use crate::stellar::StellarError;
use crate::wallet::WalletError;
use crate::wizard::{RegistryError, WizardError};

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_PSK: &str = "INVALID_PSK";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const WALLET_ERROR: &str = "WALLET_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Caller is not allowed to act on the resource
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Validation error
    Validation(String),
    /// Operation not valid in the current state
    Conflict(String),
    /// Database error
    Database(String),
    /// Horizon or Soroban RPC failure
    Upstream {
        message: String,
        details: Option<serde_json::Value>,
    },
    /// Wallet kit failure
    Wallet(String),
    /// Internal server error
    Internal(String),
    /// Bad request
    BadRequest(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            AppError::Wallet(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Forbidden(_) => codes::FORBIDDEN,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Upstream { .. } => codes::UPSTREAM_ERROR,
            AppError::Wallet(_) => codes::WALLET_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::Database(msg)
            | AppError::Wallet(msg)
            | AppError::Internal(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Upstream { message, .. } => message.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<WizardError> for AppError {
    fn from(err: WizardError) -> Self {
        match err {
            WizardError::InvalidAmount(_) => AppError::Validation(err.to_string()),
            WizardError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(id) => AppError::NotFound(format!("Wizard {} not found", id)),
            RegistryError::Wizard(e) => e.into(),
        }
    }
}

impl From<WalletError> for AppError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NotConnected => AppError::Conflict(err.to_string()),
            WalletError::Store(msg) => {
                tracing::error!("Wallet session store error: {}", msg);
                AppError::Database(format!("Database error: {}", msg))
            }
            other => {
                tracing::error!("Wallet error: {}", other);
                AppError::Wallet(other.to_string())
            }
        }
    }
}

impl From<StellarError> for AppError {
    fn from(err: StellarError) -> Self {
        if err.is_not_found() {
            return AppError::NotFound(err.to_string());
        }
        match err {
            StellarError::InvalidInput(msg) => AppError::Validation(msg),
            StellarError::Submission {
                status,
                ref title,
                ref detail,
                ref result_codes,
            } => {
                let details = serde_json::json!({
                    "status": status,
                    "title": title,
                    "detail": detail,
                    "resultCodes": result_codes,
                });
                AppError::Upstream {
                    message: err.to_string(),
                    details: Some(details),
                }
            }
            other => {
                tracing::error!("Stellar error: {:?}", other);
                AppError::Upstream {
                    message: other.to_string(),
                    details: None,
                }
            }
        }
    }
}

impl From<MarketError> for AppError {
    fn from(err: MarketError) -> Self {
        match err {
            MarketError::NotAuthorized => AppError::Forbidden(err.to_string()),
            MarketError::ProjectNotFound(_) => AppError::NotFound(err.to_string()),
            MarketError::InvalidArgument(msg) => AppError::Validation(msg),
            MarketError::Malformed(msg) => {
                tracing::error!("Malformed marketplace record: {}", msg);
                AppError::Internal(format!("Malformed record: {}", msg))
            }
            MarketError::Database(e) => e.into(),
        }
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
    pub revision_id: i64,
}

impl ErrorResponse {
    pub fn new(error: &AppError, revision_id: i64) -> Self {
        let details = match error {
            AppError::Upstream { details, .. } => details.clone(),
            _ => None,
        };

        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details,
            },
            revision_id,
        }
    }
}

/// Wrapper type for errors that carry revision_id context.
pub struct AppErrorWithRevision {
    pub error: AppError,
    pub revision_id: i64,
}

impl IntoResponse for AppErrorWithRevision {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        let body = ErrorResponse::new(&self.error, self.revision_id);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_errors_map_to_status() {
        let forbidden: AppError = MarketError::NotAuthorized.into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let missing: AppError = MarketError::ProjectNotFound(9).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let invalid: AppError = MarketError::InvalidArgument("amount must be positive".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), codes::VALIDATION_ERROR);
    }

    #[test]
    fn test_wizard_errors_map_to_status() {
        let invalid: AppError = WizardError::InvalidAmount("abc".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let missing: AppError = RegistryError::NotFound("w1".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_submission_error_carries_result_codes() {
        let err: AppError = StellarError::Submission {
            status: 400,
            title: "Transaction Failed".into(),
            detail: None,
            result_codes: Some(serde_json::json!({ "transaction": "tx_bad_seq" })),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let body = ErrorResponse::new(&err, 3);
        let details = body.error.details.unwrap();
        assert_eq!(details["resultCodes"]["transaction"], "tx_bad_seq");
        assert_eq!(body.revision_id, 3);
    }

    #[test]
    fn test_wallet_not_connected_is_conflict() {
        let err: AppError = WalletError::NotConnected.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
