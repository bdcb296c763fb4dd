//! REST API module.
//!
//! Handlers for the catalog, dashboards, donation wizard, wallet session,
//! network access and marketplace ledger. Every response uses the same
//! envelope and carries the store revision.

mod catalog;
mod company;
mod marketplace;
mod network;
mod revision;
mod wallet;
mod wizards;

pub use catalog::*;
pub use company::*;
pub use marketplace::*;
pub use network::*;
pub use revision::*;
pub use wallet::*;
pub use wizards::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: impl Into<crate::errors::AppError>, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err.into(),
        revision_id,
    })
}
