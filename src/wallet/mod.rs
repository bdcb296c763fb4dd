//! Wallet connection and signing.
//!
//! All cryptography and wallet selection belongs to the external kit. This
//! module turns its modal flow into a single awaited, cancellable call and
//! keeps the resulting session.

mod connector;
mod kit;
mod session;

pub use connector::*;
pub use kit::*;
pub use session::*;

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet connection was cancelled")]
    Cancelled,
    #[error("wallet did not respond within {0:?}")]
    TimedOut(Duration),
    #[error("wallet returned no address")]
    NoAddress,
    #[error("no wallet connected")]
    NotConnected,
    #[error("wallet kit error: {0}")]
    Kit(String),
    #[error("session store error: {0}")]
    Store(String),
}

impl From<sqlx::Error> for WalletError {
    fn from(err: sqlx::Error) -> Self {
        WalletError::Store(err.to_string())
    }
}
