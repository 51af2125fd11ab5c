//! The module contains the error the engine can throw.
//!
//! Every failure is reported with enough context (kind plus the ids involved)
//! for the caller to build a meaningful message. Callers decide what is
//! recoverable:
//!
//! - [`KeyNotFound`]: a referenced entity (account, currency, job, balance
//!   row) does not exist.
//! - [`ExistingKey`]: an entity that must be unique already exists.
//! - [`InvalidAmount`] / [`InvalidId`]: the caller supplied a bad argument;
//!   never worth retrying.
//! - [`InsufficientFunds`] / [`CurrencyMismatch`]: ledger preconditions the
//!   presentation layer reports to the player.
//! - [`WriteConflict`]: an optimistic write lost too many races in a row.
//! - [`Database`]: the underlying store failed; not retried by the engine.
//!
//! [`KeyNotFound`]: EngineError::KeyNotFound
//! [`ExistingKey`]: EngineError::ExistingKey
//! [`InvalidAmount`]: EngineError::InvalidAmount
//! [`InvalidId`]: EngineError::InvalidId
//! [`InsufficientFunds`]: EngineError::InsufficientFunds
//! [`CurrencyMismatch`]: EngineError::CurrencyMismatch
//! [`WriteConflict`]: EngineError::WriteConflict
//! [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Write conflict: {0}")]
    WriteConflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::WriteConflict(a), Self::WriteConflict(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
