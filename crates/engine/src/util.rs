//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Ensure two balance rows are denominated in the same currency.
pub(crate) fn ensure_same_currency(from: i32, to: i32) -> ResultEngine<()> {
    if from != to {
        return Err(EngineError::CurrencyMismatch(format!(
            "balances use currency {from} and currency {to}"
        )));
    }
    Ok(())
}
