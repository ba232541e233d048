//! Validation Helpers
//!
//! Small guards shared by the ledgers.

use crate::{
    errors::{LedgerError, LedgerResult},
    types::{is_zero_address, Address, Amount},
};

/// Check a condition and return an error if it fails.
///
/// ```rust,ignore
/// check!(amount > 0, LedgerError::ZeroAmount);
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

/// Fail with `ZeroAmount` for a zero amount
pub fn require_positive(amount: Amount) -> LedgerResult<()> {
    check!(amount > 0, LedgerError::ZeroAmount);
    Ok(())
}

/// Fail with `InvalidAddress` for the zero address
pub fn require_nonzero_address(address: &Address, reason: &'static str) -> LedgerResult<()> {
    check!(!is_zero_address(address), LedgerError::InvalidAddress { reason });
    Ok(())
}

/// Fail with `InsufficientBalance` unless `available >= requested`
pub fn require_sufficient(available: Amount, requested: Amount) -> LedgerResult<()> {
    check!(
        available >= requested,
        LedgerError::InsufficientBalance { available, requested }
    );
    Ok(())
}
