//! Reentrancy Guard
//!
//! An explicit in-progress flag. [`ReentrancyGuard::enter`] fails fast with
//! `Reentrant` while the flag is set; [`ReentrancyGuard::exit`] clears it.
//! Callers pair the two around a body so the flag is released on every
//! exit path, including errors.

use crate::{LedgerError, LedgerResult};

/// In-progress flag for a non-reentrant section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReentrancyGuard {
    entered: bool,
}

impl ReentrancyGuard {
    /// Create an unlocked guard
    pub const fn new() -> Self {
        Self { entered: false }
    }

    /// Lock the guard, or fail if it is already locked
    pub fn enter(&mut self) -> LedgerResult<()> {
        if self.entered {
            return Err(LedgerError::Reentrant);
        }
        self.entered = true;
        Ok(())
    }

    /// Release the guard
    pub fn exit(&mut self) {
        self.entered = false;
    }

    /// Whether a guarded section is in flight
    pub fn is_entered(&self) -> bool {
        self.entered
    }
}

/// Run `body` on `target` with the guard selected by `guard` held.
///
/// The guard is released whether `body` succeeds or fails.
pub fn non_reentrant<S, T>(
    target: &mut S,
    guard: fn(&mut S) -> &mut ReentrancyGuard,
    body: impl FnOnce(&mut S) -> LedgerResult<T>,
) -> LedgerResult<T> {
    guard(target).enter()?;
    let result = body(target);
    guard(target).exit();
    result
}
