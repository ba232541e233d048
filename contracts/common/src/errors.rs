//! Error Types for the Staked Collateral Ledgers
//!
//! Typed errors carrying enough context to tell which guard tripped.
//! Every variant aborts the enclosing operation; callers never observe
//! partially applied state.

use crate::access_control::Operation;
use crate::types::Address;

/// Result type alias for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Main error enum for all ledger errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ============ Authorization Errors ============
    /// Caller is not in the allow-list for this operation
    Unauthorized { caller: Address, operation: Operation },

    // ============ Lookup Errors ============
    /// Reward token was never registered
    RewardNotFound { token: Address },

    /// Reward slot index is out of range
    SlotNotFound { index: usize },

    // ============ Balance Errors ============
    /// Recorded balance is smaller than the requested amount
    InsufficientBalance { available: u128, requested: u128 },

    /// Zero amount not allowed
    ZeroAmount,

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ Execution Errors ============
    /// Checkpoint logic entered while already in flight
    Reentrant,

    /// A collaborator reverted or returned an unexpected value
    ExternalCallFailed { call: &'static str },

    /// Token transfer failed
    TransferFailed { token: Address, to: Address, amount: u128 },

    /// Operation is disabled while paused
    ProtocolPaused,

    // ============ Input Validation Errors ============
    /// Invalid address (e.g., zero address)
    InvalidAddress {
        /// Description of why the address is invalid
        reason: &'static str,
    },

    /// Invalid parameter value
    InvalidParameter { param: &'static str, reason: &'static str },

    // ============ Lifecycle Errors ============
    /// Component used before initialization
    NotInitialized,

    /// Component initialized twice
    AlreadyInitialized,
}

impl LedgerError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "E020_UNAUTHORIZED",
            Self::RewardNotFound { .. } => "E030_REWARD_NOT_FOUND",
            Self::SlotNotFound { .. } => "E031_SLOT_NOT_FOUND",
            Self::InsufficientBalance { .. } => "E040_INSUFFICIENT_BALANCE",
            Self::ZeroAmount => "E041_ZERO_AMOUNT",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
            Self::Reentrant => "E090_REENTRANT",
            Self::ExternalCallFailed { .. } => "E091_EXTERNAL_CALL",
            Self::TransferFailed { .. } => "E092_TRANSFER_FAILED",
            Self::ProtocolPaused => "E100_PAUSED",
            Self::InvalidAddress { .. } => "E110_INVALID_ADDRESS",
            Self::InvalidParameter { .. } => "E111_INVALID_PARAM",
            Self::NotInitialized => "E120_NOT_INITIALIZED",
            Self::AlreadyInitialized => "E121_ALREADY_INITIALIZED",
        }
    }

    /// True for the underflow family (`Underflow` or `InsufficientBalance`)
    pub fn is_underflow(&self) -> bool {
        matches!(self, Self::Underflow | Self::InsufficientBalance { .. })
    }
}

impl core::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {:?}", self.code(), self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LedgerError {}
