//! Ledger Events
//!
//! Observations emitted during execution. They are collected in an
//! [`EventLog`] owned by the emitting component, roll back together with
//! the rest of its state, and can be indexed off-chain.

use crate::access_control::Role;
use crate::types::{Address, Amount};
use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Reward Registry Events (0x01 - 0x1F)
    RewardAdded = 0x01,
    RewardInvalidated = 0x02,
    RewardPoolUpdated = 0x03,

    // Reward Ledger Events (0x20 - 0x3F)
    UserCheckpoint = 0x20,
    RewardPaid = 0x21,
    TreasuryClaimed = 0x22,
    RewardRedirected = 0x23,
    ProtocolFeeChanged = 0x24,

    // Wrapped Token Events (0x40 - 0x5F)
    Deposited = 0x40,
    Withdrawn = 0x41,
    Transfer = 0x42,

    // Pool Ledger Events (0x60 - 0x7F)
    PoolAssetBalanceUpdated = 0x60,
    PoolDebtUpdated = 0x61,
    AssetSent = 0x62,

    // Protocol Events (0x80 - 0x9F)
    Paused = 0x80,
    Unpaused = 0x81,
    RoleGranted = 0x82,
    RoleRevoked = 0x83,
}

/// Main event enum containing all ledger events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum LedgerEvent {
    // ============ Reward Registry Events ============

    /// A reward slot became active (new slot or revived slot)
    RewardAdded {
        token: Address,
        index: u64,
        source_pool: Option<Address>,
    },

    /// A reward slot was tombstoned
    RewardInvalidated { token: Address, index: u64 },

    /// The source pool of an existing slot changed
    RewardPoolUpdated {
        token: Address,
        index: u64,
        source_pool: Address,
    },

    // ============ Reward Ledger Events ============

    /// A checkpoint ran for up to two accounts
    UserCheckpoint {
        account_a: Address,
        account_b: Address,
    },

    /// Claimed rewards were paid out
    RewardPaid {
        account: Address,
        receiver: Address,
        token: Address,
        amount: Amount,
    },

    /// Treasury fee share of one slot was paid out
    TreasuryClaimed {
        treasury: Address,
        token: Address,
        amount: Amount,
    },

    /// An account changed its claim destination
    RewardRedirected {
        account: Address,
        destination: Address,
    },

    /// Protocol fee changed
    ProtocolFeeChanged { old_fee: u128, new_fee: u128 },

    // ============ Wrapped Token Events ============

    /// Principal or deposit tokens were wrapped
    Deposited {
        caller: Address,
        receiver: Address,
        amount: Amount,
        /// True when the principal token was deposited (not a pre-deposited receipt)
        principal: bool,
    },

    /// Wrapped tokens were burned and the underlying returned
    Withdrawn {
        account: Address,
        amount: Amount,
        /// True when the principal token was returned
        unwrapped: bool,
    },

    /// Wrapped tokens moved between accounts (zero address on mint/burn)
    Transfer {
        from: Address,
        to: Address,
        amount: Amount,
    },

    // ============ Pool Ledger Events ============

    /// Recorded collateral of an asset changed
    PoolAssetBalanceUpdated {
        pool: Address,
        asset: Address,
        balance: Amount,
    },

    /// Recorded debt of an asset changed
    PoolDebtUpdated {
        pool: Address,
        asset: Address,
        debt: Amount,
    },

    /// Collateral left the pool
    AssetSent {
        pool: Address,
        to: Address,
        asset: Address,
        amount: Amount,
    },

    // ============ Protocol Events ============

    /// Emitted when the protocol is paused
    Paused { by: Address },

    /// Emitted when the protocol is unpaused
    Unpaused { by: Address },

    /// A role was granted
    RoleGranted { account: Address, role: Role },

    /// A role was revoked
    RoleRevoked { account: Address, role: Role },
}

impl LedgerEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::RewardAdded { .. } => EventType::RewardAdded,
            Self::RewardInvalidated { .. } => EventType::RewardInvalidated,
            Self::RewardPoolUpdated { .. } => EventType::RewardPoolUpdated,
            Self::UserCheckpoint { .. } => EventType::UserCheckpoint,
            Self::RewardPaid { .. } => EventType::RewardPaid,
            Self::TreasuryClaimed { .. } => EventType::TreasuryClaimed,
            Self::RewardRedirected { .. } => EventType::RewardRedirected,
            Self::ProtocolFeeChanged { .. } => EventType::ProtocolFeeChanged,
            Self::Deposited { .. } => EventType::Deposited,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::Transfer { .. } => EventType::Transfer,
            Self::PoolAssetBalanceUpdated { .. } => EventType::PoolAssetBalanceUpdated,
            Self::PoolDebtUpdated { .. } => EventType::PoolDebtUpdated,
            Self::AssetSent { .. } => EventType::AssetSent,
            Self::Paused { .. } => EventType::Paused,
            Self::Unpaused { .. } => EventType::Unpaused,
            Self::RoleGranted { .. } => EventType::RoleGranted,
            Self::RoleRevoked { .. } => EventType::RoleRevoked,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<LedgerEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&LedgerEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Most recent event, if any
    pub fn last(&self) -> Option<&LedgerEvent> {
        self.events.last()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
