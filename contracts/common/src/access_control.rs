//! Access Control Module
//!
//! Role-based access control for the ledgers. Roles are plain data held in
//! one [`AccessControlState`] together with the pause flag; every check is
//! a pure predicate over that state.
//!
//! ## Key Features
//!
//! - **Role Assignments**: addresses hold one or more roles
//! - **Allow-lists**: each operation names the roles allowed to call it
//! - **Pause Flag**: suppresses external reward pulls and new deposits

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::events::{EventLog, LedgerEvent};
use crate::types::{is_zero_address, Address};
use crate::{LedgerError, LedgerResult, Vec};

// ============================================================================
// Types
// ============================================================================

/// Protocol roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum Role {
    /// Owner - registers reward tokens, pauses, manages roles
    Owner,
    /// Timelocked authority - changes economic parameters
    Timelock,
    /// Borrower operations contract
    BorrowerOperations,
    /// Vessel manager contract
    VesselManager,
    /// Stability pool contract
    StabilityPool,
    /// Default pool contract
    DefaultPool,
    /// Active pool contract
    ActivePool,
}

/// Operations gated by an allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Operation {
    /// Increase recorded debt of an asset
    IncreaseDebt,
    /// Decrease recorded debt of an asset
    DecreaseDebt,
    /// Send collateral out of a pool
    SendAsset,
    /// Book collateral received by a pool
    ReceivedErc20,
    /// Register or revive a reward token
    RegisterReward,
    /// Tombstone a reward token
    InvalidateReward,
    /// Change the protocol fee
    SetProtocolFee,
    /// Pause the protocol
    Pause,
    /// Unpause the protocol
    Unpause,
    /// Grant a role
    GrantRole,
    /// Revoke a role
    RevokeRole,
}

impl Operation {
    /// Roles allowed to perform this operation when no component-specific
    /// allow-list applies
    pub fn default_roles(&self) -> &'static [Role] {
        match self {
            Operation::SetProtocolFee => &[Role::Timelock],
            Operation::RegisterReward
            | Operation::InvalidateReward
            | Operation::Pause
            | Operation::Unpause
            | Operation::GrantRole
            | Operation::RevokeRole => &[Role::Owner],
            // Pool operations are gated per pool kind
            Operation::IncreaseDebt
            | Operation::DecreaseDebt
            | Operation::SendAsset
            | Operation::ReceivedErc20 => &[],
        }
    }
}

/// Role assignment for an address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RoleAssignment {
    /// Address with the role
    pub address: Address,
    /// Assigned role
    pub role: Role,
    /// Whether assignment is active
    pub is_active: bool,
}

/// Access control state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AccessControlState {
    /// Owner address
    pub owner: Address,
    /// Role assignments
    pub roles: Vec<RoleAssignment>,
    /// Whether the protocol is paused
    pub is_paused: bool,
}

impl AccessControlState {
    /// Create new access control state with an owner
    pub fn new(owner: Address) -> Self {
        let mut roles = Vec::new();
        roles.push(RoleAssignment {
            address: owner,
            role: Role::Owner,
            is_active: true,
        });

        Self {
            owner,
            roles,
            is_paused: false,
        }
    }

    /// Builder-style role assignment used when wiring components
    pub fn with_role(mut self, address: Address, role: Role) -> Self {
        if !has_role(&self, &address, role) {
            self.roles.push(RoleAssignment {
                address,
                role,
                is_active: true,
            });
        }
        self
    }
}

// ============================================================================
// Predicates
// ============================================================================

/// Check if address has a specific role
pub fn has_role(state: &AccessControlState, address: &Address, role: Role) -> bool {
    state
        .roles
        .iter()
        .any(|r| r.address == *address && r.role == role && r.is_active)
}

/// Check if address holds any of the allowed roles
pub fn is_authorized(state: &AccessControlState, caller: &Address, allowed: &[Role]) -> bool {
    allowed.iter().any(|role| has_role(state, caller, *role))
}

/// Check the operation's default allow-list
pub fn is_authorized_for(state: &AccessControlState, caller: &Address, operation: Operation) -> bool {
    is_authorized(state, caller, operation.default_roles())
}

/// Check if the protocol is paused
pub fn is_paused(state: &AccessControlState) -> bool {
    state.is_paused
}

/// Fail with `Unauthorized` unless `caller` holds one of `allowed`
pub fn require_authorized(
    state: &AccessControlState,
    caller: &Address,
    operation: Operation,
    allowed: &[Role],
) -> LedgerResult<()> {
    if is_authorized(state, caller, allowed) {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized {
            caller: *caller,
            operation,
        })
    }
}

/// Fail with `Unauthorized` unless `caller` passes the default allow-list
pub fn require_operation(state: &AccessControlState, caller: &Address, operation: Operation) -> LedgerResult<()> {
    require_authorized(state, caller, operation, operation.default_roles())
}

// ============================================================================
// Mutations
// ============================================================================

/// Grant a role to an address
pub fn grant_role(
    state: &mut AccessControlState,
    granter: Address,
    grantee: Address,
    role: Role,
    events: &mut EventLog,
) -> LedgerResult<()> {
    require_operation(state, &granter, Operation::GrantRole)?;

    if is_zero_address(&grantee) {
        return Err(LedgerError::InvalidAddress {
            reason: "cannot grant a role to the zero address",
        });
    }

    if has_role(state, &grantee, role) {
        return Ok(()); // Already has role
    }

    state.roles.push(RoleAssignment {
        address: grantee,
        role,
        is_active: true,
    });
    events.emit(LedgerEvent::RoleGranted { account: grantee, role });
    Ok(())
}

/// Revoke a role from an address
pub fn revoke_role(
    state: &mut AccessControlState,
    revoker: Address,
    target: Address,
    role: Role,
    events: &mut EventLog,
) -> LedgerResult<()> {
    // Can't strip the owner of ownership
    if target == state.owner && role == Role::Owner {
        return Err(LedgerError::InvalidParameter {
            param: "role",
            reason: "owner role cannot be revoked",
        });
    }

    require_operation(state, &revoker, Operation::RevokeRole)?;

    let mut revoked = false;
    for r in &mut state.roles {
        if r.address == target && r.role == role && r.is_active {
            r.is_active = false;
            revoked = true;
        }
    }

    if revoked {
        events.emit(LedgerEvent::RoleRevoked { account: target, role });
    }
    Ok(())
}

/// Set the pause flag
pub fn pause(state: &mut AccessControlState, caller: Address, events: &mut EventLog) -> LedgerResult<()> {
    require_operation(state, &caller, Operation::Pause)?;
    if !state.is_paused {
        state.is_paused = true;
        events.emit(LedgerEvent::Paused { by: caller });
    }
    Ok(())
}

/// Clear the pause flag
pub fn unpause(state: &mut AccessControlState, caller: Address, events: &mut EventLog) -> LedgerResult<()> {
    require_operation(state, &caller, Operation::Unpause)?;
    if state.is_paused {
        state.is_paused = false;
        events.emit(LedgerEvent::Unpaused { by: caller });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
