//! Reward Registry
//!
//! An arena of reward slots addressed by permanent index, plus a lookup
//! from token to index. Slots are never removed: invalidation sets a
//! tombstone flag and registering the token again revives the same slot
//! with its integral history intact.
//!
//! ## Key Features
//!
//! - **Stable indices**: external references to a slot index stay valid
//! - **Soft delete**: tombstoned slots are skipped by every loop in O(1)
//! - **Discovery**: auxiliary reward streams of the staking source are
//!   registered on demand

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use staked_collateral_common::{
    constants::rewards::{CVX_INDEX, WRAPPED_EXTRA_REWARD_POOL_ID},
    validation::require_nonzero_address,
    Address, Amount, BTreeMap, EventLog, Integral, LedgerError, LedgerEvent, LedgerResult, SlotIndex,
    StakingSource, TokenWrapperAdapter, Vec,
};

// ============ Reward Slot ============

/// Accounting state of one reward token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RewardSlot {
    /// Reward token
    pub token: Address,
    /// Reward pool this stream originates from (informational)
    pub source_pool: Option<Address>,
    /// Cumulative reward per unit of stake, scaled by `INTEGRAL_SCALE`
    pub integral: Integral,
    /// Last observed token balance attributable to the ledger
    pub remaining: Amount,
    /// Integral at each account's last settlement
    pub integral_for: BTreeMap<Address, Integral>,
    /// Owed but unpaid rewards per account (treasury included)
    pub claimable: BTreeMap<Address, Amount>,
    /// Tombstone flag
    pub invalidated: bool,
}

impl RewardSlot {
    fn new(token: Address, source_pool: Option<Address>) -> Self {
        Self {
            token,
            source_pool,
            integral: Integral::zero(),
            remaining: 0,
            integral_for: BTreeMap::new(),
            claimable: BTreeMap::new(),
            invalidated: false,
        }
    }

    /// Whether checkpoints process this slot
    pub fn is_active(&self) -> bool {
        !self.invalidated
    }

    /// Claimable amount of `account`
    pub fn claimable_of(&self, account: &Address) -> Amount {
        self.claimable.get(account).copied().unwrap_or(0)
    }

    /// Integral `account` was last settled at
    pub fn integral_of(&self, account: &Address) -> Integral {
        self.integral_for.get(account).copied().unwrap_or_default()
    }
}

/// Outcome of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// A new slot was appended
    Added(SlotIndex),
    /// A tombstoned slot was reactivated
    Revived(SlotIndex),
    /// The token was already active; nothing changed
    AlreadyActive(SlotIndex),
}

impl Registration {
    /// Index of the affected slot
    pub fn index(&self) -> SlotIndex {
        match self {
            Registration::Added(index) | Registration::Revived(index) | Registration::AlreadyActive(index) => {
                *index
            }
        }
    }
}

// ============ Reward Registry ============

/// Ordered list of reward slots
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct RewardRegistry {
    slots: Vec<RewardSlot>,
    registered: BTreeMap<Address, SlotIndex>,
}

impl RewardRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token`, appending a slot or reviving its old one.
    ///
    /// Emits `RewardAdded` whenever a slot becomes active. A revived slot
    /// keeps its integral and per-account data.
    pub fn register(
        &mut self,
        token: Address,
        source_pool: Option<Address>,
        events: &mut EventLog,
    ) -> LedgerResult<Registration> {
        require_nonzero_address(&token, "reward token is zero")?;

        let registration = match self.registered.get(&token).copied() {
            Some(index) => {
                let slot = self.slot_mut(index)?;
                if slot.is_active() {
                    return Ok(Registration::AlreadyActive(index));
                }
                slot.invalidated = false;
                if source_pool.is_some() {
                    slot.source_pool = source_pool;
                }
                Registration::Revived(index)
            }
            None => {
                let index = self.slots.len();
                self.slots.push(RewardSlot::new(token, source_pool));
                self.registered.insert(token, index);
                Registration::Added(index)
            }
        };

        let index = registration.index();
        log::info!("reward slot {} active", index);
        events.emit(LedgerEvent::RewardAdded {
            token,
            index: index as u64,
            source_pool: self.slots[index].source_pool,
        });
        Ok(registration)
    }

    /// Tombstone the slot of `token`; a no-op if it already is
    pub fn invalidate(&mut self, token: &Address, events: &mut EventLog) -> LedgerResult<SlotIndex> {
        let index = self.index_of(token).ok_or(LedgerError::RewardNotFound { token: *token })?;
        let slot = self.slot_mut(index)?;
        if slot.invalidated {
            return Ok(index);
        }
        slot.invalidated = true;

        log::info!("reward slot {} invalidated", index);
        events.emit(LedgerEvent::RewardInvalidated {
            token: *token,
            index: index as u64,
        });
        Ok(index)
    }

    /// Point slot `index` at a new source pool; emits only on change
    pub fn set_source_pool(&mut self, index: SlotIndex, source_pool: Address, events: &mut EventLog) -> LedgerResult<()> {
        let slot = self.slot_mut(index)?;
        if slot.source_pool == Some(source_pool) {
            return Ok(());
        }
        slot.source_pool = Some(source_pool);
        let token = slot.token;
        events.emit(LedgerEvent::RewardPoolUpdated {
            token,
            index: index as u64,
            source_pool,
        });
        Ok(())
    }

    /// Slot index of `token`, if it was ever registered
    pub fn index_of(&self, token: &Address) -> Option<SlotIndex> {
        self.registered.get(token).copied()
    }

    /// Slot at `index`
    pub fn slot(&self, index: SlotIndex) -> LedgerResult<&RewardSlot> {
        self.slots.get(index).ok_or(LedgerError::SlotNotFound { index })
    }

    /// Mutable slot at `index`
    pub fn slot_mut(&mut self, index: SlotIndex) -> LedgerResult<&mut RewardSlot> {
        self.slots.get_mut(index).ok_or(LedgerError::SlotNotFound { index })
    }

    /// All slots in registry order, tombstones included
    pub fn slots(&self) -> &[RewardSlot] {
        &self.slots
    }

    /// Active slots with their indices
    pub fn active_slots(&self) -> impl Iterator<Item = (SlotIndex, &RewardSlot)> {
        self.slots.iter().enumerate().filter(|(_, slot)| slot.is_active())
    }

    /// Number of slots ever created
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True before the canonical slots exist
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ============ Discovery ============

/// Register reward tokens of the staking source's auxiliary pools.
///
/// All collaborator reads happen before the registry changes, so a failed
/// read leaves it untouched. The canonical second reward token only moves
/// its fixed slot to the discovered pool. Returns the number of slots added.
pub fn discover_external_rewards<H>(
    registry: &mut RewardRegistry,
    host: &H,
    pool_id: u64,
    cvx_token: &Address,
    events: &mut EventLog,
) -> LedgerResult<usize>
where
    H: StakingSource + TokenWrapperAdapter,
{
    let count = host.extra_rewards_length();
    let mut discovered = Vec::with_capacity(count);
    for i in 0..count {
        let pool = host.extra_rewards(i)?;
        let mut token = host.reward_token(&pool)?;
        if pool_id >= WRAPPED_EXTRA_REWARD_POOL_ID {
            token = host.underlying_token(&token)?;
        }
        discovered.push((pool, token));
    }

    let mut added = 0;
    for (pool, token) in discovered {
        if token == *cvx_token {
            registry.set_source_pool(CVX_INDEX, pool, events)?;
            continue;
        }
        match registry.index_of(&token) {
            Some(index) => registry.set_source_pool(index, pool, events)?,
            None => {
                registry.register(token, Some(pool), events)?;
                added += 1;
            }
        }
    }

    if added > 0 {
        log::debug!("discovered {} new reward tokens", added);
    }
    Ok(added)
}
