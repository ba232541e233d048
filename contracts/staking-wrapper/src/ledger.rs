//! Reward Ledger
//!
//! Per-slot integral accounting. A checkpoint first plans a [`SlotUpdate`]
//! from the observed token balance without touching the slot, then the
//! plan is applied once every external effect has succeeded.
//!
//! ## Formulas
//!
//! ```text
//! integral  += (observed - remaining) * INTEGRAL_SCALE / supply
//! accrued    = stake * (integral - integral_for[account]) / INTEGRAL_SCALE
//! user_share = accrued * (1 - protocol_fee)
//! treasury   = accrued - user_share
//! ```
//!
//! The fee applies to newly accrued rewards only; amounts already sitting
//! in `claimable` were netted when they were booked.

use staked_collateral_common::{
    math::{self, accrued_reward, integral_add, integral_increase, integral_sub, split_protocol_fee},
    Address, Amount, BTreeMap, Integral, LedgerResult, SlotIndex, Vec,
};

use crate::registry::RewardSlot;

/// Settlement of one account within a slot update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSettlement {
    /// Settled account
    pub account: Address,
    /// Gross reward accrued since the account's last settlement
    pub accrued: Amount,
    /// Part of `accrued` credited to the account
    pub user_share: Amount,
    /// Part of `accrued` credited to the treasury
    pub treasury_share: Amount,
    /// Amount paid out on a claim (0 otherwise)
    pub payout: Amount,
}

/// Planned change of one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotUpdate {
    /// Slot being updated
    pub index: SlotIndex,
    /// Reward token of the slot
    pub token: Address,
    /// New integral
    pub integral: Integral,
    /// New attributable balance, net of payouts and deferred rewards
    pub remaining: Amount,
    /// Per-account settlements in processing order
    pub settlements: Vec<AccountSettlement>,
    /// Final claimable values to store
    pub claimable: BTreeMap<Address, Amount>,
}

impl SlotUpdate {
    /// Total paid out by this update
    pub fn total_payout(&self) -> Amount {
        self.settlements.iter().map(|s| s.payout).sum()
    }
}

/// Integral after observing `observed` with `supply` outstanding.
///
/// Returns `(integral, deferred)`. With zero supply the increase cannot be
/// attributed and is reported as deferred instead.
pub fn accrue(slot: &RewardSlot, observed: Amount, supply: Amount) -> LedgerResult<(Integral, Amount)> {
    if observed <= slot.remaining {
        return Ok((slot.integral, 0));
    }
    let received = observed - slot.remaining;
    if supply == 0 {
        return Ok((slot.integral, received));
    }
    let integral = integral_add(slot.integral, integral_increase(received, supply)?)?;
    Ok((integral, 0))
}

/// Plan the update of `slot` for the given `(account, stake)` participants.
///
/// On a claim every participant's claimable balance (old plus newly
/// accrued user share) is paid out; otherwise it is only booked. The
/// treasury's share is always booked to `treasury`.
#[allow(clippy::too_many_arguments)]
pub fn plan_slot_update(
    index: SlotIndex,
    slot: &RewardSlot,
    observed: Amount,
    supply: Amount,
    participants: &[(Address, Amount)],
    protocol_fee: u128,
    treasury: &Address,
    claim: bool,
) -> LedgerResult<SlotUpdate> {
    let (integral, deferred) = accrue(slot, observed, supply)?;

    let mut claimable: BTreeMap<Address, Amount> = BTreeMap::new();
    let mut settlements = Vec::with_capacity(participants.len());

    for (account, stake) in participants {
        let last = slot.integral_of(account);
        if !claim && last >= integral {
            continue;
        }

        let accrued = accrued_reward(*stake, integral_sub(integral, last)?)?;
        let (user_share, treasury_share) = split_protocol_fee(accrued, protocol_fee)?;
        let current = claimable.get(account).copied().unwrap_or_else(|| slot.claimable_of(account));
        let owed = math::add(current, user_share)?;

        let payout = if claim { owed } else { 0 };
        claimable.insert(*account, if claim { 0 } else { owed });

        if treasury_share > 0 {
            let booked = claimable.get(treasury).copied().unwrap_or_else(|| slot.claimable_of(treasury));
            claimable.insert(*treasury, math::add(booked, treasury_share)?);
        }

        settlements.push(AccountSettlement {
            account: *account,
            accrued,
            user_share,
            treasury_share,
            payout,
        });
    }

    let paid: Amount = settlements.iter().map(|s| s.payout).sum();
    let remaining = observed.saturating_sub(paid).saturating_sub(deferred);

    Ok(SlotUpdate {
        index,
        token: slot.token,
        integral,
        remaining,
        settlements,
        claimable,
    })
}

/// Write a planned update into its slot
pub fn apply_slot_update(slot: &mut RewardSlot, update: &SlotUpdate) {
    slot.integral = update.integral;
    slot.remaining = update.remaining;
    for settlement in &update.settlements {
        slot.integral_for.insert(settlement.account, update.integral);
    }
    for (account, amount) in &update.claimable {
        if *amount == 0 {
            slot.claimable.remove(account);
        } else {
            slot.claimable.insert(*account, *amount);
        }
    }
}

/// Rewards `account` could claim right now if `observed` were checkpointed
pub fn earned(
    slot: &RewardSlot,
    observed: Amount,
    supply: Amount,
    account: &Address,
    stake: Amount,
    protocol_fee: u128,
) -> LedgerResult<Amount> {
    let (integral, _) = accrue(slot, observed, supply)?;
    let accrued = accrued_reward(stake, integral_sub(integral, slot.integral_of(account))?)?;
    let (user_share, _) = split_protocol_fee(accrued, protocol_fee)?;
    math::add(slot.claimable_of(account), user_share)
}
