//! Checkpoint Engine
//!
//! Reconciles the wrapper's reward token balances into per-account
//! claimable amounts for up to two accounts.
//!
//! A checkpoint runs in two phases. [`run_checkpoint`] performs the
//! external effects (reward pull, payouts) and plans every slot update
//! against the unchanged registry; the caller runs it under a host
//! savepoint. [`CheckpointPlan::commit`] then writes the plan back. A
//! failure in the first phase therefore leaves no trace anywhere.

use staked_collateral_common::{
    is_zero_address, Address, Amount, BTreeMap, EventLog, LedgerEvent, LedgerResult, Vec,
    ZERO_ADDRESS,
};

use crate::config::WrapperConfig;
use crate::ledger::{apply_slot_update, plan_slot_update, SlotUpdate};
use crate::registry::RewardRegistry;
use crate::stake::total_stake;
use crate::WrapperHost;

// ============ Context ============

/// Read-only view of the wrapper state a checkpoint depends on
#[derive(Debug, Clone, Copy)]
pub struct CheckpointContext<'a> {
    /// Wrapper configuration
    pub config: &'a WrapperConfig,
    /// Wrapped token balances
    pub balances: &'a BTreeMap<Address, Amount>,
    /// Wrapped token supply (the integral denominator)
    pub total_supply: Amount,
    /// Current protocol fee
    pub protocol_fee: u128,
    /// Skip the external reward pull
    pub paused: bool,
}

/// Accounts to checkpoint and whether to pay out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckpointRequest {
    /// On a sync both accounts are settled; on a claim the first is
    /// settled and paid out to the second
    pub accounts: [Address; 2],
    /// Pay out the first account's rewards
    pub claim: bool,
}

impl CheckpointRequest {
    /// Settle `a` and `b` without paying out
    pub fn sync(a: Address, b: Address) -> Self {
        Self {
            accounts: [a, b],
            claim: false,
        }
    }

    /// Settle `account` and pay its rewards to `receiver`
    pub fn claim(account: Address, receiver: Address) -> Self {
        Self {
            accounts: [account, receiver],
            claim: true,
        }
    }

    /// Settle a single account
    pub fn single(account: Address) -> Self {
        Self::sync(account, ZERO_ADDRESS)
    }
}

/// What a committed checkpoint did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointResult {
    /// True when a protocol pool was involved and nothing ran
    pub skipped: bool,
    /// Number of active slots updated
    pub slots_updated: usize,
    /// `(token, amount)` paid out, one entry per paying slot
    pub payouts: Vec<(Address, Amount)>,
}

// ============ Plan ============

/// Planned slot updates awaiting commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPlan {
    request: CheckpointRequest,
    updates: Vec<SlotUpdate>,
    skipped: bool,
}

impl CheckpointPlan {
    fn skipped(request: CheckpointRequest) -> Self {
        Self {
            request,
            updates: Vec::new(),
            skipped: true,
        }
    }

    /// Check that every slot the plan touches exists in `registry`
    pub fn verify(&self, registry: &RewardRegistry) -> LedgerResult<()> {
        for update in &self.updates {
            registry.slot(update.index)?;
        }
        Ok(())
    }

    /// Write the plan into `registry` and emit its events.
    ///
    /// The plan is verified before anything is written, so a plan that does
    /// not match `registry` fails with `SlotNotFound` and leaves it untouched.
    pub fn commit(self, registry: &mut RewardRegistry, events: &mut EventLog) -> LedgerResult<CheckpointResult> {
        if self.skipped {
            return Ok(CheckpointResult {
                skipped: true,
                ..CheckpointResult::default()
            });
        }
        self.verify(registry)?;

        let [account_a, account_b] = self.request.accounts;
        let mut payouts = Vec::new();

        for update in &self.updates {
            apply_slot_update(registry.slot_mut(update.index)?, update);
            for settlement in update.settlements.iter().filter(|s| s.payout > 0) {
                events.emit(LedgerEvent::RewardPaid {
                    account: settlement.account,
                    receiver: account_b,
                    token: update.token,
                    amount: settlement.payout,
                });
            }
            let paid = update.total_payout();
            if paid > 0 {
                payouts.push((update.token, paid));
            }
        }

        events.emit(LedgerEvent::UserCheckpoint { account_a, account_b });
        Ok(CheckpointResult {
            skipped: false,
            slots_updated: self.updates.len(),
            payouts,
        })
    }
}

// ============ Execution ============

/// Pull rewards, plan every active slot and perform the payouts.
///
/// Must run under a host savepoint: payouts are real transfers. A slot
/// whose balance cannot be read or whose math fails is skipped without
/// affecting its siblings; a failed payout aborts the whole checkpoint.
pub fn run_checkpoint<H: WrapperHost>(
    ctx: &CheckpointContext<'_>,
    registry: &RewardRegistry,
    host: &mut H,
    request: CheckpointRequest,
) -> LedgerResult<CheckpointPlan> {
    let pools = &ctx.config.protocol_pools;
    if request.accounts.iter().any(|account| pools.contains(account)) {
        log::debug!("checkpoint skipped for protocol pool");
        return Ok(CheckpointPlan::skipped(request));
    }

    let [first, second] = request.accounts;
    let mut participants = Vec::with_capacity(2);
    if !is_zero_address(&first) {
        participants.push((first, total_stake(ctx.config, ctx.balances, &*host, &first)?));
    }
    if !request.claim && second != first && !is_zero_address(&second) {
        participants.push((second, total_stake(ctx.config, ctx.balances, &*host, &second)?));
    }

    let wrapper = ctx.config.address;
    if !ctx.paused {
        if let Err(err) = host.get_reward(&wrapper, true) {
            log::warn!("reward pull failed: {}", err.code());
        }
    }

    let mut updates = Vec::new();
    for (index, slot) in registry.active_slots() {
        let observed = match host.balance_of(&slot.token, &wrapper) {
            Ok(balance) => balance,
            Err(err) => {
                log::warn!("slot {} balance unavailable: {}", index, err.code());
                continue;
            }
        };

        let update = match plan_slot_update(
            index,
            slot,
            observed,
            ctx.total_supply,
            &participants,
            ctx.protocol_fee,
            &ctx.config.treasury,
            request.claim,
        ) {
            Ok(update) => update,
            Err(err) => {
                log::warn!("slot {} skipped: {}", index, err.code());
                continue;
            }
        };

        let paid = update.total_payout();
        if paid > 0 {
            host.transfer(&slot.token, &wrapper, &second, paid)?;
        }
        updates.push(update);
    }

    Ok(CheckpointPlan {
        request,
        updates,
        skipped: false,
    })
}
