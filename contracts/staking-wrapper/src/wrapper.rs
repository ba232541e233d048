//! Staking Wrapper
//!
//! The wrapped token and every entry point of the reward ledger.
//!
//! ## Operations
//!
//! - **deposit_principal / stake_deposit_tokens**: wrap and mint
//! - **withdraw / withdraw_and_unwrap**: burn and return the underlying
//! - **transfer**: move wrapped tokens between accounts
//! - **checkpoint / claim / claim_and_forward / claim_treasury**: settle
//!   and pay out rewards
//! - **register / invalidate / set_protocol_fee / pause**: administration

use staked_collateral_common::{
    access_control,
    constants::{fees::MAX_PROTOCOL_FEE, rewards::{CRV_INDEX, CVX_INDEX}},
    is_zero_address, math, non_reentrant,
    require_operation,
    validation::{require_nonzero_address, require_positive, require_sufficient},
    with_savepoint, AccessControlState, Address, Amount, BTreeMap, EarnedReward, EventLog, LedgerError,
    LedgerEvent, LedgerResult, Operation, ReentrancyGuard, Role, SlotIndex, StakingPoolInfo, Vec, ZERO_ADDRESS,
};

use crate::checkpoint::{run_checkpoint, CheckpointContext, CheckpointRequest, CheckpointResult};
use crate::config::WrapperConfig;
use crate::ledger;
use crate::registry::{self, Registration, RewardRegistry, RewardSlot};
use crate::stake::total_stake;
use crate::WrapperHost;

/// Wrapped staking position with its reward ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingWrapper {
    /// Static configuration
    pub config: WrapperConfig,
    /// Roles and pause flag
    pub access: AccessControlState,
    registry: RewardRegistry,
    balances: BTreeMap<Address, Amount>,
    total_supply: Amount,
    protocol_fee: u128,
    redirects: BTreeMap<Address, Address>,
    pool_info: Option<StakingPoolInfo>,
    pub(crate) guard: ReentrancyGuard,
    events: EventLog,
}

fn guard_of(wrapper: &mut StakingWrapper) -> &mut ReentrancyGuard {
    &mut wrapper.guard
}

impl StakingWrapper {
    /// Create an uninitialized wrapper
    pub fn new(config: WrapperConfig, access: AccessControlState) -> LedgerResult<Self> {
        config.validate()?;
        let protocol_fee = config.protocol_fee;
        Ok(Self {
            config,
            access,
            registry: RewardRegistry::new(),
            balances: BTreeMap::new(),
            total_supply: 0,
            protocol_fee,
            redirects: BTreeMap::new(),
            pool_info: None,
            guard: ReentrancyGuard::new(),
            events: EventLog::new(),
        })
    }

    /// Resolve the staking pool and create the canonical reward slots.
    ///
    /// Slot 0 tracks the primary reward token of the base reward pool,
    /// slot 1 the secondary canonical token. Auxiliary streams are
    /// discovered right away.
    pub fn initialize<H: WrapperHost>(&mut self, host: &H) -> LedgerResult<()> {
        if self.pool_info.is_some() {
            return Err(LedgerError::AlreadyInitialized);
        }

        let info = host.pool_info(self.config.staking_pool_id)?;
        let mut registry = RewardRegistry::new();
        let mut events = EventLog::new();
        let crv = registry.register(self.config.crv_token, Some(info.rewards_pool), &mut events)?;
        let cvx = registry.register(self.config.cvx_token, None, &mut events)?;
        debug_assert_eq!((crv.index(), cvx.index()), (CRV_INDEX, CVX_INDEX));
        registry::discover_external_rewards(
            &mut registry,
            host,
            self.config.staking_pool_id,
            &self.config.cvx_token,
            &mut events,
        )?;

        log::info!("wrapper initialized with {} reward slots", registry.len());
        self.registry = registry;
        self.pool_info = Some(info);
        for event in events.into_events() {
            self.events.emit(event);
        }
        Ok(())
    }

    /// Register reward streams added to the staking source since the last
    /// discovery. Callable by anyone.
    pub fn discover_external_rewards<H: WrapperHost>(&mut self, host: &H) -> LedgerResult<usize> {
        self.require_initialized()?;
        registry::discover_external_rewards(
            &mut self.registry,
            host,
            self.config.staking_pool_id,
            &self.config.cvx_token,
            &mut self.events,
        )
    }

    // ============ Wrapped Token ============

    /// Pull `amount` principal from `caller`, deposit and stake it, and
    /// mint wrapped tokens to `receiver`
    pub fn deposit_principal<H: WrapperHost>(
        &mut self,
        host: &mut H,
        caller: &Address,
        amount: Amount,
        receiver: &Address,
    ) -> LedgerResult<()> {
        let info = self.prepare_deposit(amount, receiver)?;
        let wrapper = self.config.address;
        let pool_id = self.config.staking_pool_id;
        let caller = *caller;

        let minted = self.minted(receiver, amount)?;
        self.checkpointed(host, CheckpointRequest::sync(ZERO_ADDRESS, *receiver), |host| {
            host.transfer(&info.principal_token, &caller, &wrapper, amount)?;
            host.deposit_principal(&wrapper, pool_id, amount, true)
        })?;
        self.commit_mint(caller, *receiver, amount, minted, true);
        Ok(())
    }

    /// Pull `amount` already-deposited receipt tokens from `caller`, stake
    /// them and mint wrapped tokens to `receiver`
    pub fn stake_deposit_tokens<H: WrapperHost>(
        &mut self,
        host: &mut H,
        caller: &Address,
        amount: Amount,
        receiver: &Address,
    ) -> LedgerResult<()> {
        let info = self.prepare_deposit(amount, receiver)?;
        let wrapper = self.config.address;
        let caller = *caller;

        let minted = self.minted(receiver, amount)?;
        self.checkpointed(host, CheckpointRequest::sync(ZERO_ADDRESS, *receiver), |host| {
            host.transfer(&info.deposit_token, &caller, &wrapper, amount)?;
            host.stake(&wrapper, amount)
        })?;
        self.commit_mint(caller, *receiver, amount, minted, false);
        Ok(())
    }

    /// Burn `amount` and return staking deposit tokens to `caller`
    pub fn withdraw<H: WrapperHost>(&mut self, host: &mut H, caller: &Address, amount: Amount) -> LedgerResult<()> {
        self.burn(host, caller, amount, false)
    }

    /// Burn `amount` and return principal tokens to `caller`
    pub fn withdraw_and_unwrap<H: WrapperHost>(
        &mut self,
        host: &mut H,
        caller: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        self.burn(host, caller, amount, true)
    }

    /// Move `amount` wrapped tokens from `caller` to `to`
    pub fn transfer<H: WrapperHost>(
        &mut self,
        host: &mut H,
        caller: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<()> {
        require_nonzero_address(to, "transfer to zero address")?;
        require_positive(amount)?;
        let from_balance = self.balance_of(caller);
        require_sufficient(from_balance, amount)?;
        let to_balance = if to == caller {
            from_balance
        } else {
            math::add(self.balance_of(to), amount)?
        };

        self.checkpointed(host, CheckpointRequest::sync(*caller, *to), |_| Ok(()))?;

        if to != caller {
            self.balances.insert(*caller, from_balance - amount);
            self.balances.insert(*to, to_balance);
        }
        self.events.emit(LedgerEvent::Transfer {
            from: *caller,
            to: *to,
            amount,
        });
        Ok(())
    }

    // ============ Rewards ============

    /// Settle `account` without paying out
    pub fn checkpoint<H: WrapperHost>(&mut self, host: &mut H, account: &Address) -> LedgerResult<CheckpointResult> {
        self.checkpointed(host, CheckpointRequest::single(*account), |_| Ok(()))
    }

    /// Settle `account` and pay its rewards to its redirect, or to itself
    /// when none is set
    pub fn claim<H: WrapperHost>(&mut self, host: &mut H, account: &Address) -> LedgerResult<CheckpointResult> {
        require_nonzero_address(account, "claim for zero address")?;
        let receiver = self.reward_redirect(account).unwrap_or(*account);
        self.checkpointed(host, CheckpointRequest::claim(*account, receiver), |_| Ok(()))
    }

    /// Settle `caller` and pay its rewards to `destination`
    pub fn claim_and_forward<H: WrapperHost>(
        &mut self,
        host: &mut H,
        caller: &Address,
        destination: &Address,
    ) -> LedgerResult<CheckpointResult> {
        require_nonzero_address(caller, "claim for zero address")?;
        require_nonzero_address(destination, "forward to zero address")?;
        self.checkpointed(host, CheckpointRequest::claim(*caller, *destination), |_| Ok(()))
    }

    /// Pay the treasury's accumulated fee share of slot `index`.
    ///
    /// Returns the amount paid; 0 for a tombstoned slot or an empty share.
    pub fn claim_treasury<H: WrapperHost>(&mut self, host: &mut H, index: SlotIndex) -> LedgerResult<Amount> {
        non_reentrant(self, guard_of, |wrapper| {
            let treasury = wrapper.config.treasury;
            let slot = wrapper.registry.slot(index)?;
            if !slot.is_active() {
                return Ok(0);
            }
            let amount = slot.claimable_of(&treasury);
            if amount == 0 {
                return Ok(0);
            }
            let token = slot.token;
            let address = wrapper.config.address;

            with_savepoint(host, |host| host.transfer(&token, &address, &treasury, amount))?;

            let slot = wrapper.registry.slot_mut(index)?;
            slot.claimable.remove(&treasury);
            slot.remaining = slot.remaining.saturating_sub(amount);
            wrapper.events.emit(LedgerEvent::TreasuryClaimed { treasury, token, amount });
            Ok(amount)
        })
    }

    /// Send future claims of `caller` to `destination`; the zero address
    /// clears the redirect
    pub fn set_reward_redirect(&mut self, caller: &Address, destination: &Address) {
        if is_zero_address(destination) {
            self.redirects.remove(caller);
        } else {
            self.redirects.insert(*caller, *destination);
        }
        self.events.emit(LedgerEvent::RewardRedirected {
            account: *caller,
            destination: *destination,
        });
    }

    // ============ Administration ============

    /// Register (or revive) a reward token
    pub fn register_reward_token(&mut self, caller: &Address, token: &Address) -> LedgerResult<Registration> {
        require_operation(&self.access, caller, Operation::RegisterReward)?;
        self.require_initialized()?;
        self.registry.register(*token, None, &mut self.events)
    }

    /// Tombstone a reward token
    pub fn invalidate_reward_token(&mut self, caller: &Address, token: &Address) -> LedgerResult<SlotIndex> {
        require_operation(&self.access, caller, Operation::InvalidateReward)?;
        self.registry.invalidate(token, &mut self.events)
    }

    /// Change the protocol fee (1e18 = 100%)
    pub fn set_protocol_fee(&mut self, caller: &Address, fee: u128) -> LedgerResult<()> {
        require_operation(&self.access, caller, Operation::SetProtocolFee)?;
        if fee > MAX_PROTOCOL_FEE {
            return Err(LedgerError::InvalidParameter {
                param: "protocol_fee",
                reason: "exceeds 1.0",
            });
        }
        let old_fee = self.protocol_fee;
        self.protocol_fee = fee;
        self.events.emit(LedgerEvent::ProtocolFeeChanged { old_fee, new_fee: fee });
        Ok(())
    }

    /// Block deposits and skip the external reward pull
    pub fn pause(&mut self, caller: &Address) -> LedgerResult<()> {
        access_control::pause(&mut self.access, *caller, &mut self.events)
    }

    /// Lift a pause
    pub fn unpause(&mut self, caller: &Address) -> LedgerResult<()> {
        access_control::unpause(&mut self.access, *caller, &mut self.events)
    }

    /// Grant `role` to `account`
    pub fn grant_role(&mut self, caller: &Address, account: &Address, role: Role) -> LedgerResult<()> {
        access_control::grant_role(&mut self.access, *caller, *account, role, &mut self.events)
    }

    /// Revoke `role` from `account`
    pub fn revoke_role(&mut self, caller: &Address, account: &Address, role: Role) -> LedgerResult<()> {
        access_control::revoke_role(&mut self.access, *caller, *account, role, &mut self.events)
    }

    /// Ask the staking source to earmark this pool's rewards
    pub fn earmark_rewards<H: WrapperHost>(&mut self, host: &mut H) -> LedgerResult<bool> {
        let pool_id = self.config.staking_pool_id;
        with_savepoint(host, |host| host.earmark_rewards(pool_id))
    }

    // ============ Views ============

    /// Rewards `account` would receive from a claim right now, per active
    /// slot, without pulling from the staking source
    pub fn earned_rewards<H: WrapperHost>(&self, host: &H, account: &Address) -> LedgerResult<Vec<EarnedReward>> {
        let stake = total_stake(&self.config, &self.balances, host, account)?;
        let mut earned = Vec::new();
        for (index, slot) in self.registry.active_slots() {
            let observed = match host.balance_of(&slot.token, &self.config.address) {
                Ok(balance) => balance,
                Err(err) => {
                    log::warn!("slot {} balance unavailable: {}", index, err.code());
                    continue;
                }
            };
            let amount = ledger::earned(slot, observed, self.total_supply, account, stake, self.protocol_fee)?;
            earned.push(EarnedReward { token: slot.token, amount });
        }
        Ok(earned)
    }

    /// Reward-accruing stake of `account`
    pub fn stake_of<H: WrapperHost>(&self, host: &H, account: &Address) -> LedgerResult<Amount> {
        total_stake(&self.config, &self.balances, host, account)
    }

    /// Wrapped token balance of `account`
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Wrapped token supply
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Current protocol fee
    pub fn protocol_fee(&self) -> u128 {
        self.protocol_fee
    }

    /// Number of reward slots, tombstones included
    pub fn reward_count(&self) -> usize {
        self.registry.len()
    }

    /// Reward slot at `index`
    pub fn reward_slot(&self, index: SlotIndex) -> LedgerResult<&RewardSlot> {
        self.registry.slot(index)
    }

    /// All reward slots in registry order
    pub fn reward_slots(&self) -> &[RewardSlot] {
        self.registry.slots()
    }

    /// Claimable amount of `account` in slot `index`
    pub fn claimable(&self, index: SlotIndex, account: &Address) -> LedgerResult<Amount> {
        Ok(self.registry.slot(index)?.claimable_of(account))
    }

    /// Claim destination of `account`, if redirected
    pub fn reward_redirect(&self, account: &Address) -> Option<Address> {
        self.redirects.get(account).copied()
    }

    /// Staking pool tokens, once initialized
    pub fn pool_info(&self) -> Option<&StakingPoolInfo> {
        self.pool_info.as_ref()
    }

    /// Events emitted so far
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    // ============ Internals ============

    /// Checkpoint under the guard, run `effects` in the same savepoint, and
    /// commit the checkpoint once both succeeded
    fn checkpointed<H, T>(
        &mut self,
        host: &mut H,
        request: CheckpointRequest,
        effects: impl FnOnce(&mut H) -> LedgerResult<T>,
    ) -> LedgerResult<CheckpointResult>
    where
        H: WrapperHost,
    {
        non_reentrant(self, guard_of, |wrapper| {
            let ctx = CheckpointContext {
                config: &wrapper.config,
                balances: &wrapper.balances,
                total_supply: wrapper.total_supply,
                protocol_fee: wrapper.protocol_fee,
                paused: access_control::is_paused(&wrapper.access),
            };
            let registry = &wrapper.registry;

            let plan = with_savepoint(host, |host| {
                let plan = run_checkpoint(&ctx, registry, host, request)?;
                plan.verify(registry)?;
                effects(host)?;
                Ok(plan)
            })?;

            plan.commit(&mut wrapper.registry, &mut wrapper.events)
        })
    }

    fn burn<H: WrapperHost>(&mut self, host: &mut H, caller: &Address, amount: Amount, unwrap: bool) -> LedgerResult<()> {
        require_positive(amount)?;
        let info = self.require_initialized()?.clone();
        let balance = self.balance_of(caller);
        require_sufficient(balance, amount)?;
        let supply = math::sub(self.total_supply, amount)?;
        let wrapper = self.config.address;
        let receiver = *caller;

        self.checkpointed(host, CheckpointRequest::sync(*caller, ZERO_ADDRESS), |host| {
            if unwrap {
                host.withdraw_and_unwrap(&wrapper, amount, false)?;
                host.transfer(&info.principal_token, &wrapper, &receiver, amount)
            } else {
                host.withdraw(&wrapper, amount, false)?;
                host.transfer(&info.deposit_token, &wrapper, &receiver, amount)
            }
        })?;

        self.balances.insert(*caller, balance - amount);
        self.total_supply = supply;
        self.events.emit(LedgerEvent::Transfer {
            from: *caller,
            to: ZERO_ADDRESS,
            amount,
        });
        self.events.emit(LedgerEvent::Withdrawn {
            account: *caller,
            amount,
            unwrapped: unwrap,
        });
        Ok(())
    }

    fn prepare_deposit(&self, amount: Amount, receiver: &Address) -> LedgerResult<StakingPoolInfo> {
        if access_control::is_paused(&self.access) {
            return Err(LedgerError::ProtocolPaused);
        }
        require_positive(amount)?;
        require_nonzero_address(receiver, "mint to zero address")?;
        Ok(self.require_initialized()?.clone())
    }

    /// Receiver balance and supply after minting `amount`
    fn minted(&self, receiver: &Address, amount: Amount) -> LedgerResult<(Amount, Amount)> {
        Ok((
            math::add(self.balance_of(receiver), amount)?,
            math::add(self.total_supply, amount)?,
        ))
    }

    fn commit_mint(&mut self, caller: Address, receiver: Address, amount: Amount, minted: (Amount, Amount), principal: bool) {
        let (balance, supply) = minted;
        self.balances.insert(receiver, balance);
        self.total_supply = supply;
        self.events.emit(LedgerEvent::Transfer {
            from: ZERO_ADDRESS,
            to: receiver,
            amount,
        });
        self.events.emit(LedgerEvent::Deposited {
            caller,
            receiver,
            amount,
            principal,
        });
    }

    fn require_initialized(&self) -> LedgerResult<&StakingPoolInfo> {
        self.pool_info.as_ref().ok_or(LedgerError::NotInitialized)
    }
}
