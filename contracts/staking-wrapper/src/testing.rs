//! In-memory host and fixtures shared by the wrapper tests

use staked_collateral_common::{
    derive_address, AccessControlState, Address, Amount, BTreeMap, CollateralPools, LedgerError, LedgerResult,
    ProtocolPools, Role, StakingPoolInfo, StakingSource, TokenBank, TokenWrapperAdapter, Transactional, Vec,
};

use crate::config::WrapperConfig;
use crate::wrapper::StakingWrapper;

pub const POOL_ID: u64 = 7;

// ============ Addresses ============

pub fn owner() -> Address {
    [1u8; 32]
}

pub fn timelock() -> Address {
    [2u8; 32]
}

pub fn treasury() -> Address {
    [3u8; 32]
}

pub fn alice() -> Address {
    [4u8; 32]
}

pub fn bob() -> Address {
    [5u8; 32]
}

pub fn carol() -> Address {
    [6u8; 32]
}

pub fn crv() -> Address {
    [10u8; 32]
}

pub fn cvx() -> Address {
    [11u8; 32]
}

pub fn extra() -> Address {
    [12u8; 32]
}

pub fn lp_token() -> Address {
    [20u8; 32]
}

pub fn deposit_token() -> Address {
    [21u8; 32]
}

pub fn rewards_pool() -> Address {
    [22u8; 32]
}

pub fn wrapper_address() -> Address {
    derive_address(b"staking-wrapper")
}

pub fn pools() -> ProtocolPools {
    ProtocolPools {
        active_pool: derive_address(b"active-pool"),
        default_pool: derive_address(b"default-pool"),
        stability_pool: derive_address(b"stability-pool"),
        coll_surplus_pool: derive_address(b"coll-surplus-pool"),
        vessel_manager: derive_address(b"vessel-manager"),
    }
}

pub fn config(pool_id: u64) -> WrapperConfig {
    WrapperConfig::new(wrapper_address(), pool_id, crv(), cvx(), treasury(), pools())
}

pub fn access() -> AccessControlState {
    AccessControlState::new(owner()).with_role(timelock(), Role::Timelock)
}

// ============ Mock Host ============

/// Token bank, staking source and collateral pools in one
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    pub balances: BTreeMap<(Address, Address), Amount>,
    pub staked: Amount,
    /// Rewards waiting in the staking source, by (token, holder)
    pub pending: BTreeMap<(Address, Address), Amount>,
    pub pool_infos: BTreeMap<u64, StakingPoolInfo>,
    pub extra_pools: Vec<Address>,
    pub pool_tokens: BTreeMap<Address, Address>,
    pub wrapped_tokens: BTreeMap<Address, Address>,
    pub earmarks: u32,
    pub fail_get_reward: bool,
    pub broken_tokens: Vec<Address>,
    pub failing_transfers: Vec<Address>,
    pub vessel: BTreeMap<Address, Amount>,
    pub surplus: BTreeMap<Address, Amount>,
    pub pool_collateral: BTreeMap<Address, Amount>,
}

impl MockHost {
    pub fn new() -> Self {
        let mut host = Self::default();
        host.pool_infos.insert(
            POOL_ID,
            StakingPoolInfo {
                principal_token: lp_token(),
                deposit_token: deposit_token(),
                rewards_pool: rewards_pool(),
            },
        );
        host
    }

    pub fn fund(&mut self, token: Address, holder: Address, amount: Amount) {
        *self.balances.entry((token, holder)).or_default() += amount;
    }

    pub fn held(&self, token: Address, holder: Address) -> Amount {
        self.balances.get(&(token, holder)).copied().unwrap_or(0)
    }

    /// Make `amount` of `token` claimable by the wrapper at the source
    pub fn accrue(&mut self, token: Address, amount: Amount) {
        *self.pending.entry((token, wrapper_address())).or_default() += amount;
    }

    /// Send `amount` of `token` straight to the wrapper
    pub fn airdrop(&mut self, token: Address, amount: Amount) {
        self.fund(token, wrapper_address(), amount);
    }

    fn burn(&mut self, token: Address, holder: Address, amount: Amount) -> LedgerResult<()> {
        let available = self.held(token, holder);
        if available < amount {
            return Err(LedgerError::ExternalCallFailed { call: "burn" });
        }
        self.balances.insert((token, holder), available - amount);
        Ok(())
    }
}

impl TokenBank for MockHost {
    fn balance_of(&self, token: &Address, holder: &Address) -> LedgerResult<Amount> {
        if self.broken_tokens.contains(token) {
            return Err(LedgerError::ExternalCallFailed { call: "balance_of" });
        }
        Ok(self.held(*token, *holder))
    }

    fn transfer(&mut self, token: &Address, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()> {
        let available = self.held(*token, *from);
        if self.failing_transfers.contains(token) || available < amount {
            return Err(LedgerError::TransferFailed { token: *token, to: *to, amount });
        }
        self.balances.insert((*token, *from), available - amount);
        self.fund(*token, *to, amount);
        Ok(())
    }
}

impl StakingSource for MockHost {
    fn deposit_principal(&mut self, caller: &Address, pool_id: u64, amount: Amount, auto_stake: bool) -> LedgerResult<()> {
        let info = self.pool_info(pool_id)?;
        self.burn(info.principal_token, *caller, amount)?;
        if auto_stake {
            self.staked += amount;
        } else {
            self.fund(info.deposit_token, *caller, amount);
        }
        Ok(())
    }

    fn stake(&mut self, caller: &Address, amount: Amount) -> LedgerResult<()> {
        self.burn(deposit_token(), *caller, amount)?;
        self.staked += amount;
        Ok(())
    }

    fn withdraw(&mut self, caller: &Address, amount: Amount, _claim: bool) -> LedgerResult<()> {
        if self.staked < amount {
            return Err(LedgerError::ExternalCallFailed { call: "withdraw" });
        }
        self.staked -= amount;
        self.fund(deposit_token(), *caller, amount);
        Ok(())
    }

    fn withdraw_and_unwrap(&mut self, caller: &Address, amount: Amount, _claim: bool) -> LedgerResult<()> {
        if self.staked < amount {
            return Err(LedgerError::ExternalCallFailed { call: "withdraw_and_unwrap" });
        }
        self.staked -= amount;
        self.fund(lp_token(), *caller, amount);
        Ok(())
    }

    fn get_reward(&mut self, for_address: &Address, _claim_extras: bool) -> LedgerResult<()> {
        if self.fail_get_reward {
            return Err(LedgerError::ExternalCallFailed { call: "get_reward" });
        }
        let due: Vec<(Address, Amount)> = self
            .pending
            .iter()
            .filter(|((_, holder), _)| holder == for_address)
            .map(|((token, _), amount)| (*token, *amount))
            .collect();
        for (token, amount) in due {
            self.pending.remove(&(token, *for_address));
            self.fund(token, *for_address, amount);
        }
        Ok(())
    }

    fn earmark_rewards(&mut self, _pool_id: u64) -> LedgerResult<bool> {
        self.earmarks += 1;
        Ok(true)
    }

    fn pool_info(&self, pool_id: u64) -> LedgerResult<StakingPoolInfo> {
        self.pool_infos
            .get(&pool_id)
            .cloned()
            .ok_or(LedgerError::ExternalCallFailed { call: "pool_info" })
    }

    fn extra_rewards_length(&self) -> usize {
        self.extra_pools.len()
    }

    fn extra_rewards(&self, index: usize) -> LedgerResult<Address> {
        self.extra_pools
            .get(index)
            .copied()
            .ok_or(LedgerError::ExternalCallFailed { call: "extra_rewards" })
    }

    fn reward_token(&self, reward_pool: &Address) -> LedgerResult<Address> {
        self.pool_tokens
            .get(reward_pool)
            .copied()
            .ok_or(LedgerError::ExternalCallFailed { call: "reward_token" })
    }
}

impl TokenWrapperAdapter for MockHost {
    fn underlying_token(&self, wrapper: &Address) -> LedgerResult<Address> {
        self.wrapped_tokens
            .get(wrapper)
            .copied()
            .ok_or(LedgerError::ExternalCallFailed { call: "underlying_token" })
    }
}

impl CollateralPools for MockHost {
    fn collateral_balance(&self, pool: &Address, _asset: &Address) -> LedgerResult<Amount> {
        Ok(self.pool_collateral.get(pool).copied().unwrap_or(0))
    }

    fn debt_balance(&self, _pool: &Address, _asset: &Address) -> LedgerResult<Amount> {
        Ok(0)
    }

    fn vessel_collateral(&self, _asset: &Address, account: &Address) -> LedgerResult<Amount> {
        Ok(self.vessel.get(account).copied().unwrap_or(0))
    }

    fn surplus_collateral(&self, _asset: &Address, account: &Address) -> LedgerResult<Amount> {
        Ok(self.surplus.get(account).copied().unwrap_or(0))
    }
}

impl Transactional for MockHost {
    type Savepoint = MockHost;

    fn savepoint(&self) -> MockHost {
        self.clone()
    }

    fn rollback(&mut self, savepoint: MockHost) {
        *self = savepoint;
    }
}

// ============ Fixtures ============

/// Initialized wrapper with alice and bob holding principal tokens
pub fn setup() -> (StakingWrapper, MockHost) {
    let mut host = MockHost::new();
    host.fund(lp_token(), alice(), 1_000_000);
    host.fund(lp_token(), bob(), 1_000_000);

    let mut wrapper = StakingWrapper::new(config(POOL_ID), access()).unwrap();
    wrapper.initialize(&host).unwrap();
    (wrapper, host)
}

/// `setup` plus a deposit of `a` for alice and `b` for bob
pub fn setup_with_deposits(a: Amount, b: Amount) -> (StakingWrapper, MockHost) {
    let (mut wrapper, mut host) = setup();
    if a > 0 {
        wrapper.deposit_principal(&mut host, &alice(), a, &alice()).unwrap();
    }
    if b > 0 {
        wrapper.deposit_principal(&mut host, &bob(), b, &bob()).unwrap();
    }
    (wrapper, host)
}
