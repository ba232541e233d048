//! External Collaborator Interfaces
//!
//! The ledgers reach the outside world only through these traits. The
//! `caller` argument of mutating calls is the identity the collaborator
//! sees as the sender (normally the ledger's own address).
//!
//! Hosts are expected to be [`Transactional`]: a ledger operation takes a
//! savepoint before it starts and rolls the host back if it fails, so an
//! aborted operation leaves no external trace either.

use crate::types::{Address, Amount, StakingPoolInfo};
use crate::LedgerResult;

/// Fungible token balances and transfers
pub trait TokenBank {
    /// Balance of `holder` in `token`
    fn balance_of(&self, token: &Address, holder: &Address) -> LedgerResult<Amount>;

    /// Move `amount` of `token` from `from` to `to`
    fn transfer(&mut self, token: &Address, from: &Address, to: &Address, amount: Amount) -> LedgerResult<()>;

    /// Native decimals of `token`
    fn decimals(&self, _token: &Address) -> u8 {
        crate::constants::precision::STANDARD_DECIMALS
    }
}

/// The external staking/yield source holding staked principal
pub trait StakingSource {
    /// Deposit principal into pool `pool_id`, optionally staking the receipt
    fn deposit_principal(&mut self, caller: &Address, pool_id: u64, amount: Amount, auto_stake: bool) -> LedgerResult<()>;

    /// Stake already-deposited receipt tokens
    fn stake(&mut self, caller: &Address, amount: Amount) -> LedgerResult<()>;

    /// Unstake receipt tokens, optionally claiming
    fn withdraw(&mut self, caller: &Address, amount: Amount, claim: bool) -> LedgerResult<()>;

    /// Unstake and return the principal token
    fn withdraw_and_unwrap(&mut self, caller: &Address, amount: Amount, claim: bool) -> LedgerResult<()>;

    /// Push every claimable reward of `for_address` into its balance
    fn get_reward(&mut self, for_address: &Address, claim_extras: bool) -> LedgerResult<()>;

    /// Ask the source to move accumulated rewards into reward pools
    fn earmark_rewards(&mut self, pool_id: u64) -> LedgerResult<bool>;

    /// Tokens and reward pool of `pool_id`
    fn pool_info(&self, pool_id: u64) -> LedgerResult<StakingPoolInfo>;

    /// Number of auxiliary reward pools attached to the base reward pool
    fn extra_rewards_length(&self) -> usize;

    /// Auxiliary reward pool at `index`
    fn extra_rewards(&self, index: usize) -> LedgerResult<Address>;

    /// Token distributed by `reward_pool`
    fn reward_token(&self, reward_pool: &Address) -> LedgerResult<Address>;
}

/// Adapter that hides a reward token behind a wrapper token
pub trait TokenWrapperAdapter {
    /// Token wrapped by `wrapper`
    fn underlying_token(&self, wrapper: &Address) -> LedgerResult<Address>;
}

/// Yield-bearing vault wrapper used by some collateral assets
pub trait VaultAdapter {
    /// Whether `asset` is a vault share that should be redeemed on exit
    fn is_vault_asset(&self, asset: &Address) -> bool;

    /// Asset backing the vault share
    fn underlying_asset(&self, asset: &Address) -> LedgerResult<Address>;

    /// Redeem `amount` shares held by `owner`, sending the underlying to
    /// `to`; returns the underlying amount sent
    fn redeem(&mut self, asset: &Address, amount: Amount, to: &Address, owner: &Address) -> LedgerResult<Amount>;
}

/// Collateral and debt views of the protocol pools
pub trait CollateralPools {
    /// Collateral of `asset` recorded by `pool`
    fn collateral_balance(&self, pool: &Address, asset: &Address) -> LedgerResult<Amount>;

    /// Debt of `asset` recorded by `pool`
    fn debt_balance(&self, pool: &Address, asset: &Address) -> LedgerResult<Amount>;

    /// Collateral of `asset` locked in `account`'s vessel
    fn vessel_collateral(&self, asset: &Address, account: &Address) -> LedgerResult<Amount>;

    /// Surplus collateral of `asset` claimable by `account`
    fn surplus_collateral(&self, asset: &Address, account: &Address) -> LedgerResult<Amount>;
}

/// Contracts that want to be told when they receive an asset
pub trait DepositRecipient {
    /// Whether `account` exposes the deposit-notification hook
    fn is_deposit_contract(&self, account: &Address) -> bool;

    /// Deliver the notification
    fn on_received_asset(&mut self, recipient: &Address, asset: &Address, amount: Amount) -> LedgerResult<()>;
}

/// Host state that can be rolled back when an operation fails
pub trait Transactional {
    /// Opaque restore point
    type Savepoint;

    /// Capture the current state
    fn savepoint(&self) -> Self::Savepoint;

    /// Restore a previously captured state
    fn rollback(&mut self, savepoint: Self::Savepoint);
}

/// Run `body` against `host`, rolling the host back if it fails
pub fn with_savepoint<H, T>(host: &mut H, body: impl FnOnce(&mut H) -> LedgerResult<T>) -> LedgerResult<T>
where
    H: Transactional,
{
    let savepoint = host.savepoint();
    match body(host) {
        Ok(value) => Ok(value),
        Err(err) => {
            log::warn!("external effects rolled back: {}", err.code());
            host.rollback(savepoint);
            Err(err)
        }
    }
}
