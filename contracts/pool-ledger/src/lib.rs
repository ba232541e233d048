//! Pool Ledger Contract
//!
//! Books, per collateral asset, the collateral a protocol pool holds and
//! the debt outstanding against it. The same ledger serves the active pool
//! and the default pool; only the caller allow-lists differ.
//!
//! ## Operations
//!
//! - **increase_debt / decrease_debt**: adjust recorded debt
//! - **send_asset**: move collateral out, redeeming vault shares when the
//!   destination is not an internal pool
//! - **received_erc20**: book collateral sent in by another component
//!
//! Every mutation runs atomically: external effects run under a host
//! savepoint and the ledger commits only after they all succeed.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use staked_collateral_common::{
    math::{self, decimals_correction},
    require_authorized,
    validation::require_sufficient,
    with_savepoint, AccessControlState, Address, Amount, BTreeMap, DepositRecipient, EventLog,
    LedgerEvent, LedgerResult, Operation, ProtocolPools, ReentrancyGuard, Role, TokenBank,
    Transactional, VaultAdapter,
};

// ============ Pool Kind ============

/// Which protocol pool a ledger instance books for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolKind {
    /// Collateral and debt of open vessels
    Active,
    /// Collateral and debt awaiting redistribution
    Default,
}

impl PoolKind {
    /// Roles allowed to perform `operation` on this pool
    pub fn allowed_roles(&self, operation: Operation) -> &'static [Role] {
        match (self, operation) {
            (PoolKind::Active, Operation::IncreaseDebt) => {
                &[Role::BorrowerOperations, Role::VesselManager]
            }
            (PoolKind::Active, Operation::DecreaseDebt) | (PoolKind::Active, Operation::SendAsset) => {
                &[Role::BorrowerOperations, Role::VesselManager, Role::StabilityPool]
            }
            (PoolKind::Active, Operation::ReceivedErc20) => &[Role::BorrowerOperations, Role::DefaultPool],
            (PoolKind::Default, Operation::IncreaseDebt)
            | (PoolKind::Default, Operation::DecreaseDebt)
            | (PoolKind::Default, Operation::SendAsset) => &[Role::VesselManager],
            (PoolKind::Default, Operation::ReceivedErc20) => &[Role::ActivePool],
            _ => &[],
        }
    }
}

// ============ Pool Ledger Config ============

/// Configuration for a pool ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolLedgerConfig {
    /// This pool's own address (holder of the collateral tokens)
    pub address: Address,
    /// Pool kind (selects the allow-lists)
    pub kind: PoolKind,
    /// Protocol-internal pool addresses
    pub protocol_pools: ProtocolPools,
}

impl PoolLedgerConfig {
    /// Destinations that always receive vault shares as-is
    pub fn keeps_wrapped_form(&self, destination: &Address) -> bool {
        *destination == self.protocol_pools.default_pool
            || *destination == self.protocol_pools.coll_surplus_pool
            || *destination == self.protocol_pools.stability_pool
    }
}

// ============ Pool Balance ============

/// Recorded amounts for one asset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolBalance {
    /// Collateral held, in standard decimals
    pub collateral: Amount,
    /// Outstanding debt
    pub debt: Amount,
}

/// Everything a pool ledger needs from its environment
pub trait PoolHost: TokenBank + VaultAdapter + DepositRecipient + Transactional {}

impl<T> PoolHost for T where T: TokenBank + VaultAdapter + DepositRecipient + Transactional {}

// ============ Pool Ledger ============

/// Collateral and debt ledger of one protocol pool
#[derive(Debug, Clone)]
pub struct PoolLedger {
    /// Static configuration
    pub config: PoolLedgerConfig,
    /// Roles and pause flag
    pub access: AccessControlState,
    balances: BTreeMap<Address, PoolBalance>,
    guard: ReentrancyGuard,
    events: EventLog,
}

impl PoolLedger {
    /// Create an empty ledger
    pub fn new(config: PoolLedgerConfig, access: AccessControlState) -> Self {
        Self {
            config,
            access,
            balances: BTreeMap::new(),
            guard: ReentrancyGuard::new(),
            events: EventLog::new(),
        }
    }

    // ============ Views ============

    /// Recorded collateral of `asset`
    pub fn asset_balance(&self, asset: &Address) -> Amount {
        self.balance(asset).collateral
    }

    /// Recorded debt of `asset`
    pub fn debt_balance(&self, asset: &Address) -> Amount {
        self.balance(asset).debt
    }

    /// Recorded amounts of `asset`
    pub fn balance(&self, asset: &Address) -> PoolBalance {
        self.balances.get(asset).copied().unwrap_or_default()
    }

    /// Events emitted so far
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    // ============ Debt ============

    /// Increase recorded debt of `asset`
    pub fn increase_debt(&mut self, caller: &Address, asset: &Address, amount: Amount) -> LedgerResult<()> {
        self.authorize(caller, Operation::IncreaseDebt)?;
        let mut entry = self.balance(asset);
        entry.debt = math::add(entry.debt, amount)?;
        self.store_debt(asset, entry);
        Ok(())
    }

    /// Decrease recorded debt of `asset`; fails with `Underflow` if the
    /// amount exceeds the recorded debt
    pub fn decrease_debt(&mut self, caller: &Address, asset: &Address, amount: Amount) -> LedgerResult<()> {
        self.authorize(caller, Operation::DecreaseDebt)?;
        let mut entry = self.balance(asset);
        entry.debt = math::sub(entry.debt, amount)?;
        self.store_debt(asset, entry);
        Ok(())
    }

    // ============ Collateral ============

    /// Book collateral received from another component
    pub fn received_erc20(&mut self, caller: &Address, asset: &Address, amount: Amount) -> LedgerResult<()> {
        self.authorize(caller, Operation::ReceivedErc20)?;
        let mut entry = self.balance(asset);
        entry.collateral = math::add(entry.collateral, amount)?;
        self.store_collateral(asset, entry);
        Ok(())
    }

    /// Send `amount` (standard decimals) of `asset` to `to`.
    ///
    /// The recorded balance drops by the requested `amount` while the
    /// transfer moves the decimals-corrected amount. Returns the amount
    /// that actually left the pool (0 when the corrected amount is zero,
    /// in which case nothing changes).
    pub fn send_asset<H: PoolHost>(
        &mut self,
        host: &mut H,
        caller: &Address,
        asset: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<Amount> {
        self.authorize(caller, Operation::SendAsset)?;
        self.guard.enter()?;
        let result = self.send_asset_inner(host, asset, to, amount);
        self.guard.exit();
        result
    }

    fn send_asset_inner<H: PoolHost>(
        &mut self,
        host: &mut H,
        asset: &Address,
        to: &Address,
        amount: Amount,
    ) -> LedgerResult<Amount> {
        let transfer_amount = decimals_correction(amount, host.decimals(asset))?;
        if transfer_amount == 0 {
            return Ok(0);
        }

        let mut entry = self.balance(asset);
        require_sufficient(entry.collateral, amount)?;
        entry.collateral -= amount;

        let pool = self.config.address;
        let unwrap = host.is_vault_asset(asset) && !self.config.keeps_wrapped_form(to);

        // External effects first; the ledger only commits once they all succeed
        let sent = with_savepoint(host, |host| {
            let sent = if unwrap {
                log::debug!("redeeming vault asset before send");
                host.redeem(asset, transfer_amount, to, &pool)?
            } else {
                host.transfer(asset, &pool, to, transfer_amount)?;
                transfer_amount
            };

            if host.is_deposit_contract(to) {
                host.on_received_asset(to, asset, amount)?;
            }
            Ok(sent)
        })?;

        self.store_collateral(asset, entry);
        self.events.emit(LedgerEvent::AssetSent {
            pool,
            to: *to,
            asset: *asset,
            amount: sent,
        });
        Ok(sent)
    }

    // ============ Internals ============

    fn authorize(&self, caller: &Address, operation: Operation) -> LedgerResult<()> {
        require_authorized(&self.access, caller, operation, self.config.kind.allowed_roles(operation))
    }

    fn store_debt(&mut self, asset: &Address, entry: PoolBalance) {
        self.balances.insert(*asset, entry);
        self.events.emit(LedgerEvent::PoolDebtUpdated {
            pool: self.config.address,
            asset: *asset,
            debt: entry.debt,
        });
    }

    fn store_collateral(&mut self, asset: &Address, entry: PoolBalance) {
        self.balances.insert(*asset, entry);
        self.events.emit(LedgerEvent::PoolAssetBalanceUpdated {
            pool: self.config.address,
            asset: *asset,
            balance: entry.collateral,
        });
    }
}

// ============ Tests ============
