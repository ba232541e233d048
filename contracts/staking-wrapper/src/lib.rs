//! Staking Wrapper Contract
//!
//! Wraps a staked LP position into a transferable token and distributes
//! every reward token the position earns to holders, pro rata to their
//! stake, with a protocol fee skimmed to the treasury.
//!
//! ## Key Features
//!
//! - **Reward registry**: append-only slots with tombstone and revive
//! - **Incremental integrals**: each checkpoint costs O(slots), never
//!   O(accounts)
//! - **Collateral-aware stake**: wrapped tokens deposited as collateral
//!   keep earning for their owner
//! - **All-or-nothing operations**: external effects run under a host
//!   savepoint and local state commits only after they succeed
//!
//! ## Flow
//!
//! Every mint, burn and transfer of the wrapped token, and every explicit
//! checkpoint or claim, first checkpoints the affected accounts. The
//! checkpoint pulls fresh rewards from the staking source, advances each
//! active slot's integral and settles the accounts.

pub mod checkpoint;
pub mod config;
pub mod ledger;
pub mod registry;
pub mod stake;
pub mod wrapper;

#[cfg(test)]
mod testing;


pub use checkpoint::{CheckpointContext, CheckpointPlan, CheckpointRequest, CheckpointResult};
pub use config::WrapperConfig;
pub use registry::{Registration, RewardRegistry, RewardSlot};
pub use wrapper::StakingWrapper;

use staked_collateral_common::{CollateralPools, StakingSource, TokenBank, TokenWrapperAdapter, Transactional};

/// Everything the wrapper needs from its environment
pub trait WrapperHost: TokenBank + StakingSource + TokenWrapperAdapter + CollateralPools + Transactional {}

impl<T> WrapperHost for T where T: TokenBank + StakingSource + TokenWrapperAdapter + CollateralPools + Transactional {}
