//! Stake Position Tracker
//!
//! An account's reward-accruing stake is its wrapped-token balance plus
//! the collateral it holds in the protocol pools. Protocol pools themselves
//! carry no stake: what they hold is attributed back to vessel owners or to
//! the treasury.

use staked_collateral_common::{
    is_zero_address, math, Address, Amount, BTreeMap, CollateralPools, LedgerResult,
};

use crate::config::WrapperConfig;

/// Total stake of `account`
pub fn total_stake<H: CollateralPools + ?Sized>(
    config: &WrapperConfig,
    balances: &BTreeMap<Address, Amount>,
    host: &H,
    account: &Address,
) -> LedgerResult<Amount> {
    if is_zero_address(account) || config.protocol_pools.contains(account) {
        return Ok(0);
    }

    let wrapper = &config.address;
    let held = balances.get(account).copied().unwrap_or(0);
    let pools = &config.protocol_pools;

    let external = if *account == config.treasury {
        math::add(
            host.collateral_balance(&pools.default_pool, wrapper)?,
            host.collateral_balance(&pools.stability_pool, wrapper)?,
        )?
    } else {
        math::add(
            host.vessel_collateral(wrapper, account)?,
            host.surplus_collateral(wrapper, account)?,
        )?
    };

    math::add(held, external)
}

#[cfg(test)]
mod tests {
    use super::*;
    use staked_collateral_common::{derive_address, LedgerError, ProtocolPools};

    fn pools() -> ProtocolPools {
        ProtocolPools {
            active_pool: derive_address(b"active-pool"),
            default_pool: derive_address(b"default-pool"),
            stability_pool: derive_address(b"stability-pool"),
            coll_surplus_pool: derive_address(b"coll-surplus-pool"),
            vessel_manager: derive_address(b"vessel-manager"),
        }
    }

    fn config() -> WrapperConfig {
        WrapperConfig::new([50u8; 32], 7, [10u8; 32], [11u8; 32], [9u8; 32], pools())
    }

    fn user() -> Address {
        [1u8; 32]
    }

    struct Pools;

    impl CollateralPools for Pools {
        fn collateral_balance(&self, pool: &Address, _asset: &Address) -> LedgerResult<Amount> {
            if *pool == pools().default_pool {
                Ok(30)
            } else if *pool == pools().stability_pool {
                Ok(20)
            } else {
                Err(LedgerError::ExternalCallFailed { call: "collateral_balance" })
            }
        }

        fn debt_balance(&self, _pool: &Address, _asset: &Address) -> LedgerResult<Amount> {
            Ok(0)
        }

        fn vessel_collateral(&self, _asset: &Address, _account: &Address) -> LedgerResult<Amount> {
            Ok(5)
        }

        fn surplus_collateral(&self, _asset: &Address, _account: &Address) -> LedgerResult<Amount> {
            Ok(2)
        }
    }

    #[test]
    fn test_user_stake() {
        let mut balances = BTreeMap::new();
        balances.insert(user(), 100);
        assert_eq!(total_stake(&config(), &balances, &Pools, &user()), Ok(107));
    }

    #[test]
    fn test_treasury_stake() {
        let mut balances = BTreeMap::new();
        balances.insert([9u8; 32], 1);
        assert_eq!(total_stake(&config(), &balances, &Pools, &[9u8; 32]), Ok(51));
    }

    #[test]
    fn test_pools_and_zero_have_no_stake() {
        let mut balances = BTreeMap::new();
        balances.insert(pools().active_pool, 1_000);
        assert_eq!(total_stake(&config(), &balances, &Pools, &pools().active_pool), Ok(0));
        assert_eq!(total_stake(&config(), &balances, &Pools, &[0u8; 32]), Ok(0));
    }
}
