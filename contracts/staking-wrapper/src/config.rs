//! Wrapper configuration

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use staked_collateral_common::{
    constants::fees::{DEFAULT_PROTOCOL_FEE, MAX_PROTOCOL_FEE},
    validation::require_nonzero_address,
    Address, LedgerError, LedgerResult, ProtocolPools,
};

/// Configuration for the staking wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct WrapperConfig {
    /// The wrapper's own address (holder of staked and reward tokens)
    pub address: Address,
    /// Pool id in the staking source
    pub staking_pool_id: u64,
    /// Primary reward token paid by the base reward pool
    pub crv_token: Address,
    /// Secondary canonical reward token
    pub cvx_token: Address,
    /// Receiver of the protocol fee share
    pub treasury: Address,
    /// Protocol-internal pools (never accrue rewards directly)
    pub protocol_pools: ProtocolPools,
    /// Initial protocol fee (1e18 = 100%)
    pub protocol_fee: u128,
}

impl WrapperConfig {
    /// Config with the default protocol fee
    pub fn new(
        address: Address,
        staking_pool_id: u64,
        crv_token: Address,
        cvx_token: Address,
        treasury: Address,
        protocol_pools: ProtocolPools,
    ) -> Self {
        Self {
            address,
            staking_pool_id,
            crv_token,
            cvx_token,
            treasury,
            protocol_pools,
            protocol_fee: DEFAULT_PROTOCOL_FEE,
        }
    }

    /// Reject configs the wrapper cannot run with
    pub fn validate(&self) -> LedgerResult<()> {
        require_nonzero_address(&self.address, "wrapper address is zero")?;
        require_nonzero_address(&self.crv_token, "crv token is zero")?;
        require_nonzero_address(&self.cvx_token, "cvx token is zero")?;
        require_nonzero_address(&self.treasury, "treasury is zero")?;
        if self.crv_token == self.cvx_token {
            return Err(LedgerError::InvalidParameter {
                param: "cvx_token",
                reason: "canonical reward tokens must differ",
            });
        }
        if self.protocol_fee > MAX_PROTOCOL_FEE {
            return Err(LedgerError::InvalidParameter {
                param: "protocol_fee",
                reason: "exceeds 1.0",
            });
        }
        Ok(())
    }
}
