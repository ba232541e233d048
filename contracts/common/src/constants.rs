//! Protocol Constants
//!
//! Fixed-point scales, fee bounds and well-known reward slot indices.

/// Fixed-point precision
pub mod precision {
    /// Scale of the reward integral (reward per unit of stake)
    pub const INTEGRAL_SCALE: u128 = 100_000_000_000_000_000_000; // 1e20

    /// Scale of fractional parameters such as the protocol fee (1.0 = 1e18)
    pub const FEE_PRECISION: u128 = 1_000_000_000_000_000_000;

    /// Decimals every ledger amount is expressed in
    pub const STANDARD_DECIMALS: u8 = 18;
}

/// Protocol fee configuration
pub mod fees {
    use super::precision::FEE_PRECISION;

    /// Default share of distributed rewards kept by the treasury (15%)
    pub const DEFAULT_PROTOCOL_FEE: u128 = FEE_PRECISION * 15 / 100;

    /// Upper bound for the protocol fee (100%)
    pub const MAX_PROTOCOL_FEE: u128 = FEE_PRECISION;
}

/// Reward slot layout
pub mod rewards {
    /// Slot of the staking source's primary reward token
    pub const CRV_INDEX: usize = 0;

    /// Slot of the secondary canonical reward token
    pub const CVX_INDEX: usize = 1;

    /// From this pool id on, auxiliary reward pools report a wrapper token
    /// that must be unwrapped to find the real reward token
    pub const WRAPPED_EXTRA_REWARD_POOL_ID: u64 = 151;
}
