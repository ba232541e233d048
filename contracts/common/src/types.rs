//! Core Types for the Staked Collateral Ledgers
//!
//! Fundamental data structures shared by the pool ledger and the
//! staking wrapper.

use borsh::{BorshDeserialize, BorshSerialize};
use primitive_types::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Type alias for addresses (32-byte identifiers)
pub type Address = [u8; 32];

/// Token amounts in base units
pub type Amount = u128;

/// Permanent index of a reward slot
pub type SlotIndex = usize;

/// The zero address. Never a valid holder or reward token.
pub const ZERO_ADDRESS: Address = [0u8; 32];

/// Returns true for the zero address
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}

/// Derive a deterministic address from a label.
///
/// Used to name well-known accounts (pools, the wrapper itself) without
/// hand-picking byte patterns.
pub fn derive_address(label: &[u8]) -> Address {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(b"staked-collateral");
    hasher.update(label);
    let result = hasher.finalize();
    let mut address = [0u8; 32];
    address.copy_from_slice(&result);
    address
}

// ============ Reward Integral ============

/// Cumulative reward per unit of stake, scaled by `INTEGRAL_SCALE`.
///
/// 256 bits wide: a single unit of stake may accrue any `Amount` of
/// rewards without exhausting the range. Encoded as 32 little-endian
/// bytes in both serde and borsh form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integral(U256);

impl Integral {
    /// Integral of a slot nothing was distributed to yet
    pub fn zero() -> Self {
        Self::default()
    }

    /// Wrap a raw 256-bit value
    pub fn from_raw(value: U256) -> Self {
        Self(value)
    }

    /// Raw 256-bit value
    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.0.to_little_endian(&mut bytes);
        bytes
    }

    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_little_endian(&bytes))
    }
}

impl From<u128> for Integral {
    fn from(value: u128) -> Self {
        Self(U256::from(value))
    }
}

impl Serialize for Integral {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.to_le_bytes(), serializer)
    }
}

impl<'de> Deserialize<'de> for Integral {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[u8; 32] as Deserialize<'de>>::deserialize(deserializer).map(Self::from_le_bytes)
    }
}

impl BorshSerialize for Integral {
    fn serialize<W: borsh::io::Write>(&self, writer: &mut W) -> borsh::io::Result<()> {
        BorshSerialize::serialize(&self.to_le_bytes(), writer)
    }
}

impl BorshDeserialize for Integral {
    fn deserialize_reader<R: borsh::io::Read>(reader: &mut R) -> borsh::io::Result<Self> {
        <[u8; 32]>::deserialize_reader(reader).map(Self::from_le_bytes)
    }
}

// ============ Protocol Pools ============

/// Addresses of the protocol-internal pools.
///
/// These accounts never accrue rewards directly: collateral they hold is
/// attributed back to users (vessel and surplus balances) or to the
/// treasury (default pool and stability pool balances).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct ProtocolPools {
    /// Pool holding collateral and debt of active vessels
    pub active_pool: Address,
    /// Pool holding redistributed collateral and debt
    pub default_pool: Address,
    /// Stability pool (offset collateral)
    pub stability_pool: Address,
    /// Pool holding claimable collateral surplus
    pub coll_surplus_pool: Address,
    /// Vessel manager (holds nothing but can be a transfer party)
    pub vessel_manager: Address,
}

impl ProtocolPools {
    /// Returns true if `account` is one of the protocol-internal pools
    pub fn contains(&self, account: &Address) -> bool {
        *account == self.active_pool
            || *account == self.default_pool
            || *account == self.stability_pool
            || *account == self.coll_surplus_pool
            || *account == self.vessel_manager
    }
}

// ============ Staking Source Types ============

/// Pool description returned by the staking source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StakingPoolInfo {
    /// Principal token deposited into the staking source (LP token)
    pub principal_token: Address,
    /// Deposit receipt token minted by the staking source
    pub deposit_token: Address,
    /// Base reward pool the deposit token is staked in
    pub rewards_pool: Address,
}

// ============ Reward Views ============

/// Pending reward of one token for one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct EarnedReward {
    /// Reward token
    pub token: Address,
    /// Amount claimable if a checkpoint ran now
    pub amount: Amount,
}
