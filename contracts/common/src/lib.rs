//! Staked Collateral Common Library
//!
//! Shared types, constants, and utilities for the staked-collateral
//! ledgers: the pool ledger that books collateral and debt per asset, and
//! the staking wrapper that distributes externally earned rewards to
//! depositors.
//!
//! ## Contents
//!
//! - **Errors**: one taxonomy for every ledger operation
//! - **Events**: typed, serializable observations collected per call
//! - **Math**: fixed-point helpers with a 256-bit intermediate
//! - **Access Control**: role assignments checked through pure predicates
//! - **Guard**: explicit reentrancy flag
//! - **Interfaces**: the narrow traits external collaborators implement
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, vec::Vec};

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod validation;
pub mod access_control;
pub mod guard;
pub mod interfaces;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use events::*;
pub use access_control::*;
pub use guard::*;
pub use interfaces::*;
