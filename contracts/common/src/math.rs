//! Mathematical Utilities
//!
//! Checked fixed-point arithmetic. Products go through a 256-bit
//! intermediate so `amount * SCALE` never overflows before the division.

use primitive_types::{U256, U512};

use crate::constants::precision::{FEE_PRECISION, INTEGRAL_SCALE, STANDARD_DECIMALS};
use crate::errors::{LedgerError, LedgerResult};
use crate::types::{Amount, Integral};

/// Compute `a * b / denominator`, rounding down.
///
/// Fails with `DivisionByZero` for a zero denominator and with `Overflow`
/// if the quotient does not fit in 128 bits.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> LedgerResult<u128> {
    if denominator == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    let quotient = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(LedgerError::Overflow)?
        / U256::from(denominator);
    if quotient > U256::from(u128::MAX) {
        return Err(LedgerError::Overflow);
    }
    Ok(quotient.as_u128())
}

/// Checked addition
pub fn add(a: u128, b: u128) -> LedgerResult<u128> {
    a.checked_add(b).ok_or(LedgerError::Overflow)
}

/// Checked subtraction
pub fn sub(a: u128, b: u128) -> LedgerResult<u128> {
    a.checked_sub(b).ok_or(LedgerError::Underflow)
}

/// Integral increase for a newly observed reward amount.
///
/// integral_delta = received * INTEGRAL_SCALE / supply
pub fn integral_increase(received: Amount, supply: Amount) -> LedgerResult<Integral> {
    if supply == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    let delta = U256::from(received)
        .checked_mul(U256::from(INTEGRAL_SCALE))
        .ok_or(LedgerError::Overflow)?
        / U256::from(supply);
    Ok(Integral::from_raw(delta))
}

/// Checked integral addition
pub fn integral_add(a: Integral, b: Integral) -> LedgerResult<Integral> {
    a.raw()
        .checked_add(b.raw())
        .map(Integral::from_raw)
        .ok_or(LedgerError::Overflow)
}

/// Checked integral subtraction
pub fn integral_sub(a: Integral, b: Integral) -> LedgerResult<Integral> {
    a.raw()
        .checked_sub(b.raw())
        .map(Integral::from_raw)
        .ok_or(LedgerError::Underflow)
}

/// Reward accrued by `stake` while the integral moved by `integral_delta`.
///
/// accrued = stake * integral_delta / INTEGRAL_SCALE
///
/// The product is taken in 512 bits; only the final amount is narrowed.
pub fn accrued_reward(stake: Amount, integral_delta: Integral) -> LedgerResult<Amount> {
    let accrued = U256::from(stake).full_mul(integral_delta.raw()) / U512::from(INTEGRAL_SCALE);
    if accrued > U512::from(u128::MAX) {
        return Err(LedgerError::Overflow);
    }
    Ok(accrued.low_u128())
}

/// Split a gross reward into `(user_share, treasury_share)`.
///
/// The user share rounds down, the treasury takes the remainder, so the
/// two always sum to `gross`.
pub fn split_protocol_fee(gross: Amount, protocol_fee: u128) -> LedgerResult<(Amount, Amount)> {
    if protocol_fee > FEE_PRECISION {
        return Err(LedgerError::InvalidParameter {
            param: "protocol_fee",
            reason: "exceeds 1.0",
        });
    }
    let user_share = mul_div(gross, FEE_PRECISION - protocol_fee, FEE_PRECISION)?;
    Ok((user_share, gross - user_share))
}

/// Convert an amount in standard (18) decimals to a token's native decimals.
///
/// Tokens with fewer decimals lose the sub-unit remainder; tokens with more
/// decimals are scaled up.
pub fn decimals_correction(amount: Amount, token_decimals: u8) -> LedgerResult<Amount> {
    if amount == 0 {
        return Ok(0);
    }
    if token_decimals < STANDARD_DECIMALS {
        let divisor = 10u128.pow(u32::from(STANDARD_DECIMALS - token_decimals));
        Ok(amount / divisor)
    } else if token_decimals > STANDARD_DECIMALS {
        let multiplier = 10u128
            .checked_pow(u32::from(token_decimals - STANDARD_DECIMALS))
            .ok_or(LedgerError::Overflow)?;
        amount.checked_mul(multiplier).ok_or(LedgerError::Overflow)
    } else {
        Ok(amount)
    }
}
