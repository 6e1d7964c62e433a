//! Shared arithmetic for the ticket lottery contracts.
//!
//! Everything here is pure integer math over token base units so it can be
//! exercised without an `Env`.
#![no_std]
#![allow(unexpected_cfgs)]

use soroban_sdk::contracttype;

/// Error codes for the shared arithmetic helpers.
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Error {
    InvalidAmount = 1,
    InvalidFeeConfig = 2,
    Overflow = 3,
}

/// Constant for basis points divisor.
pub const BASIS_POINTS_DIVISOR: u32 = 10_000;

/// Largest decimals value whose scale factor fits in an `i128`.
pub const MAX_DECIMALS: u32 = 38;

/// Result of splitting a round's pot between the operator and the winner.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PotSplit {
    pub fee: i128,
    pub prize: i128,
}

/// Fee owed on `amount` at `fee_bps` basis points, truncated toward zero.
///
/// Defined for every non-negative `i128`: the amount is split into whole
/// multiples of the divisor and a remainder so no intermediate exceeds
/// `amount`.
pub fn calculate_fee(amount: i128, fee_bps: u32) -> Result<i128, Error> {
    if amount < 0 {
        return Err(Error::InvalidAmount);
    }
    if fee_bps > BASIS_POINTS_DIVISOR {
        return Err(Error::InvalidFeeConfig);
    }
    let divisor = BASIS_POINTS_DIVISOR as i128;
    let bps = fee_bps as i128;

    let whole = (amount / divisor)
        .checked_mul(bps)
        .ok_or(Error::Overflow)?;
    let rest = (amount % divisor) * bps / divisor;
    whole.checked_add(rest).ok_or(Error::Overflow)
}

/// Split `amount` into the operator fee and the remaining prize.
///
/// `fee + prize == amount` always holds; the truncation remainder goes to the
/// prize.
pub fn split_pot(amount: i128, fee_bps: u32) -> Result<PotSplit, Error> {
    let fee = calculate_fee(amount, fee_bps)?;
    let prize = amount.checked_sub(fee).ok_or(Error::Overflow)?;
    Ok(PotSplit { fee, prize })
}

/// Convert a whole-token amount into base units for a token with `decimals`.
pub fn to_base_units(whole: i128, decimals: u32) -> Result<i128, Error> {
    if decimals > MAX_DECIMALS {
        return Err(Error::Overflow);
    }
    10i128
        .checked_pow(decimals)
        .and_then(|scale| whole.checked_mul(scale))
        .ok_or(Error::Overflow)
}
