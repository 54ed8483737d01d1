// Copyright (c) 2024 Botho Foundation

//! Exact integer arithmetic for effective stake.
//!
//! Every quotient here is formed as `(a * b) / c` with the full 512-bit
//! product and a single truncating division. Nodes agree on results only if
//! they truncate at exactly the same points, so these formulas must not be
//! rearranged.

use netstate_types::{NetworkDetails, U256, U512};

/// `a * b / divisor`, truncated. `None` if `divisor` is zero or the quotient
/// does not fit in 256 bits.
pub fn mul_div(a: U256, b: U256, divisor: U256) -> Option<U256> {
    if divisor.is_zero() {
        return None;
    }
    let quotient = a.full_mul(b) / U512::from(divisor);
    U256::try_from(quotient).ok()
}

/// Deposits of an operator's eligible minipools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EligibleDeposits {
    /// Sum of delegator (user) deposits
    pub borrowed: U256,
    /// Sum of operator (node) deposits
    pub bonded: U256,
}

impl EligibleDeposits {
    /// Add one minipool's deposits. `None` on overflow.
    pub fn checked_add(self, user_deposit: U256, node_deposit: U256) -> Option<Self> {
        Some(Self {
            borrowed: self.borrowed.checked_add(user_deposit)?,
            bonded: self.bonded.checked_add(node_deposit)?,
        })
    }
}

/// Collateral an operator must hold to earn anything, and the most that counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CollateralBounds {
    /// Stake below this earns nothing
    pub min: U256,
    /// Stake above this is capped here
    pub max: U256,
}

/// `min = borrowed * min_fraction / price`, `max = bonded * max_fraction / price`.
///
/// The fractions and the price share the same 1e18 scale, so multiplying by
/// one and dividing by the other needs no further normalisation. `None` if the
/// price ratio is zero or a bound overflows.
pub fn collateral_bounds(
    deposits: &EligibleDeposits,
    details: &NetworkDetails,
) -> Option<CollateralBounds> {
    Some(CollateralBounds {
        min: mul_div(
            deposits.borrowed,
            details.min_collateral_fraction,
            details.price_ratio,
        )?,
        max: mul_div(
            deposits.bonded,
            details.max_collateral_fraction,
            details.price_ratio,
        )?,
    })
}

/// Clamp a raw stake to the collateral bounds: below `min` is zero, above
/// `max` is `max`, otherwise unchanged. The `min` check comes first.
pub fn clamp_stake(raw_stake: U256, bounds: &CollateralBounds) -> U256 {
    if raw_stake < bounds.min {
        U256::zero()
    } else if raw_stake > bounds.max {
        bounds.max
    } else {
        raw_stake
    }
}

/// Scale `stake` by the fraction of the interval the operator has been
/// registered for. Operators registered for at least a full interval are
/// unscaled; an operator registered after `slot_time` has zero elapsed time.
/// `None` on overflow.
pub fn scale_by_participation(
    stake: U256,
    registration_time: u64,
    slot_time: u64,
    interval_duration: u64,
) -> Option<U256> {
    let elapsed = slot_time.saturating_sub(registration_time);
    if elapsed < interval_duration {
        mul_div(stake, U256::from(elapsed), U256::from(interval_duration))
    } else {
        Some(stake)
    }
}
