// Copyright (c) 2024 Botho Foundation

//! Protocol parameters in force at a snapshot's pinned block.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// 1e18, the fixed-point scale of fractions and the price ratio.
pub const ONE_ETHER: u64 = 1_000_000_000_000_000_000;

/// Shares of the interval's reward pool, each scaled by [`ONE_ETHER`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardSharePercentages {
    /// Share paid to node operators
    pub node_operator: U256,

    /// Share paid to the trusted oracle node set
    pub trusted_node: U256,

    /// Share paid to the protocol DAO treasury
    pub protocol_dao: U256,
}

/// Scalar protocol parameters read at a pinned block.
///
/// `price_ratio`, `min_collateral_fraction` and `max_collateral_fraction` are
/// all scaled by [`ONE_ETHER`], so the collateral formulas multiply by one and
/// divide by the other without a separate normalisation step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDetails {
    /// Collateral token price in base currency
    pub price_ratio: U256,

    /// Minimum collateral per unit of borrowed deposit
    pub min_collateral_fraction: U256,

    /// Maximum collateral per unit of bonded deposit
    pub max_collateral_fraction: U256,

    /// Index of the reward interval in progress
    pub reward_index: u64,

    /// Length of a reward interval in whole seconds
    pub interval_duration: u64,

    /// Reward pool split
    pub reward_shares: RewardSharePercentages,

    /// Rewards accrued for the interval in progress
    pub pending_rewards: U256,
}
