// Copyright (c) 2024 Botho Foundation

//! Read-only interfaces to the external data sources a snapshot is built from.
//!
//! Every execution-layer call takes the exact block to read at; every
//! beacon-layer call takes the exact slot. Implementations are expected to
//! apply their own timeout and retry policy; the snapshot builder never
//! retries.

use std::collections::HashMap;

use async_trait::async_trait;
use netstate_types::{
    MinipoolRecord, NodeRecord, RewardSharePercentages, ValidatorPubkey, ValidatorStatus, U256,
};

use crate::error::ReaderError;

#[cfg(test)]
use mockall::automock;

/// Reads the full operator and minipool lists from the execution layer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EntityReader: Send + Sync {
    /// All registered node operators at `block`.
    async fn node_records(&self, block: u64) -> Result<Vec<NodeRecord>, ReaderError>;

    /// All minipools at `block`.
    async fn minipool_records(&self, block: u64) -> Result<Vec<MinipoolRecord>, ReaderError>;
}

/// Reads scalar protocol parameters from the execution layer.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParameterSource: Send + Sync {
    /// Collateral token price in base currency, scaled by 1e18.
    async fn price_ratio(&self, block: u64) -> Result<U256, ReaderError>;

    /// Minimum collateral fraction per borrowed deposit, scaled by 1e18.
    async fn min_collateral_fraction(&self, block: u64) -> Result<U256, ReaderError>;

    /// Maximum collateral fraction per bonded deposit, scaled by 1e18.
    async fn max_collateral_fraction(&self, block: u64) -> Result<U256, ReaderError>;

    /// Index of the reward interval in progress.
    async fn reward_index(&self, block: u64) -> Result<u64, ReaderError>;

    /// Length in seconds of reward interval `reward_index`.
    async fn interval_duration(&self, block: u64, reward_index: u64)
        -> Result<u64, ReaderError>;

    /// Reward pool split for interval `reward_index`.
    async fn reward_share_percentages(
        &self,
        block: u64,
        reward_index: u64,
    ) -> Result<RewardSharePercentages, ReaderError>;

    /// Rewards accrued so far in interval `reward_index`.
    async fn pending_rewards(&self, block: u64, reward_index: u64) -> Result<U256, ReaderError>;
}

/// Reads the beacon chain.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BeaconReader: Send + Sync {
    /// The execution block number carried by the beacon block at `slot`, or
    /// `None` if the slot is empty.
    async fn execution_block_for_slot(&self, slot: u64) -> Result<Option<u64>, ReaderError>;

    /// Lifecycle status of each validator as of `slot`. Pubkeys unknown to the
    /// beacon chain are absent from the result.
    async fn validator_statuses(
        &self,
        pubkeys: &[ValidatorPubkey],
        slot: u64,
    ) -> Result<HashMap<ValidatorPubkey, ValidatorStatus>, ReaderError>;
}
