// Copyright (c) 2024 Botho Foundation

//! In-memory readers and record fixtures for snapshot and stake tests.
//!
//! [`InMemoryLedger`] serves entity lists and protocol parameters per block,
//! so tests can check which block a snapshot was pinned to. Both fakes record
//! every request and can be told to fail a specific call.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use netstate::{BeaconReader, EntityReader, ParameterSource, ReaderError};
use netstate_types::{
    Address, BeaconConfig, MinipoolRecord, MinipoolStatus, NetworkDetails, NodeRecord,
    RewardSharePercentages, ValidatorPubkey, ValidatorStatus, FAR_FUTURE_EPOCH, ONE_ETHER, U256,
};

/// Four weeks, the usual reward interval.
pub const INTERVAL_SECONDS: u64 = 28 * 24 * 60 * 60;

/// `n` whole tokens in 1e18 base units.
pub fn eth(n: u64) -> U256 {
    U256::from(n) * U256::from(ONE_ETHER)
}

/// A deterministic address derived from `n`.
pub fn address(n: u64) -> Address {
    let mut bytes = [0u8; 20];
    bytes[12..].copy_from_slice(&n.to_be_bytes());
    Address(bytes)
}

/// A deterministic non-empty pubkey derived from `n`.
pub fn pubkey(n: u64) -> ValidatorPubkey {
    let mut bytes = [0u8; 48];
    bytes[0] = 0xa0;
    bytes[40..].copy_from_slice(&n.to_be_bytes());
    ValidatorPubkey(bytes)
}

/// Small test-friendly beacon timing: genesis at 0, 12s slots, 32-slot epochs.
pub fn test_beacon_config() -> BeaconConfig {
    BeaconConfig {
        genesis_time: 0,
        seconds_per_slot: 12,
        slots_per_epoch: 32,
    }
}

/// Parameters resembling mainnet: collateral priced at 0.01, 10% min, 150% max.
pub fn test_network_details() -> NetworkDetails {
    NetworkDetails {
        price_ratio: U256::from(ONE_ETHER / 100),
        min_collateral_fraction: U256::from(ONE_ETHER / 10),
        max_collateral_fraction: U256::from(ONE_ETHER / 2 * 3),
        reward_index: 12,
        interval_duration: INTERVAL_SECONDS,
        reward_shares: RewardSharePercentages {
            node_operator: U256::from(ONE_ETHER / 1000 * 705),
            trusted_node: U256::from(ONE_ETHER / 1000 * 15),
            protocol_dao: U256::from(ONE_ETHER / 1000 * 280),
        },
        pending_rewards: eth(50_000),
    }
}

/// An operator registered at `registration_time` with `stake`.
pub fn node(n: u64, stake: U256, registration_time: u64) -> NodeRecord {
    NodeRecord {
        address: address(n),
        stake,
        registration_time,
    }
}

/// A staking minipool with a 16/16 deposit split owned by operator `owner`.
pub fn staking_minipool(n: u64, owner: u64) -> MinipoolRecord {
    MinipoolRecord {
        address: address(1_000_000 + n),
        exists: true,
        node_address: address(owner),
        pubkey: pubkey(n),
        status: MinipoolStatus::Staking,
        user_deposit_balance: eth(16),
        node_deposit_balance: eth(16),
    }
}

/// A validator active from `activation_epoch` that has not exited.
pub fn active_validator(key: ValidatorPubkey, index: u64, activation_epoch: u64) -> ValidatorStatus {
    ValidatorStatus {
        pubkey: key,
        index,
        activation_epoch,
        exit_epoch: FAR_FUTURE_EPOCH,
    }
}

/// Execution-layer calls [`InMemoryLedger`] can be told to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LedgerCall {
    /// [`EntityReader::node_records`]
    NodeRecords,
    /// [`EntityReader::minipool_records`]
    MinipoolRecords,
    /// [`ParameterSource::price_ratio`]
    PriceRatio,
    /// [`ParameterSource::min_collateral_fraction`]
    MinCollateralFraction,
    /// [`ParameterSource::max_collateral_fraction`]
    MaxCollateralFraction,
    /// [`ParameterSource::reward_index`]
    RewardIndex,
    /// [`ParameterSource::interval_duration`]
    IntervalDuration,
    /// [`ParameterSource::reward_share_percentages`]
    RewardSharePercentages,
    /// [`ParameterSource::pending_rewards`]
    PendingRewards,
}

/// Execution-layer state at one block.
#[derive(Clone, Debug, Default)]
pub struct LedgerView {
    /// Protocol parameters
    pub details: NetworkDetails,
    /// Operators
    pub nodes: Vec<NodeRecord>,
    /// Minipools
    pub minipools: Vec<MinipoolRecord>,
}

/// Execution-layer fake serving per-block state.
#[derive(Default)]
pub struct InMemoryLedger {
    views: HashMap<u64, LedgerView>,
    failing: HashSet<LedgerCall>,
    reads: Mutex<Vec<(LedgerCall, u64)>>,
}

impl InMemoryLedger {
    /// An empty ledger; every read fails until a view is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `view` at `block`.
    pub fn with_view(mut self, block: u64, view: LedgerView) -> Self {
        self.views.insert(block, view);
        self
    }

    /// Make `call` fail at every block.
    pub fn failing(mut self, call: LedgerCall) -> Self {
        self.failing.insert(call);
        self
    }

    /// Every `(call, block)` served or refused so far, in order.
    pub fn reads(&self) -> Vec<(LedgerCall, u64)> {
        self.reads.lock().expect("lock poisoned").clone()
    }

    fn view(&self, call: LedgerCall, block: u64) -> Result<&LedgerView, ReaderError> {
        self.reads.lock().expect("lock poisoned").push((call, block));
        if self.failing.contains(&call) {
            return Err(ReaderError::Unavailable(format!("{call:?} failed at block {block}")));
        }
        self.views
            .get(&block)
            .ok_or_else(|| ReaderError::Unavailable(format!("no state at block {block}")))
    }
}

#[async_trait]
impl EntityReader for InMemoryLedger {
    async fn node_records(&self, block: u64) -> Result<Vec<NodeRecord>, ReaderError> {
        Ok(self.view(LedgerCall::NodeRecords, block)?.nodes.clone())
    }

    async fn minipool_records(&self, block: u64) -> Result<Vec<MinipoolRecord>, ReaderError> {
        Ok(self.view(LedgerCall::MinipoolRecords, block)?.minipools.clone())
    }
}

#[async_trait]
impl ParameterSource for InMemoryLedger {
    async fn price_ratio(&self, block: u64) -> Result<U256, ReaderError> {
        Ok(self.view(LedgerCall::PriceRatio, block)?.details.price_ratio)
    }

    async fn min_collateral_fraction(&self, block: u64) -> Result<U256, ReaderError> {
        Ok(self
            .view(LedgerCall::MinCollateralFraction, block)?
            .details
            .min_collateral_fraction)
    }

    async fn max_collateral_fraction(&self, block: u64) -> Result<U256, ReaderError> {
        Ok(self
            .view(LedgerCall::MaxCollateralFraction, block)?
            .details
            .max_collateral_fraction)
    }

    async fn reward_index(&self, block: u64) -> Result<u64, ReaderError> {
        Ok(self.view(LedgerCall::RewardIndex, block)?.details.reward_index)
    }

    async fn interval_duration(&self, block: u64, reward_index: u64) -> Result<u64, ReaderError> {
        let details = &self.view(LedgerCall::IntervalDuration, block)?.details;
        check_reward_index(details, reward_index)?;
        Ok(details.interval_duration)
    }

    async fn reward_share_percentages(
        &self,
        block: u64,
        reward_index: u64,
    ) -> Result<RewardSharePercentages, ReaderError> {
        let details = &self.view(LedgerCall::RewardSharePercentages, block)?.details;
        check_reward_index(details, reward_index)?;
        Ok(details.reward_shares.clone())
    }

    async fn pending_rewards(&self, block: u64, reward_index: u64) -> Result<U256, ReaderError> {
        let details = &self.view(LedgerCall::PendingRewards, block)?.details;
        check_reward_index(details, reward_index)?;
        Ok(details.pending_rewards)
    }
}

fn check_reward_index(details: &NetworkDetails, reward_index: u64) -> Result<(), ReaderError> {
    if details.reward_index != reward_index {
        return Err(ReaderError::Decode(format!(
            "asked for interval {reward_index}, current interval is {}",
            details.reward_index
        )));
    }
    Ok(())
}

/// Beacon-chain fake.
#[derive(Default)]
pub struct InMemoryBeacon {
    blocks_by_slot: HashMap<u64, u64>,
    validators: HashMap<ValidatorPubkey, ValidatorStatus>,
    fail_statuses: bool,
    status_requests: Mutex<Vec<(Vec<ValidatorPubkey>, u64)>>,
}

impl InMemoryBeacon {
    /// A beacon chain with no blocks and no validators.
    pub fn new() -> Self {
        Self::default()
    }

    /// `slot` carries execution block `block`.
    pub fn with_block(mut self, slot: u64, block: u64) -> Self {
        self.blocks_by_slot.insert(slot, block);
        self
    }

    /// Register a validator.
    pub fn with_validator(mut self, status: ValidatorStatus) -> Self {
        self.validators.insert(status.pubkey, status);
        self
    }

    /// Make validator status lookups fail.
    pub fn failing_statuses(mut self) -> Self {
        self.fail_statuses = true;
        self
    }

    /// Every `(pubkeys, slot)` status request so far, in order.
    pub fn status_requests(&self) -> Vec<(Vec<ValidatorPubkey>, u64)> {
        self.status_requests.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl BeaconReader for InMemoryBeacon {
    async fn execution_block_for_slot(&self, slot: u64) -> Result<Option<u64>, ReaderError> {
        Ok(self.blocks_by_slot.get(&slot).copied())
    }

    async fn validator_statuses(
        &self,
        pubkeys: &[ValidatorPubkey],
        slot: u64,
    ) -> Result<HashMap<ValidatorPubkey, ValidatorStatus>, ReaderError> {
        self.status_requests
            .lock()
            .expect("lock poisoned")
            .push((pubkeys.to_vec(), slot));
        if self.fail_statuses {
            return Err(ReaderError::Timeout(format!("validator statuses at slot {slot}")));
        }
        Ok(pubkeys
            .iter()
            .filter_map(|key| self.validators.get(key).map(|v| (*key, v.clone())))
            .collect())
    }
}
