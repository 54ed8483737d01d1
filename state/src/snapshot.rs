// Copyright (c) 2024 Botho Foundation

//! Height-pinned network state snapshots.
//!
//! A [`NetworkState`] is built for one beacon slot. The slot is resolved to the
//! execution block its beacon block carries, and every execution-layer read
//! that follows is pinned to that block number, so every quantity in the
//! snapshot reflects one ledger state. Construction is all-or-nothing: any
//! failed read aborts it and no partial snapshot is ever returned.

use std::{collections::HashMap, sync::Arc, time::Instant};

use netstate_types::{
    Address, BeaconConfig, MinipoolRecord, NetworkDetails, NodeRecord, ValidatorPubkey,
    ValidatorStatus,
};

use crate::{
    calculator::{EffectiveStakeCalculator, EffectiveStakes},
    config::CalculatorConfig,
    error::{StateError, StateResult},
    index::{referenced_pubkeys, StateIndex},
    logger::{create_null_logger, StateLogger},
    reader::{BeaconReader, EntityReader, ParameterSource},
    state_log,
};

/// Immutable snapshot of operators, minipools, validator statuses and protocol
/// parameters at one (execution block, beacon slot) pair.
#[derive(Clone, Debug)]
pub struct NetworkState {
    el_block_number: u64,
    beacon_slot_number: u64,
    beacon_config: BeaconConfig,
    network_details: NetworkDetails,
    nodes: Vec<NodeRecord>,
    minipools: Vec<MinipoolRecord>,
    validators: HashMap<ValidatorPubkey, ValidatorStatus>,
    index: StateIndex,
}

impl NetworkState {
    /// Assemble a snapshot from already-read parts, building the indexes.
    pub fn from_parts(
        el_block_number: u64,
        beacon_slot_number: u64,
        beacon_config: BeaconConfig,
        network_details: NetworkDetails,
        nodes: Vec<NodeRecord>,
        minipools: Vec<MinipoolRecord>,
        validators: HashMap<ValidatorPubkey, ValidatorStatus>,
    ) -> Self {
        let index = StateIndex::build(&nodes, &minipools);
        Self {
            el_block_number,
            beacon_slot_number,
            beacon_config,
            network_details,
            nodes,
            minipools,
            validators,
            index,
        }
    }

    /// Execution block every ledger read was pinned to.
    pub fn el_block_number(&self) -> u64 {
        self.el_block_number
    }

    /// Beacon slot the snapshot was taken at.
    pub fn beacon_slot_number(&self) -> u64 {
        self.beacon_slot_number
    }

    /// Beacon timing parameters.
    pub fn beacon_config(&self) -> &BeaconConfig {
        &self.beacon_config
    }

    /// Protocol parameters.
    pub fn network_details(&self) -> &NetworkDetails {
        &self.network_details
    }

    /// All node operators, in reader order.
    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    /// All minipools, in reader order.
    pub fn minipools(&self) -> &[MinipoolRecord] {
        &self.minipools
    }

    /// Node operator with `address`.
    pub fn node(&self, address: &Address) -> Option<&NodeRecord> {
        self.index.node_position(address).map(|i| &self.nodes[i])
    }

    /// Minipool with `address`.
    pub fn minipool(&self, address: &Address) -> Option<&MinipoolRecord> {
        self.index.minipool_position(address).map(|i| &self.minipools[i])
    }

    /// Minipools owned by the operator at `node`.
    pub fn minipools_for_node<'a>(
        &'a self,
        node: &Address,
    ) -> impl Iterator<Item = &'a MinipoolRecord> + 'a {
        self.index
            .minipool_positions_for_node(node)
            .iter()
            .map(move |&i| &self.minipools[i])
    }

    /// Beacon status of the validator with `pubkey`, if the beacon chain knows it.
    pub fn validator_status(&self, pubkey: &ValidatorPubkey) -> Option<&ValidatorStatus> {
        self.validators.get(pubkey)
    }

    /// Number of resolved validator statuses.
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Wall-clock time of the snapshot slot, or `None` on overflow.
    pub fn slot_time(&self) -> Option<u64> {
        self.beacon_config.slot_time(self.beacon_slot_number)
    }

    /// Epoch containing the snapshot slot, or `None` for a zero-length epoch.
    pub fn interval_end_epoch(&self) -> Option<u64> {
        self.beacon_config.epoch_of(self.beacon_slot_number)
    }

    /// Effective stake of every operator using the default worker pool.
    pub fn calculate_effective_stakes(
        &self,
        scale_by_participation: bool,
    ) -> StateResult<EffectiveStakes> {
        EffectiveStakeCalculator::new(CalculatorConfig {
            scale_by_participation,
            ..Default::default()
        })
        .calculate(self)
    }
}

/// Builds [`NetworkState`] snapshots from the external readers.
#[derive(Clone)]
pub struct SnapshotBuilder {
    entities: Arc<dyn EntityReader>,
    parameters: Arc<dyn ParameterSource>,
    beacon: Arc<dyn BeaconReader>,
    logger: Arc<dyn StateLogger>,
}

impl SnapshotBuilder {
    /// Create a builder that logs nowhere.
    pub fn new(
        entities: Arc<dyn EntityReader>,
        parameters: Arc<dyn ParameterSource>,
        beacon: Arc<dyn BeaconReader>,
    ) -> Self {
        Self {
            entities,
            parameters,
            beacon,
            logger: create_null_logger(),
        }
    }

    /// Replace the progress logger.
    pub fn with_logger(mut self, logger: Arc<dyn StateLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Build the snapshot for `slot`.
    pub async fn build(&self, slot: u64, beacon_config: BeaconConfig) -> StateResult<NetworkState> {
        if beacon_config.slots_per_epoch == 0 {
            return Err(StateError::ZeroSlotsPerEpoch);
        }

        let block = self
            .beacon
            .execution_block_for_slot(slot)
            .await
            .map_err(|source| StateError::BeaconBlock { slot, source })?
            .ok_or(StateError::SlotNotFound { slot })?;

        let network_details = self.read_network_details(block).await?;

        state_log!(
            self.logger,
            "Getting network state for EL block {}, Beacon slot {}",
            block,
            slot
        );
        let start = Instant::now();

        let (nodes, minipools) = tokio::try_join!(
            async {
                self.entities
                    .node_records(block)
                    .await
                    .map_err(|source| StateError::NodeRecords { block, source })
            },
            async {
                self.entities
                    .minipool_records(block)
                    .await
                    .map_err(|source| StateError::MinipoolRecords { block, source })
            },
        )?;
        // Both reads run together; report them in a fixed order once joined.
        state_log!(
            self.logger,
            "1/4 - Retrieved node details ({:?} so far)",
            start.elapsed()
        );
        state_log!(
            self.logger,
            "2/4 - Retrieved minipool details ({:?} so far)",
            start.elapsed()
        );

        let index = StateIndex::build(&nodes, &minipools);
        let pubkeys = referenced_pubkeys(&minipools);
        state_log!(
            self.logger,
            "3/4 - Created lookups ({:?} so far)",
            start.elapsed()
        );

        let validators = self
            .beacon
            .validator_statuses(&pubkeys, slot)
            .await
            .map_err(|source| StateError::ValidatorStatuses {
                slot,
                count: pubkeys.len(),
                source,
            })?;
        state_log!(
            self.logger,
            "4/4 - Retrieved validator details (total time: {:?})",
            start.elapsed()
        );

        Ok(NetworkState {
            el_block_number: block,
            beacon_slot_number: slot,
            beacon_config,
            network_details,
            nodes,
            minipools,
            validators,
            index,
        })
    }

    async fn read_network_details(&self, block: u64) -> StateResult<NetworkDetails> {
        let param = |name: &'static str| move |source| StateError::Parameter { name, block, source };

        let price_ratio = self
            .parameters
            .price_ratio(block)
            .await
            .map_err(param("collateral price ratio"))?;
        let min_collateral_fraction = self
            .parameters
            .min_collateral_fraction(block)
            .await
            .map_err(param("minimum per minipool stake"))?;
        let max_collateral_fraction = self
            .parameters
            .max_collateral_fraction(block)
            .await
            .map_err(param("maximum per minipool stake"))?;
        let reward_index = self
            .parameters
            .reward_index(block)
            .await
            .map_err(param("reward index"))?;
        let interval_duration = self
            .parameters
            .interval_duration(block, reward_index)
            .await
            .map_err(param("interval duration"))?;
        let reward_shares = self
            .parameters
            .reward_share_percentages(block, reward_index)
            .await
            .map_err(param("reward share percentages"))?;
        let pending_rewards = self
            .parameters
            .pending_rewards(block, reward_index)
            .await
            .map_err(param("pending rewards"))?;

        Ok(NetworkDetails {
            price_ratio,
            min_collateral_fraction,
            max_collateral_fraction,
            reward_index,
            interval_duration,
            reward_shares,
            pending_rewards,
        })
    }
}
