// Copyright (c) 2024 Botho Foundation

//! Effective stake calculation.
//!
//! Each operator's effective stake is computed from the snapshot alone, with
//! no dependency on any other operator's result, so operators are evaluated in
//! parallel on a fixed-size worker pool. Workers share the snapshot read-only
//! and each writes only its own slot of a pre-sized result vector; results are
//! then folded in operator order.
//!
//! Per operator:
//!
//! 1. Sum the user and node deposits of minipools that exist, are staking, and
//!    whose validator is active in the epoch containing the snapshot slot.
//! 2. `min = borrowed * min_fraction / price`, `max = bonded * max_fraction / price`.
//! 3. Raw stake below `min` counts as zero, above `max` counts as `max`.
//! 4. If [`CalculatorConfig::scale_by_participation`] is set, scale by
//!    `elapsed / interval` for operators registered for less than one interval.

use std::{collections::BTreeMap, sync::Arc};

use netstate_types::{Address, NodeRecord, U256};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::CalculatorConfig,
    error::{StateError, StateResult},
    logger::{create_null_logger, StateLogger},
    snapshot::NetworkState,
    stake::{clamp_stake, collateral_bounds, scale_by_participation, EligibleDeposits},
    state_log,
};

/// Effective stake per operator and the network total.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveStakes {
    /// Effective stake keyed by operator address
    pub stakes: BTreeMap<Address, U256>,

    /// Sum of all per-operator effective stakes
    pub total: U256,
}

impl EffectiveStakes {
    /// Effective stake of the operator at `address`.
    pub fn get(&self, address: &Address) -> Option<&U256> {
        self.stakes.get(address)
    }

    /// Number of operators.
    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    /// Whether there are no operators.
    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }
}

/// Values shared by every operator's evaluation.
#[derive(Clone, Copy, Debug)]
struct IntervalContext {
    slot_time: u64,
    interval_end_epoch: u64,
    scale_by_participation: bool,
}

/// Computes [`EffectiveStakes`] from a [`NetworkState`].
#[derive(Clone)]
pub struct EffectiveStakeCalculator {
    config: CalculatorConfig,
    logger: Arc<dyn StateLogger>,
}

impl EffectiveStakeCalculator {
    /// Create a calculator that logs nowhere.
    pub fn new(config: CalculatorConfig) -> Self {
        Self {
            config,
            logger: create_null_logger(),
        }
    }

    /// Replace the diagnostic logger.
    pub fn with_logger(mut self, logger: Arc<dyn StateLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Effective stake of every operator in `state`, plus the total.
    ///
    /// Fails without a partial result if the configuration is invalid, the
    /// price ratio is zero, the beacon epoch length is zero, or any operator's
    /// computation overflows. When several operators fail, the error reported
    /// is the one for the operator earliest in the snapshot's node list.
    pub fn calculate(&self, state: &NetworkState) -> StateResult<EffectiveStakes> {
        self.config.validate()?;
        if state.network_details().price_ratio.is_zero() {
            return Err(StateError::ZeroPriceRatio);
        }
        let interval_end_epoch = state
            .interval_end_epoch()
            .ok_or(StateError::ZeroSlotsPerEpoch)?;
        let slot_time = state.slot_time().ok_or(StateError::SlotTimeOverflow {
            slot: state.beacon_slot_number(),
        })?;
        let ctx = IntervalContext {
            slot_time,
            interval_end_epoch,
            scale_by_participation: self.config.scale_by_participation,
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .thread_name(|i| format!("effective-stake-{i}"))
            .build()
            .map_err(|e| StateError::WorkerPool(e.to_string()))?;

        let nodes = state.nodes();
        let mut results: Vec<StateResult<U256>> = Vec::with_capacity(nodes.len());
        pool.install(|| {
            nodes
                .par_iter()
                .map(|node| self.node_effective_stake(state, node, &ctx))
                .collect_into_vec(&mut results);
        });

        let mut stakes = BTreeMap::new();
        let mut total = U256::zero();
        for (node, result) in nodes.iter().zip(results) {
            let stake = result?;
            total = total
                .checked_add(stake)
                .ok_or(StateError::Overflow {
                    operator: node.address,
                    context: "total effective stake",
                })?;
            stakes.insert(node.address, stake);
        }

        Ok(EffectiveStakes { stakes, total })
    }

    /// Deposits of `node`'s minipools that are eligible in the snapshot's
    /// epoch.
    pub fn eligible_deposits(
        &self,
        state: &NetworkState,
        node: &Address,
    ) -> StateResult<EligibleDeposits> {
        let interval_end_epoch = state
            .interval_end_epoch()
            .ok_or(StateError::ZeroSlotsPerEpoch)?;
        self.sum_eligible_deposits(state, node, interval_end_epoch)
    }

    fn sum_eligible_deposits(
        &self,
        state: &NetworkState,
        node: &Address,
        interval_end_epoch: u64,
    ) -> StateResult<EligibleDeposits> {
        let mut deposits = EligibleDeposits::default();
        for mp in state.minipools_for_node(node) {
            if !mp.is_staking() {
                continue;
            }

            let Some(validator) = state.validator_status(&mp.pubkey) else {
                state_log!(
                    self.logger,
                    "NOTE: minipool {} (pubkey {}) didn't exist on the beacon chain, ignoring it in effective stake calculation",
                    mp.address,
                    mp.pubkey
                );
                continue;
            };

            if validator.activation_epoch > interval_end_epoch {
                state_log!(
                    self.logger,
                    "NOTE: minipool {} starts on epoch {} which is after interval epoch {} so it's not eligible for rewards",
                    mp.address,
                    validator.activation_epoch,
                    interval_end_epoch
                );
                continue;
            }

            if validator.exit_epoch <= interval_end_epoch {
                state_log!(
                    self.logger,
                    "NOTE: minipool {} exited on epoch {} which is not after interval epoch {} so it's not eligible for rewards",
                    mp.address,
                    validator.exit_epoch,
                    interval_end_epoch
                );
                continue;
            }

            deposits = deposits
                .checked_add(mp.user_deposit_balance, mp.node_deposit_balance)
                .ok_or(StateError::Overflow {
                    operator: *node,
                    context: "eligible deposits",
                })?;
        }
        Ok(deposits)
    }

    fn node_effective_stake(
        &self,
        state: &NetworkState,
        node: &NodeRecord,
        ctx: &IntervalContext,
    ) -> StateResult<U256> {
        let details = state.network_details();
        let deposits = self.sum_eligible_deposits(state, &node.address, ctx.interval_end_epoch)?;
        let bounds = collateral_bounds(&deposits, details).ok_or(StateError::Overflow {
            operator: node.address,
            context: "collateral bounds",
        })?;

        let stake = clamp_stake(node.stake, &bounds);
        if !ctx.scale_by_participation {
            return Ok(stake);
        }

        scale_by_participation(
            stake,
            node.registration_time,
            ctx.slot_time,
            details.interval_duration,
        )
        .ok_or(StateError::Overflow {
            operator: node.address,
            context: "participation scaling",
        })
    }
}
