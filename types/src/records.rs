// Copyright (c) 2024 Botho Foundation

//! Per-entity records read at a pinned block or slot.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::ids::{Address, ValidatorPubkey};

/// Exit epoch of a validator that has not exited.
pub const FAR_FUTURE_EPOCH: u64 = u64::MAX;

/// A registered node operator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Operator account address
    pub address: Address,

    /// Raw staked collateral, in the collateral token's base units
    pub stake: U256,

    /// Unix timestamp (seconds) of the operator's registration
    pub registration_time: u64,
}

/// Lifecycle status of a minipool as recorded on the execution layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinipoolStatus {
    /// Created, no validator assigned yet
    #[default]
    Initialized,
    /// Deposit made, waiting for the validator to be staked
    Prelaunch,
    /// Validator is staking
    Staking,
    /// Validator has exited and funds can be withdrawn
    Withdrawable,
    /// Minipool was dissolved before staking
    Dissolved,
}

/// A minipool: one delegated validator slot owned by a node operator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinipoolRecord {
    /// Minipool contract address
    pub address: Address,

    /// Whether the minipool is still registered at the pinned block
    pub exists: bool,

    /// Owning operator
    pub node_address: Address,

    /// Validator pubkey, [`ValidatorPubkey::EMPTY`] until assigned
    pub pubkey: ValidatorPubkey,

    /// Lifecycle status
    pub status: MinipoolStatus,

    /// Deposit contributed by delegators (borrowed)
    pub user_deposit_balance: U256,

    /// Deposit contributed by the operator (bonded)
    pub node_deposit_balance: U256,
}

impl MinipoolRecord {
    /// Whether this minipool is registered and its validator staking.
    pub fn is_staking(&self) -> bool {
        self.exists && self.status == MinipoolStatus::Staking
    }
}

/// Beacon-side lifecycle of one validator as of a slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorStatus {
    /// Validator pubkey
    pub pubkey: ValidatorPubkey,

    /// Beacon registry index
    pub index: u64,

    /// First epoch in which the validator is active
    pub activation_epoch: u64,

    /// First epoch in which the validator is no longer active;
    /// [`FAR_FUTURE_EPOCH`] if it has not exited
    pub exit_epoch: u64,
}

impl ValidatorStatus {
    /// Whether the validator is active in `epoch`: activated at or before it,
    /// exiting strictly after it.
    pub fn is_active_at(&self, epoch: u64) -> bool {
        self.activation_epoch <= epoch && self.exit_epoch > epoch
    }
}
