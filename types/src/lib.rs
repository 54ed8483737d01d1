// Copyright (c) 2024 Botho Foundation

//! Data model for height-pinned network state snapshots.
//!
//! These types describe what a snapshot is made of: node operators, the
//! minipools they run, the beacon-side lifecycle of each minipool's validator
//! and the protocol parameters in force at the pinned block. Every economic
//! quantity is an exact [`U256`]; nothing in this crate uses floating point.

#![deny(missing_docs)]

mod beacon;
mod ids;
mod network;
mod records;

pub use beacon::BeaconConfig;
pub use ids::{Address, ParseIdError, ValidatorPubkey};
pub use network::{NetworkDetails, RewardSharePercentages, ONE_ETHER};
pub use records::{
    MinipoolRecord, MinipoolStatus, NodeRecord, ValidatorStatus, FAR_FUTURE_EPOCH,
};

#[doc(inline)]
pub use primitive_types::{U256, U512};
