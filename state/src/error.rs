// Copyright (c) 2024 Botho Foundation

//! Error types for snapshot construction and stake calculation.

use netstate_types::Address;
use thiserror::Error;

/// Failure reported by an external reader (execution client, beacon client or
/// parameter source). Client implementations map their transport errors into
/// one of these.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ReaderError {
    /// The upstream source could not serve the request
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The upstream source did not answer in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The upstream response could not be decoded
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Errors from building a [`NetworkState`](crate::NetworkState) or calculating
/// effective stakes. Both operations are all-or-nothing: any of these means no
/// snapshot or no result was produced.
#[derive(Debug, Error)]
pub enum StateError {
    /// The slot has no beacon block (empty or skipped slot)
    #[error("slot {slot} did not have a beacon block")]
    SlotNotFound {
        /// Requested slot
        slot: u64,
    },

    /// Looking up the beacon block for a slot failed
    #[error("error getting beacon block for slot {slot}: {source}")]
    BeaconBlock {
        /// Requested slot
        slot: u64,
        /// Underlying reader failure
        source: ReaderError,
    },

    /// A scalar protocol parameter could not be read
    #[error("error getting {name} at block {block}: {source}")]
    Parameter {
        /// Parameter being read
        name: &'static str,
        /// Pinned execution block
        block: u64,
        /// Underlying reader failure
        source: ReaderError,
    },

    /// The node operator list could not be read
    #[error("error getting node details at block {block}: {source}")]
    NodeRecords {
        /// Pinned execution block
        block: u64,
        /// Underlying reader failure
        source: ReaderError,
    },

    /// The minipool list could not be read
    #[error("error getting minipool details at block {block}: {source}")]
    MinipoolRecords {
        /// Pinned execution block
        block: u64,
        /// Underlying reader failure
        source: ReaderError,
    },

    /// Validator statuses could not be resolved
    #[error("error getting {count} validator statuses at slot {slot}: {source}")]
    ValidatorStatuses {
        /// Pinned slot
        slot: u64,
        /// Number of pubkeys requested
        count: usize,
        /// Underlying reader failure
        source: ReaderError,
    },

    /// The collateral price ratio is zero
    #[error("collateral price ratio is zero")]
    ZeroPriceRatio,

    /// The beacon config has a zero-length epoch
    #[error("beacon config has zero slots per epoch")]
    ZeroSlotsPerEpoch,

    /// Calculator configuration is unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The worker pool could not be created
    #[error("could not start worker pool: {0}")]
    WorkerPool(String),

    /// An intermediate value did not fit the 256-bit range
    #[error("arithmetic overflow computing {context} for node {operator}")]
    Overflow {
        /// Operator whose computation overflowed
        operator: Address,
        /// Quantity being computed
        context: &'static str,
    },

    /// The snapshot slot's wall-clock time does not fit in a u64
    #[error("timestamp of slot {slot} overflows")]
    SlotTimeOverflow {
        /// Snapshot slot
        slot: u64,
    },
}

/// Result alias for this crate.
pub type StateResult<T> = Result<T, StateError>;
