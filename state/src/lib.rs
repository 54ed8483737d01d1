// Copyright (c) 2024 Botho Foundation

//! Height-pinned network state snapshots and effective stake calculation.
//!
//! Independent oracle nodes each build a [`NetworkState`] for the same beacon
//! slot and derive per-operator effective stake from it. Everything here is
//! deterministic: the snapshot pins every execution-layer read to the block
//! behind the slot, and the calculator uses exact integer arithmetic with a
//! fixed multiply-then-divide order, so independently computed results match
//! bit for bit.
//!
//! ```text
//! SnapshotBuilder ──> NetworkState ──> EffectiveStakeCalculator ──> EffectiveStakes
//!   (readers)          (immutable)        (rayon pool)                (per node + total)
//! ```

#![warn(missing_docs)]

pub mod calculator;
pub mod config;
mod error;
pub mod index;
pub mod logger;
pub mod reader;
pub mod snapshot;
pub mod stake;

pub use calculator::{EffectiveStakeCalculator, EffectiveStakes};
pub use config::CalculatorConfig;
pub use error::{ReaderError, StateError, StateResult};
pub use index::StateIndex;
pub use logger::{NullLogger, StateLogger, TracingLogger};
pub use reader::{BeaconReader, EntityReader, ParameterSource};
pub use snapshot::{NetworkState, SnapshotBuilder};

#[doc(inline)]
pub use netstate_types as types;
