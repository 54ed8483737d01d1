// Copyright (c) 2024 Botho Foundation

//! Consensus-layer timing parameters.

use serde::{Deserialize, Serialize};

/// Beacon chain timing: genesis and the slot/epoch lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Unix timestamp (seconds) of slot 0
    pub genesis_time: u64,

    /// Slot length in seconds
    pub seconds_per_slot: u64,

    /// Number of slots in an epoch
    pub slots_per_epoch: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        // Mainnet
        Self {
            genesis_time: 1_606_824_023,
            seconds_per_slot: 12,
            slots_per_epoch: 32,
        }
    }
}

impl BeaconConfig {
    /// Wall-clock start of `slot` as a unix timestamp, or `None` on overflow.
    pub fn slot_time(&self, slot: u64) -> Option<u64> {
        slot.checked_mul(self.seconds_per_slot)
            .and_then(|offset| self.genesis_time.checked_add(offset))
    }

    /// The epoch containing `slot`, or `None` if `slots_per_epoch` is zero.
    pub fn epoch_of(&self, slot: u64) -> Option<u64> {
        slot.checked_div(self.slots_per_epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_time_offsets_genesis() {
        let cfg = BeaconConfig {
            genesis_time: 1000,
            seconds_per_slot: 12,
            slots_per_epoch: 32,
        };
        assert_eq!(cfg.slot_time(0), Some(1000));
        assert_eq!(cfg.slot_time(10), Some(1120));
        assert_eq!(cfg.slot_time(u64::MAX), None);
    }

    #[test]
    fn epoch_boundaries() {
        let cfg = BeaconConfig::default();
        assert_eq!(cfg.epoch_of(0), Some(0));
        assert_eq!(cfg.epoch_of(31), Some(0));
        assert_eq!(cfg.epoch_of(32), Some(1));
        assert_eq!(cfg.epoch_of(6_400_000), Some(200_000));
    }

    #[test]
    fn zero_length_epoch_has_no_epochs() {
        let cfg = BeaconConfig {
            slots_per_epoch: 0,
            ..Default::default()
        };
        assert_eq!(cfg.epoch_of(0), None);
        assert_eq!(cfg.epoch_of(320_000), None);
    }
}
