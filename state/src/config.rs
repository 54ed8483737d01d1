// Copyright (c) 2024 Botho Foundation

//! Effective stake calculator settings.
//!
//! Meant to be embedded in a daemon's config file:
//!
//! ```toml
//! [effective_stake]
//! worker_threads = 4
//! scale_by_participation = true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Calculator settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    /// Number of worker threads evaluating operators in parallel
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Scale each operator's stake by its participation in the interval
    #[serde(default = "default_scale_by_participation")]
    pub scale_by_participation: bool,
}

fn default_worker_threads() -> usize {
    4
}

fn default_scale_by_participation() -> bool {
    true
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            scale_by_participation: default_scale_by_participation(),
        }
    }
}

impl CalculatorConfig {
    /// Check the settings are usable.
    pub fn validate(&self) -> StateResult<()> {
        if self.worker_threads == 0 {
            return Err(StateError::InvalidConfig(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
