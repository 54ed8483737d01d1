// Copyright (c) 2024 Botho Foundation

//! Injected progress/diagnostic logging.
//!
//! Snapshot construction and stake calculation write human-readable progress
//! lines through a [`StateLogger`] handed to them at construction. Nothing
//! they compute depends on the logger; [`NullLogger`] is the default.

use std::{fmt, sync::Arc};

/// Sink for progress and diagnostic lines.
pub trait StateLogger: Send + Sync {
    /// Record one formatted line.
    fn log_line(&self, line: fmt::Arguments<'_>);
}

/// Forwards lines to the `tracing` subscriber at info level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl StateLogger for TracingLogger {
    fn log_line(&self, line: fmt::Arguments<'_>) {
        tracing::info!(target: "netstate", "{}", line);
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl StateLogger for NullLogger {
    fn log_line(&self, _line: fmt::Arguments<'_>) {}
}

/// A logger that discards everything.
pub fn create_null_logger() -> Arc<dyn StateLogger> {
    Arc::new(NullLogger)
}

/// Write a formatted line to a [`StateLogger`].
///
/// ```ignore
/// state_log!(self.logger, "1/4 - Retrieved node details ({:?} so far)", start.elapsed());
/// ```
#[macro_export]
macro_rules! state_log {
    ($logger:expr, $($arg:tt)*) => {
        $crate::logger::StateLogger::log_line(&*$logger, format_args!($($arg)*))
    };
}
