//! Progress trace sink.
//!
//! The engine reports progress as ordered (message, verbosity) lines plus an
//! explicit finished marker. The engine only ever writes to the sink, never
//! queries it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One trace line. Verbosity 0 is run-level, 1 is per-row detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// The message text.
    pub message: String,
    /// Verbosity level of the line.
    pub verbosity: u8,
}

/// Append-only sink for sync progress output.
pub trait SyncTrace: Send {
    /// Append one line at the given verbosity.
    fn output(&mut self, message: &str, verbosity: u8);

    /// Mark the run as finished. No further output follows.
    fn finished(&mut self);
}

/// Collects trace lines in memory.
#[derive(Debug, Default)]
pub struct BufferedTrace {
    lines: Vec<LogLine>,
    finished: bool,
}

impl BufferedTrace {
    /// Create an empty trace buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The lines collected so far.
    #[must_use]
    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    /// Whether the finished marker was received.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl SyncTrace for BufferedTrace {
    fn output(&mut self, message: &str, verbosity: u8) {
        self.lines.push(LogLine {
            message: message.to_string(),
            verbosity,
        });
    }

    fn finished(&mut self) {
        self.finished = true;
    }
}

/// Forwards trace lines to the `tracing` subscriber.
///
/// Run-level lines emit at info, per-row detail at debug.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTrace;

impl SyncTrace for TracingTrace {
    fn output(&mut self, message: &str, verbosity: u8) {
        if verbosity == 0 {
            info!("{message}");
        } else {
            debug!("{message}");
        }
    }

    fn finished(&mut self) {
        debug!("sync trace finished");
    }
}
