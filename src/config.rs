//! Configuration for a measurement run.

use std::time::Duration;

/// Configuration options for a sampling run.
///
/// Plain data: out-of-range values given on the command line are
/// clamped (with a warning) by the CLI before this struct is built.
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of samples to take (default: 10,000).
    pub samples: usize,

    /// Payload bytes per sample (default: 1).
    ///
    /// Every byte must come back before the round trip is complete, so
    /// larger payloads measure the link under proportionally more load.
    pub payload_size: usize,

    /// Inter-sample wait in milliseconds (default: 0, no pacing).
    pub wait_ms: f64,

    /// Randomize the wait uniformly in `[wait, 2*wait)` (default: no).
    pub random_wait: bool,

    /// Budget for each bounded wait inside a read (default: 1s).
    ///
    /// A read that cannot produce the full echo within this budget
    /// returns short, which ends the run.
    pub read_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            samples: 10_000,
            payload_size: 1,
            wait_ms: 0.0,
            random_wait: false,
            read_timeout: Duration::from_secs(1),
        }
    }
}
