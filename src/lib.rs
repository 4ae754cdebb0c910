//! # serial-latency
//!
//! Measure round-trip latency of a serial device that echoes back
//! every byte it receives, and summarize the resulting distribution
//! online — no unbounded history, however long the run.
//!
//! The pieces, leaves first:
//! - [`measurement::clock`]: opaque monotonic timestamps, immune to
//!   wall-clock adjustment
//! - [`measurement::Channel`]: the byte-echo transport contract, with
//!   a termios-backed [`measurement::SerialPort`] implementation on
//!   unix
//! - [`measurement::SampleDriver`]: one round trip per call —
//!   timestamp, write, read the echo, timestamp
//! - [`stats::RunningStats`] and [`stats::LatencyHistogram`]: O(1)
//!   streaming accumulation; the histogram derives its bin layout from
//!   the first ten samples (Scott's rule) and never re-bins
//! - [`measurement::Collector`]: the strictly serialized sampling
//!   loop, with pacing and cooperative cancellation
//!
//! ## Quick start
//!
//! ```ignore
//! use serial_latency::{CancelToken, Config, SerialPort};
//!
//! let mut port = SerialPort::open("/dev/ttyUSB0", 115_200)?;
//! let cancel = CancelToken::new();
//! serial_latency::cancel::install_signal_handlers(&cancel);
//!
//! let outcome = serial_latency::run(&mut port, &Config::default(), &cancel);
//! if let Some(report) = serial_latency::Report::from_recording(&outcome.recording) {
//!     print!("{}", serial_latency::output::terminal::format_report(&report));
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod measurement;
pub mod output;
pub mod pacing;
pub mod report;
pub mod stats;

#[cfg(unix)]
pub mod platform;

pub use cancel::CancelToken;
pub use config::Config;
pub use error::{SampleError, SerialError};
pub use measurement::{
    Channel, Collector, Outcome, Recording, Sample, SampleDriver, StopReason,
};
pub use report::{HistogramSummary, Report};
pub use stats::{Bin, LatencyHistogram, RunningStats, WARMUP_WINDOW};

#[cfg(unix)]
pub use measurement::SerialPort;

/// Run a full sampling loop with default wiring.
///
/// Convenience over building a [`Collector`] by hand; the channel is
/// borrowed exclusively for the duration of the run.
pub fn run<C: Channel>(channel: &mut C, config: &Config, cancel: &CancelToken) -> Outcome {
    Collector::new(config).collect(channel, cancel)
}
