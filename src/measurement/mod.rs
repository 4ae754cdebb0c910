//! Measurement infrastructure: clock, channel contract, sample driver
//! and the sampling loop.
//!
//! # Clock selection
//!
//! Timing uses the platform monotonic clock:
//! - **Linux/macOS**: `clock_gettime(CLOCK_MONOTONIC_RAW)`
//! - **other unix**: `clock_gettime(CLOCK_MONOTONIC)`
//! - **elsewhere**: `std::time::Instant`
//!
//! All variants are immune to wall-clock adjustment; resolution is
//! whatever the platform reports, typically well under a microsecond —
//! comfortably finer than serial round trips, which sit in the
//! hundreds of microseconds even at high baud rates.

pub mod channel;
pub mod clock;
pub mod collector;
pub mod sampler;

#[cfg(unix)]
pub mod serial;

pub use channel::Channel;
pub use clock::{elapsed_secs, now, Timestamp};
pub use collector::{Collector, Outcome, Recording, StopReason};
pub use sampler::{fill_payload, Sample, SampleDriver};

#[cfg(unix)]
pub use serial::SerialPort;
