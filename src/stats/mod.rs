//! Streaming statistics over the latency sample stream.
//!
//! Both accumulators are O(1) per sample and bounded in memory: the
//! run can be arbitrarily long without buffering history beyond the
//! histogram's fixed warm-up window.

mod histogram;
mod running;

pub use histogram::{Bin, LatencyHistogram, WARMUP_WINDOW};
pub use running::RunningStats;
