//! The sampling loop.
//!
//! Strictly serialized: one round trip in flight at any time, one
//! thread of control. The collector owns the pacing and cancellation
//! checks; the channel is owned exclusively by the loop for the
//! duration of the run.

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::SampleError;
use crate::pacing::Pacer;
use crate::stats::{LatencyHistogram, RunningStats};

use super::channel::Channel;
use super::sampler::{Sample, SampleDriver};

/// Why the sampling loop stopped.
#[derive(Debug)]
pub enum StopReason {
    /// The configured sample count was reached.
    Completed,
    /// Cancellation was requested; a normal early end-of-stream.
    Cancelled,
    /// A transport failure ended the run. Samples accumulated before
    /// the failure remain valid and are reported.
    Transport(SampleError),
}

/// Everything accumulated over one run.
///
/// Mutated only by the sampling thread; the ordered sample log is kept
/// so a flat-file sink can replay accepted samples in order.
#[derive(Debug)]
pub struct Recording {
    stats: RunningStats,
    histogram: LatencyHistogram,
    samples: Vec<Sample>,
}

impl Recording {
    fn new() -> Self {
        Self {
            stats: RunningStats::new(),
            histogram: LatencyHistogram::new(),
            samples: Vec::new(),
        }
    }

    /// Record one accepted sample everywhere it belongs.
    fn observe(&mut self, sample: Sample) {
        self.stats.observe(sample.value);
        self.histogram.observe(sample.value);
        self.samples.push(sample);
    }

    /// Streaming summary statistics.
    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    /// The latency histogram, in whatever state it reached.
    pub fn histogram(&self) -> &LatencyHistogram {
        &self.histogram
    }

    /// Accepted samples in acceptance order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// True when no sample completed.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Result of a run: the recording plus why it ended.
#[derive(Debug)]
pub struct Outcome {
    /// Accumulated statistics, histogram and sample log.
    pub recording: Recording,
    /// Why the loop stopped.
    pub stop: StopReason,
}

/// Repeatedly takes round-trip samples and accumulates them.
#[derive(Debug)]
pub struct Collector {
    driver: SampleDriver,
    pacer: Pacer,
    samples: usize,
}

impl Collector {
    /// Build a collector from a run configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            driver: SampleDriver::new(config.payload_size, config.read_timeout),
            pacer: Pacer::new(config.wait_ms, config.random_wait),
            samples: config.samples,
        }
    }

    /// Run the sampling loop to completion, cancellation, or the first
    /// transport failure.
    pub fn collect<C: Channel>(&mut self, channel: &mut C, cancel: &CancelToken) -> Outcome {
        self.collect_with(channel, cancel, |_, _| {})
    }

    /// Like [`collect`](Self::collect), with a per-sample observer.
    ///
    /// The observer sees each accepted sample and the statistics after
    /// folding it in; the CLI uses this for its live progress line
    /// without the loop knowing about terminals.
    pub fn collect_with<C, F>(
        &mut self,
        channel: &mut C,
        cancel: &CancelToken,
        mut on_sample: F,
    ) -> Outcome
    where
        C: Channel,
        F: FnMut(&Sample, &RunningStats),
    {
        let mut recording = Recording::new();

        for _ in 0..self.samples {
            // Checked before the pacing wait and again after it: the
            // wait can be long, and a round trip must not start once
            // cancellation was requested.
            if cancel.is_cancelled() {
                return Outcome {
                    recording,
                    stop: StopReason::Cancelled,
                };
            }

            self.pacer.pause();

            if cancel.is_cancelled() {
                return Outcome {
                    recording,
                    stop: StopReason::Cancelled,
                };
            }

            match self.driver.take_sample(channel) {
                Ok(sample) => {
                    recording.observe(sample);
                    on_sample(&sample, recording.stats());
                }
                Err(err) => {
                    return Outcome {
                        recording,
                        stop: StopReason::Transport(err),
                    };
                }
            }
        }

        Outcome {
            recording,
            stop: StopReason::Completed,
        }
    }
}
