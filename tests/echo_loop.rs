//! End-to-end sampling loop tests against a simulated echo device.

use std::io;
use std::thread;
use std::time::Duration;

use serial_latency::measurement::{Channel, Collector, StopReason};
use serial_latency::output::terminal;
use serial_latency::{CancelToken, Config, Report};

/// Echoes every write back on the next read, after an artificial
/// delay. Can be told to start shorting writes or reads partway
/// through a run.
struct EchoChannel {
    delay: Duration,
    pending: Vec<u8>,
    writes: usize,
    fail_write_after: Option<usize>,
    fail_read_after: Option<usize>,
}

impl EchoChannel {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending: Vec::new(),
            writes: 0,
            fail_write_after: None,
            fail_read_after: None,
        }
    }

    fn instant() -> Self {
        Self::with_delay(Duration::ZERO)
    }
}

impl Channel for EchoChannel {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        if let Some(limit) = self.fail_write_after {
            if self.writes > limit {
                return Ok(0);
            }
        }
        self.pending = buf.to_vec();
        Ok(buf.len())
    }

    fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        if let Some(limit) = self.fail_read_after {
            if self.writes > limit {
                return Ok(buf.len() / 2);
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        Ok(n)
    }
}

fn config(samples: usize) -> Config {
    Config {
        samples,
        ..Config::default()
    }
}

#[test]
fn completes_the_configured_sample_count() {
    let mut channel = EchoChannel::instant();
    let cancel = CancelToken::new();

    let outcome = Collector::new(&config(25)).collect(&mut channel, &cancel);

    assert!(matches!(outcome.stop, StopReason::Completed));
    assert_eq!(outcome.recording.samples().len(), 25);
    assert_eq!(outcome.recording.stats().count(), 25);

    // Every accepted sample is bracketed by the running min/max.
    let stats = outcome.recording.stats();
    for sample in outcome.recording.samples() {
        assert!(stats.min() <= sample.value && sample.value <= stats.max());
    }

    // Past the warm-up window the histogram holds every sample.
    let total: u64 = outcome.recording.histogram().counts().iter().sum();
    assert_eq!(total, 25);
}

#[test]
fn round_trip_latency_tracks_the_device_delay() {
    let delay_ms = 20.0;
    let mut channel = EchoChannel::with_delay(Duration::from_millis(20));
    let cancel = CancelToken::new();

    let outcome = Collector::new(&config(3)).collect(&mut channel, &cancel);

    assert!(matches!(outcome.stop, StopReason::Completed));
    for sample in outcome.recording.samples() {
        assert!(
            sample.value >= delay_ms,
            "latency {} below the simulated delay",
            sample.value
        );
        // Sleep overshoot and scheduling noise, nothing more.
        assert!(
            sample.value < delay_ms + 50.0,
            "latency {} implausibly far above the simulated delay",
            sample.value
        );
    }
}

#[test]
fn transport_shortfall_ends_the_run_keeping_accepted_samples() {
    // Shortfall on sample 5 of a planned 100.
    let mut channel = EchoChannel::instant();
    channel.fail_write_after = Some(4);
    let cancel = CancelToken::new();

    let outcome = Collector::new(&config(100)).collect(&mut channel, &cancel);

    assert!(matches!(outcome.stop, StopReason::Transport(_)));
    assert_eq!(outcome.recording.samples().len(), 4);

    // The short run still renders: summary lines, no histogram yet.
    let report = Report::from_recording(&outcome.recording).expect("4 samples to report");
    assert_eq!(report.samples, 4);
    assert!(report.histogram.is_none());
    let rendered = terminal::format_report(&report);
    assert!(rendered.contains("best latency was"));
}

#[test]
fn short_echo_ends_the_run() {
    let mut channel = EchoChannel::instant();
    channel.fail_read_after = Some(7);
    let cancel = CancelToken::new();

    let outcome = Collector::new(&Config {
        samples: 100,
        payload_size: 8,
        ..Config::default()
    })
    .collect(&mut channel, &cancel);

    assert!(matches!(outcome.stop, StopReason::Transport(_)));
    assert_eq!(outcome.recording.samples().len(), 7);
}

#[test]
fn cancellation_before_the_first_sample_yields_no_measurements() {
    let mut channel = EchoChannel::instant();
    let cancel = CancelToken::new();
    cancel.cancel();

    let outcome = Collector::new(&config(100)).collect(&mut channel, &cancel);

    assert!(matches!(outcome.stop, StopReason::Cancelled));
    assert!(outcome.recording.is_empty());
    assert!(
        Report::from_recording(&outcome.recording).is_none(),
        "an empty recording must not produce a report"
    );
}

#[test]
fn cancellation_mid_run_keeps_accumulated_samples() {
    let mut channel = EchoChannel::instant();
    let cancel = CancelToken::new();

    let observer_cancel = cancel.clone();
    let outcome = Collector::new(&config(100)).collect_with(&mut channel, &cancel, |sample, _| {
        if sample.index == 2 {
            observer_cancel.cancel();
        }
    });

    assert!(matches!(outcome.stop, StopReason::Cancelled));
    assert_eq!(outcome.recording.samples().len(), 3);

    let report = Report::from_recording(&outcome.recording).expect("3 samples to report");
    assert_eq!(report.samples, 3);
}

#[test]
fn sample_indices_are_sequential_from_zero() {
    let mut channel = EchoChannel::instant();
    let cancel = CancelToken::new();

    let outcome = Collector::new(&config(12)).collect(&mut channel, &cancel);

    for (i, sample) in outcome.recording.samples().iter().enumerate() {
        assert_eq!(sample.index, i as u64);
    }
}
