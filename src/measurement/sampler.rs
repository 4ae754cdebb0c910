//! One round-trip measurement.

use std::time::Duration;

use crate::error::SampleError;

use super::channel::Channel;
use super::clock;

/// A single latency observation.
///
/// Immutable once produced.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    /// Round-trip latency in milliseconds.
    pub value: f64,
    /// Sequence number, starting at 0. Only successful round trips
    /// consume an index.
    pub index: u64,
}

/// Fill `buf` with the deterministic payload pattern.
///
/// A repeating `0..=254` ramp: content is irrelevant to timing, only
/// size matters, but a fixed pattern keeps runs byte-identical and
/// makes a mangled echo obvious on a logic analyzer.
pub fn fill_payload(buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = (i % 255) as u8;
    }
}

/// Drives one round trip per call: timestamp, write, read the echo
/// back, timestamp.
///
/// The measured interval spans the full round trip — write completion
/// is deliberately not separated from echo delay, because the device
/// under test is the bottleneck of interest, not the host's write
/// syscall in isolation.
#[derive(Debug)]
pub struct SampleDriver {
    payload: Vec<u8>,
    echo: Vec<u8>,
    read_timeout: Duration,
    next_index: u64,
}

impl SampleDriver {
    /// Create a driver for `payload_size`-byte round trips.
    pub fn new(payload_size: usize, read_timeout: Duration) -> Self {
        let mut payload = vec![0u8; payload_size];
        fill_payload(&mut payload);
        Self {
            payload,
            echo: vec![0u8; payload_size],
            read_timeout,
            next_index: 0,
        }
    }

    /// Payload bytes sent per sample.
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }

    /// Take one sample.
    ///
    /// A short write or short echo is a typed error, not a retry case:
    /// once framing is lost, further latency figures from this
    /// connection are meaningless.
    pub fn take_sample<C: Channel>(&mut self, channel: &mut C) -> Result<Sample, SampleError> {
        let expected = self.payload.len();

        let t0 = clock::now();

        let written = channel.write(&self.payload)?;
        if written != expected {
            return Err(SampleError::WriteShortfall { written, expected });
        }

        let read = channel.read(&mut self.echo, self.read_timeout)?;
        if read != expected {
            return Err(SampleError::ReadShortfall { read, expected });
        }

        let t1 = clock::now();

        let value = clock::elapsed_secs(t1, t0) * 1_000.0;
        let index = self.next_index;
        self.next_index += 1;

        Ok(Sample { value, index })
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    /// Echoes whatever was last written; optionally lies about counts.
    struct LoopbackChannel {
        pending: Vec<u8>,
        short_write: bool,
        short_read: bool,
    }

    impl LoopbackChannel {
        fn new() -> Self {
            Self {
                pending: Vec::new(),
                short_write: false,
                short_read: false,
            }
        }
    }

    impl Channel for LoopbackChannel {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.short_write {
                return Ok(buf.len().saturating_sub(1));
            }
            self.pending = buf.to_vec();
            Ok(buf.len())
        }

        fn read(&mut self, buf: &mut [u8], _timeout: Duration) -> io::Result<usize> {
            if self.short_read {
                return Ok(0);
            }
            let n = buf.len().min(self.pending.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_payload_pattern_repeats() {
        let mut buf = vec![0u8; 600];
        fill_payload(&mut buf);
        assert_eq!(buf[0], 0);
        assert_eq!(buf[254], 254);
        assert_eq!(buf[255], 0);
        assert_eq!(buf[510], 0);
        assert_eq!(buf[599], (599 % 255) as u8);
    }

    #[test]
    fn test_take_sample_indexes_from_zero() {
        let mut driver = SampleDriver::new(4, Duration::from_secs(1));
        let mut channel = LoopbackChannel::new();

        let first = driver.take_sample(&mut channel).unwrap();
        let second = driver.take_sample(&mut channel).unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(second.index, 1);
        assert!(first.value >= 0.0);
    }

    #[test]
    fn test_short_write_is_fatal() {
        let mut driver = SampleDriver::new(4, Duration::from_secs(1));
        let mut channel = LoopbackChannel::new();
        channel.short_write = true;

        match driver.take_sample(&mut channel) {
            Err(SampleError::WriteShortfall { written, expected }) => {
                assert_eq!(written, 3);
                assert_eq!(expected, 4);
            }
            other => panic!("expected WriteShortfall, got {:?}", other.map(|s| s.value)),
        }
    }

    #[test]
    fn test_short_read_is_fatal() {
        let mut driver = SampleDriver::new(4, Duration::from_secs(1));
        let mut channel = LoopbackChannel::new();
        channel.short_read = true;

        match driver.take_sample(&mut channel) {
            Err(SampleError::ReadShortfall { read, expected }) => {
                assert_eq!(read, 0);
                assert_eq!(expected, 4);
            }
            other => panic!("expected ReadShortfall, got {:?}", other.map(|s| s.value)),
        }
    }

    #[test]
    fn test_failed_sample_consumes_no_index() {
        let mut driver = SampleDriver::new(4, Duration::from_secs(1));
        let mut channel = LoopbackChannel::new();

        channel.short_read = true;
        assert!(driver.take_sample(&mut channel).is_err());

        channel.short_read = false;
        let sample = driver.take_sample(&mut channel).unwrap();
        assert_eq!(sample.index, 0);
    }
}
