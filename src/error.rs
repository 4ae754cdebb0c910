//! Error types for sampling and serial port handling.

use std::io;

use thiserror::Error;

/// Failure of a single round-trip sample.
///
/// Any of these is fatal for the run: the sampling loop stops at the
/// first transport failure instead of retrying, since a silently
/// dropped or repeated sample would bias the latency distribution.
#[derive(Debug, Error)]
pub enum SampleError {
    /// The channel accepted fewer bytes than the payload size.
    #[error("short write: {written} of {expected} bytes accepted")]
    WriteShortfall {
        /// Bytes the channel actually accepted.
        written: usize,
        /// Bytes requested.
        expected: usize,
    },

    /// The echo came back short within the read timeout.
    #[error("short read: {read} of {expected} echoed bytes (timeout or lost framing)")]
    ReadShortfall {
        /// Bytes read before the timeout.
        read: usize,
        /// Bytes expected.
        expected: usize,
    },

    /// The underlying transport failed outright.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure to open or configure a serial port.
#[derive(Debug, Error)]
pub enum SerialError {
    /// The device node could not be opened.
    #[error("unable to open {path}: {source}")]
    Open {
        /// Device path as given on the command line.
        path: String,
        /// Underlying OS error.
        source: io::Error,
    },

    /// termios configuration failed after the port was opened.
    #[error("unable to configure {path}: {source}")]
    Configure {
        /// Device path as given on the command line.
        path: String,
        /// Underlying OS error.
        source: io::Error,
    },

    /// The requested baud rate has no termios constant on this platform.
    #[error("unsupported baud rate {0}")]
    UnsupportedBaud(u32),
}
