//! Run summary types.

use serde::{Deserialize, Serialize};

use crate::measurement::Recording;
use crate::stats::Bin;

/// Serializable summary of a finished (or aborted) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Accepted samples.
    pub samples: u64,

    /// Best observed latency in milliseconds.
    pub min_ms: f64,

    /// Worst observed latency in milliseconds.
    pub max_ms: f64,

    /// Mean latency in milliseconds.
    pub mean_ms: f64,

    /// Bin layout and counts; absent when the run ended before the
    /// histogram's warm-up window filled.
    pub histogram: Option<HistogramSummary>,
}

/// The histogram's fixed layout plus its counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Lower edge of the first regular bin, milliseconds.
    pub bin_min_ms: f64,

    /// Bin width, milliseconds.
    pub bin_width_ms: f64,

    /// Per-bin counts, underflow first, overflow region last.
    pub counts: Vec<u64>,
}

impl HistogramSummary {
    /// Renderable bins with their boundary labels.
    ///
    /// Same labeling as [`LatencyHistogram::bins`]: bin 0 covers
    /// `[0, bin_min)`, the last bin is open-ended.
    ///
    /// [`LatencyHistogram::bins`]: crate::stats::LatencyHistogram::bins
    pub fn bins(&self) -> impl Iterator<Item = Bin> + '_ {
        let last = self.counts.len().saturating_sub(1);
        self.counts.iter().enumerate().map(move |(i, &count)| {
            let lower = if i == 0 {
                0.0
            } else {
                self.bin_min_ms + (i as f64 - 1.0) * self.bin_width_ms
            };
            let upper = if i == last {
                None
            } else if i == 0 {
                Some(self.bin_min_ms)
            } else {
                Some(self.bin_min_ms + i as f64 * self.bin_width_ms)
            };
            Bin { lower, upper, count }
        })
    }
}

impl Report {
    /// Summarize a recording.
    ///
    /// Returns `None` for an empty recording: with zero samples there
    /// is no mean to compute and nothing to render.
    pub fn from_recording(recording: &Recording) -> Option<Self> {
        let stats = recording.stats();
        if stats.count() == 0 {
            return None;
        }

        let histogram = recording.histogram();
        let histogram = histogram.is_seeded().then(|| HistogramSummary {
            bin_min_ms: histogram.bin_min(),
            bin_width_ms: histogram.bin_width(),
            counts: histogram.counts().to_vec(),
        });

        Some(Self {
            samples: stats.count(),
            min_ms: stats.min(),
            max_ms: stats.max(),
            mean_ms: stats.mean(),
            histogram,
        })
    }
}
