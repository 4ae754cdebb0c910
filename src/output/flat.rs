//! Flat dump of raw samples.

use std::io::{self, Write};

use crate::measurement::Sample;

/// Write accepted samples to `writer`, one latency per line.
///
/// Milliseconds with two decimals, in sample order. This is a
/// pass-through sink: nothing is aggregated or reordered, so the dump
/// can be replayed into other tooling.
pub fn write_samples<W: Write>(writer: &mut W, samples: &[Sample]) -> io::Result<()> {
    for sample in samples {
        writeln!(writer, "{:.2}", sample.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_decimals_in_sample_order() {
        let samples = [
            Sample {
                value: 1.234,
                index: 0,
            },
            Sample {
                value: 0.5,
                index: 1,
            },
            Sample {
                value: 12.999,
                index: 2,
            },
        ];
        let mut buf = Vec::new();
        write_samples(&mut buf, &samples).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "1.23\n0.50\n13.00\n");
    }

    #[test]
    fn test_empty_dump_writes_nothing() {
        let mut buf = Vec::new();
        write_samples(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }
}
