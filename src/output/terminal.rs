//! ASCII bar-chart rendering of the latency distribution.

use colored::Colorize;

use crate::report::Report;

/// Character budget for the widest bar.
pub const TERM_WIDTH: usize = 50;

/// Scale a bin count into a bar width.
///
/// `round(count * TERM_WIDTH / max_count)`, with one guarantee layered
/// on top: a non-empty bin is never invisible — a computed width of 0
/// becomes 1.
pub fn bar_width(count: u64, max_count: u64) -> usize {
    if count == 0 || max_count == 0 {
        return 0;
    }
    let width = (count as f64 * TERM_WIDTH as f64 / max_count as f64).round() as usize;
    width.max(1)
}

/// Render a report for the terminal.
///
/// Runs of empty bins collapse to a single `...` line, and a run too
/// short to seed the histogram gets summary lines only.
pub fn format_report(report: &Report) -> String {
    let mut out = String::new();

    out.push_str("> latency distribution:\n");

    match &report.histogram {
        Some(hist) => {
            let max_count = hist.counts.iter().copied().max().unwrap_or(0);
            let mut skipped = false;
            for bin in hist.bins() {
                if bin.count == 0 {
                    skipped = true;
                    continue;
                }
                if skipped {
                    out.push_str("...\n");
                    skipped = false;
                }
                let upper = match bin.upper {
                    Some(upper) => format!("{:8.2}", upper),
                    None => format!("{:>8}", "inf"),
                };
                out.push_str(&format!("{:8.2} -{} ms: {:8} ", bin.lower, upper, bin.count));
                for _ in 0..bar_width(bin.count, max_count) {
                    out.push('#');
                }
                out.push('\n');
            }
        }
        None => {
            out.push_str("  (too few samples for a distribution)\n");
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "  best latency was {} msec\n",
        format!("{:.2}", report.min_ms).green()
    ));
    out.push_str(&format!(
        " worst latency was {} msec\n",
        format!("{:.2}", report.max_ms).red()
    ));
    out.push_str(&format!(
        "  mean latency was {} msec\n",
        format!("{:.2}", report.mean_ms).bold()
    ));

    out
}
