//! JSON serialization of run reports.

use crate::report::Report;

/// Serialize a report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `Report`).
pub fn to_json(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize a report to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `Report`).
pub fn to_json_pretty(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::HistogramSummary;

    fn make_report() -> Report {
        Report {
            samples: 42,
            min_ms: 0.52,
            max_ms: 9.21,
            mean_ms: 1.03,
            histogram: Some(HistogramSummary {
                bin_min_ms: 0.4,
                bin_width_ms: 0.25,
                counts: vec![0, 30, 10, 1, 1],
            }),
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_report()).unwrap();
        assert!(json.contains("\"samples\":42"));
        assert!(json.contains("\"min_ms\":0.52"));
        assert!(json.contains("\"counts\":[0,30,10,1,1]"));
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&make_report()).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("mean_ms"));
    }

    #[test]
    fn test_json_round_trips() {
        let report = make_report();
        let json = to_json(&report).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.samples, report.samples);
        assert_eq!(parsed.histogram.unwrap().counts, vec![0, 30, 10, 1, 1]);
    }
}
