//! Rendering of accumulated results: terminal bar chart, JSON report,
//! flat sample dump.

pub mod flat;
pub mod json;
pub mod terminal;
