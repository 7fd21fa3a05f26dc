//! # cov-core
//!
//! Coverage delta computation for covdelta.
//!
//! ## Features
//!
//! - Parse LCOV tracefiles into per-file hit/found counts
//! - Reduce records into one aggregate metric per kind (lines, functions, branches)
//! - Classify the change between a baseline and the current run
//! - Render a deterministic one-line summary (plus HTML and JSON variants)
//!
//! ## Usage
//!
//! ```rust
//! use cov_core::{MetricKind, Summary};
//!
//! let current = "SF:src/lib.rs\nLF:100\nLH:90\nend_of_record\n";
//! let baseline = "SF:src/lib.rs\nLF:100\nLH:80\nend_of_record\n";
//!
//! let summary = Summary::from_reports("svc", current, baseline, MetricKind::Lines, "http://x")?;
//! assert_eq!(
//!     summary.render_plain(),
//!     "Service: svc. Covered 90/100 (90.0%). Coverage increased by 10.0 compared to production. See More on http://x."
//! );
//! # Ok::<(), cov_core::CoverageError>(())
//! ```

pub mod compare;
pub mod metric;
pub mod parser;
pub mod render;

pub use compare::{Comparison, Direction, compare_direction};
pub use metric::{AggregateMetric, HitFound, MetricKind, aggregate};
pub use parser::{CoverageRecord, CoverageReport, parse_report};
pub use render::{Summary, SummaryFormat, format_metric, render_summary};

use thiserror::Error;

/// Errors that can occur during coverage operations
#[derive(Error, Debug)]
pub enum CoverageError {
    #[error("Failed to parse coverage report at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoverageError>;

impl CoverageError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        CoverageError::Parse {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = CoverageError::parse(7, "invalid count \"x\" in LH");
        assert_eq!(
            err.to_string(),
            "Failed to parse coverage report at line 7: invalid count \"x\" in LH"
        );
    }
}
