//! Baseline comparison

use crate::metric::AggregateMetric;
use serde::Serialize;
use std::fmt;

/// Direction of the coverage change relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Decreased,
    Increased,
    Equal,
}

/// Classified change between two aggregate metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparison {
    pub direction: Direction,
    /// Signed percentage-point difference, current minus baseline (unrounded)
    pub delta: f64,
}

impl Comparison {
    /// Delta rounded to one decimal, sign kept (`-0.04` gives `-0.0`)
    pub fn display_delta(&self) -> String {
        format!("{:.1}", self.delta)
    }

    /// Phrase placed between "Coverage" and "production"
    pub fn phrase(&self) -> String {
        match self.direction {
            Direction::Decreased => format!("decreased by {} compared to", self.display_delta()),
            Direction::Increased => format!("increased by {} compared to", self.display_delta()),
            Direction::Equal => "is equal with".to_string(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.phrase())
    }
}

/// Compare the current metric against the baseline
///
/// Classification uses exact float comparison on the unrounded delta.
pub fn compare_direction(baseline: &AggregateMetric, current: &AggregateMetric) -> Comparison {
    let delta = current.percent() - baseline.percent();
    let direction = if delta < 0.0 {
        Direction::Decreased
    } else if delta > 0.0 {
        Direction::Increased
    } else {
        Direction::Equal
    };
    Comparison { direction, delta }
}
