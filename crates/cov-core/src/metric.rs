//! Metric kinds and aggregation of coverage records

use crate::parser::CoverageRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// Kind of coverage counted in an LCOV record
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    #[default]
    Lines,
    Functions,
    Branches,
}

impl MetricKind {
    pub const ALL: [MetricKind; 3] = [MetricKind::Lines, MetricKind::Functions, MetricKind::Branches];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Lines => "lines",
            MetricKind::Functions => "functions",
            MetricKind::Branches => "branches",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" | "line" => Ok(MetricKind::Lines),
            "functions" | "function" => Ok(MetricKind::Functions),
            "branches" | "branch" => Ok(MetricKind::Branches),
            other => Err(format!(
                "unknown metric kind '{}' (expected lines, functions or branches)",
                other
            )),
        }
    }
}

/// Hit/found pair for one metric kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitFound {
    pub hit: u64,
    pub found: u64,
}

impl HitFound {
    pub fn new(hit: u64, found: u64) -> Self {
        Self { hit, found }
    }
}

impl Add for HitFound {
    type Output = HitFound;

    fn add(self, other: HitFound) -> HitFound {
        HitFound {
            hit: self.hit + other.hit,
            found: self.found + other.found,
        }
    }
}

impl Sum for HitFound {
    fn sum<I: Iterator<Item = HitFound>>(iter: I) -> Self {
        iter.fold(HitFound::default(), Add::add)
    }
}

/// Coverage totals reduced to a single percentage
///
/// `percent` is 0 when nothing was found.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateMetric {
    found: u64,
    hit: u64,
    percent: f64,
}

impl AggregateMetric {
    pub fn found(&self) -> u64 {
        self.found
    }

    pub fn hit(&self) -> u64 {
        self.hit
    }

    /// Coverage percentage (0.0 - 100.0)
    pub fn percent(&self) -> f64 {
        self.percent
    }
}

impl From<HitFound> for AggregateMetric {
    fn from(counts: HitFound) -> Self {
        let percent = if counts.found == 0 {
            0.0
        } else {
            counts.hit as f64 / counts.found as f64 * 100.0
        };
        Self {
            found: counts.found,
            hit: counts.hit,
            percent,
        }
    }
}

/// Sum hit/found over every record for `kind`
///
/// Records without data for `kind` count as 0/0.
pub fn aggregate(records: &[CoverageRecord], kind: MetricKind) -> AggregateMetric {
    let totals: HitFound = records.iter().map(|r| r.counts(kind)).sum();
    log::debug!(
        "Aggregated {} over {} records: {}/{}",
        kind,
        records.len(),
        totals.hit,
        totals.found
    );
    AggregateMetric::from(totals)
}
