//! Coverage data parsing from LCOV tracefiles
//!
//! A tracefile is a sequence of records, one per source file:
//!
//! ```text
//! TN:<test name>
//! SF:<source file>
//! FN:<line>,<function name>
//! FNDA:<execution count>,<function name>
//! FNF:<functions found>
//! FNH:<functions hit>
//! DA:<line>,<execution count>[,<checksum>]
//! LF:<lines found>
//! LH:<lines hit>
//! BRDA:<line>,[e]<block>,<branch>,<taken or ->
//! BRF:<branches found>
//! BRH:<branches hit>
//! end_of_record
//! ```
//!
//! Only counts are validated. Line numbers, block ids and branch labels are
//! kept as written, since gcc/lcov 2.x emit exception blocks (`e0`) and
//! expression labels there.

use crate::metric::{AggregateMetric, HitFound, MetricKind, aggregate};
use crate::{CoverageError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Execution count of a single source line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDetail {
    pub line: Option<u32>,
    pub hit: u64,
}

/// Function declaration and its execution count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionDetail {
    pub name: String,
    pub line: Option<u32>,
    pub hit: u64,
}

/// One branch arm; `taken` is `None` when the block was never executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchDetail {
    pub line: Option<u32>,
    pub block: String,
    pub branch: String,
    pub taken: Option<u64>,
}

/// Coverage data for a single source file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageRecord {
    /// Source file path (`SF`)
    pub path: String,
    /// Test name (`TN`), if the tracefile carries one
    pub test_name: Option<String>,
    pub lines: Vec<LineDetail>,
    pub functions: Vec<FunctionDetail>,
    pub branches: Vec<BranchDetail>,
    /// Counts from the summary tags (`LF/LH`, `FNF/FNH`, `BRF/BRH`)
    summaries: BTreeMap<MetricKind, HitFound>,
}

impl CoverageRecord {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Override the hit/found pair for one kind
    pub fn set_counts(&mut self, kind: MetricKind, counts: HitFound) {
        self.summaries.insert(kind, counts);
    }

    /// Whether the record carries any data for `kind`
    pub fn has_kind(&self, kind: MetricKind) -> bool {
        self.summaries.contains_key(&kind) || self.detail_counts(kind).is_some()
    }

    /// Hit/found pair for `kind`
    ///
    /// Summary tags win over details. A kind with neither is 0/0.
    pub fn counts(&self, kind: MetricKind) -> HitFound {
        self.summaries
            .get(&kind)
            .copied()
            .or_else(|| self.detail_counts(kind))
            .unwrap_or_default()
    }

    fn detail_counts(&self, kind: MetricKind) -> Option<HitFound> {
        let (found, hit) = match kind {
            MetricKind::Lines => (
                self.lines.len(),
                self.lines.iter().filter(|l| l.hit > 0).count(),
            ),
            MetricKind::Functions => (
                self.functions.len(),
                self.functions.iter().filter(|f| f.hit > 0).count(),
            ),
            MetricKind::Branches => (
                self.branches.len(),
                self.branches
                    .iter()
                    .filter(|b| b.taken.is_some_and(|t| t > 0))
                    .count(),
            ),
        };
        (found > 0).then(|| HitFound::new(hit as u64, found as u64))
    }

    fn summary_mut(&mut self, kind: MetricKind) -> &mut HitFound {
        self.summaries.entry(kind).or_default()
    }
}

/// Parsed LCOV report
#[derive(Debug, Clone, Default, Serialize)]
pub struct CoverageReport {
    records: Vec<CoverageRecord>,
}

impl CoverageReport {
    /// Parse a report from LCOV text
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Self {
            records: parse_report(text)?,
        })
    }

    pub fn records(&self) -> &[CoverageRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CoverageRecord> {
        self.records
    }

    /// Aggregate metric for `kind` across all files
    pub fn metric(&self, kind: MetricKind) -> AggregateMetric {
        aggregate(&self.records, kind)
    }

    /// Get total number of files
    pub fn total_files(&self) -> usize {
        self.records.len()
    }

    /// Get number of files with at least one line hit
    pub fn files_with_coverage(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.counts(MetricKind::Lines).hit > 0)
            .count()
    }
}

impl From<Vec<CoverageRecord>> for CoverageReport {
    fn from(records: Vec<CoverageRecord>) -> Self {
        Self { records }
    }
}

/// Parse LCOV text into one record per source file
///
/// Empty input yields no records. A trailing record without
/// `end_of_record` is kept. Unknown tags are skipped.
pub fn parse_report(text: &str) -> Result<Vec<CoverageRecord>> {
    let mut records = Vec::new();
    let mut current: Option<CoverageRecord> = None;
    let mut test_name: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line == "end_of_record" {
            if let Some(record) = current.take() {
                records.push(record);
            }
            continue;
        }

        let (tag, value) = line
            .split_once(':')
            .ok_or_else(|| CoverageError::parse(line_no, format!("expected TAG:value, got \"{}\"", line)))?;

        if tag == "TN" {
            test_name = (!value.is_empty()).then(|| value.to_string());
            if let Some(record) = current.as_mut() {
                record.test_name = test_name.clone();
            }
            continue;
        }

        let record = current.get_or_insert_with(|| CoverageRecord {
            test_name: test_name.clone(),
            ..Default::default()
        });

        match tag {
            "SF" => record.path = value.to_string(),
            "FN" => {
                let (line, name) = split_pair(value, line_no, tag)?;
                // lcov 2.x writes FN:<start>,<end>,<name>
                let name = match name.split_once(',') {
                    Some((end, rest)) if end.parse::<u32>().is_ok() => rest,
                    _ => name,
                };
                let line = parse_line_number(line);
                match record.functions.iter_mut().find(|f| f.name == name) {
                    Some(existing) => existing.line = line,
                    None => record.functions.push(FunctionDetail {
                        name: name.to_string(),
                        line,
                        hit: 0,
                    }),
                }
            }
            "FNDA" => {
                let (count, name) = split_pair(value, line_no, tag)?;
                let hit: u64 = parse_num(count, line_no, tag)?;
                match record.functions.iter_mut().find(|f| f.name == name) {
                    Some(existing) => existing.hit += hit,
                    None => record.functions.push(FunctionDetail {
                        name: name.to_string(),
                        line: None,
                        hit,
                    }),
                }
            }
            "DA" => {
                let mut fields = value.split(',');
                let line = parse_line_number(field(fields.next(), line_no, tag)?);
                let hit = parse_num(field(fields.next(), line_no, tag)?, line_no, tag)?;
                record.lines.push(LineDetail { line, hit });
            }
            "BRDA" => {
                // The branch label may itself contain commas, so `taken` is the last field
                let short = || CoverageError::parse(line_no, "BRDA expects 4 fields");
                let (head, taken) = value.rsplit_once(',').ok_or_else(short)?;
                let mut fields = head.splitn(3, ',');
                let (Some(line), Some(block), Some(branch)) = (fields.next(), fields.next(), fields.next())
                else {
                    return Err(short());
                };
                let taken = match taken.trim() {
                    "-" => None,
                    count => Some(parse_num(count, line_no, tag)?),
                };
                record.branches.push(BranchDetail {
                    line: parse_line_number(line),
                    block: block.to_string(),
                    branch: branch.to_string(),
                    taken,
                });
            }
            "LF" => record.summary_mut(MetricKind::Lines).found = parse_num(value, line_no, tag)?,
            "LH" => record.summary_mut(MetricKind::Lines).hit = parse_num(value, line_no, tag)?,
            "FNF" => record.summary_mut(MetricKind::Functions).found = parse_num(value, line_no, tag)?,
            "FNH" => record.summary_mut(MetricKind::Functions).hit = parse_num(value, line_no, tag)?,
            "BRF" => record.summary_mut(MetricKind::Branches).found = parse_num(value, line_no, tag)?,
            "BRH" => record.summary_mut(MetricKind::Branches).hit = parse_num(value, line_no, tag)?,
            other => log::trace!("Skipping unknown LCOV tag {} at line {}", other, line_no),
        }
    }

    if let Some(record) = current.take() {
        log::debug!("Report ended without end_of_record, keeping {}", record.path);
        records.push(record);
    }

    log::debug!("Parsed {} coverage records", records.len());
    Ok(records)
}

fn parse_line_number(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

fn split_pair<'a>(value: &'a str, line_no: usize, tag: &str) -> Result<(&'a str, &'a str)> {
    value
        .split_once(',')
        .ok_or_else(|| CoverageError::parse(line_no, format!("{} expects two comma-separated fields", tag)))
}

fn field<'a>(value: Option<&'a str>, line_no: usize, tag: &str) -> Result<&'a str> {
    value.ok_or_else(|| CoverageError::parse(line_no, format!("{} is missing a field", tag)))
}

fn parse_num<T: std::str::FromStr>(value: &str, line_no: usize, tag: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoverageError::parse(line_no, format!("invalid count \"{}\" in {}", value, tag)))
}
