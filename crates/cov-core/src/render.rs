//! Summary rendering

use crate::compare::{Comparison, compare_direction};
use crate::metric::{AggregateMetric, MetricKind, aggregate};
use crate::parser::parse_report;
use crate::Result;
use serde::Serialize;
use std::fmt::Write;
use std::str::FromStr;

/// Summary output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SummaryFormat {
    /// One-line text, the format dashboards scrape
    #[default]
    Plain,
    Html,
    Json,
}

impl FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" => Ok(SummaryFormat::Plain),
            "html" => Ok(SummaryFormat::Html),
            "json" => Ok(SummaryFormat::Json),
            other => Err(format!(
                "unknown summary format '{}' (expected plain, html or json)",
                other
            )),
        }
    }
}

/// Render a metric as `<hit>/<found> (<percent>%)`, one decimal
pub fn format_metric(metric: &AggregateMetric) -> String {
    format!("{}/{} ({:.1}%)", metric.hit(), metric.found(), metric.percent())
}

/// Render the one-line comparison summary
pub fn render_summary(
    service: &str,
    current: &AggregateMetric,
    baseline: &AggregateMetric,
    report_link: &str,
) -> String {
    let comparison = compare_direction(baseline, current);
    format!(
        "Service: {}. Covered {}. Coverage {} production. See More on {}.",
        service,
        format_metric(current),
        comparison.phrase(),
        report_link
    )
}

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub service: String,
    pub kind: MetricKind,
    pub current: AggregateMetric,
    pub baseline: AggregateMetric,
    pub comparison: Comparison,
    pub report_link: String,
}

impl Summary {
    /// Build a summary from two aggregate metrics
    pub fn from_metrics(
        service: impl Into<String>,
        kind: MetricKind,
        current: AggregateMetric,
        baseline: AggregateMetric,
        report_link: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            kind,
            comparison: compare_direction(&baseline, &current),
            current,
            baseline,
            report_link: report_link.into(),
        }
    }

    /// Parse both reports and build the summary
    ///
    /// A parse failure in either report aborts the whole summary.
    pub fn from_reports(
        service: impl Into<String>,
        current_report: &str,
        baseline_report: &str,
        kind: MetricKind,
        report_link: impl Into<String>,
    ) -> Result<Self> {
        let current = aggregate(&parse_report(current_report)?, kind);
        let baseline = aggregate(&parse_report(baseline_report)?, kind);
        log::info!(
            "Current {} coverage {}, baseline {}",
            kind,
            format_metric(&current),
            format_metric(&baseline)
        );
        Ok(Self::from_metrics(service, kind, current, baseline, report_link))
    }

    /// Generate summary in specified format
    pub fn render(&self, format: SummaryFormat) -> Result<String> {
        match format {
            SummaryFormat::Plain => Ok(self.render_plain()),
            SummaryFormat::Html => Ok(self.render_html()),
            SummaryFormat::Json => self.to_json(),
        }
    }

    pub fn render_plain(&self) -> String {
        render_summary(&self.service, &self.current, &self.baseline, &self.report_link)
    }

    /// HTML layout based on the action's comment markup: adds the direction
    /// sentence, uses the link itself as anchor text and escapes user text.
    pub fn render_html(&self) -> String {
        let mut output = String::new();
        let link = escape_html(&self.report_link);

        let _ = write!(output, "<p><b>Service: {}</b></p>", escape_html(&self.service));
        let _ = write!(
            output,
            "<p>Covered {} {} in this PR compared to {} in production. Coverage {} production.</p>",
            format_metric(&self.current),
            self.kind,
            format_metric(&self.baseline),
            self.comparison.phrase()
        );
        let _ = write!(output, "<p>See More on <a href=\"{}\">{}</a>.</p>", link, link);

        output
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
