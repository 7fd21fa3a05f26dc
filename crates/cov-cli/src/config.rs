//! Command-line and environment configuration
//!
//! Every input can come from a flag or from the environment variable a
//! GitHub Action receives (`INPUT_<NAME>`). [`Args`] is what clap parses;
//! [`Config`] is the validated form the pipeline runs on.

use clap::Parser;
use cov_core::{MetricKind, SummaryFormat};
use cov_publish::RepoSlug;
use cov_publish::github::DEFAULT_API_URL;
use std::path::PathBuf;
use thiserror::Error;

/// Raw command-line arguments
#[derive(Parser, Debug, Default)]
#[command(
    name = "covdelta",
    version,
    about = "Compare LCOV coverage against production and comment on the pull request"
)]
pub struct Args {
    /// LCOV report of the current change
    #[arg(long, env = "INPUT_LCOV-PATH")]
    pub lcov_path: Option<PathBuf>,

    /// LCOV report of production (the baseline)
    #[arg(long, env = "INPUT_PRODUCTION-LCOV-PATH")]
    pub production_lcov_path: Option<PathBuf>,

    /// Service or package name shown in the summary
    #[arg(long, env = "INPUT_PACKAGE-NAME")]
    pub package_name: Option<String>,

    /// Link to the full coverage report
    #[arg(long, env = "INPUT_COVERALLS-LINK")]
    pub coveralls_link: Option<String>,

    /// Token used to post the comment
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Metric to compare (lines, functions, branches)
    #[arg(long, env = "INPUT_METRIC", default_value = "lines")]
    pub metric: MetricKind,

    /// Summary format (plain, html, json)
    #[arg(long, env = "INPUT_FORMAT", default_value = "plain")]
    pub format: SummaryFormat,

    /// Name of the event that triggered the workflow
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Path to the JSON payload of the triggering event
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// Pull request to comment on, overrides event detection
    #[arg(long)]
    pub pr_number: Option<u64>,

    /// Repository in owner/name form
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,

    /// Print the summary instead of posting it
    #[arg(long)]
    pub dry_run: bool,
}

/// Configuration errors, raised before any report is read
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid input {name}: {message}")]
    InvalidInput { name: &'static str, message: String },
}

/// Where the rendered summary goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Write to stdout
    DryRun,
    /// Post as a pull request comment
    Github {
        api_url: String,
        repository: RepoSlug,
        token: String,
    },
}

/// How the triggering pull request is found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSource {
    pub event_name: Option<String>,
    pub event_path: Option<PathBuf>,
    pub pr_number: Option<u64>,
}

/// Validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub current_report: PathBuf,
    pub baseline_report: PathBuf,
    pub service: String,
    pub report_link: String,
    pub metric: MetricKind,
    pub format: SummaryFormat,
    pub trigger: TriggerSource,
    pub output: Output,
}

impl TryFrom<Args> for Config {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let current_report = required_path(args.lcov_path, "lcov-path")?;
        let baseline_report = required_path(args.production_lcov_path, "production-lcov-path")?;
        let service = required(args.package_name, "package-name")?;
        let report_link = required(args.coveralls_link, "coveralls-link")?;

        let output = if args.dry_run {
            Output::DryRun
        } else {
            let token = required(args.github_token, "github-token")?;
            let repository = required(args.repository, "repository")?
                .parse::<RepoSlug>()
                .map_err(|e| ConfigError::InvalidInput {
                    name: "repository",
                    message: e.to_string(),
                })?;
            let api_url = non_empty(args.api_url).unwrap_or_else(|| DEFAULT_API_URL.to_string());
            Output::Github {
                api_url,
                repository,
                token,
            }
        };

        Ok(Config {
            current_report,
            baseline_report,
            service,
            report_link,
            metric: args.metric,
            format: args.format,
            trigger: TriggerSource {
                event_name: non_empty(args.event_name),
                event_path: args.event_path.filter(|p| !p.as_os_str().is_empty()),
                pr_number: args.pr_number,
            },
            output,
        })
    }
}

// Actions pass unset inputs as empty strings
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::MissingInput(name))
}

fn required_path(value: Option<PathBuf>, name: &'static str) -> Result<PathBuf, ConfigError> {
    value
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or(ConfigError::MissingInput(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_args() -> Args {
        Args {
            lcov_path: Some("coverage/lcov.info".into()),
            production_lcov_path: Some("prod/lcov.info".into()),
            package_name: Some("payments".into()),
            coveralls_link: Some("https://coveralls.io/builds/1".into()),
            github_token: Some("ghs_token".into()),
            repository: Some("octo-org/payments".into()),
            event_name: Some("pull_request".into()),
            event_path: Some("/tmp/event.json".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_config() {
        let config = Config::try_from(complete_args()).unwrap();

        assert_eq!(config.service, "payments");
        assert_eq!(config.metric, MetricKind::Lines);
        assert_eq!(config.format, SummaryFormat::Plain);
        assert_eq!(config.trigger.event_name.as_deref(), Some("pull_request"));
        assert_eq!(
            config.output,
            Output::Github {
                api_url: DEFAULT_API_URL.to_string(),
                repository: "octo-org/payments".parse().unwrap(),
                token: "ghs_token".into(),
            }
        );
    }

    #[test]
    fn test_missing_inputs_are_named() {
        let cases: [(fn(&mut Args), &str); 5] = [
            (|a| a.lcov_path = None, "lcov-path"),
            (|a| a.production_lcov_path = None, "production-lcov-path"),
            (|a| a.package_name = None, "package-name"),
            (|a| a.coveralls_link = None, "coveralls-link"),
            (|a| a.github_token = None, "github-token"),
        ];

        for (clear, name) in cases {
            let mut args = complete_args();
            clear(&mut args);
            assert_eq!(Config::try_from(args).unwrap_err(), ConfigError::MissingInput(name));
        }
    }

    #[test]
    fn test_empty_string_is_missing() {
        let args = Args {
            package_name: Some("  ".into()),
            ..complete_args()
        };
        let err = Config::try_from(args).unwrap_err();

        assert_eq!(err, ConfigError::MissingInput("package-name"));
        assert_eq!(err.to_string(), "Missing required input: package-name");
    }

    #[test]
    fn test_dry_run_needs_no_token() {
        let args = Args {
            github_token: None,
            repository: None,
            dry_run: true,
            ..complete_args()
        };
        let config = Config::try_from(args).unwrap();
        assert_eq!(config.output, Output::DryRun);
    }

    #[test]
    fn test_invalid_repository() {
        let args = Args {
            repository: Some("payments".into()),
            ..complete_args()
        };
        let err = Config::try_from(args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput { name: "repository", .. }));
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "covdelta",
            "--lcov-path",
            "a.info",
            "--production-lcov-path",
            "b.info",
            "--package-name",
            "svc",
            "--coveralls-link",
            "http://x",
            "--metric",
            "branches",
            "--format",
            "html",
            "--pr-number",
            "9",
            "--dry-run",
        ])
        .unwrap();
        let config = Config::try_from(args).unwrap();

        assert_eq!(config.metric, MetricKind::Branches);
        assert_eq!(config.format, SummaryFormat::Html);
        assert_eq!(config.trigger.pr_number, Some(9));
        assert_eq!(config.output, Output::DryRun);
    }

    #[test]
    fn test_parse_rejects_unknown_metric() {
        let result = Args::try_parse_from(["covdelta", "--metric", "statements"]);
        assert!(result.is_err());
    }
}
