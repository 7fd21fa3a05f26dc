//! covdelta - coverage delta comments for pull requests
//!
//! Usage:
//!   covdelta --lcov-path coverage/lcov.info \
//!            --production-lcov-path prod/lcov.info \
//!            --package-name payments \
//!            --coveralls-link https://coveralls.io/... \
//!            [--metric lines] [--format plain] [--dry-run]
//!
//! Inside a GitHub Action the same inputs are read from `INPUT_*`,
//! `GITHUB_EVENT_NAME`, `GITHUB_EVENT_PATH` and `GITHUB_REPOSITORY`.

mod config;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cov_core::Summary;
use cov_publish::{GithubPublisher, TriggerContext, publish_summary};

use config::{Args, Config, Output, TriggerSource};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = Config::try_from(Args::parse()).context("Invalid configuration")?;
    run(&config).await?;
    Ok(())
}

/// Run the pipeline; returns the rendered summary when one was produced
async fn run(config: &Config) -> Result<Option<String>> {
    let trigger = resolve_trigger(&config.trigger)?;

    if trigger == TriggerContext::Other && config.output != Output::DryRun {
        log::info!("Run was not triggered by a pull request, skipping");
        return Ok(None);
    }

    let summary = build_summary(config)?;
    let body = summary
        .render(config.format)
        .context("Failed to render coverage summary")?;

    match &config.output {
        Output::DryRun => println!("{}", body),
        Output::Github {
            api_url,
            repository,
            token,
        } => {
            let publisher = GithubPublisher::new(api_url.as_str(), repository.clone(), token.as_str())
                .context("Failed to create GitHub client")?;
            publish_summary(&publisher, &trigger, &body)
                .await
                .with_context(|| format!("Failed to comment on {}", repository))?;
        }
    }

    Ok(Some(body))
}

fn resolve_trigger(source: &TriggerSource) -> Result<TriggerContext> {
    if let Some(number) = source.pr_number {
        return Ok(TriggerContext::pull_request(number));
    }

    let Some(event_name) = source.event_name.as_deref() else {
        return Ok(TriggerContext::Other);
    };

    let payload = match &source.event_path {
        Some(path) => Some(read_file(path, "event payload")?),
        None => None,
    };

    TriggerContext::from_event(event_name, payload.as_deref())
        .context("Failed to resolve triggering pull request")
}

fn build_summary(config: &Config) -> Result<Summary> {
    let current = read_file(&config.current_report, "coverage report")?;
    let baseline = read_file(&config.baseline_report, "production coverage report")?;

    let summary = Summary::from_reports(
        config.service.as_str(),
        &current,
        &baseline,
        config.metric,
        config.report_link.as_str(),
    )
    .with_context(|| {
        format!(
            "Failed to compare {} against {}",
            config.current_report.display(),
            config.baseline_report.display()
        )
    })?;

    Ok(summary)
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {} {}", what, path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cov_core::{MetricKind, SummaryFormat};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn dry_run_config(current: &Path, baseline: &Path) -> Config {
        Config {
            current_report: current.to_path_buf(),
            baseline_report: baseline.to_path_buf(),
            service: "svc".into(),
            report_link: "http://x".into(),
            metric: MetricKind::Lines,
            format: SummaryFormat::Plain,
            trigger: TriggerSource::default(),
            output: Output::DryRun,
        }
    }

    #[tokio::test]
    async fn test_dry_run_renders_summary() {
        let current = write_temp("SF:a.rs\nLF:100\nLH:90\nend_of_record\n");
        let baseline = write_temp(
            "SF:a.rs\nLF:50\nLH:40\nend_of_record\nSF:b.rs\nLF:100\nLH:60\nend_of_record\n",
        );

        let body = run(&dry_run_config(current.path(), baseline.path()))
            .await
            .unwrap();

        assert_eq!(
            body.as_deref(),
            Some(
                "Service: svc. Covered 90/100 (90.0%). Coverage increased by 23.3 compared to production. See More on http://x."
            )
        );
    }

    #[tokio::test]
    async fn test_non_pull_request_is_noop() {
        let config = Config {
            output: Output::Github {
                api_url: "http://127.0.0.1:9".into(),
                repository: "o/r".parse().unwrap(),
                token: "t".into(),
            },
            trigger: TriggerSource {
                event_name: Some("push".into()),
                ..Default::default()
            },
            // Reports are never read for a no-op run
            ..dry_run_config(Path::new("/nonexistent/a"), Path::new("/nonexistent/b"))
        };

        assert_eq!(run(&config).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_report_names_path() {
        let baseline = write_temp("");
        let config = dry_run_config(Path::new("/nonexistent/lcov.info"), baseline.path());

        let err = run(&config).await.unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/lcov.info"));
    }

    #[tokio::test]
    async fn test_malformed_report_aborts() {
        let current = write_temp("SF:a.rs\nLH:lots\n");
        let baseline = write_temp("");

        let err = run(&dry_run_config(current.path(), baseline.path()))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("line 2"));
    }

    #[test]
    fn test_resolve_trigger_from_event_file() {
        let event = write_temp(r#"{"pull_request": {"number": 31}}"#);
        let source = TriggerSource {
            event_name: Some("pull_request".into()),
            event_path: Some(event.path().to_path_buf()),
            pr_number: None,
        };

        assert_eq!(resolve_trigger(&source).unwrap(), TriggerContext::pull_request(31));
    }

    #[test]
    fn test_resolve_trigger_override() {
        let source = TriggerSource {
            event_name: Some("push".into()),
            event_path: Some(PathBuf::from("/nonexistent/event.json")),
            pr_number: Some(5),
        };

        assert_eq!(resolve_trigger(&source).unwrap(), TriggerContext::pull_request(5));
    }

    #[test]
    fn test_resolve_trigger_without_event() {
        assert_eq!(
            resolve_trigger(&TriggerSource::default()).unwrap(),
            TriggerContext::Other
        );
    }
}
