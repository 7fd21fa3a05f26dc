//! # cov-publish
//!
//! Delivery of coverage summaries to pull requests.
//!
//! - [`TriggerContext`] decides whether a run has anything to comment on
//! - [`Publisher`] is the seam between the finished summary and the outside world
//! - [`GithubPublisher`] posts the summary as an issue comment via the REST API
//!
//! Publishing is attempted once. There is no retry.

pub mod event;
pub mod github;

pub use event::{PullRequest, TriggerContext};
pub use github::{GithubPublisher, RepoSlug};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while resolving the trigger or publishing
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Invalid repository '{0}', expected owner/name")]
    InvalidRepository(String),

    #[error("Invalid event payload: {0}")]
    InvalidEvent(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PublishError>;

/// Destination for a rendered summary
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Post `body` on the given pull request
    async fn publish(&self, target: PullRequest, body: &str) -> Result<()>;
}

/// Publish when the trigger targets a pull request
///
/// Returns `Ok(false)` without calling the publisher for any other trigger.
pub async fn publish_summary(
    publisher: &dyn Publisher,
    context: &TriggerContext,
    body: &str,
) -> Result<bool> {
    match context {
        TriggerContext::PullRequest(target) => {
            publisher.publish(*target, body).await?;
            log::info!("Published coverage summary to pull request #{}", target.number);
            Ok(true)
        }
        TriggerContext::Other => {
            log::info!("Not a pull request trigger, nothing to publish");
            Ok(false)
        }
    }
}
