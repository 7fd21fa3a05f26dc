//! GitHub issue-comment publisher

use crate::event::PullRequest;
use crate::{PublishError, Publisher, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository identifier in `owner/name` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = PublishError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(RepoSlug {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(PublishError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

/// Posts summaries as pull request comments through the GitHub REST API
#[derive(Debug, Clone)]
pub struct GithubPublisher {
    api_url: String,
    repo: RepoSlug,
    token: String,
    client: reqwest::Client,
}

impl GithubPublisher {
    /// Create a publisher against `api_url` (e.g. `https://api.github.com`)
    pub fn new(api_url: impl Into<String>, repo: RepoSlug, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("covdelta/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(api_url, repo, token, client))
    }

    /// Create a publisher with a custom reqwest client
    pub fn with_client(
        api_url: impl Into<String>,
        repo: RepoSlug,
        token: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            repo,
            token: token.into(),
            client,
        }
    }

    pub fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    /// Endpoint for comments on a pull request (PRs are issues to this API)
    pub fn comments_url(&self, target: PullRequest) -> String {
        format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.api_url, self.repo.owner, self.repo.name, target.number
        )
    }
}

#[async_trait]
impl Publisher for GithubPublisher {
    async fn publish(&self, target: PullRequest, body: &str) -> Result<()> {
        let url = self.comments_url(target);
        log::debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .json(&CommentRequest { body })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
