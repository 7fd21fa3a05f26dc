//! CI trigger resolution

use crate::Result;
use serde::Deserialize;

/// Pull request a summary is posted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
}

/// What started the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerContext {
    PullRequest(PullRequest),
    /// Push, schedule, manual dispatch... nothing to comment on
    Other,
}

#[derive(Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
}

#[derive(Deserialize)]
struct PullRequestPayload {
    number: Option<u64>,
}

impl TriggerContext {
    /// Resolve the context from a GitHub Actions event name and payload
    ///
    /// Only `pull_request` events carrying a PR number target anything.
    /// A malformed payload on a `pull_request` event is an error.
    pub fn from_event(event_name: &str, payload: Option<&str>) -> Result<Self> {
        if event_name != "pull_request" {
            log::debug!("Event '{}' is not a pull request", event_name);
            return Ok(TriggerContext::Other);
        }

        let Some(payload) = payload else {
            log::warn!("pull_request event without payload, skipping");
            return Ok(TriggerContext::Other);
        };

        let event: EventPayload = serde_json::from_str(payload)?;
        Ok(match event.pull_request.and_then(|pr| pr.number) {
            Some(number) => TriggerContext::PullRequest(PullRequest { number }),
            None => {
                log::warn!("pull_request event payload has no pull request number");
                TriggerContext::Other
            }
        })
    }

    /// Explicit PR number, bypassing event detection
    pub fn pull_request(number: u64) -> Self {
        TriggerContext::PullRequest(PullRequest { number })
    }

    pub fn target(&self) -> Option<PullRequest> {
        match self {
            TriggerContext::PullRequest(pr) => Some(*pr),
            TriggerContext::Other => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PublishError;

    #[test]
    fn test_pull_request_event() {
        let payload = r#"{"action": "opened", "number": 7, "pull_request": {"number": 7, "title": "x"}}"#;
        let context = TriggerContext::from_event("pull_request", Some(payload)).unwrap();

        assert_eq!(context, TriggerContext::pull_request(7));
        assert_eq!(context.target(), Some(PullRequest { number: 7 }));
    }

    #[test]
    fn test_other_events() {
        for name in ["push", "schedule", "workflow_dispatch", ""] {
            let context = TriggerContext::from_event(name, Some("{}")).unwrap();
            assert_eq!(context, TriggerContext::Other);
            assert_eq!(context.target(), None);
        }
    }

    #[test]
    fn test_pull_request_without_number() {
        let context = TriggerContext::from_event("pull_request", Some(r#"{"pull_request": {}}"#)).unwrap();
        assert_eq!(context, TriggerContext::Other);

        let context = TriggerContext::from_event("pull_request", Some("{}")).unwrap();
        assert_eq!(context, TriggerContext::Other);
    }

    #[test]
    fn test_pull_request_without_payload() {
        let context = TriggerContext::from_event("pull_request", None).unwrap();
        assert_eq!(context, TriggerContext::Other);
    }

    #[test]
    fn test_malformed_payload() {
        let err = TriggerContext::from_event("pull_request", Some("{not json")).unwrap_err();
        assert!(matches!(err, PublishError::InvalidEvent(_)));
    }

    #[test]
    fn test_payload_ignored_for_other_events() {
        let context = TriggerContext::from_event("push", Some("{not json")).unwrap();
        assert_eq!(context, TriggerContext::Other);
    }
}
