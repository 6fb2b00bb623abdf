//! Parsing of the GitHub Actions event payload that triggered the run.
use std::path::Path;

use thiserror::Error;

use crate::github::{GithubRepoName, PullRequestNumber};
use crate::policy::EventType;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("Error, not triggered from PR, aborting...")]
    NotPullRequest,
    #[error("Event payload does not contain an action")]
    MissingAction,
    #[error("Owner for repo {0} is missing")]
    MissingRepositoryOwner(String),
    #[error("Cannot read event payload {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Cannot parse event payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(serde::Deserialize, Debug)]
struct WebhookOwner {
    login: String,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookRepository {
    name: String,
    owner: Option<WebhookOwner>,
}

#[derive(serde::Deserialize, Debug)]
struct WebhookPullRequest {
    number: u64,
}

/// Shared shape of `pull_request`, `pull_request_target` and `pull_request_review` payloads.
#[derive(serde::Deserialize, Debug)]
struct WebhookPayload {
    action: Option<String>,
    pull_request: Option<WebhookPullRequest>,
    repository: WebhookRepository,
}

/// The event that triggered the current run.
#[derive(Debug, PartialEq)]
pub struct PullRequestEvent {
    pub repository: GithubRepoName,
    pub pr_number: PullRequestNumber,
    pub event_type: EventType,
}

pub fn load_event(path: &Path) -> Result<PullRequestEvent, EventError> {
    let body = std::fs::read(path).map_err(|source| EventError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_event(&body)
}

pub fn parse_event(body: &[u8]) -> Result<PullRequestEvent, EventError> {
    let payload: WebhookPayload = serde_json::from_slice(body)?;
    let Some(pull_request) = payload.pull_request else {
        return Err(EventError::NotPullRequest);
    };
    let action = payload.action.ok_or(EventError::MissingAction)?;
    let repository = parse_repository_name(payload.repository)?;

    Ok(PullRequestEvent {
        repository,
        pr_number: pull_request.number.into(),
        event_type: EventType::parse(&action),
    })
}

fn parse_repository_name(repository: WebhookRepository) -> Result<GithubRepoName, EventError> {
    let Some(owner) = repository.owner else {
        return Err(EventError::MissingRepositoryOwner(repository.name));
    };
    Ok(GithubRepoName::new(&owner.login, &repository.name))
}
