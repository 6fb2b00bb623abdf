use std::collections::BTreeSet;

use anyhow::Context;
use tracing::Instrument;

use crate::github::event::PullRequestEvent;
use crate::github::PullRequest;
use crate::policy::{plan, Decision, EventType, PolicySnapshot};
use crate::steward::{RepositoryClient, RepositoryState};

/// Result of a run that did not fail with an error.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// The PR does not have enough approvals yet.
    Blocked { required: u32, actual: u32 },
}

/// Fetches the state of the PR that triggered `event`, decides what to do with it and performs
/// the resulting actions. The first failing API call aborts the run.
pub async fn handle_pull_request_event<Client: RepositoryClient>(
    repo: &RepositoryState<Client>,
    event: &PullRequestEvent,
) -> anyhow::Result<RunOutcome> {
    let span = tracing::info_span!(
        "Pull request",
        pr = format!("{}#{}", repo.repository(), event.pr_number),
        event = ?event.event_type
    );
    handle_event(repo, event).instrument(span).await
}

async fn handle_event<Client: RepositoryClient>(
    repo: &RepositoryState<Client>,
    event: &PullRequestEvent,
) -> anyhow::Result<RunOutcome> {
    let pr = repo
        .client
        .get_pull_request(event.pr_number)
        .await
        .context("Error reading PR info")?;
    tracing::info!("Processing PR {} ({}) by {}", pr.number, pr.title, pr.author.username);
    let labels: BTreeSet<String> = repo
        .client
        .get_labels(pr.number)
        .await
        .context("Cannot load PR labels")?
        .into_iter()
        .collect();
    let reviews = repo
        .client
        .get_reviews(pr.number)
        .await
        .context("Cannot load PR reviews")?;
    tracing::debug!("Labels: {labels:?}, reviews: {reviews:?}");

    let snapshot = PolicySnapshot {
        event_type: event.event_type.clone(),
        actor_login: pr.author.username.clone(),
        labels,
        reviews,
    };
    let decisions = plan(
        &snapshot,
        &repo.config.automation_login,
        repo.config.approval_counting,
    );
    tracing::debug!("Decisions: {decisions:?}");

    if snapshot.event_type == EventType::Opened {
        request_reviewers(repo, &pr).await?;
    }

    let mut outcome = RunOutcome::Completed;
    for decision in decisions {
        match decision {
            Decision::Assign { user } => {
                repo.client
                    .add_assignees(pr.number, std::slice::from_ref(&user))
                    .await
                    .context("Cannot assign PR")?;
                tracing::info!("Assigned {user} to PR {}", pr.number);
            }
            Decision::Approve { message } => {
                repo.client
                    .approve(pr.number, &message)
                    .await
                    .context("Cannot approve PR")?;
                tracing::info!("Approved PR {}: {message}", pr.number);
            }
            Decision::NoOp { reason } => {
                tracing::info!("{reason}");
            }
            Decision::Block { required, actual } => {
                tracing::warn!("PR {} has {actual} of {required} required approvals", pr.number);
                outcome = RunOutcome::Blocked { required, actual };
            }
        }
    }
    Ok(outcome)
}

async fn request_reviewers<Client: RepositoryClient>(
    repo: &RepositoryState<Client>,
    pr: &PullRequest,
) -> anyhow::Result<()> {
    let Some(code_owners) = &repo.code_owners else {
        return Ok(());
    };
    let reviewers = code_owners.select_reviewers(&pr.author.username, repo.config.reviewers);
    if reviewers.is_empty() {
        tracing::info!("No code owners available to review PR {}", pr.number);
        return Ok(());
    }
    repo.client
        .request_reviewers(pr.number, &reviewers)
        .await
        .context("Cannot request reviewers")?;
    tracing::info!("Requested review from {reviewers:?} on PR {}", pr.number);
    Ok(())
}
