use async_trait::async_trait;

use crate::codeowners::CodeOwners;
use crate::config::RepositoryConfig;
use crate::github::{GithubRepoName, PullRequest, PullRequestNumber, Review};

mod handlers;

pub use handlers::{handle_pull_request_event, RunOutcome};

/// Provides functionality for working with a remote repository.
#[async_trait]
pub trait RepositoryClient: Send + Sync {
    fn repository(&self) -> &GithubRepoName;

    /// Resolve a pull request from this repository by it's number.
    async fn get_pull_request(&self, pr: PullRequestNumber) -> anyhow::Result<PullRequest>;

    /// Return the names of all labels attached to the pull request.
    async fn get_labels(&self, pr: PullRequestNumber) -> anyhow::Result<Vec<String>>;

    /// Return all submitted reviews of the pull request, oldest first.
    async fn get_reviews(&self, pr: PullRequestNumber) -> anyhow::Result<Vec<Review>>;

    /// Add the given users as assignees of the pull request.
    async fn add_assignees(&self, pr: PullRequestNumber, users: &[String]) -> anyhow::Result<()>;

    /// Request a review from the given users.
    async fn request_reviewers(
        &self,
        pr: PullRequestNumber,
        users: &[String],
    ) -> anyhow::Result<()>;

    /// Submit an approving review with the given message.
    /// The review will be posted as the user that owns the client's token.
    async fn approve(&self, pr: PullRequestNumber, message: &str) -> anyhow::Result<()>;
}

/// An access point to a single repository.
/// Holds everything a run needs to act on the repository: the client used to talk to
/// GitHub and the loaded configuration.
pub struct RepositoryState<Client: RepositoryClient> {
    pub client: Client,
    pub config: RepositoryConfig,
    /// Present only when reviewers should be requested.
    pub code_owners: Option<CodeOwners>,
}

impl<Client: RepositoryClient> RepositoryState<Client> {
    pub fn repository(&self) -> &GithubRepoName {
        self.client.repository()
    }
}
