use anyhow::Context;
use async_trait::async_trait;
use octocrab::Octocrab;

use crate::github::{
    GithubRepoName, GithubUser, PullRequest, PullRequestNumber, Review, ReviewState,
};
use crate::steward::RepositoryClient;

/// GitHub returns at most this many items per page.
const PAGE_SIZE: &str = "100";

/// Provides access to a single repository using the GitHub API.
pub struct GithubRepositoryClient {
    pub client: Octocrab,
    pub repo_name: GithubRepoName,
}

impl GithubRepositoryClient {
    pub fn client(&self) -> &Octocrab {
        &self.client
    }

    pub fn name(&self) -> &GithubRepoName {
        &self.repo_name
    }

    fn format_pr(&self, pr: PullRequestNumber) -> String {
        format!("{}/{}/{}", self.name().owner(), self.name().name(), pr)
    }

    fn pr_route(&self, pr: PullRequestNumber, suffix: &str) -> String {
        format!("/repos/{}/pulls/{}{suffix}", self.repo_name, pr.0)
    }
}

#[derive(serde::Deserialize, Debug)]
struct LabelPayload {
    name: String,
}

#[derive(serde::Deserialize, Debug)]
struct ReviewUserPayload {
    login: String,
}

#[derive(serde::Deserialize, Debug)]
struct ReviewPayload {
    // Reviews of deleted accounts have no user.
    user: Option<ReviewUserPayload>,
    state: ReviewState,
}

#[async_trait]
impl RepositoryClient for GithubRepositoryClient {
    fn repository(&self) -> &GithubRepoName {
        self.name()
    }

    async fn get_pull_request(&self, pr: PullRequestNumber) -> anyhow::Result<PullRequest> {
        let pr = self
            .client
            .pulls(self.repository().owner(), self.repository().name())
            .get(pr.0)
            .await
            .map_err(|error| {
                anyhow::anyhow!("Could not get PR {}/{}: {error:?}", self.repository(), pr.0)
            })?;
        github_pr_to_pr(pr)
    }

    async fn get_labels(&self, pr: PullRequestNumber) -> anyhow::Result<Vec<String>> {
        // https://docs.github.com/en/rest/issues/labels#list-labels-for-an-issue
        let labels: Vec<LabelPayload> = self
            .client
            .get(
                format!("/repos/{}/issues/{}/labels", self.repo_name, pr.0),
                Some(&[("per_page", PAGE_SIZE)]),
            )
            .await
            .with_context(|| format!("Cannot fetch labels of {}", self.format_pr(pr)))?;
        Ok(labels.into_iter().map(|label| label.name).collect())
    }

    async fn get_reviews(&self, pr: PullRequestNumber) -> anyhow::Result<Vec<Review>> {
        // https://docs.github.com/en/rest/pulls/reviews#list-reviews-for-a-pull-request
        let reviews: Vec<ReviewPayload> = self
            .client
            .get(self.pr_route(pr, "/reviews"), Some(&[("per_page", PAGE_SIZE)]))
            .await
            .with_context(|| format!("Cannot fetch reviews of {}", self.format_pr(pr)))?;
        Ok(reviews
            .into_iter()
            .filter_map(|review| {
                let Some(user) = review.user else {
                    tracing::trace!("Skipping review without an author on PR {pr}");
                    return None;
                };
                Some(Review {
                    author_login: user.login,
                    state: review.state,
                })
            })
            .collect())
    }

    async fn add_assignees(&self, pr: PullRequestNumber, users: &[String]) -> anyhow::Result<()> {
        // https://docs.github.com/en/rest/issues/assignees#add-assignees-to-an-issue
        let _: serde_json::Value = self
            .client
            .post(
                format!("/repos/{}/issues/{}/assignees", self.repo_name, pr.0),
                Some(&serde_json::json!({ "assignees": users })),
            )
            .await
            .with_context(|| format!("Cannot add assignees to {}", self.format_pr(pr)))?;
        Ok(())
    }

    async fn request_reviewers(
        &self,
        pr: PullRequestNumber,
        users: &[String],
    ) -> anyhow::Result<()> {
        // https://docs.github.com/en/rest/pulls/review-requests#request-reviewers-for-a-pull-request
        let _: serde_json::Value = self
            .client
            .post(
                self.pr_route(pr, "/requested_reviewers"),
                Some(&serde_json::json!({ "reviewers": users })),
            )
            .await
            .with_context(|| format!("Cannot request reviewers on {}", self.format_pr(pr)))?;
        Ok(())
    }

    async fn approve(&self, pr: PullRequestNumber, message: &str) -> anyhow::Result<()> {
        // https://docs.github.com/en/rest/pulls/reviews#create-a-review-for-a-pull-request
        let _: serde_json::Value = self
            .client
            .post(
                self.pr_route(pr, "/reviews"),
                Some(&serde_json::json!({ "event": "APPROVE", "body": message })),
            )
            .await
            .with_context(|| format!("Cannot approve {}", self.format_pr(pr)))?;
        Ok(())
    }
}

fn github_pr_to_pr(pr: octocrab::models::pulls::PullRequest) -> anyhow::Result<PullRequest> {
    let Some(user) = pr.user else {
        return Err(anyhow::anyhow!("Error reading user info of PR {}", pr.number));
    };
    Ok(PullRequest {
        number: pr.number.into(),
        author: GithubUser {
            username: user.login,
        },
        title: pr.title.unwrap_or_default(),
    })
}
