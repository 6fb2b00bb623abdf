use anyhow::Context;
use octocrab::Octocrab;

use client::GithubRepositoryClient;

use crate::github::{GithubRepoName, GithubToken};

pub mod client;

/// Creates a client authenticated with the given token that operates on `repo_name`.
pub fn create_repository_client(
    token: &GithubToken,
    repo_name: GithubRepoName,
) -> anyhow::Result<GithubRepositoryClient> {
    let client = Octocrab::builder()
        .personal_token(token.expose().to_string())
        .build()
        .context("Could not create octocrab builder")?;
    Ok(GithubRepositoryClient {
        client,
        repo_name,
    })
}
