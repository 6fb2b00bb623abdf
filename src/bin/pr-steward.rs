use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pr_steward::codeowners::{CodeOwners, CODEOWNERS_PATH};
use pr_steward::config::{load_config, CONFIG_FILE_PATH};
use pr_steward::github::api::create_repository_client;
use pr_steward::github::event::load_event;
use pr_steward::github::GithubToken;
use pr_steward::steward::{handle_pull_request_event, RepositoryState, RunOutcome};
use pr_steward::utils::logging::LogError;

#[derive(clap::Parser)]
struct Opts {
    /// Token used to authenticate to the GitHub API.
    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
    token: String,

    /// Path to the JSON payload of the event that triggered the workflow.
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: PathBuf,

    /// Path to the repository configuration file.
    #[arg(long, env = "INPUT_CONFIG", default_value = CONFIG_FILE_PATH)]
    config: PathBuf,

    /// Login of the account that submits automatic approvals.
    #[arg(long, env = "INPUT_AUTOMATION_LOGIN")]
    automation_login: Option<String>,

    /// How many code owners should be requested as reviewers of newly opened PRs.
    #[arg(long, env = "INPUT_REVIEWERS")]
    reviewers: Option<usize>,

    /// Path to the CODEOWNERS file used to pick reviewers.
    #[arg(long, env = "INPUT_CODEOWNERS")]
    codeowners: Option<PathBuf>,
}

fn try_main(opts: Opts) -> anyhow::Result<RunOutcome> {
    let event = load_event(&opts.event_path)?;

    let mut config = load_config(&opts.config)?;
    if let Some(login) = opts.automation_login {
        config.automation_login = login;
    }
    if let Some(reviewers) = opts.reviewers {
        config.reviewers = reviewers;
    }
    if let Some(codeowners) = opts.codeowners {
        config.codeowners = Some(codeowners);
    }
    tracing::debug!("Loaded config: {config:?}");

    let code_owners = if config.reviewers > 0 {
        let path = config
            .codeowners
            .clone()
            .unwrap_or_else(|| PathBuf::from(CODEOWNERS_PATH));
        Some(CodeOwners::load(&path)?)
    } else {
        None
    };

    let token = GithubToken::new(opts.token);
    let client = create_repository_client(&token, event.repository.clone())?;
    let state = RepositoryState {
        client,
        config,
        code_owners,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Cannot build tokio runtime")?;
    runtime.block_on(handle_pull_request_event(&state, &event))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = Opts::parse();
    let span = tracing::info_span!("pr-steward");
    match try_main(opts) {
        Ok(RunOutcome::Completed) => {}
        Ok(RunOutcome::Blocked { required, actual }) => {
            // Reported as a failed check by GitHub Actions.
            println!("::error::PR has {actual} of {required} required approvals");
            std::process::exit(1);
        }
        Err(error) => {
            span.log_error(&error);
            println!("::error::{error}");
            std::process::exit(1);
        }
    }
}
