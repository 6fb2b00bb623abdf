use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::policy::ApprovalCounting;

pub const CONFIG_FILE_PATH: &str = ".github/pr-steward.toml";

/// Login under which reviews submitted with the Actions token appear.
pub const DEFAULT_AUTOMATION_LOGIN: &str = "github-actions[bot]";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Configuration of a repository loaded from a `.github/pr-steward.toml`
/// file located in the repository checkout.
#[derive(serde::Deserialize, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Login of the account that submits automatic approvals.
    pub automation_login: String,
    pub approval_counting: ApprovalCounting,
    /// How many code owners should be requested as reviewers when a PR is opened.
    pub reviewers: usize,
    pub codeowners: Option<PathBuf>,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            automation_login: DEFAULT_AUTOMATION_LOGIN.to_string(),
            approval_counting: ApprovalCounting::default(),
            reviewers: 0,
            codeowners: None,
        }
    }
}

/// Loads the configuration file, falling back to defaults if it does not exist.
pub fn load_config(path: &Path) -> Result<RepositoryConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(RepositoryConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
