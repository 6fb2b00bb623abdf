//! This is the library of the pr-steward bot, which applies approval policies to pull requests.
pub mod codeowners;
pub mod config;
pub mod github;
pub mod policy;
pub mod steward;
pub mod utils;
