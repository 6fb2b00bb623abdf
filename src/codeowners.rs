//! Reviewer candidates loaded from a `CODEOWNERS` file.
use std::path::Path;

use anyhow::Context;
use itertools::Itertools;

/// Default location of the code owners file in a repository checkout.
pub const CODEOWNERS_PATH: &str = ".github/CODEOWNERS";

/// Individual users listed as owners in a `CODEOWNERS` file, in order of first appearance.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CodeOwners {
    owners: Vec<String>,
}

impl CodeOwners {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read code owners file {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Team owners (`@org/team`) and e-mail owners cannot be requested as reviewers by login,
    /// so they are skipped.
    pub fn parse(content: &str) -> Self {
        let owners = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .flat_map(|line| {
                line.split('#')
                    .next()
                    .unwrap_or_default()
                    .split_whitespace()
                    .skip(1)
            })
            .filter_map(|owner| owner.strip_prefix('@'))
            .filter(|login| !login.is_empty() && !login.contains('/'))
            .map(ToString::to_string)
            .unique()
            .collect();
        Self { owners }
    }

    pub fn owners(&self) -> &[String] {
        &self.owners
    }

    /// Picks up to `count` reviewers, never selecting the PR author.
    pub fn select_reviewers(&self, author: &str, count: usize) -> Vec<String> {
        self.owners
            .iter()
            .filter(|owner| !owner.eq_ignore_ascii_case(author))
            .take(count)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const CODEOWNERS: &str = r#"
# Default owners
*       @alice @bob

/docs/  @carol @alice   # docs team
*.rs    @rust-lang/compiler @dave
/ci/    ops@example.com
"#;

    #[test]
    fn parse_owners() {
        let owners = CodeOwners::parse(CODEOWNERS);
        assert_eq!(owners.owners(), &["alice", "bob", "carol", "dave"]);
    }

    #[test]
    fn parse_empty() {
        assert_eq!(CodeOwners::parse("\n# nothing here\n"), CodeOwners::default());
    }

    #[test]
    fn select_skips_author() {
        let owners = CodeOwners::parse(CODEOWNERS);
        assert_eq!(owners.select_reviewers("Alice", 2), vec!["bob", "carol"]);
    }

    #[test]
    fn select_more_than_available() {
        let owners = CodeOwners::parse(CODEOWNERS);
        assert_eq!(owners.select_reviewers("someone", 10).len(), 4);
    }

    #[test]
    fn select_zero() {
        let owners = CodeOwners::parse(CODEOWNERS);
        assert!(owners.select_reviewers("someone", 0).is_empty());
    }

    #[test]
    fn load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CODEOWNERS.as_bytes()).unwrap();
        assert_eq!(CodeOwners::load(file.path()).unwrap().owners().len(), 4);
    }

    #[test]
    fn load_missing_file() {
        assert!(CodeOwners::load(Path::new("/nonexistent/CODEOWNERS")).is_err());
    }
}
