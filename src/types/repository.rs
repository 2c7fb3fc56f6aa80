use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::User;
use crate::error::KanbanError;

/// A repository as returned by `/user/repos`.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: User,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// An `owner/name` pair identifying the repository a board is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = KanbanError;

    /// Accepts `owner/repo` as well as `https://github.com/owner/repo[.git]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('/');
        let path = trimmed
            .strip_prefix("https://github.com/")
            .or_else(|| trimmed.strip_prefix("http://github.com/"))
            .or_else(|| trimmed.strip_prefix("github.com/"))
            .unwrap_or(trimmed);
        let path = path.strip_suffix(".git").unwrap_or(path);

        match path.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoRef::new(owner, name))
            }
            _ => Err(KanbanError::InvalidRepo(s.to_string())),
        }
    }
}
