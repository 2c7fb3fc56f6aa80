use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KanbanError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GitHub API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to encode or decode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to read config file at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config file at {path}: {message}")]
    ConfigWrite { path: PathBuf, message: String },

    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error(
        "No GitHub token found. Run 'gh-kanban login', set GITHUB_TOKEN, or add token to ~/.config/gh-kanban/config.toml"
    )]
    MissingToken,

    #[error("No OAuth client ID. Set GITHUB_CLIENT_ID or add client_id to the config file")]
    MissingClientId,

    #[error("GitHub login failed: {0}")]
    Auth(String),

    #[error("Repository not specified and no default_repo in config")]
    NoRepo,

    #[error("Invalid repository '{0}', expected OWNER/REPO")]
    InvalidRepo(String),

    #[error("Issue #{0} is not on the board")]
    IssueNotOnBoard(u64),

    #[error("Invalid label color '{0}', expected 6 hex digits")]
    InvalidColor(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Failed to move issue #{number}: {source}")]
    MoveFailed {
        number: u64,
        #[source]
        source: Box<KanbanError>,
    },
}

impl KanbanError {
    /// HTTP status reported by GitHub, if this error came from the API.
    pub fn status(&self) -> Option<u16> {
        match self {
            KanbanError::ApiError { status, .. } => Some(*status),
            KanbanError::Http(e) => e.status().map(|s| s.as_u16()),
            KanbanError::MoveFailed { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// GitHub answers 422 when a request references something that does not exist yet.
    pub fn is_validation(&self) -> bool {
        self.status() == Some(422)
    }
}

pub type Result<T> = std::result::Result<T, KanbanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_helpers() {
        let not_found = KanbanError::ApiError {
            status: 404,
            message: "Label does not exist".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_validation());

        let invalid = KanbanError::ApiError {
            status: 422,
            message: "Validation Failed".to_string(),
        };
        assert!(invalid.is_validation());
        assert_eq!(invalid.status(), Some(422));

        assert_eq!(KanbanError::NoRepo.status(), None);
    }

    #[test]
    fn test_move_failed_keeps_status() {
        let err = KanbanError::MoveFailed {
            number: 7,
            source: Box::new(KanbanError::ApiError {
                status: 403,
                message: "Forbidden".to_string(),
            }),
        };
        assert_eq!(err.status(), Some(403));
        assert!(err.to_string().contains("#7"));
    }
}
