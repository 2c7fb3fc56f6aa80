use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{KanbanError, Result};
use crate::types::RepoRef;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub usually serves a fresh read within this window after a label change.
pub const DEFAULT_SYNC_DELAY_SECS: u64 = 5;

#[derive(Deserialize, Serialize, Default, Debug, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_delay_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents =
            std::fs::read_to_string(config_path).map_err(|e| KanbanError::ConfigRead {
                path: config_path.to_path_buf(),
                source: e,
            })?;

        toml::from_str(&contents).map_err(|e| KanbanError::ConfigParse {
            path: config_path.to_path_buf(),
            source: e,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        let write_err = |message: String| KanbanError::ConfigWrite {
            path: config_path.to_path_buf(),
            message,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let contents = toml::to_string(self).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(config_path, contents).map_err(|e| write_err(e.to_string()))
    }

    pub fn config_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "gh-kanban")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(KanbanError::NoConfigDir)
    }

    /// Get token with env vars taking precedence over config file
    pub fn token(&self) -> Result<String> {
        for var in ["GITHUB_TOKEN", "GH_TOKEN"] {
            if let Ok(token) = std::env::var(var) {
                if !token.is_empty() {
                    return Ok(token);
                }
            }
        }

        self.token.clone().ok_or(KanbanError::MissingToken)
    }

    pub fn client_id(&self) -> Result<String> {
        if let Ok(id) = std::env::var("GITHUB_CLIENT_ID") {
            return Ok(id);
        }

        self.client_id.clone().ok_or(KanbanError::MissingClientId)
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn sync_delay(&self) -> Duration {
        Duration::from_secs(self.sync_delay_secs.unwrap_or(DEFAULT_SYNC_DELAY_SECS))
    }

    /// Get repository, preferring explicit argument over default
    pub fn resolve_repo(&self, explicit: Option<&str>) -> Result<RepoRef> {
        explicit
            .or(self.default_repo.as_deref())
            .ok_or(KanbanError::NoRepo)?
            .parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_repo_prefers_explicit() {
        let config = Config {
            default_repo: Some("acme/widgets".to_string()),
            ..Default::default()
        };

        let repo = config.resolve_repo(Some("octo/board")).unwrap();
        assert_eq!(repo.to_string(), "octo/board");

        let repo = config.resolve_repo(None).unwrap();
        assert_eq!(repo.to_string(), "acme/widgets");
    }

    #[test]
    fn test_resolve_repo_missing() {
        let config = Config::default();
        assert!(matches!(config.resolve_repo(None), Err(KanbanError::NoRepo)));
    }

    #[test]
    fn test_sync_delay_default_and_override() {
        assert_eq!(Config::default().sync_delay(), Duration::from_secs(5));

        let config = Config {
            sync_delay_secs: Some(12),
            ..Default::default()
        };
        assert_eq!(config.sync_delay(), Duration::from_secs(12));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            token: Some("gho_abc".to_string()),
            default_repo: Some("acme/widgets".to_string()),
            sync_delay_secs: Some(3),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "token = [unterminated").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(KanbanError::ConfigParse { .. })
        ));
    }
}
