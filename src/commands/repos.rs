use tabled::Tabled;

use crate::client::GitHubClient;
use crate::error::Result;
use crate::output::{self, format_relative, truncate};
use crate::types::Repository;

#[derive(Tabled)]
struct RepoRow {
    #[tabled(rename = "Repository")]
    full_name: String,
    #[tabled(rename = "Visibility")]
    visibility: String,
    #[tabled(rename = "Open issues")]
    open_issues: u64,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl RepoRow {
    fn from_repo(repo: &Repository) -> Self {
        Self {
            full_name: repo.full_name.clone(),
            visibility: if repo.private { "private" } else { "public" }.to_string(),
            open_issues: repo.open_issues_count,
            updated: repo.updated_at.as_deref().map(format_relative).unwrap_or_default(),
            description: truncate(repo.description.as_deref().unwrap_or(""), 50),
        }
    }
}

/// Case-insensitive substring match on name or description; no search keeps everything.
pub fn filter_repos(repos: Vec<Repository>, search: Option<&str>) -> Vec<Repository> {
    let needle = match search.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_lowercase(),
        None => return repos,
    };

    repos
        .into_iter()
        .filter(|r| {
            r.name.to_lowercase().contains(&needle)
                || r
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .collect()
}

pub async fn list(client: &GitHubClient, search: Option<String>) -> Result<()> {
    let repos = filter_repos(client.list_repos().await?, search.as_deref());

    if repos.is_empty() {
        output::print_message("No repositories found");
        return Ok(());
    }

    output::print_table(&repos, RepoRow::from_repo);
    Ok(())
}
