use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::{KanbanError, Result};
use crate::payloads::{
    IssueUpdate, LabelInput, LabelUpdate, MilestoneUpdate, NewIssue, NewMilestone,
};
use crate::types::{Issue, Label, Milestone, RepoRef, Repository, State, User};

pub const USER_AGENT_VALUE: &str = concat!("gh-kanban/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// The calls a board move and the issue editor make against one issue.
///
/// Kept as a trait so the move sequence can run against an in-memory fake.
#[allow(async_fn_in_trait)]
pub trait IssueApi {
    async fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<Issue>;

    async fn update_issue(&self, repo: &RepoRef, number: u64, update: &IssueUpdate)
        -> Result<Issue>;

    async fn add_labels(&self, repo: &RepoRef, number: u64, labels: &[String])
        -> Result<Vec<Label>>;

    async fn remove_label(&self, repo: &RepoRef, number: u64, name: &str) -> Result<()>;

    async fn create_label(&self, repo: &RepoRef, label: &LabelInput) -> Result<Label>;

    async fn add_assignees(&self, repo: &RepoRef, number: u64, logins: &[String])
        -> Result<Issue>;

    async fn remove_assignees(&self, repo: &RepoRef, number: u64, logins: &[String])
        -> Result<Issue>;
}

pub struct GitHubClient {
    http: Client,
    token: String,
    base_url: Url,
}

#[derive(Deserialize)]
struct GitHubErrorBody {
    message: String,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Pull GitHub's `message` (and any field errors) out of an error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<GitHubErrorBody>(body) {
        Ok(parsed) if parsed.errors.is_empty() => parsed.message,
        Ok(parsed) => {
            let details: Vec<String> = parsed
                .errors
                .iter()
                .map(|e| match e.get("code").and_then(|c| c.as_str()) {
                    Some(code) => code.to_string(),
                    None => e.to_string(),
                })
                .collect();
            format!("{} ({})", parsed.message, details.join(", "))
        }
        Err(_) => body.to_string(),
    }
}

impl GitHubClient {
    pub fn new(token: String, api_url: &str) -> Result<Self> {
        let base_url = Url::parse(api_url)?;
        if base_url.cannot_be_a_base() {
            return Err(KanbanError::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        Ok(Self {
            http: Client::new(),
            token,
            base_url,
        })
    }

    /// Build an endpoint URL; each segment is percent-encoded, so label names are safe.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn repo_endpoint(&self, repo: &RepoRef, rest: &[&str]) -> Url {
        let mut segments = vec!["repos", repo.owner.as_str(), repo.name.as_str()];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %response.url(), "GitHub response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read response body>".to_string());
            return Err(KanbanError::ApiError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        tracing::debug!(%method, %url, "GitHub request");
        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        Ok(self.send(request).await?.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!(%url, ?query, "GitHub request");
        let request = self.http.get(url).query(query);
        Ok(self.send(request).await?.json().await?)
    }

    async fn write<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        self.request(method, url, Some(serde_json::to_value(body)?))
            .await
    }

    async fn delete(&self, url: Url) -> Result<()> {
        tracing::debug!(%url, "GitHub request: DELETE");
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    pub async fn authenticated_user(&self) -> Result<User> {
        self.get(self.endpoint(&["user"]), &[]).await
    }

    pub async fn list_repos(&self) -> Result<Vec<Repository>> {
        let query = [
            ("sort", "updated".to_string()),
            ("direction", "desc".to_string()),
            ("per_page", "100".to_string()),
            ("type", "all".to_string()),
        ];
        self.get(self.endpoint(&["user", "repos"]), &query).await
    }

    pub async fn list_issues(
        &self,
        repo: &RepoRef,
        state: State,
        sort: &str,
        per_page: u32,
    ) -> Result<Vec<Issue>> {
        let query = [
            ("state", state.as_str().to_string()),
            ("sort", sort.to_string()),
            ("direction", "desc".to_string()),
            ("per_page", per_page.to_string()),
        ];
        self.get(self.repo_endpoint(repo, &["issues"]), &query).await
    }

    pub async fn create_issue(&self, repo: &RepoRef, issue: &NewIssue) -> Result<Issue> {
        self.write(Method::POST, self.repo_endpoint(repo, &["issues"]), issue)
            .await
    }

    pub async fn list_collaborators(&self, repo: &RepoRef) -> Result<Vec<User>> {
        let query = [("per_page", "100".to_string())];
        self.get(self.repo_endpoint(repo, &["collaborators"]), &query)
            .await
    }

    pub async fn list_labels(&self, repo: &RepoRef) -> Result<Vec<Label>> {
        let query = [("per_page", "100".to_string())];
        self.get(self.repo_endpoint(repo, &["labels"]), &query).await
    }

    pub async fn update_label(
        &self,
        repo: &RepoRef,
        name: &str,
        update: &LabelUpdate,
    ) -> Result<Label> {
        self.write(Method::PATCH, self.repo_endpoint(repo, &["labels", name]), update)
            .await
    }

    pub async fn delete_label(&self, repo: &RepoRef, name: &str) -> Result<()> {
        self.delete(self.repo_endpoint(repo, &["labels", name])).await
    }

    pub async fn list_milestones(&self, repo: &RepoRef, state: State) -> Result<Vec<Milestone>> {
        let query = [
            ("state", state.as_str().to_string()),
            ("per_page", "100".to_string()),
        ];
        self.get(self.repo_endpoint(repo, &["milestones"]), &query)
            .await
    }

    pub async fn create_milestone(
        &self,
        repo: &RepoRef,
        milestone: &NewMilestone,
    ) -> Result<Milestone> {
        self.write(Method::POST, self.repo_endpoint(repo, &["milestones"]), milestone)
            .await
    }

    pub async fn update_milestone(
        &self,
        repo: &RepoRef,
        number: u64,
        update: &MilestoneUpdate,
    ) -> Result<Milestone> {
        let number = number.to_string();
        self.write(
            Method::PATCH,
            self.repo_endpoint(repo, &["milestones", &number]),
            update,
        )
        .await
    }

    pub async fn delete_milestone(&self, repo: &RepoRef, number: u64) -> Result<()> {
        let number = number.to_string();
        self.delete(self.repo_endpoint(repo, &["milestones", &number]))
            .await
    }
}

impl IssueApi for GitHubClient {
    async fn get_issue(&self, repo: &RepoRef, number: u64) -> Result<Issue> {
        let number = number.to_string();
        self.get(self.repo_endpoint(repo, &["issues", &number]), &[])
            .await
    }

    async fn update_issue(
        &self,
        repo: &RepoRef,
        number: u64,
        update: &IssueUpdate,
    ) -> Result<Issue> {
        let number = number.to_string();
        self.write(
            Method::PATCH,
            self.repo_endpoint(repo, &["issues", &number]),
            update,
        )
        .await
    }

    async fn add_labels(
        &self,
        repo: &RepoRef,
        number: u64,
        labels: &[String],
    ) -> Result<Vec<Label>> {
        let number = number.to_string();
        self.request(
            Method::POST,
            self.repo_endpoint(repo, &["issues", &number, "labels"]),
            Some(json!({ "labels": labels })),
        )
        .await
    }

    async fn remove_label(&self, repo: &RepoRef, number: u64, name: &str) -> Result<()> {
        let number = number.to_string();
        self.delete(self.repo_endpoint(repo, &["issues", &number, "labels", name]))
            .await
    }

    async fn create_label(&self, repo: &RepoRef, label: &LabelInput) -> Result<Label> {
        self.write(Method::POST, self.repo_endpoint(repo, &["labels"]), label)
            .await
    }

    async fn add_assignees(
        &self,
        repo: &RepoRef,
        number: u64,
        logins: &[String],
    ) -> Result<Issue> {
        let number = number.to_string();
        self.request(
            Method::POST,
            self.repo_endpoint(repo, &["issues", &number, "assignees"]),
            Some(json!({ "assignees": logins })),
        )
        .await
    }

    async fn remove_assignees(
        &self,
        repo: &RepoRef,
        number: u64,
        logins: &[String],
    ) -> Result<Issue> {
        let number = number.to_string();
        self.request(
            Method::DELETE,
            self.repo_endpoint(repo, &["issues", &number, "assignees"]),
            Some(json!({ "assignees": logins })),
        )
        .await
    }
}
