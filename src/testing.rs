//! In-memory stand-in for GitHub used by unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use crate::board::{Board, BoardFilter};
use crate::client::IssueApi;
use crate::commands::board::BoardSource;
use crate::error::{KanbanError, Result};
use crate::payloads::{IssueUpdate, LabelInput};
use crate::types::{Issue, Label, RepoRef, State, User};

pub fn user(login: &str) -> User {
    User {
        login: login.to_string(),
        avatar_url: String::new(),
        html_url: String::new(),
    }
}

/// An open issue by `octocat` carrying the given labels.
pub fn issue(number: u64, labels: &[&str]) -> Issue {
    Issue {
        id: 1000 + number,
        number,
        title: format!("Issue {number}"),
        state: State::Open,
        body: None,
        user: user("octocat"),
        labels: labels.iter().map(|name| Label::new(name, "ededed")).collect(),
        assignees: Vec::new(),
        milestone: None,
        html_url: format!("https://github.com/acme/widgets/issues/{number}"),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        updated_at: "2024-01-01T00:00:00Z".to_string(),
        pull_request: None,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetIssue(u64),
    UpdateIssue(u64, IssueUpdate),
    AddLabels(u64, Vec<String>),
    RemoveLabel(u64, String),
    CreateLabel(String),
    AddAssignees(u64, Vec<String>),
    RemoveAssignees(u64, Vec<String>),
    /// Board load; `true` when it honoured a consistency wait.
    LoadBoard(bool),
}

/// Behaves like GitHub for the calls the board makes: removing a label the
/// issue lacks is a 404, adding a label the repository lacks is a 422.
#[derive(Default)]
pub struct FakeApi {
    issues: RefCell<HashMap<u64, Issue>>,
    labels: RefCell<Vec<Label>>,
    calls: RefCell<Vec<Call>>,
    failures: RefCell<HashMap<&'static str, u16>>,
}

fn api_error(status: u16, message: &str) -> KanbanError {
    KanbanError::ApiError {
        status,
        message: message.to_string(),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, issue: Issue) {
        self.issues.borrow_mut().insert(issue.number, issue);
    }

    pub fn define_labels(&self, names: &[&str]) {
        self.labels
            .borrow_mut()
            .extend(names.iter().map(|n| Label::new(n, "ededed")));
    }

    /// Make every call to `method` fail with `status`.
    pub fn fail(&self, method: &'static str, status: u16) {
        self.failures.borrow_mut().insert(method, status);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn issue(&self, number: u64) -> Option<Issue> {
        self.issues.borrow().get(&number).cloned()
    }

    pub fn repo_label(&self, name: &str) -> Option<Label> {
        self.labels.borrow().iter().find(|l| l.name == name).cloned()
    }

    fn record(&self, method: &'static str, call: Call) -> Result<()> {
        self.calls.borrow_mut().push(call);
        match self.failures.borrow().get(method) {
            Some(status) => Err(api_error(*status, "injected failure")),
            None => Ok(()),
        }
    }

    fn with_issue<T>(&self, number: u64, f: impl FnOnce(&mut Issue) -> Result<T>) -> Result<T> {
        let mut issues = self.issues.borrow_mut();
        let issue = issues
            .get_mut(&number)
            .ok_or_else(|| api_error(404, "Not Found"))?;
        f(issue)
    }
}

impl IssueApi for FakeApi {
    async fn get_issue(&self, _repo: &RepoRef, number: u64) -> Result<Issue> {
        self.record("get_issue", Call::GetIssue(number))?;
        self.with_issue(number, |issue| Ok(issue.clone()))
    }

    async fn update_issue(&self, _repo: &RepoRef, number: u64, update: &IssueUpdate) -> Result<Issue> {
        self.record("update_issue", Call::UpdateIssue(number, update.clone()))?;
        self.with_issue(number, |issue| {
            if let Some(title) = &update.title {
                issue.title = title.clone();
            }
            if let Some(body) = &update.body {
                issue.body = Some(body.clone());
            }
            if let Some(state) = update.state {
                issue.state = state;
            }
            if let Some(milestone) = update.milestone {
                issue.milestone = milestone.map(|number| crate::types::Milestone {
                    number,
                    title: format!("Milestone {number}"),
                    description: None,
                    due_on: None,
                    state: State::Open,
                    open_issues: 0,
                    closed_issues: 0,
                });
            }
            Ok(issue.clone())
        })
    }

    async fn add_labels(&self, _repo: &RepoRef, number: u64, labels: &[String]) -> Result<Vec<Label>> {
        self.record("add_labels", Call::AddLabels(number, labels.to_vec()))?;
        let defined = self.labels.borrow().clone();
        self.with_issue(number, |issue| {
            for name in labels {
                let label = defined
                    .iter()
                    .find(|l| &l.name == name)
                    .ok_or_else(|| api_error(422, "Validation Failed"))?;
                if !issue.has_label(name) {
                    issue.labels.push(label.clone());
                }
            }
            Ok(issue.labels.clone())
        })
    }

    async fn remove_label(&self, _repo: &RepoRef, number: u64, name: &str) -> Result<()> {
        self.record("remove_label", Call::RemoveLabel(number, name.to_string()))?;
        self.with_issue(number, |issue| {
            if !issue.has_label(name) {
                return Err(api_error(404, "Label does not exist"));
            }
            issue.labels.retain(|l| l.name != name);
            Ok(())
        })
    }

    async fn create_label(&self, _repo: &RepoRef, label: &LabelInput) -> Result<Label> {
        self.record("create_label", Call::CreateLabel(label.name.clone()))?;
        if self.repo_label(&label.name).is_some() {
            return Err(api_error(422, "Validation Failed (already_exists)"));
        }
        let created = Label {
            id: None,
            name: label.name.clone(),
            color: label.color.clone(),
            description: label.description.clone(),
        };
        self.labels.borrow_mut().push(created.clone());
        Ok(created)
    }

    async fn add_assignees(&self, _repo: &RepoRef, number: u64, logins: &[String]) -> Result<Issue> {
        self.record("add_assignees", Call::AddAssignees(number, logins.to_vec()))?;
        self.with_issue(number, |issue| {
            for login in logins {
                if !issue.is_assigned_to(login) {
                    issue.assignees.push(user(login));
                }
            }
            Ok(issue.clone())
        })
    }

    async fn remove_assignees(&self, _repo: &RepoRef, number: u64, logins: &[String]) -> Result<Issue> {
        self.record("remove_assignees", Call::RemoveAssignees(number, logins.to_vec()))?;
        self.with_issue(number, |issue| {
            issue.assignees.retain(|a| !logins.contains(&a.login));
            Ok(issue.clone())
        })
    }
}

impl BoardSource for FakeApi {
    async fn load_board(
        &self,
        _repo: &RepoRef,
        filter: &BoardFilter,
        wait: Option<Duration>,
    ) -> Result<Board> {
        self.record("load_board", Call::LoadBoard(wait.is_some()))?;
        let mut issues: Vec<Issue> = self.issues.borrow().values().cloned().collect();
        issues.sort_by_key(|i| i.number);
        Ok(Board::organize(issues, filter))
    }
}
