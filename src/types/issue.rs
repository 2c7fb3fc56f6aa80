use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{Label, Milestone, User};

/// Open/closed state shared by issues and milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Open,
    Closed,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Open => "open",
            State::Closed => "closed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub state: State,
    #[serde(default)]
    pub body: Option<String>,
    pub user: User,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub html_url: String,
    pub created_at: String,
    pub updated_at: String,
    /// Present when the issues endpoint hands back a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    pub fn author(&self) -> &str {
        &self.user.login
    }

    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    pub fn is_assigned_to(&self, login: &str) -> bool {
        self.assignees.iter().any(|a| a.login == login)
    }

    pub fn department(&self) -> Option<&Label> {
        self.labels.iter().find(|l| l.is_department())
    }

    /// Labels that are neither board status nor department markers.
    pub fn plain_labels(&self) -> impl Iterator<Item = &Label> {
        self.labels
            .iter()
            .filter(|l| !l.is_status() && !l.is_department())
    }
}
