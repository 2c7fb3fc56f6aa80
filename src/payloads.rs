//! Request bodies sent to the GitHub REST API.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{KanbanError, Result};
use crate::types::State;

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct NewIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}

/// Partial issue update. `milestone: Some(None)` serializes as `null` and clears it.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<Option<u64>>,
}

impl IssueUpdate {
    pub fn state(state: State) -> Self {
        Self {
            state: Some(state),
            ..Default::default()
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LabelInput {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct LabelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NewMilestone {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct MilestoneUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<State>,
}

/// Strip a leading `#` and check for six hex digits; GitHub stores colors bare.
pub fn normalize_color(color: &str) -> Result<String> {
    let hex = color.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(hex.to_lowercase())
    } else {
        Err(KanbanError::InvalidColor(color.to_string()))
    }
}

/// Turn a `YYYY-MM-DD` date into the timestamp GitHub expects for `due_on`.
pub fn due_on(date: &str) -> Result<String> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map(|d| format!("{}T00:00:00Z", d.format("%Y-%m-%d")))
        .map_err(|_| KanbanError::InvalidDate(date.to_string()))
}
