use serde::{Deserialize, Serialize};

use super::State;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Milestone {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_on: Option<String>,
    pub state: State,
    #[serde(default)]
    pub open_issues: u64,
    #[serde(default)]
    pub closed_issues: u64,
}
