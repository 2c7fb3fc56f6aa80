use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::types::Issue;

/// A board column. Derived from labels on every read, never stored on GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    /// No status label
    Todo,
    /// Labelled as in progress
    InProgress,
    /// Labelled as done
    Done,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Todo, Column::InProgress, Column::Done];

    pub fn title(self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::InProgress => "In Progress",
            Column::Done => "Done",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Place an issue by label content. Done beats In Progress; everything else is To Do.
pub fn classify(issue: &Issue) -> Column {
    let names: Vec<String> = issue.labels.iter().map(|l| l.name.to_lowercase()).collect();

    if names
        .iter()
        .any(|n| n.contains("done") || n.contains("complete"))
    {
        Column::Done
    } else if names
        .iter()
        .any(|n| n.contains("progress") || n.contains("working"))
    {
        Column::InProgress
    } else {
        Column::Todo
    }
}

/// Optional exact-match filters; an issue must satisfy every one that is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardFilter {
    pub author: Option<String>,
    pub assignee: Option<String>,
    pub label: Option<String>,
    pub milestone: Option<String>,
}

impl BoardFilter {
    pub fn is_empty(&self) -> bool {
        self.author.is_none()
            && self.assignee.is_none()
            && self.label.is_none()
            && self.milestone.is_none()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(author) = &self.author {
            if issue.author() != author {
                return false;
            }
        }
        if let Some(milestone) = &self.milestone {
            if issue.milestone.as_ref().map(|m| &m.title) != Some(milestone) {
                return false;
            }
        }
        if let Some(label) = &self.label {
            if !issue.has_label(label) {
                return false;
            }
        }
        if let Some(assignee) = &self.assignee {
            if !issue.is_assigned_to(assignee) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Board {
    pub todo: Vec<Issue>,
    pub in_progress: Vec<Issue>,
    pub done: Vec<Issue>,
}

impl Board {
    /// Filter, then classify, keeping fetch order inside each column.
    pub fn organize(issues: impl IntoIterator<Item = Issue>, filter: &BoardFilter) -> Self {
        let mut board = Board::default();

        for issue in issues.into_iter().filter(|i| filter.matches(i)) {
            let column = classify(&issue);
            tracing::trace!(number = issue.number, %column, "classified issue");
            board.column_mut(column).push(issue);
        }

        tracing::debug!(
            todo = board.todo.len(),
            in_progress = board.in_progress.len(),
            done = board.done.len(),
            "organized board"
        );
        board
    }

    pub fn column(&self, column: Column) -> &[Issue] {
        match column {
            Column::Todo => &self.todo,
            Column::InProgress => &self.in_progress,
            Column::Done => &self.done,
        }
    }

    pub fn column_mut(&mut self, column: Column) -> &mut Vec<Issue> {
        match column {
            Column::Todo => &mut self.todo,
            Column::InProgress => &mut self.in_progress,
            Column::Done => &mut self.done,
        }
    }

    /// Column and position of an issue on the board.
    pub fn find(&self, number: u64) -> Option<(Column, usize)> {
        Column::ALL.into_iter().find_map(|column| {
            self.column(column)
                .iter()
                .position(|i| i.number == number)
                .map(|pos| (column, pos))
        })
    }

    pub fn len(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
